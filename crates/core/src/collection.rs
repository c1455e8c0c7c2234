//! Remote collection views.
//!
//! Every list screen in the console has the same shape: the whole server
//! collection is fetched once, searched and paginated locally, and patched
//! in place after a mutation. [`RemoteCollection`] owns the fetched copy;
//! [`ViewState`] carries one viewer's search term, page and selection; and
//! [`RemoteCollection::view`] combines the two into a [`CollectionPage`].
//!
//! Fetching is not done here. The owner calls [`RemoteCollection::begin_load`]
//! and [`RemoteCollection::finish_load`] around its own request.

use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};

/// Number of records on one page of a list screen.
pub const PAGE_SIZE: usize = 6;

/// A record with a stable backend identity.
pub trait Record {
    /// The record's identifier type.
    type Id: Clone + Eq + Debug;

    /// Returns the record's identifier.
    fn id(&self) -> &Self::Id;
}

/// A record that can be matched against a free-text search term.
pub trait Searchable {
    /// The fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;
}

/// Returns `true` when any search field contains `term`, ignoring case.
///
/// Matching is a plain substring test, not token based. An empty term
/// matches every record.
#[must_use]
pub fn matches_term<T: Searchable>(record: &T, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Loading state of a [`RemoteCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has been fetched yet.
    #[default]
    NotLoaded,
    /// A fetch is in flight.
    Loading,
    /// The last fetch finished (successfully or not).
    Ready,
}

/// The client-side copy of one server collection.
#[derive(Debug, Clone)]
pub struct RemoteCollection<T> {
    items: Vec<T>,
    state: LoadState,
    loaded_at: Option<DateTime<Utc>>,
}

impl<T> Default for RemoteCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::NotLoaded,
            loaded_at: None,
        }
    }
}

impl<T: Record> RemoteCollection<T> {
    /// Create an empty, not yet loaded collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fetch as in flight.
    pub const fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Apply the outcome of a fetch.
    ///
    /// On success the whole collection is replaced and `now` is recorded as
    /// the load time. On failure the current items are kept, loading is
    /// cleared, and the error is handed back to the caller for logging. The
    /// load time is left as it was, so a collection that never loaded will
    /// be fetched again on next use.
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged.
    pub fn finish_load<E>(&mut self, result: Result<Vec<T>, E>, now: DateTime<Utc>) -> Result<(), E> {
        self.state = LoadState::Ready;
        let items = result?;
        self.items = items;
        self.loaded_at = Some(now);
        Ok(())
    }

    /// Returns `true` if the copy was never loaded or is at least `max_age` old.
    #[must_use]
    pub fn needs_reload(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.loaded_at
            .is_none_or(|loaded_at| now - loaded_at >= max_age)
    }

    /// Current loading state.
    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// Returns `true` while a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// When the collection was last loaded successfully.
    #[must_use]
    pub const fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// All records in server order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of records in the full collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the full collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a record by id.
    #[must_use]
    pub fn find(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Remove a record after the backend confirmed its deletion.
    ///
    /// Returns the removed record, or `None` if it was already gone.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Insert a record returned by a create, or replace it in place after an
    /// update.
    ///
    /// Returns `true` if an existing record was replaced.
    pub fn upsert(&mut self, record: T) -> bool {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id() == record.id()) {
            *existing = record;
            true
        } else {
            self.items.push(record);
            false
        }
    }
}

impl<T: Record + Searchable> RemoteCollection<T> {
    /// Build the filtered, paginated view for one viewer.
    #[must_use]
    pub fn view<'a>(&'a self, state: &ViewState<T::Id>) -> CollectionPage<'a, T> {
        let filtered: Vec<&T> = self
            .items
            .iter()
            .filter(|item| matches_term(*item, &state.search))
            .collect();

        let selected = state.selected.as_ref().and_then(|id| self.find(id));

        CollectionPage {
            filtered,
            page: state.page,
            page_size: PAGE_SIZE,
            total: self.items.len(),
            selected,
        }
    }
}

/// One viewer's search term, page and detail selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState<I> {
    search: String,
    page: usize,
    selected: Option<I>,
}

impl<I> Default for ViewState<I> {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            selected: None,
        }
    }
}

impl<I: Clone + Eq> ViewState<I> {
    /// Start on page 1 with no search term and nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the search term. Always returns to page 1.
    pub fn set_search_term(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    /// Select a 1-based page. Out-of-range values are kept as given.
    pub const fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Open the detail view for one record.
    pub fn select(&mut self, id: I) {
        self.selected = Some(id);
    }

    /// Close the detail view.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// The current search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// The current 1-based page.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// The selected record id, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&I> {
        self.selected.as_ref()
    }
}

/// A filtered, paginated slice of a [`RemoteCollection`].
#[derive(Debug)]
pub struct CollectionPage<'a, T> {
    filtered: Vec<&'a T>,
    page: usize,
    page_size: usize,
    total: usize,
    selected: Option<&'a T>,
}

impl<'a, T> CollectionPage<'a, T> {
    /// Records on the current page. Empty when the page is out of range.
    #[must_use]
    pub fn items(&self) -> &[&'a T] {
        let Some(start) = self
            .page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(self.page_size))
        else {
            return &[];
        };
        let end = start.saturating_add(self.page_size).min(self.filtered.len());
        self.filtered.get(start..end).unwrap_or(&[])
    }

    /// Every record matching the search term.
    #[must_use]
    pub fn filtered(&self) -> &[&'a T] {
        &self.filtered
    }

    /// Number of records matching the search term.
    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Number of records in the full collection.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// `ceil(filtered_len / page_size)`.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size)
    }

    /// The current 1-based page.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Whether a pager should be rendered (more than one page).
    #[must_use]
    pub const fn has_pager(&self) -> bool {
        self.page_count() > 1
    }

    /// 1-based position of the first record on this page in the filtered view.
    #[must_use]
    pub const fn first_position(&self) -> usize {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .saturating_add(1)
    }

    /// The record selected for the detail view, if it still exists.
    #[must_use]
    pub const fn selected(&self) -> Option<&'a T> {
        self.selected
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: u32,
        name: String,
        email: String,
        phone: String,
    }

    impl Record for Person {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    impl Searchable for Person {
        fn search_fields(&self) -> Vec<&str> {
            vec![&self.name, &self.email, &self.phone]
        }
    }

    fn person(id: u32, name: &str, email: &str, phone: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    fn people(n: u32) -> Vec<Person> {
        (1..=n)
            .map(|i| person(i, &format!("Person {i}"), &format!("p{i}@example.com"), &format!("90000{i:05}")))
            .collect()
    }

    fn loaded(items: Vec<Person>) -> RemoteCollection<Person> {
        let mut collection = RemoteCollection::new();
        collection.begin_load();
        collection.finish_load::<()>(Ok(items), Utc::now()).unwrap();
        collection
    }

    #[test]
    fn test_search_is_case_insensitive_substring_across_fields() {
        let collection = loaded(vec![
            person(1, "Asha Verma", "asha@uni.edu", "98100"),
            person(2, "Ravi Kumar", "ravi@VERMA.org", "98200"),
            person(3, "Meera", "meera@example.com", "77300"),
        ]);

        let mut state = ViewState::new();
        state.set_search_term("verma");
        let page = collection.view(&state);
        let ids: Vec<u32> = page.filtered().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);

        state.set_search_term("773");
        let ids: Vec<u32> = collection.view(&state).filtered().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);

        state.set_search_term("nobody");
        assert_eq!(collection.view(&state).filtered_len(), 0);
    }

    #[test]
    fn test_filtered_view_is_exactly_the_matching_subsequence() {
        let collection = loaded(people(20));
        for term in ["", "1", "PERSON 1", "example", "x"] {
            let mut state = ViewState::new();
            state.set_search_term(term);
            let page = collection.view(&state);
            let expected: Vec<&Person> = collection
                .items()
                .iter()
                .filter(|p| {
                    let t = term.to_lowercase();
                    p.name.to_lowercase().contains(&t)
                        || p.email.to_lowercase().contains(&t)
                        || p.phone.to_lowercase().contains(&t)
                })
                .collect();
            assert_eq!(page.filtered(), expected.as_slice(), "term {term:?}");
        }
    }

    #[test]
    fn test_search_resets_page() {
        let mut state: ViewState<u32> = ViewState::new();
        state.set_page(3);
        state.set_search_term("a");
        assert_eq!(state.page(), 1);
        state.set_page(2);
        state.set_search_term("");
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_page_count_and_last_page_size() {
        for n in 0..=25u32 {
            let collection = loaded(people(n));
            let n = n as usize;
            let mut state = ViewState::new();
            let count = collection.view(&state).page_count();
            assert_eq!(count, n.div_ceil(PAGE_SIZE), "n = {n}");

            if n > 0 {
                state.set_page(count);
                let last = collection.view(&state).items().len();
                let expected = if n % PAGE_SIZE == 0 { PAGE_SIZE } else { n % PAGE_SIZE };
                assert_eq!(last, expected, "n = {n}");
            }
        }
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let collection = loaded(people(7));
        let mut state = ViewState::new();

        state.set_page(3);
        assert!(collection.view(&state).items().is_empty());

        state.set_page(0);
        assert!(collection.view(&state).items().is_empty());
    }

    #[test]
    fn test_pager_only_with_more_than_one_page() {
        assert!(!loaded(people(0)).view(&ViewState::new()).has_pager());
        assert!(!loaded(people(6)).view(&ViewState::new()).has_pager());
        assert!(loaded(people(7)).view(&ViewState::new()).has_pager());
    }

    #[test]
    fn test_first_position_numbers_rows() {
        let collection = loaded(people(13));
        let mut state = ViewState::new();
        state.set_page(2);
        let page = collection.view(&state);
        assert_eq!(page.first_position(), 7);
        assert_eq!(page.items()[0].id, 7);
    }

    #[test]
    fn test_huge_page_numbers_are_empty_not_wrapped() {
        let collection = loaded(people(13));
        for huge in [usize::MAX, (1 << (usize::BITS - 1)) + 1] {
            let mut state = ViewState::new();
            state.set_page(huge);
            let page = collection.view(&state);
            assert!(page.items().is_empty(), "page {huge}");
            assert_eq!(page.first_position(), usize::MAX);
        }
    }

    #[test]
    fn test_remove_patches_both_views_once() {
        let mut collection = loaded(people(3));
        let mut state = ViewState::new();
        state.set_search_term("person");

        assert!(collection.remove(&2).is_some());
        assert!(collection.remove(&2).is_none());

        assert_eq!(collection.len(), 2);
        let page = collection.view(&state);
        assert!(page.filtered().iter().all(|p| p.id != 2));
    }

    #[test]
    fn test_upsert_replaces_or_appends() {
        let mut collection = loaded(people(2));
        assert!(collection.upsert(person(2, "Renamed", "r@example.com", "1")));
        assert_eq!(collection.find(&2).unwrap().name, "Renamed");
        assert!(!collection.upsert(person(9, "New", "n@example.com", "2")));
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_failed_load_clears_loading_and_keeps_items() {
        let mut collection = loaded(people(2));
        collection.begin_load();
        assert!(collection.is_loading());

        let result = collection.finish_load(Err("timeout"), Utc::now());
        assert_eq!(result, Err("timeout"));
        assert_eq!(collection.state(), LoadState::Ready);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_needs_reload() {
        let never: RemoteCollection<Person> = RemoteCollection::new();
        assert!(never.needs_reload(Utc::now(), Duration::minutes(5)));

        let now = Utc::now();
        let mut collection = RemoteCollection::new();
        collection.finish_load::<()>(Ok(people(1)), now).unwrap();
        assert!(!collection.needs_reload(now + Duration::minutes(4), Duration::minutes(5)));
        assert!(collection.needs_reload(now + Duration::minutes(5), Duration::minutes(5)));

        let mut failed: RemoteCollection<Person> = RemoteCollection::new();
        let _ = failed.finish_load(Err(()), now);
        assert!(failed.needs_reload(now, Duration::minutes(5)));
    }

    #[test]
    fn test_select_and_deselect() {
        let collection = loaded(people(3));
        let mut state = ViewState::new();
        state.select(2);
        assert_eq!(collection.view(&state).selected().unwrap().id, 2);

        state.set_search_term("Person 3");
        assert_eq!(collection.view(&state).selected().unwrap().id, 2);

        state.deselect();
        assert!(collection.view(&state).selected().is_none());

        state.select(42);
        assert!(collection.view(&state).selected().is_none());
    }
}
