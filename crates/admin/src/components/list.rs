//! List screen components.
//!
//! Every list screen takes the same query string (`q`, `page`, `selected`,
//! `refresh`) and renders the same pager and banner.

use serde::Deserialize;
use shodhsutra_core::{CollectionPage, StatusBanner, ViewState};

/// Query parameters shared by list screens.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Search term.
    #[serde(default)]
    pub q: Option<String>,
    /// 1-based page. Kept as text so a bad value renders page 1 instead of
    /// rejecting the request.
    #[serde(default)]
    pub page: Option<String>,
    /// Record shown in the detail panel.
    #[serde(default)]
    pub selected: Option<String>,
    /// Any non-empty value forces a reload from the backend.
    #[serde(default)]
    pub refresh: Option<String>,
}

impl ListQuery {
    /// Build the per-request view state.
    ///
    /// The search term is applied first since it resets the page.
    #[must_use]
    pub fn view_state<I>(&self) -> ViewState<I>
    where
        I: Clone + Eq + From<String>,
    {
        let mut view = ViewState::new();
        view.set_search_term(self.search_term());
        if let Some(page) = self.page.as_deref().and_then(|p| p.trim().parse::<usize>().ok()) {
            view.set_page(page);
        }
        if let Some(id) = self.selected.as_deref().filter(|id| !id.is_empty()) {
            view.select(I::from(id.to_string()));
        }
        view
    }

    /// Whether the viewer asked for a reload.
    #[must_use]
    pub fn refresh(&self) -> bool {
        self.refresh.as_deref().is_some_and(|r| !r.is_empty() && r != "0")
    }

    /// The trimmed search term, empty when none was given.
    #[must_use]
    pub fn search_term(&self) -> &str {
        self.q.as_deref().map_or("", str::trim)
    }
}

/// One numbered pager link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

/// Pager and summary for a list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerView {
    /// Render the pager at all (more than one page).
    pub visible: bool,
    pub links: Vec<PageLink>,
    /// Records matching the search.
    pub filtered: usize,
    /// Records in the collection.
    pub total: usize,
    /// Row number of the first row on this page (1-based).
    pub first_position: usize,
}

impl PagerView {
    /// Build the pager for `page`, linking back to `base_path` with the
    /// current search term.
    #[must_use]
    pub fn new<T>(page: &CollectionPage<'_, T>, base_path: &str, search_term: &str) -> Self {
        let links = (1..=page.page_count())
            .map(|number| PageLink {
                number,
                href: page_href(base_path, search_term, number),
                current: number == page.page(),
            })
            .collect();

        Self {
            visible: page.has_pager(),
            links,
            filtered: page.filtered_len(),
            total: page.total(),
            first_position: page.first_position(),
        }
    }
}

/// Query string for page `number` of a list, keeping the search term.
#[must_use]
pub fn list_query(search_term: &str, number: usize) -> String {
    if search_term.is_empty() {
        format!("page={number}")
    } else {
        format!("q={}&page={number}", urlencoding::encode(search_term))
    }
}

/// Link to page `number` of a list, keeping the search term.
#[must_use]
pub fn page_href(base_path: &str, search_term: &str, number: usize) -> String {
    format!("{base_path}?{}", list_query(search_term, number))
}

/// A notification as templates see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
    /// `success`, `error` or `info`; used as a CSS modifier.
    pub kind: &'static str,
    pub message: String,
}

impl From<&StatusBanner> for BannerView {
    fn from(banner: &StatusBanner) -> Self {
        Self {
            kind: banner.kind.as_str(),
            message: banner.message.clone(),
        }
    }
}

impl From<StatusBanner> for BannerView {
    fn from(banner: StatusBanner) -> Self {
        Self::from(&banner)
    }
}
