//! Blog and case-study drafts.
//!
//! A draft lives only in the author's session until it is submitted with one
//! create call. [`Draft`] bundles the metadata form, the body editor and the
//! caret; [`Draft::submission`] validates everything and produces the
//! payload.

use serde::{Deserialize, Serialize};

use crate::editor::{Editor, Selection, to_html};
use crate::types::{DataUrl, Slug, SlugError};

/// Which kind of content is being authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    Blog,
    CaseStudy,
}

impl DraftKind {
    /// Backend collection path the draft is posted to.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Blog => "/blogs",
            Self::CaseStudy => "/case-studies",
        }
    }

    /// Console route prefix for the authoring screen.
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::Blog => "/blogs/new",
            Self::CaseStudy => "/case-studies/new",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::CaseStudy => "Case Study",
        }
    }

    /// Message shown after a successful create.
    #[must_use]
    pub const fn saved_message(self) -> &'static str {
        match self {
            Self::Blog => "Blog saved successfully!",
            Self::CaseStudy => "Case Study Saved Successfully",
        }
    }

    /// Whether the slug follows the title until edited by hand.
    #[must_use]
    pub const fn derives_slug(self) -> bool {
        matches!(self, Self::CaseStudy)
    }

    /// Whether the form carries category and date fields.
    #[must_use]
    pub const fn has_category_and_date(self) -> bool {
        matches!(self, Self::Blog)
    }
}

/// Validation failures that stop a submission before any network call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Slug is required")]
    MissingSlug,
    #[error("Invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),
}

/// The metadata fields of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftForm {
    kind: DraftKind,
    pub title: String,
    slug: String,
    slug_edited: bool,
    pub category: String,
    pub date: String,
    pub short_description: String,
    pub image: Option<DataUrl>,
}

impl DraftForm {
    #[must_use]
    pub const fn new(kind: DraftKind) -> Self {
        Self {
            kind,
            title: String::new(),
            slug: String::new(),
            slug_edited: false,
            category: String::new(),
            date: String::new(),
            short_description: String::new(),
            image: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> DraftKind {
        self.kind
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Change the title. For case studies the slug is re-derived unless it
    /// was edited by hand.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        if self.kind.derives_slug() && !self.slug_edited {
            self.slug = Slug::from_title(&self.title).into_inner();
        }
    }

    /// Edit the slug by hand. Clearing it lets the title drive it again.
    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.slug = slug.into();
        self.slug_edited = !self.slug.trim().is_empty();
    }

    /// Apply title and slug as submitted together by a form.
    ///
    /// A slug that merely echoes the current derived value does not count as
    /// a hand edit.
    pub fn update_title_and_slug(&mut self, title: &str, slug: &str) {
        if slug != self.slug {
            self.set_slug(slug);
        }
        if title != self.title {
            self.set_title(title);
        }
    }

    /// Check the required fields and return the slug to send.
    ///
    /// A hand-typed slug is normalized the same way a title is, so
    /// `My_Post` goes out as `my-post`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check: missing title, missing slug, then a
    /// slug with no letters or digits.
    pub fn validate(&self) -> Result<Slug, DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        let slug = self.slug.trim();
        if slug.is_empty() {
            return Err(DraftError::MissingSlug);
        }
        Ok(Slug::parse(Slug::from_title(slug).as_str())?)
    }

    /// Clear every field, keeping the kind.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }
}

/// The body posted to `/blogs` or `/case-studies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    pub title: String,
    pub slug: Slug,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub short_description: String,
    /// Featured image as a data URL, or empty when none was chosen.
    pub image: String,
    pub content: String,
}

/// Reply to `POST /blogs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogSaveResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl BlogSaveResponse {
    /// Turn a `success: false` reply into an error message.
    ///
    /// # Errors
    ///
    /// Returns the backend's message, or "Failed to save blog" when it sent
    /// none.
    pub fn into_result(self) -> Result<(), String> {
        if self.success {
            Ok(())
        } else {
            Err(self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Failed to save blog".to_string()))
        }
    }
}

/// A draft being authored: form, body and caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub form: DraftForm,
    pub editor: Editor,
    pub selection: Selection,
}

impl Draft {
    #[must_use]
    pub fn new(kind: DraftKind) -> Self {
        Self {
            form: DraftForm::new(kind),
            editor: Editor::new(),
            selection: Selection::default(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> DraftKind {
        self.form.kind()
    }

    /// The body as markup.
    #[must_use]
    pub fn content_html(&self) -> String {
        to_html(self.editor.document())
    }

    /// Validate the draft and build the create payload.
    ///
    /// # Errors
    ///
    /// Returns a [`DraftError`] when the form is incomplete; nothing should be
    /// sent in that case.
    pub fn submission(&self) -> Result<DraftPayload, DraftError> {
        let slug = self.form.validate()?;
        let with_meta = self.kind().has_category_and_date();
        Ok(DraftPayload {
            title: self.form.title.trim().to_string(),
            slug,
            category: with_meta.then(|| self.form.category.clone()),
            date: with_meta.then(|| self.form.date.clone()),
            short_description: self.form.short_description.clone(),
            image: self
                .form
                .image
                .as_ref()
                .map_or_else(String::new, |url| url.as_str().to_string()),
            content: self.content_html(),
        })
    }

    /// Clear the form and the body after a successful create.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::editor::Command;

    #[test]
    fn test_case_study_slug_follows_title() {
        let mut form = DraftForm::new(DraftKind::CaseStudy);
        form.set_title("PhD Thesis: A Case");
        assert_eq!(form.slug(), "phd-thesis-a-case");
        form.set_title("PhD Thesis: A Case Study");
        assert_eq!(form.slug(), "phd-thesis-a-case-study");

        form.set_slug("custom");
        form.set_title("Something else");
        assert_eq!(form.slug(), "custom");

        form.set_slug("");
        form.set_title("Back to auto");
        assert_eq!(form.slug(), "back-to-auto");
    }

    #[test]
    fn test_blog_slug_is_manual() {
        let mut form = DraftForm::new(DraftKind::Blog);
        form.set_title("Some Title");
        assert_eq!(form.slug(), "");
    }

    #[test]
    fn test_form_echo_of_derived_slug_is_not_a_hand_edit() {
        let mut form = DraftForm::new(DraftKind::CaseStudy);
        form.update_title_and_slug("First", "");
        assert_eq!(form.slug(), "first");
        form.update_title_and_slug("First draft", "first");
        assert_eq!(form.slug(), "first-draft");
        form.update_title_and_slug("First draft", "mine");
        form.update_title_and_slug("Renamed", "mine");
        assert_eq!(form.slug(), "mine");
    }

    #[test]
    fn test_validation_order() {
        let mut form = DraftForm::new(DraftKind::Blog);
        assert_eq!(form.validate(), Err(DraftError::MissingTitle));
        form.set_title("Title");
        assert_eq!(form.validate(), Err(DraftError::MissingSlug));
        form.set_slug("--!!--");
        assert!(matches!(form.validate(), Err(DraftError::InvalidSlug(_))));
        form.set_slug("good-slug");
        assert_eq!(form.validate().unwrap().as_str(), "good-slug");
    }

    #[test]
    fn test_hand_typed_slug_is_normalized() {
        let mut form = DraftForm::new(DraftKind::Blog);
        form.set_title("Title");
        form.set_slug("My_Post 2");
        assert_eq!(form.validate().unwrap().as_str(), "my-post-2");
    }

    #[test]
    fn test_blog_payload_shape() {
        let mut draft = Draft::new(DraftKind::Blog);
        draft.form.set_title("Writing a Synopsis");
        draft.form.set_slug("writing-a-synopsis");
        draft.form.category = "Guides".to_string();
        draft.form.date = "2025-01-10".to_string();
        draft.form.short_description = "How to".to_string();
        draft.form.image = Some(DataUrl::from_image("image/png", b"\x89PNG").unwrap());
        draft.editor.apply_all([Command::InsertText("Body".into())]).unwrap();

        let value = serde_json::to_value(draft.submission().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Writing a Synopsis",
                "slug": "writing-a-synopsis",
                "category": "Guides",
                "date": "2025-01-10",
                "shortDescription": "How to",
                "image": "data:image/png;base64,iVBORw==",
                "content": "<p>Body</p>"
            })
        );
    }

    #[test]
    fn test_case_study_payload_omits_blog_fields() {
        let mut draft = Draft::new(DraftKind::CaseStudy);
        draft.form.set_title("Case");
        let value = serde_json::to_value(draft.submission().unwrap()).unwrap();
        assert!(value.get("category").is_none());
        assert!(value.get("date").is_none());
        assert_eq!(value["image"], "");
        assert_eq!(value["content"], "");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut draft = Draft::new(DraftKind::CaseStudy);
        draft.form.set_title("Case");
        draft.editor.apply_all([Command::InsertText("Body".into())]).unwrap();
        draft.reset();
        assert_eq!(draft, Draft::new(DraftKind::CaseStudy));
    }

    #[test]
    fn test_blog_response() {
        let ok: BlogSaveResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(ok.into_result(), Ok(()));

        let rejected: BlogSaveResponse =
            serde_json::from_value(json!({"success": false, "message": "Slug already exists"})).unwrap();
        assert_eq!(rejected.into_result(), Err("Slug already exists".to_string()));

        let bare: BlogSaveResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert_eq!(bare.into_result(), Err("Failed to save blog".to_string()));
    }
}
