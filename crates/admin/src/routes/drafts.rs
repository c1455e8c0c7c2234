//! Blog and case-study authoring route handlers.
//!
//! A draft lives in the admin's session until it is submitted. Each form
//! post carries the metadata fields and at most one editor command applied
//! to the selection given by block/offset pairs; the page then re-renders the
//! live preview from the document.

use askama::Template;
use axum::{
    Extension, Form, Router,
    extract::{Multipart, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use shodhsutra_core::editor::{BlockKind, Command, ListKind, Position, Selection};
use shodhsutra_core::{DataUrl, Draft, DraftKind, PendingFile, StatusBanner};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{session_keys, set_flash};
use crate::routes::{Layout, read_file_field, render};
use crate::state::AppState;

/// Multipart field image uploads are sent in.
const IMAGE_FIELD: &str = "image";

// =============================================================================
// View Types
// =============================================================================

/// A toolbar button.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarButton {
    pub command: &'static str,
    pub label: &'static str,
    /// Reads the shared value field (size, color, URL...).
    pub takes_value: bool,
}

const fn button(command: &'static str, label: &'static str, takes_value: bool) -> ToolbarButton {
    ToolbarButton {
        command,
        label,
        takes_value,
    }
}

/// Toolbar in display order.
pub const TOOLBAR: [ToolbarButton; 18] = [
    button("bold", "Bold", false),
    button("italic", "Italic", false),
    button("underline", "Underline", false),
    button("strike", "Strike", false),
    button("heading", "Format (p, h1, h2, h3)", true),
    button("font_size", "Size (small, normal, large, xlarge)", true),
    button("fore_color", "Text color", true),
    button("highlight", "Highlight", true),
    button("link", "Link", true),
    button("align_left", "Left", false),
    button("align_center", "Center", false),
    button("align_right", "Right", false),
    button("align_justify", "Justify", false),
    button("ordered_list", "Numbered list", false),
    button("unordered_list", "Bullet list", false),
    button("clear_formatting", "Clear formatting", false),
    button("insert_text", "Insert text", true),
    button("new_paragraph", "New paragraph", false),
];

/// One block of the document as listed beside the preview.
#[derive(Debug, Clone)]
pub struct BlockView {
    pub index: usize,
    pub kind: String,
    pub text: String,
    pub len: usize,
}

fn block_label(kind: BlockKind) -> String {
    match kind {
        BlockKind::Paragraph => "Paragraph".to_string(),
        BlockKind::Heading(level) => level.tag().to_uppercase(),
        BlockKind::ListItem(ListKind::Ordered) => "Numbered item".to_string(),
        BlockKind::ListItem(ListKind::Unordered) => "Bullet item".to_string(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Draft editor template.
#[derive(Template)]
#[template(path = "drafts/editor.html")]
struct EditorTemplate {
    layout: Layout,
    label: &'static str,
    route: &'static str,
    title: String,
    slug: String,
    slug_follows_title: bool,
    show_category_and_date: bool,
    category: String,
    date: String,
    short_description: String,
    featured_image: Option<String>,
    preview_html: String,
    blocks: Vec<BlockView>,
    toolbar: &'static [ToolbarButton],
    can_undo: bool,
    can_redo: bool,
    selection: Selection,
}

// =============================================================================
// Request Types
// =============================================================================

/// Metadata plus an optional editor command.
#[derive(Debug, Default, Deserialize)]
pub struct DraftEditForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    short_description: String,
    /// Toolbar command name; empty when only the fields changed.
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    start_block: Option<String>,
    #[serde(default)]
    start_offset: Option<String>,
    #[serde(default)]
    end_block: Option<String>,
    #[serde(default)]
    end_offset: Option<String>,
}

fn parse_index(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse().ok())
}

impl DraftEditForm {
    /// Copy the metadata fields into the draft.
    fn apply_fields(&self, draft: &mut Draft) {
        draft.form.update_title_and_slug(&self.title, &self.slug);
        if let Some(category) = &self.category {
            draft.form.category.clone_from(category);
        }
        if let Some(date) = &self.date {
            draft.form.date.clone_from(date);
        }
        draft.form.short_description.clone_from(&self.short_description);
    }

    /// The selection the form names, falling back to the previous one.
    fn selection(&self, previous: Selection) -> Selection {
        let anchor = Position::new(
            parse_index(self.start_block.as_deref()).unwrap_or(previous.anchor.block),
            parse_index(self.start_offset.as_deref()).unwrap_or(previous.anchor.offset),
        );
        let focus = Position::new(
            parse_index(self.end_block.as_deref()).unwrap_or(anchor.block),
            parse_index(self.end_offset.as_deref()).unwrap_or(anchor.offset),
        );
        Selection::new(anchor, focus)
    }

    fn command_name(&self) -> Option<&str> {
        self.command.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Build the drafts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(kind_router(DraftKind::Blog))
        .merge(kind_router(DraftKind::CaseStudy))
}

fn kind_router(kind: DraftKind) -> Router<AppState> {
    let base = kind.route();
    Router::new()
        .route(base, get(editor))
        .route(&format!("{base}/edit"), post(edit))
        .route(&format!("{base}/image"), post(featured_image))
        .route(&format!("{base}/inline-image"), post(inline_image))
        .route(&format!("{base}/submit"), post(submit))
        .layer(Extension(kind))
}

// =============================================================================
// Session Helpers
// =============================================================================

const fn draft_key(kind: DraftKind) -> &'static str {
    match kind {
        DraftKind::Blog => session_keys::BLOG_DRAFT,
        DraftKind::CaseStudy => session_keys::CASE_STUDY_DRAFT,
    }
}

async fn load_draft(session: &Session, kind: DraftKind) -> Result<Draft, AppError> {
    Ok(session
        .get::<Draft>(draft_key(kind))
        .await?
        .unwrap_or_else(|| Draft::new(kind)))
}

async fn save_draft(session: &Session, draft: &Draft) -> Result<(), AppError> {
    session.insert(draft_key(draft.kind()), draft).await?;
    Ok(())
}

/// Turn an uploaded file into a data URL, flashing why when it cannot be.
async fn image_data_url(session: &Session, file: Option<PendingFile>) -> Result<Option<DataUrl>, AppError> {
    let Some(file) = file else {
        set_flash(session, StatusBanner::error("Please select an image")).await?;
        return Ok(None);
    };
    match DataUrl::from_image(&file.content_type, &file.bytes) {
        Ok(url) => Ok(Some(url)),
        Err(e) => {
            tracing::info!(file = %file.file_name, error = %e, "Rejected draft image");
            set_flash(session, StatusBanner::error(e.to_string())).await?;
            Ok(None)
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Draft editor page.
///
/// GET /blogs/new, GET /case-studies/new
async fn editor(
    RequireAdminAuth(admin): RequireAdminAuth,
    Extension(kind): Extension<DraftKind>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let draft = load_draft(&session, kind).await?;
    let document = draft.editor.document();

    let blocks = document
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| BlockView {
            index,
            kind: block_label(block.kind),
            text: block.plain_text(),
            len: block.len(),
        })
        .collect();

    let template = EditorTemplate {
        layout: Layout::new(&admin, kind.route(), &session).await?,
        label: kind.label(),
        route: kind.route(),
        title: draft.form.title.clone(),
        slug: draft.form.slug().to_string(),
        slug_follows_title: kind.derives_slug(),
        show_category_and_date: kind.has_category_and_date(),
        category: draft.form.category.clone(),
        date: draft.form.date.clone(),
        short_description: draft.form.short_description.clone(),
        featured_image: draft.form.image.as_ref().map(ToString::to_string),
        preview_html: draft.content_html(),
        blocks,
        toolbar: &TOOLBAR,
        can_undo: draft.editor.can_undo(),
        can_redo: draft.editor.can_redo(),
        selection: draft.selection,
    };
    Ok(render(&template))
}

/// Save the fields and apply one editor command.
///
/// POST /blogs/new/edit, POST /case-studies/new/edit
#[instrument(skip_all, fields(kind = ?kind, command = form.command.as_deref().unwrap_or("")))]
async fn edit(
    RequireAdminAuth(_admin): RequireAdminAuth,
    Extension(kind): Extension<DraftKind>,
    session: Session,
    Form(form): Form<DraftEditForm>,
) -> Result<Redirect, AppError> {
    let mut draft = load_draft(&session, kind).await?;
    form.apply_fields(&mut draft);

    if let Some(name) = form.command_name() {
        let selection = form.selection(draft.selection);
        let applied = Command::from_toolbar(name, form.value.as_deref())
            .and_then(|command| draft.editor.apply(&command, selection));
        match applied {
            Ok(selection) => draft.selection = selection,
            Err(e) => {
                tracing::debug!(error = %e, "Editor command rejected");
                set_flash(&session, StatusBanner::error(e.to_string())).await?;
            }
        }
    }

    save_draft(&session, &draft).await?;
    Ok(Redirect::to(kind.route()))
}

/// Set the featured image.
///
/// POST /blogs/new/image, POST /case-studies/new/image
async fn featured_image(
    RequireAdminAuth(_admin): RequireAdminAuth,
    Extension(kind): Extension<DraftKind>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let file = read_file_field(multipart, IMAGE_FIELD).await?;
    if let Some(url) = image_data_url(&session, file).await? {
        let mut draft = load_draft(&session, kind).await?;
        draft.form.image = Some(url);
        save_draft(&session, &draft).await?;
    }
    Ok(Redirect::to(kind.route()))
}

/// Insert an image into the body at the caret.
///
/// POST /blogs/new/inline-image, POST /case-studies/new/inline-image
async fn inline_image(
    RequireAdminAuth(_admin): RequireAdminAuth,
    Extension(kind): Extension<DraftKind>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let file = read_file_field(multipart, IMAGE_FIELD).await?;
    if let Some(url) = image_data_url(&session, file).await? {
        let mut draft = load_draft(&session, kind).await?;
        match draft.editor.apply(&Command::Image(url.into_inner()), draft.selection) {
            Ok(selection) => draft.selection = selection,
            Err(e) => set_flash(&session, StatusBanner::error(e.to_string())).await?,
        }
        save_draft(&session, &draft).await?;
    }
    Ok(Redirect::to(kind.route()))
}

/// Validate and create the blog post or case study.
///
/// POST /blogs/new/submit, POST /case-studies/new/submit
#[instrument(skip_all, fields(kind = ?kind, admin = %admin.email))]
async fn submit(
    RequireAdminAuth(admin): RequireAdminAuth,
    Extension(kind): Extension<DraftKind>,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DraftEditForm>,
) -> Result<Redirect, AppError> {
    let mut draft = load_draft(&session, kind).await?;
    form.apply_fields(&mut draft);

    let banner = match draft.submission() {
        Err(e) => StatusBanner::error(e.to_string()),
        Ok(payload) => match state.backend().create_content(&admin.token.token, kind, &payload).await {
            Ok(()) => {
                tracing::info!(slug = %payload.slug, "Draft published");
                draft.reset();
                StatusBanner::success(kind.saved_message())
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to publish draft");
                StatusBanner::error(e.user_message())
            }
        },
    };

    save_draft(&session, &draft).await?;
    set_flash(&session, banner).await?;
    Ok(Redirect::to(kind.route()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(start: (&str, &str), end: Option<(&str, &str)>) -> DraftEditForm {
        DraftEditForm {
            start_block: Some(start.0.to_string()),
            start_offset: Some(start.1.to_string()),
            end_block: end.map(|e| e.0.to_string()),
            end_offset: end.map(|e| e.1.to_string()),
            ..DraftEditForm::default()
        }
    }

    #[test]
    fn test_selection_from_form() {
        let previous = Selection::caret(Position::new(0, 0));
        let selection = form(("1", "2"), Some(("1", "7"))).selection(previous);
        assert_eq!(selection, Selection::new(Position::new(1, 2), Position::new(1, 7)));

        // Missing end collapses to a caret at the start
        let selection = form(("0", "4"), None).selection(previous);
        assert!(selection.is_collapsed());
        assert_eq!(selection.anchor, Position::new(0, 4));
    }

    #[test]
    fn test_unparsable_selection_keeps_previous() {
        let previous = Selection::new(Position::new(2, 1), Position::new(2, 3));
        let selection = form(("x", ""), None).selection(previous);
        assert_eq!(selection.anchor, previous.anchor);
    }

    #[test]
    fn test_blank_command_is_metadata_only() {
        let mut form = DraftEditForm::default();
        assert!(form.command_name().is_none());
        form.command = Some("  ".to_string());
        assert!(form.command_name().is_none());
        form.command = Some("bold".to_string());
        assert_eq!(form.command_name(), Some("bold"));
    }

    #[test]
    fn test_fields_follow_slug_rules() {
        let mut draft = Draft::new(DraftKind::CaseStudy);
        let form = DraftEditForm {
            title: "My First Case".to_string(),
            ..DraftEditForm::default()
        };
        form.apply_fields(&mut draft);
        assert_eq!(draft.form.slug(), "my-first-case");
    }

    #[test]
    fn test_block_labels() {
        assert_eq!(block_label(BlockKind::Paragraph), "Paragraph");
        assert_eq!(block_label(BlockKind::ListItem(ListKind::Ordered)), "Numbered item");
    }
}
