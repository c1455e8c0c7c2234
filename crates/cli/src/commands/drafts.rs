//! Blog and case-study commands.
//!
//! A draft file is JSON:
//!
//! ```json
//! {
//!   "title": "Choosing a Research Topic",
//!   "slug": "",
//!   "category": "Guides",
//!   "date": "2024-03-01",
//!   "shortDescription": "Where to start.",
//!   "image": "cover.jpg",
//!   "content": [
//!     { "command": "insert_text", "value": "Start with a question." },
//!     { "command": "new_paragraph" }
//!   ]
//! }
//! ```
//!
//! `content` holds the same editor commands the web toolbar sends; `image`
//! is resolved relative to the draft file.

use std::path::Path;

use serde::Deserialize;
use shodhsutra_core::editor::{Command, Editor, to_html};
use shodhsutra_core::{DataUrl, Draft, DraftKind, Slug};

use super::{CliError, Console, read_image};

/// A draft as written by hand.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftFile {
    title: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    content: Vec<Command>,
}

/// Print the slug derived from `title`.
#[allow(clippy::print_stdout)]
pub fn slug(title: &str) {
    println!("{}", Slug::from_title(title));
}

/// Apply the commands in `path` to an empty document and print the markup.
///
/// # Errors
///
/// Returns error if the file is unreadable, not a command list, or a
/// command is rejected.
#[allow(clippy::print_stdout)]
pub fn render(path: &Path) -> Result<(), CliError> {
    let commands: Vec<Command> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let mut editor = Editor::new();
    editor.apply_all(commands)?;
    println!("{}", to_html(editor.document()));
    Ok(())
}

/// Build, validate and create a blog post or case study.
///
/// # Errors
///
/// Returns error if the draft is invalid (nothing is sent), sign-in fails,
/// or the backend refuses the create.
#[allow(clippy::print_stdout)]
pub async fn publish(kind: DraftKind, path: &Path) -> Result<(), CliError> {
    let file: DraftFile = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let draft = build_draft(kind, file, base_dir)?;
    let payload = draft.submission()?;

    let console = Console::connect().await?;
    console
        .backend()
        .create_content(console.token(), kind, &payload)
        .await?;

    tracing::info!(slug = %payload.slug, "Draft published");
    println!("{}", kind.saved_message());
    Ok(())
}

fn build_draft(kind: DraftKind, file: DraftFile, base_dir: &Path) -> Result<Draft, CliError> {
    let mut draft = Draft::new(kind);
    draft.form.update_title_and_slug(&file.title, &file.slug);
    draft.form.category = file.category;
    draft.form.date = file.date;
    draft.form.short_description = file.short_description;

    if let Some(image) = file.image {
        let image = read_image(&base_dir.join(image))?;
        draft.form.image = Some(DataUrl::from_image(&image.content_type, &image.bytes)?);
    }

    draft.selection = draft.editor.apply_all(file.content)?;
    Ok(draft)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shodhsutra_core::DraftError;

    use super::*;

    fn parse(json: &str) -> DraftFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_case_study_slug_follows_title() {
        let file = parse(
            r#"{
                "title": "Thesis Review Checklist",
                "content": [{ "command": "insert_text", "value": "Read it twice." }]
            }"#,
        );
        let draft = build_draft(DraftKind::CaseStudy, file, Path::new(".")).unwrap();
        let payload = draft.submission().unwrap();
        assert_eq!(payload.slug.as_str(), "thesis-review-checklist");
        assert!(payload.content.contains("Read it twice."));
        assert!(payload.category.is_none());
    }

    #[test]
    fn test_blog_needs_a_slug() {
        let file = parse(r#"{ "title": "No Slug Here", "category": "News" }"#);
        let draft = build_draft(DraftKind::Blog, file, Path::new(".")).unwrap();
        assert!(matches!(draft.submission(), Err(DraftError::MissingSlug)));
    }

    #[test]
    fn test_missing_image_file_is_an_error() {
        let file = parse(r#"{ "title": "T", "slug": "t", "image": "does-not-exist.png" }"#);
        assert!(matches!(
            build_draft(DraftKind::Blog, file, Path::new("/nonexistent")),
            Err(CliError::Io(_))
        ));
    }
}
