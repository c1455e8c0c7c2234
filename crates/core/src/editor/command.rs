//! Toolbar and typing intents.

use serde::{Deserialize, Serialize};

use super::document::{Align, FontSize, HeadingLevel, ListKind};

/// Block format chosen from the heading dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockFormat {
    #[serde(rename = "p")]
    Paragraph,
    H1,
    H2,
    H3,
}

impl BlockFormat {
    #[must_use]
    pub const fn heading_level(self) -> Option<HeadingLevel> {
        match self {
            Self::Paragraph => None,
            Self::H1 => Some(HeadingLevel::H1),
            Self::H2 => Some(HeadingLevel::H2),
            Self::H3 => Some(HeadingLevel::H3),
        }
    }
}

/// Errors raised while interpreting or applying a command.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown editor command '{0}'")]
    UnknownCommand(String),
    #[error("'{0}' needs a value")]
    MissingValue(&'static str),
    #[error("invalid value for '{command}': {value}")]
    InvalidValue { command: &'static str, value: String },
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
}

/// One editing intent.
///
/// Serialized as `{"command": "<name>", "value": ...}`, which is also the
/// shape of the JSON command lists the CLI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    Bold,
    Italic,
    Underline,
    Strike,
    AlignLeft,
    AlignCenter,
    AlignRight,
    AlignJustify,
    OrderedList,
    UnorderedList,
    FontSize(FontSize),
    Heading(BlockFormat),
    ForeColor(String),
    Highlight(String),
    Link(String),
    Image(String),
    ClearFormatting,
    Undo,
    Redo,
    InsertText(String),
    NewParagraph,
}

impl Command {
    /// Build a command from a toolbar button name and its optional value.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownCommand`] for an unrecognised name, and
    /// [`EditorError::MissingValue`] or [`EditorError::InvalidValue`] when a
    /// command that takes a value is given none or a bad one.
    pub fn from_toolbar(name: &str, value: Option<&str>) -> Result<Self, EditorError> {
        let raw = value.filter(|v| !v.is_empty());
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let need = |command: &'static str| value.ok_or(EditorError::MissingValue(command));

        let command = match name {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "underline" => Self::Underline,
            "strike" | "strikethrough" => Self::Strike,
            "align_left" => Self::AlignLeft,
            "align_center" => Self::AlignCenter,
            "align_right" => Self::AlignRight,
            "align_justify" => Self::AlignJustify,
            "ordered_list" => Self::OrderedList,
            "unordered_list" => Self::UnorderedList,
            "font_size" => Self::FontSize(parse_font_size(need("font_size")?)?),
            "heading" => Self::Heading(parse_block_format(need("heading")?)?),
            "fore_color" => Self::ForeColor(need("fore_color")?.to_string()),
            "highlight" => Self::Highlight(need("highlight")?.to_string()),
            "link" => Self::Link(need("link")?.to_string()),
            "image" => Self::Image(need("image")?.to_string()),
            "clear_formatting" => Self::ClearFormatting,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "insert_text" => Self::InsertText(
                raw.ok_or(EditorError::MissingValue("insert_text"))?
                    .to_string(),
            ),
            "new_paragraph" => Self::NewParagraph,
            other => return Err(EditorError::UnknownCommand(other.to_string())),
        };
        command.validate()?;
        Ok(command)
    }

    /// Check values that end up inside HTML attributes.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidValue`] for colors that are not a hex
    /// code or a plain color name, links with a scheme other than http(s) or
    /// mailto, and images that are not an image data URL or http(s) URL.
    pub fn validate(&self) -> Result<(), EditorError> {
        match self {
            Self::ForeColor(color) if !is_safe_color(color) => Err(invalid("fore_color", color)),
            Self::Highlight(color) if !is_safe_color(color) => Err(invalid("highlight", color)),
            Self::Link(href) if !is_safe_link(href) => Err(invalid("link", href)),
            Self::Image(src) if !is_safe_image(src) => Err(invalid("image", src)),
            _ => Ok(()),
        }
    }

    /// Whether the command changes the document (and so takes an undo step).
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        !matches!(self, Self::Undo | Self::Redo)
    }

    pub(crate) const fn alignment(&self) -> Option<Align> {
        match self {
            Self::AlignLeft => Some(Align::Left),
            Self::AlignCenter => Some(Align::Center),
            Self::AlignRight => Some(Align::Right),
            Self::AlignJustify => Some(Align::Justify),
            _ => None,
        }
    }

    pub(crate) const fn list_kind(&self) -> Option<ListKind> {
        match self {
            Self::OrderedList => Some(ListKind::Ordered),
            Self::UnorderedList => Some(ListKind::Unordered),
            _ => None,
        }
    }
}

fn invalid(command: &'static str, value: &str) -> EditorError {
    EditorError::InvalidValue {
        command,
        value: value.to_string(),
    }
}

fn parse_font_size(value: &str) -> Result<FontSize, EditorError> {
    match value.to_ascii_lowercase().as_str() {
        "small" | "2" => Ok(FontSize::Small),
        "normal" | "3" => Ok(FontSize::Normal),
        "large" | "5" => Ok(FontSize::Large),
        "xlarge" | "x-large" | "7" => Ok(FontSize::XLarge),
        _ => Err(invalid("font_size", value)),
    }
}

fn parse_block_format(value: &str) -> Result<BlockFormat, EditorError> {
    match value.to_ascii_lowercase().as_str() {
        "p" | "paragraph" => Ok(BlockFormat::Paragraph),
        "h1" => Ok(BlockFormat::H1),
        "h2" => Ok(BlockFormat::H2),
        "h3" => Ok(BlockFormat::H3),
        _ => Err(invalid("heading", value)),
    }
}

fn is_safe_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_safe_link(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:")
        || (lower.starts_with('/') && !lower.starts_with("//"))
}

fn is_safe_image(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("data:image/") || lower.starts_with("https://") || lower.starts_with("http://")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_toolbar() {
        assert_eq!(Command::from_toolbar("bold", None).unwrap(), Command::Bold);
        assert_eq!(
            Command::from_toolbar("heading", Some("h2")).unwrap(),
            Command::Heading(BlockFormat::H2)
        );
        assert_eq!(
            Command::from_toolbar("font_size", Some("xlarge")).unwrap(),
            Command::FontSize(FontSize::XLarge)
        );
        assert_eq!(
            Command::from_toolbar("link", Some(" https://shodhsutra.com ")).unwrap(),
            Command::Link("https://shodhsutra.com".to_string())
        );
        assert_eq!(
            Command::from_toolbar("insert_text", Some(" two words ")).unwrap(),
            Command::InsertText(" two words ".to_string())
        );
    }

    #[test]
    fn test_from_toolbar_errors() {
        assert_eq!(
            Command::from_toolbar("blink", None),
            Err(EditorError::UnknownCommand("blink".to_string()))
        );
        assert_eq!(Command::from_toolbar("link", Some("  ")), Err(EditorError::MissingValue("link")));
        assert!(matches!(
            Command::from_toolbar("link", Some("javascript:alert(1)")),
            Err(EditorError::InvalidValue { command: "link", .. })
        ));
        assert!(Command::from_toolbar("fore_color", Some("red;background:url(x)")).is_err());
        assert!(Command::from_toolbar("fore_color", Some("#ff0000")).is_ok());
        assert!(Command::from_toolbar("image", Some("data:text/html,hi")).is_err());
    }

    #[test]
    fn test_json_shape() {
        let commands: Vec<Command> = serde_json::from_value(json!([
            {"command": "insert_text", "value": "Hello"},
            {"command": "bold"},
            {"command": "heading", "value": "p"},
            {"command": "font_size", "value": "large"}
        ]))
        .unwrap();
        assert_eq!(
            commands,
            vec![
                Command::InsertText("Hello".to_string()),
                Command::Bold,
                Command::Heading(BlockFormat::Paragraph),
                Command::FontSize(FontSize::Large),
            ]
        );
    }
}
