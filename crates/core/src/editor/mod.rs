//! Rich-text editing for blog posts and case studies.
//!
//! The editor works on an explicit [`Document`] rather than on live markup.
//! Toolbar buttons and typing become [`Command`]s; [`Editor::apply`] turns
//! each one into a new document and [`to_html`] produces the markup that is
//! sent to the backend.

mod command;
mod document;
mod html;
mod state;

pub use command::{BlockFormat, Command, EditorError};
pub use document::{
    Align, Block, BlockKind, Document, FontSize, HeadingLevel, ImageKey, Inline, ListKind, Marks, Position,
    Selection, ToggleMark,
};
pub use html::{escape, to_html};
pub use state::{Editor, HISTORY_LIMIT};
