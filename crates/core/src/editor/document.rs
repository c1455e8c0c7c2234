//! Rich-text document model.
//!
//! A [`Document`] is a list of [`Block`]s; each block holds a run of
//! [`Inline`]s. Positions address characters inside a block, with an inline
//! image counting as a single character.

use serde::{Deserialize, Serialize};

/// Heading level offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading(HeadingLevel),
    ListItem(ListKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Normal,
    Large,
    #[serde(rename = "xlarge")]
    XLarge,
}

impl FontSize {
    /// CSS `font-size` keyword.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Normal => "medium",
            Self::Large => "large",
            Self::XLarge => "x-large",
        }
    }
}

/// Character formatting carried by a run of text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strike: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The on/off marks a toolbar button toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleMark {
    Bold,
    Italic,
    Underline,
    Strike,
}

impl Marks {
    #[must_use]
    pub const fn has(&self, mark: ToggleMark) -> bool {
        match mark {
            ToggleMark::Bold => self.bold,
            ToggleMark::Italic => self.italic,
            ToggleMark::Underline => self.underline,
            ToggleMark::Strike => self.strike,
        }
    }

    pub const fn set(&mut self, mark: ToggleMark, on: bool) {
        match mark {
            ToggleMark::Bold => self.bold = on,
            ToggleMark::Italic => self.italic = on,
            ToggleMark::Underline => self.underline = on,
            ToggleMark::Strike => self.strike = on,
        }
    }

    /// Drop everything except the link.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            link: self.link.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text {
        text: String,
        #[serde(default)]
        marks: Marks,
    },
    Image {
        image: ImageKey,
    },
}

/// Handle to an image source held once in [`Document::images`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageKey(usize);

impl Inline {
    #[must_use]
    pub fn text(text: impl Into<String>, marks: Marks) -> Self {
        Self::Text {
            text: text.into(),
            marks,
        }
    }

    /// Length in positions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text { text, .. } => text.chars().count(),
            Self::Image { .. } => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub inlines: Vec<Inline>,
}

impl Block {
    /// An empty block of the given kind.
    #[must_use]
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// A left-aligned block holding unformatted text.
    #[must_use]
    pub fn with_text(kind: BlockKind, text: impl Into<String>) -> Self {
        let mut block = Self::new(kind);
        block.inlines.push(Inline::text(text, Marks::default()));
        block.normalize();
        block
    }

    /// Length in positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inlines.iter().map(Inline::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split the inline run so that a boundary falls at `offset`.
    ///
    /// Returns the index of the first inline starting at or after `offset`.
    /// Offsets past the end resolve to `inlines.len()`.
    pub fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for index in 0..self.inlines.len() {
            if pos >= offset {
                return index;
            }
            let Some(inline) = self.inlines.get_mut(index) else {
                break;
            };
            let len = inline.len();
            if offset < pos + len {
                if let Inline::Text { text, marks } = inline {
                    let byte = byte_index(text, offset - pos);
                    let tail = text.split_off(byte);
                    let marks = marks.clone();
                    self.inlines.insert(index + 1, Inline::text(tail, marks));
                }
                return index + 1;
            }
            pos += len;
        }
        self.inlines.len()
    }

    /// Merge adjacent text runs with equal marks and drop empty runs.
    pub fn normalize(&mut self) {
        let mut merged: Vec<Inline> = Vec::with_capacity(self.inlines.len());
        for inline in self.inlines.drain(..) {
            if inline.is_empty() {
                continue;
            }
            if let (
                Some(Inline::Text { text: prev, marks: prev_marks }),
                Inline::Text { text, marks },
            ) = (merged.last_mut(), &inline)
                && prev_marks == marks
            {
                prev.push_str(text);
                continue;
            }
            merged.push(inline);
        }
        self.inlines = merged;
    }

    /// Marks in effect for text typed at `offset`.
    ///
    /// This is the formatting of the character just before the offset, or of
    /// the first character when typing at the very start.
    #[must_use]
    pub fn marks_at(&self, offset: usize) -> Marks {
        let mut pos = 0;
        let mut first = None;
        for inline in &self.inlines {
            let len = inline.len();
            if let Inline::Text { marks, .. } = inline {
                if first.is_none() {
                    first = Some(marks);
                }
                if offset > pos && offset <= pos + len {
                    return marks.clone();
                }
            }
            pos += len;
        }
        if offset == 0 {
            first.cloned().unwrap_or_default()
        } else {
            Marks::default()
        }
    }

    /// Plain text content, with images rendered as U+FFFC.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.inlines
            .iter()
            .map(|inline| match inline {
                Inline::Text { text, .. } => text.as_str(),
                Inline::Image { .. } => "\u{FFFC}",
            })
            .collect()
    }
}

/// A caret location: block index and character offset within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    #[must_use]
    pub const fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// An anchor/focus pair. A collapsed selection is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    #[must_use]
    pub const fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    #[must_use]
    pub const fn caret(at: Position) -> Self {
        Self { anchor: at, focus: at }
    }

    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The selection's endpoints in document order.
    #[must_use]
    pub fn ordered(&self) -> (Position, Position) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

/// Blocks plus the image sources they point at.
///
/// Inline images store only an [`ImageKey`]; the source itself (usually a
/// base64 data URL) lives once in `images`. The table is append-only, so a
/// key stays valid across undo and redo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::from_blocks(vec![Block::new(BlockKind::Paragraph)])
    }
}

impl Document {
    /// A document with one empty paragraph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            images: Vec::new(),
        }
    }

    /// Store `src` once and return its key. A source already stored is reused.
    pub fn intern_image(&mut self, src: &str) -> ImageKey {
        if let Some(index) = self.images.iter().position(|stored| stored == src) {
            return ImageKey(index);
        }
        self.images.push(src.to_owned());
        ImageKey(self.images.len() - 1)
    }

    #[must_use]
    pub fn image_src(&self, key: ImageKey) -> Option<&str> {
        self.images.get(key.0).map(String::as_str)
    }

    /// Returns `true` when no block holds any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_empty)
    }

    /// Pull `pos` inside the document.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let Some(last) = self.blocks.len().checked_sub(1) else {
            return Position::default();
        };
        let block = pos.block.min(last);
        let len = self.blocks.get(block).map_or(0, Block::len);
        Position::new(block, pos.offset.min(len))
    }

    /// Pull both ends of `selection` inside the document.
    #[must_use]
    pub fn clamp_selection(&self, selection: Selection) -> Selection {
        Selection::new(self.clamp(selection.anchor), self.clamp(selection.focus))
    }

    /// The caret position just after the last character.
    #[must_use]
    pub fn end(&self) -> Position {
        let block = self.blocks.len().saturating_sub(1);
        Position::new(block, self.blocks.get(block).map_or(0, Block::len))
    }

    /// Plain text with one line per block.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// For each block touched by `start..end`, the character range inside it.
    pub(crate) fn block_ranges(&self, start: Position, end: Position) -> Vec<(usize, usize, usize)> {
        (start.block..=end.block)
            .filter_map(|index| {
                let block = self.blocks.get(index)?;
                let from = if index == start.block { start.offset } else { 0 };
                let to = if index == end.block { end.offset } else { block.len() };
                Some((index, from, to))
            })
            .collect()
    }

    /// Delete `start..end`, joining the end block into the start block.
    ///
    /// Returns the collapsed caret position.
    pub(crate) fn delete_range(&mut self, start: Position, end: Position) -> Position {
        if start == end {
            return start;
        }
        if start.block == end.block {
            if let Some(block) = self.blocks.get_mut(start.block) {
                let from = block.split_at(start.offset);
                let to = block.split_at(end.offset);
                block.inlines.drain(from..to);
                block.normalize();
            }
            return start;
        }

        let tail = self.blocks.get_mut(end.block).map_or_else(Vec::new, |block| {
            let at = block.split_at(end.offset);
            block.inlines.split_off(at)
        });
        if let Some(block) = self.blocks.get_mut(start.block) {
            let at = block.split_at(start.offset);
            block.inlines.truncate(at);
            block.inlines.extend(tail);
            block.normalize();
        }
        let last = end.block.min(self.blocks.len().saturating_sub(1));
        if start.block < last {
            self.blocks.drain(start.block + 1..=last);
        }
        start
    }
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn bold() -> Marks {
        Marks {
            bold: true,
            ..Marks::default()
        }
    }

    #[test]
    fn test_split_at_text_boundary() {
        let mut block = Block::with_text(BlockKind::Paragraph, "héllo");
        let index = block.split_at(2);
        assert_eq!(index, 1);
        assert_eq!(block.inlines[0], Inline::text("hé", Marks::default()));
        assert_eq!(block.inlines[1], Inline::text("llo", Marks::default()));
        assert_eq!(block.split_at(2), 1);
        assert_eq!(block.split_at(0), 0);
        assert_eq!(block.split_at(99), 2);
    }

    #[test]
    fn test_split_around_image() {
        let mut doc = Document::new();
        let image = doc.intern_image("x.png");
        let mut block = Block::new(BlockKind::Paragraph);
        block.inlines = vec![
            Inline::text("ab", Marks::default()),
            Inline::Image { image },
            Inline::text("cd", Marks::default()),
        ];
        assert_eq!(block.len(), 5);
        assert_eq!(block.split_at(2), 1);
        assert_eq!(block.split_at(3), 2);
        assert_eq!(block.split_at(4), 3);
        assert_eq!(block.inlines.len(), 4);
    }

    #[test]
    fn test_normalize_merges_equal_runs() {
        let mut block = Block::new(BlockKind::Paragraph);
        block.inlines = vec![
            Inline::text("a", bold()),
            Inline::text("", Marks::default()),
            Inline::text("b", bold()),
            Inline::text("c", Marks::default()),
        ];
        block.normalize();
        assert_eq!(
            block.inlines,
            vec![Inline::text("ab", bold()), Inline::text("c", Marks::default())]
        );
    }

    #[test]
    fn test_marks_at_uses_preceding_character() {
        let mut block = Block::new(BlockKind::Paragraph);
        block.inlines = vec![Inline::text("ab", bold()), Inline::text("cd", Marks::default())];
        assert_eq!(block.marks_at(0), bold());
        assert_eq!(block.marks_at(2), bold());
        assert_eq!(block.marks_at(3), Marks::default());
    }

    #[test]
    fn test_delete_range_across_blocks() {
        let mut doc = Document::from_blocks(vec![
            Block::with_text(BlockKind::Paragraph, "hello"),
            Block::with_text(BlockKind::Paragraph, "middle"),
            Block::with_text(BlockKind::Heading(HeadingLevel::H2), "world"),
        ]);
        let caret = doc.delete_range(Position::new(0, 2), Position::new(2, 3));
        assert_eq!(caret, Position::new(0, 2));
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.plain_text(), "held");
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_clamp() {
        let doc = Document::from_blocks(vec![Block::with_text(BlockKind::Paragraph, "abc")]);
        assert_eq!(doc.clamp(Position::new(4, 10)), Position::new(0, 3));
    }

    #[test]
    fn test_images_are_stored_once() {
        let mut doc = Document::new();
        let first = doc.intern_image("data:image/png;base64,AAAA");
        let again = doc.intern_image("data:image/png;base64,AAAA");
        let other = doc.intern_image("data:image/png;base64,BBBB");
        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(doc.image_src(other), Some("data:image/png;base64,BBBB"));
    }

    #[test]
    fn test_selection_ordering() {
        let backwards = Selection::new(Position::new(1, 0), Position::new(0, 4));
        assert_eq!(backwards.ordered(), (Position::new(0, 4), Position::new(1, 0)));
        assert!(!backwards.is_collapsed());
    }

    #[test]
    fn test_document_json_shape() {
        let doc = Document::from_blocks(vec![Block::with_text(BlockKind::Heading(HeadingLevel::H1), "Title")]);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["blocks"][0]["kind"]["heading"], "h1");
        assert_eq!(value["blocks"][0]["align"], "left");
        let back: Document = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }
}
