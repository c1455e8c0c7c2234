use serde::{Deserialize, Serialize};

use super::command::{Command, EditorError};
use super::document::{
    Block, BlockKind, Document, Inline, ListKind, Marks, Position, Selection, ToggleMark,
};

/// Maximum number of undo snapshots kept.
pub const HISTORY_LIMIT: usize = 100;

/// A document plus its undo/redo history.
///
/// Every command is a pure transform of the document: [`Editor::apply`]
/// takes the current selection and returns where the selection lands
/// afterwards. Snapshots hold only blocks; image sources stay in the
/// document's image table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    document: Document,
    #[serde(default)]
    undo: Vec<Vec<Block>>,
    #[serde(default)]
    redo: Vec<Vec<Block>>,
    /// Marks a caret toggle set up for the next typed text.
    #[serde(default)]
    typing_marks: Option<Marks>,
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document with empty history.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Throw away the document and its history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a batch of commands in order, starting with the caret at the end
    /// of the document.
    ///
    /// # Errors
    ///
    /// Stops at the first command that fails.
    pub fn apply_all<I>(&mut self, commands: I) -> Result<Selection, EditorError>
    where
        I: IntoIterator<Item = Command>,
    {
        let mut selection = Selection::caret(self.document.end());
        for command in commands {
            selection = self.apply(&command, selection)?;
        }
        Ok(selection)
    }

    /// Apply one command to `selection`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid command values and for undo/redo with an
    /// empty history. The document is unchanged on error.
    pub fn apply(&mut self, command: &Command, selection: Selection) -> Result<Selection, EditorError> {
        command.validate()?;
        let selection = self.document.clamp_selection(selection);

        match command {
            Command::Undo => return self.undo(selection),
            Command::Redo => return self.redo(selection),
            _ => {}
        }

        let before = self.document.blocks.clone();
        let typing = self.typing_marks.take();
        let (start, end) = selection.ordered();

        let next = match command {
            Command::Bold => self.toggle(ToggleMark::Bold, selection, typing),
            Command::Italic => self.toggle(ToggleMark::Italic, selection, typing),
            Command::Underline => self.toggle(ToggleMark::Underline, selection, typing),
            Command::Strike => self.toggle(ToggleMark::Strike, selection, typing),
            Command::AlignLeft | Command::AlignCenter | Command::AlignRight | Command::AlignJustify => {
                if let Some(align) = command.alignment() {
                    self.for_each_block(start, end, |block| block.align = align);
                }
                selection
            }
            Command::OrderedList | Command::UnorderedList => {
                if let Some(kind) = command.list_kind() {
                    self.toggle_list(start, end, kind);
                }
                selection
            }
            Command::Heading(format) => {
                let kind = format.heading_level().map_or(BlockKind::Paragraph, BlockKind::Heading);
                self.for_each_block(start, end, |block| block.kind = kind);
                selection
            }
            Command::FontSize(size) => {
                let size = *size;
                self.style(selection, typing, |marks| marks.font_size = Some(size))
            }
            Command::ForeColor(color) => self.style(selection, typing, |marks| marks.color = Some(color.clone())),
            Command::Highlight(color) => {
                self.style(selection, typing, |marks| marks.highlight = Some(color.clone()))
            }
            Command::Link(href) => {
                self.for_each_text(start, end, |marks| marks.link = Some(href.clone()));
                selection
            }
            Command::ClearFormatting => {
                self.for_each_text(start, end, |marks| *marks = marks.cleared());
                selection
            }
            Command::Image(src) => {
                let at = self.document.delete_range(start, end);
                let image = self.document.intern_image(src);
                self.insert_inline(at, Inline::Image { image });
                Selection::caret(Position::new(at.block, at.offset + 1))
            }
            Command::InsertText(text) => {
                let at = self.document.delete_range(start, end);
                Selection::caret(self.insert_text(at, text, typing))
            }
            Command::NewParagraph => {
                let at = self.document.delete_range(start, end);
                Selection::caret(self.split_block(at))
            }
            Command::Undo | Command::Redo => selection,
        };

        if self.document.blocks != before {
            self.push_undo(before);
        }
        Ok(next)
    }

    fn undo(&mut self, selection: Selection) -> Result<Selection, EditorError> {
        let previous = self.undo.pop().ok_or(EditorError::NothingToUndo)?;
        let current = std::mem::replace(&mut self.document.blocks, previous);
        self.redo.push(current);
        self.typing_marks = None;
        Ok(self.document.clamp_selection(selection))
    }

    fn redo(&mut self, selection: Selection) -> Result<Selection, EditorError> {
        let next = self.redo.pop().ok_or(EditorError::NothingToRedo)?;
        let current = std::mem::replace(&mut self.document.blocks, next);
        self.undo.push(current);
        self.typing_marks = None;
        Ok(self.document.clamp_selection(selection))
    }

    fn push_undo(&mut self, snapshot: Vec<Block>) {
        self.undo.push(snapshot);
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Toggle an on/off mark. Over a range the mark is removed only when all
    /// selected text already carries it. On a caret the toggle applies to the
    /// next typed text.
    fn toggle(&mut self, mark: ToggleMark, selection: Selection, typing: Option<Marks>) -> Selection {
        let (start, end) = selection.ordered();
        if selection.is_collapsed() {
            let mut marks = typing.unwrap_or_else(|| self.marks_at(start));
            let on = !marks.has(mark);
            marks.set(mark, on);
            self.typing_marks = Some(marks);
            return selection;
        }

        let mut all_have = true;
        let mut any_text = false;
        self.for_each_text(start, end, |marks| {
            any_text = true;
            all_have &= marks.has(mark);
        });
        let on = !(any_text && all_have);
        self.for_each_text(start, end, |marks| marks.set(mark, on));
        selection
    }

    /// Set a valued mark on the selection, or on the next typed text at a
    /// caret.
    fn style<F>(&mut self, selection: Selection, typing: Option<Marks>, mut f: F) -> Selection
    where
        F: FnMut(&mut Marks),
    {
        let (start, end) = selection.ordered();
        if selection.is_collapsed() {
            let mut marks = typing.unwrap_or_else(|| self.marks_at(start));
            f(&mut marks);
            self.typing_marks = Some(marks);
        } else {
            self.for_each_text(start, end, f);
        }
        selection
    }

    fn toggle_list(&mut self, start: Position, end: Position, kind: ListKind) {
        let target = BlockKind::ListItem(kind);
        let all_in_list = self
            .document
            .blocks
            .iter()
            .skip(start.block)
            .take(end.block - start.block + 1)
            .all(|block| block.kind == target);
        let next = if all_in_list { BlockKind::Paragraph } else { target };
        self.for_each_block(start, end, |block| block.kind = next);
    }

    fn marks_at(&self, at: Position) -> Marks {
        self.document
            .blocks
            .get(at.block)
            .map(|block| block.marks_at(at.offset))
            .unwrap_or_default()
    }

    fn for_each_block<F>(&mut self, start: Position, end: Position, mut f: F)
    where
        F: FnMut(&mut Block),
    {
        for block in self
            .document
            .blocks
            .iter_mut()
            .skip(start.block)
            .take(end.block - start.block + 1)
        {
            f(block);
        }
    }

    /// Visit the marks of every text run inside `start..end`, splitting runs
    /// at the range edges first.
    fn for_each_text<F>(&mut self, start: Position, end: Position, mut f: F)
    where
        F: FnMut(&mut Marks),
    {
        for (index, from, to) in self.document.block_ranges(start, end) {
            let Some(block) = self.document.blocks.get_mut(index) else {
                continue;
            };
            let first = block.split_at(from);
            let last = block.split_at(to);
            for inline in block.inlines.iter_mut().take(last).skip(first) {
                if let Inline::Text { marks, .. } = inline {
                    f(marks);
                }
            }
            block.normalize();
        }
    }

    fn insert_inline(&mut self, at: Position, inline: Inline) {
        if let Some(block) = self.document.blocks.get_mut(at.block) {
            let index = block.split_at(at.offset);
            block.inlines.insert(index, inline);
            block.normalize();
        }
    }

    /// Insert text at `at`; newlines start new blocks. Returns the caret
    /// after the inserted text.
    fn insert_text(&mut self, at: Position, text: &str, typing: Option<Marks>) -> Position {
        let marks = typing.unwrap_or_else(|| self.marks_at(at));
        let mut caret = at;
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                caret = self.split_block(caret);
            }
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            self.insert_inline(caret, Inline::text(line, marks.clone()));
            caret.offset += line.chars().count();
        }
        caret
    }

    /// Split the block at `at`. The new block keeps the alignment; list items
    /// stay list items and headings continue as paragraphs.
    fn split_block(&mut self, at: Position) -> Position {
        let Some(block) = self.document.blocks.get_mut(at.block) else {
            return at;
        };
        let index = block.split_at(at.offset);
        let tail = block.inlines.split_off(index);
        let kind = match block.kind {
            BlockKind::Heading(_) => BlockKind::Paragraph,
            other => other,
        };
        let mut next = Block::new(kind);
        next.align = block.align;
        next.inlines = tail;
        next.normalize();
        block.normalize();
        self.document.blocks.insert(at.block + 1, next);
        Position::new(at.block + 1, 0)
    }
}
