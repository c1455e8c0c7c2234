//! HTML serialization of a [`Document`].

use std::fmt::Write;

use super::document::{Align, Block, BlockKind, Document, Inline, ListKind, Marks};

/// Serialize a document to the markup stored as a draft's `content`.
///
/// Consecutive list items of the same kind share one `<ul>`/`<ol>`. An empty
/// block renders as `<p><br></p>` (or the heading/list equivalent) and a
/// document with no content at all renders as the empty string.
#[must_use]
pub fn to_html(document: &Document) -> String {
    if document.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut open_list: Option<ListKind> = None;

    for block in &document.blocks {
        let list = match block.kind {
            BlockKind::ListItem(kind) => Some(kind),
            _ => None,
        };
        if open_list != list {
            if let Some(kind) = open_list {
                out.push_str(close_list(kind));
            }
            if let Some(kind) = list {
                out.push_str(open_list_tag(kind));
            }
            open_list = list;
        }
        write_block(&mut out, document, block);
    }
    if let Some(kind) = open_list {
        out.push_str(close_list(kind));
    }
    out
}

const fn open_list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Ordered => "<ol>",
        ListKind::Unordered => "<ul>",
    }
}

const fn close_list(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Ordered => "</ol>",
        ListKind::Unordered => "</ul>",
    }
}

fn write_block(out: &mut String, document: &Document, block: &Block) {
    let tag = match block.kind {
        BlockKind::Paragraph => "p",
        BlockKind::Heading(level) => level.tag(),
        BlockKind::ListItem(_) => "li",
    };

    out.push('<');
    out.push_str(tag);
    if let Some(align) = align_css(block.align) {
        let _ = write!(out, " style=\"text-align: {align}\"");
    }
    out.push('>');

    if block.is_empty() {
        out.push_str("<br>");
    } else {
        for inline in &block.inlines {
            write_inline(out, document, inline);
        }
    }

    let _ = write!(out, "</{tag}>");
}

const fn align_css(align: Align) -> Option<&'static str> {
    match align {
        Align::Left => None,
        Align::Center => Some("center"),
        Align::Right => Some("right"),
        Align::Justify => Some("justify"),
    }
}

fn write_inline(out: &mut String, document: &Document, inline: &Inline) {
    match inline {
        Inline::Image { image } => {
            if let Some(src) = document.image_src(*image) {
                let _ = write!(out, "<img src=\"{}\">", escape(src));
            }
        }
        Inline::Text { text, marks } => {
            let closers = open_marks(out, marks);
            out.push_str(&escape(text));
            for closer in closers.iter().rev() {
                out.push_str(closer);
            }
        }
    }
}

/// Write opening tags for `marks`, outermost first, and return the matching
/// closing tags in opening order.
fn open_marks(out: &mut String, marks: &Marks) -> Vec<&'static str> {
    let mut closers = Vec::new();

    if let Some(href) = &marks.link {
        let _ = write!(out, "<a href=\"{}\">", escape(href));
        closers.push("</a>");
    }

    let mut style = Vec::new();
    if let Some(size) = marks.font_size {
        style.push(format!("font-size: {}", size.css()));
    }
    if let Some(color) = &marks.color {
        style.push(format!("color: {color}"));
    }
    if let Some(color) = &marks.highlight {
        style.push(format!("background-color: {color}"));
    }
    if !style.is_empty() {
        let _ = write!(out, "<span style=\"{}\">", escape(&style.join("; ")));
        closers.push("</span>");
    }

    for (on, open, close) in [
        (marks.bold, "<b>", "</b>"),
        (marks.italic, "<i>", "</i>"),
        (marks.underline, "<u>", "</u>"),
        (marks.strike, "<s>", "</s>"),
    ] {
        if on {
            out.push_str(open);
            closers.push(close);
        }
    }
    closers
}

/// Escape text for use in element content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::command::{BlockFormat, Command};
    use super::super::document::{FontSize, HeadingLevel, Position, Selection};
    use super::super::state::Editor;
    use super::*;

    #[test]
    fn test_empty_document_is_empty_string() {
        assert_eq!(to_html(&Document::new()), "");
        let doc = Document::from_blocks(vec![Block::new(BlockKind::Paragraph), Block::new(BlockKind::Paragraph)]);
        assert_eq!(to_html(&doc), "");
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let mut heading = Block::with_text(BlockKind::Heading(HeadingLevel::H2), "Methods");
        heading.align = Align::Center;
        let doc = Document::from_blocks(vec![
            heading,
            Block::new(BlockKind::Paragraph),
            Block::with_text(BlockKind::Paragraph, "Body"),
        ]);
        assert_eq!(
            to_html(&doc),
            "<h2 style=\"text-align: center\">Methods</h2><p><br></p><p>Body</p>"
        );
    }

    #[test]
    fn test_lists_are_grouped() {
        let doc = Document::from_blocks(vec![
            Block::with_text(BlockKind::ListItem(ListKind::Unordered), "a"),
            Block::with_text(BlockKind::ListItem(ListKind::Unordered), "b"),
            Block::with_text(BlockKind::ListItem(ListKind::Ordered), "c"),
            Block::with_text(BlockKind::Paragraph, "d"),
        ]);
        assert_eq!(
            to_html(&doc),
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>d</p>"
        );
    }

    #[test]
    fn test_marks_nest_in_fixed_order() {
        let marks = Marks {
            bold: true,
            underline: true,
            font_size: Some(FontSize::Large),
            color: Some("#333".to_string()),
            link: Some("https://example.com/?a=1&b=2".to_string()),
            ..Marks::default()
        };
        let mut block = Block::new(BlockKind::Paragraph);
        block.inlines.push(Inline::text("x", marks));
        let doc = Document::from_blocks(vec![block]);
        assert_eq!(
            to_html(&doc),
            "<p><a href=\"https://example.com/?a=1&amp;b=2\">\
             <span style=\"font-size: large; color: #333\"><b><u>x</u></b></span></a></p>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = Document::from_blocks(vec![Block::with_text(
            BlockKind::Paragraph,
            "<script>\"x\" & 'y'</script>",
        )]);
        assert_eq!(
            to_html(&doc),
            "<p>&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_editor_session_to_markup() {
        let mut editor = Editor::new();
        let caret = editor
            .apply_all([
                Command::InsertText("Intro".into()),
                Command::Heading(BlockFormat::H1),
                Command::NewParagraph,
                Command::InsertText("Read ".into()),
                Command::Bold,
                Command::InsertText("this".into()),
            ])
            .unwrap();
        assert_eq!(caret, Selection::caret(Position::new(1, 9)));
        editor
            .apply(&Command::Image("data:image/png;base64,AA==".into()), caret)
            .unwrap();

        assert_eq!(
            to_html(editor.document()),
            "<h1>Intro</h1><p>Read <b>this</b><img src=\"data:image/png;base64,AA==\"></p>"
        );
    }
}
