//! Maps formatter nodes to styled display elements.
//!
//! Each node kind gets its own treatment. Prose lines get inline styling
//! (bold, italics, inline code, links) from `pulldown-cmark`; code blocks are
//! routed to the highlighter and kept aside for the code block widget.
//!
//! Presentation is width-independent. Wrapping happens at render time in
//! [`crate::response`].

use actually_core::Node;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::highlight::Highlighter;

const TEXT_COLOR: Color = Color::Rgb(200, 200, 195);
const HEADING_H1_COLOR: Color = Color::Rgb(255, 215, 100);
const HEADING_H2_COLOR: Color = Color::Rgb(240, 190, 90);
const HEADING_H3_COLOR: Color = Color::Rgb(220, 170, 80);
const HEADING_COLOR: Color = Color::Rgb(200, 155, 75);
const INLINE_CODE_COLOR: Color = Color::Rgb(230, 160, 120);
const LINK_COLOR: Color = Color::Rgb(110, 170, 230);
const BULLET_COLOR: Color = Color::Rgb(150, 150, 150);

pub const BULLET: &str = "• ";

/// One displayable unit, in node order.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Heading { level: u8, line: Line<'static> },
    /// One styled line per source line of the paragraph.
    Paragraph { lines: Vec<Line<'static>> },
    /// Bullet is not included; the renderer adds it with a hanging indent.
    ListItem { line: Line<'static> },
    PlainLine { line: Line<'static> },
    /// Index into [`Presented::code_blocks`].
    CodeBlock { index: usize },
}

/// A code block ready for the code block widget.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlockView {
    pub language: String,
    pub code: String,
    pub highlighted: Vec<Line<'static>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presented {
    pub elements: Vec<Element>,
    pub code_blocks: Vec<CodeBlockView>,
}

/// Presents `nodes`. Never fails and never modifies node content.
pub fn present(nodes: &[Node], highlighter: &dyn Highlighter) -> Presented {
    let mut out = Presented::default();
    let text_style = Style::default().fg(TEXT_COLOR);

    for node in nodes {
        let element = match node {
            Node::Heading { level, text } => Element::Heading {
                level: *level,
                line: Line::from(inline_spans(text, heading_style(*level))),
            },
            Node::Paragraph { text } => Element::Paragraph {
                lines: text
                    .split('\n')
                    .map(|line| Line::from(inline_spans(line, text_style)))
                    .collect(),
            },
            Node::ListItem { text } => Element::ListItem {
                line: Line::from(inline_spans(text, text_style)),
            },
            Node::PlainLine { text } => Element::PlainLine {
                line: Line::from(Span::styled(
                    text.clone(),
                    text_style.add_modifier(Modifier::DIM),
                )),
            },
            Node::CodeBlock { language, code } => {
                let index = out.code_blocks.len();
                out.code_blocks.push(CodeBlockView {
                    language: language.clone(),
                    code: code.clone(),
                    highlighted: highlighter.highlight(code, language),
                });
                Element::CodeBlock { index }
            }
        };
        out.elements.push(element);
    }

    out
}

pub fn bullet_style() -> Style {
    Style::default().fg(BULLET_COLOR)
}

fn heading_style(level: u8) -> Style {
    let color = match level {
        1 => HEADING_H1_COLOR,
        2 => HEADING_H2_COLOR,
        3 => HEADING_H3_COLOR,
        _ => HEADING_COLOR,
    };
    let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if level == 1 {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

/// Styles inline markup within a single line of prose.
///
/// Only inline constructs are interpreted. If the line parses as anything but
/// a single paragraph (a numbered list, a quote, a rule), it is shown as is.
fn inline_spans(text: &str, base: Style) -> Vec<Span<'static>> {
    let raw = || vec![Span::styled(text.to_string(), base)];
    if text.trim().is_empty() {
        return raw();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let mut events = Parser::new_ext(text, options);
    if !matches!(events.next(), Some(Event::Start(Tag::Paragraph))) {
        return raw();
    }

    let mut stack: Vec<Style> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    for event in events {
        let current = stack.last().copied().unwrap_or(base);
        match event {
            Event::Start(Tag::Strong) => stack.push(current.add_modifier(Modifier::BOLD)),
            Event::Start(Tag::Emphasis) => stack.push(current.add_modifier(Modifier::ITALIC)),
            Event::Start(Tag::Strikethrough) => {
                stack.push(current.add_modifier(Modifier::CROSSED_OUT));
            }
            Event::Start(Tag::Link { .. }) => {
                stack.push(current.fg(LINK_COLOR).add_modifier(Modifier::UNDERLINED));
            }
            Event::Start(Tag::Image { .. }) => stack.push(current),
            Event::End(
                TagEnd::Strong
                | TagEnd::Emphasis
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image,
            ) => {
                stack.pop();
            }
            Event::End(TagEnd::Paragraph) => {}
            Event::Text(t) | Event::InlineHtml(t) | Event::Html(t) => push_span(&mut spans, &t, current),
            Event::Code(code) => {
                push_span(&mut spans, &code, current.fg(INLINE_CODE_COLOR));
            }
            Event::SoftBreak | Event::HardBreak => push_span(&mut spans, " ", current),
            _ => return raw(),
        }
    }

    if spans.is_empty() { raw() } else { spans }
}

fn push_span(spans: &mut Vec<Span<'static>>, text: &str, style: Style) {
    match spans.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => spans.push(Span::styled(text.to_string(), style)),
    }
}

#[cfg(test)]
mod tests {
    use actually_core::format;

    use super::*;
    use crate::highlight::PlainHighlighter;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_each_node_kind_maps_to_its_element() {
        let nodes = format("# Title\n\nsome prose\n\n- item\n\n####### seven\n\n```sh\nls\n```");
        let presented = present(&nodes, &PlainHighlighter);

        assert!(matches!(presented.elements[0], Element::Heading { level: 1, .. }));
        assert!(matches!(presented.elements[1], Element::Paragraph { .. }));
        assert!(matches!(presented.elements[2], Element::ListItem { .. }));
        assert!(matches!(presented.elements[3], Element::PlainLine { .. }));
        assert_eq!(presented.elements[4], Element::CodeBlock { index: 0 });
        assert_eq!(presented.code_blocks[0].code, "ls");
        assert_eq!(presented.code_blocks[0].language, "sh");
    }

    #[test]
    fn test_inline_markup_is_styled() {
        let spans = inline_spans("a **bold** and `code`", Style::default());
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "a bold and code");

        let bold = spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let code = spans.iter().find(|s| s.content == "code").unwrap();
        assert_eq!(code.style.fg, Some(INLINE_CODE_COLOR));
    }

    #[test]
    fn test_block_syntax_inside_prose_is_kept_verbatim() {
        for line in ["1. first", "> quoted", "---"] {
            let spans = inline_spans(line, Style::default());
            assert_eq!(spans.len(), 1);
            assert_eq!(spans[0].content, line);
        }
    }

    #[test]
    fn test_paragraph_keeps_one_line_per_source_line() {
        let nodes = format("first line\nsecond line");
        let presented = present(&nodes, &PlainHighlighter);
        let Element::Paragraph { lines } = &presented.elements[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            lines.iter().map(line_text).collect::<Vec<_>>(),
            vec!["first line", "second line"]
        );
    }

    #[test]
    fn test_presenting_does_not_touch_nodes() {
        let nodes = format("```py\nx=1\n```");
        let before = nodes.clone();
        let _ = present(&nodes, &PlainHighlighter);
        assert_eq!(nodes, before);
    }
}
