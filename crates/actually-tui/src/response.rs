//! The displayed completion: raw text, its nodes, and per-block widget state.
//!
//! Built once per response. The node sequence is derived from the raw text at
//! construction and never changes afterwards.

use actually_core::{Node, format};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::code_block::{BlockKey, CodeBlockState, CopyReset};
use crate::common::{WrapMode, wrap_line};
use crate::highlight::Highlighter;
use crate::presenter::{BULLET, Element, bullet_style, present};

/// Lines laid out for a given width.
#[derive(Debug, Default)]
pub struct RenderedResponse {
    pub lines: Vec<Line<'static>>,
    /// `(row, block index)` for each code block header row.
    pub copy_rows: Vec<(usize, usize)>,
}

impl RenderedResponse {
    pub fn block_at_row(&self, row: usize) -> Option<usize> {
        self.copy_rows
            .iter()
            .find_map(|&(r, block)| (r == row).then_some(block))
    }

    pub fn row_of_block(&self, block: usize) -> Option<usize> {
        self.copy_rows
            .iter()
            .find_map(|&(r, b)| (b == block).then_some(r))
    }
}

#[derive(Debug)]
pub struct ResponseView {
    pub id: u64,
    raw: String,
    nodes: Vec<Node>,
    elements: Vec<Element>,
    pub blocks: Vec<CodeBlockState>,
    pub selected: Option<usize>,
}

impl ResponseView {
    pub fn new(id: u64, raw: String, highlighter: &dyn Highlighter) -> Self {
        let nodes = format(&raw);
        let presented = present(&nodes, highlighter);
        let blocks: Vec<CodeBlockState> = presented
            .code_blocks
            .into_iter()
            .enumerate()
            .map(|(index, view)| CodeBlockState::new(BlockKey { response: id, index }, view))
            .collect();
        let selected = (!blocks.is_empty()).then_some(0);

        Self {
            id,
            raw,
            nodes,
            elements: presented.elements,
            blocks,
            selected,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn select_next(&mut self) {
        if self.blocks.is_empty() {
            return;
        }
        let next = self.selected.map_or(0, |i| (i + 1) % self.blocks.len());
        self.selected = Some(next);
    }

    pub fn select_prev(&mut self) {
        if self.blocks.is_empty() {
            return;
        }
        let len = self.blocks.len();
        let prev = self.selected.map_or(len - 1, |i| (i + len - 1) % len);
        self.selected = Some(prev);
    }

    /// Starts a copy of block `index`. Returns the code to place on the
    /// clipboard and the reset to schedule.
    pub fn copy_block(&mut self, index: usize) -> Option<(String, BlockKey, CopyReset)> {
        let block = self.blocks.get_mut(index)?;
        let code = block.code().to_string();
        let reset = block.copy.on_copy();
        let key = block.key;
        self.selected = Some(index);
        Some((code, key, reset))
    }

    /// Applies an elapsed copy reset. Stale keys and generations are ignored.
    pub fn on_reset_elapsed(&mut self, key: BlockKey, generation: u64) -> bool {
        if key.response != self.id {
            return false;
        }
        self.blocks
            .get_mut(key.index)
            .is_some_and(|block| block.copy.on_reset_elapsed(generation))
    }

    /// Lays out the response at `width`. Elements are separated by a blank
    /// line, except consecutive list items.
    pub fn render_lines(&self, width: usize, focused: bool) -> RenderedResponse {
        let width = width.max(1);
        let mut out = RenderedResponse::default();

        if self.elements.is_empty() {
            out.lines.push(Line::from(Span::styled(
                "(empty response)",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            )));
            return out;
        }

        let mut prev: Option<&Element> = None;
        for element in &self.elements {
            let tight = matches!(
                (prev, element),
                (Some(Element::ListItem { .. }), Element::ListItem { .. })
            );
            if prev.is_some() && !tight {
                out.lines.push(Line::default());
            }

            match element {
                Element::Heading { line, .. } | Element::PlainLine { line } => {
                    out.lines.extend(wrap_line(line, width, WrapMode::Words));
                }
                Element::Paragraph { lines } => {
                    for line in lines {
                        out.lines.extend(wrap_line(line, width, WrapMode::Words));
                    }
                }
                Element::ListItem { line } => {
                    out.lines.extend(hanging_indent(line, width));
                }
                Element::CodeBlock { index } => {
                    if let Some(block) = self.blocks.get(*index) {
                        let selected = focused && self.selected == Some(*index);
                        out.copy_rows.push((out.lines.len(), *index));
                        out.lines.extend(block.render(width, selected));
                    }
                }
            }
            prev = Some(element);
        }

        out
    }
}

fn hanging_indent(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let indent = BULLET.width();
    let body = wrap_line(line, width.saturating_sub(indent).max(1), WrapMode::Words);
    body.into_iter()
        .enumerate()
        .map(|(i, wrapped)| {
            let lead = if i == 0 {
                Span::styled(BULLET, bullet_style())
            } else {
                Span::raw(" ".repeat(indent))
            };
            let mut spans = vec![lead];
            spans.extend(wrapped.spans);
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::PlainHighlighter;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn view(raw: &str) -> ResponseView {
        ResponseView::new(7, raw.to_string(), &PlainHighlighter)
    }

    #[test]
    fn test_render_separates_elements_and_tracks_copy_rows() {
        let view = view("# Hi\n\n- a\n- b\n\n```py\nx=1\n```");
        let rendered = view.render_lines(40, true);
        let texts: Vec<String> = rendered.lines.iter().map(text).collect();

        assert_eq!(texts[0], "Hi");
        assert_eq!(texts[1], "");
        assert_eq!(texts[2], "• a");
        assert_eq!(texts[3], "• b");
        assert_eq!(texts[4], "");
        assert!(texts[5].starts_with("┌─ py"));
        assert_eq!(rendered.copy_rows, vec![(5, 0)]);
        assert_eq!(rendered.block_at_row(5), Some(0));
    }

    #[test]
    fn test_list_items_wrap_with_hanging_indent() {
        let view = view("- alpha beta gamma");
        let texts: Vec<String> = view.render_lines(12, false).lines.iter().map(text).collect();
        assert_eq!(texts, vec!["• alpha beta", "  gamma"]);
    }

    #[test]
    fn test_selection_cycles_blocks() {
        let mut view = view("```\na\n```\n\n```\nb\n```");
        assert_eq!(view.selected, Some(0));
        view.select_next();
        assert_eq!(view.selected, Some(1));
        view.select_next();
        assert_eq!(view.selected, Some(0));
        view.select_prev();
        assert_eq!(view.selected, Some(1));
    }

    #[test]
    fn test_copy_block_returns_exact_code() {
        let mut view = view("```python\nprint('hi')\n```");
        let (code, key, _reset) = view.copy_block(0).unwrap();
        assert_eq!(code, "print('hi')");
        assert_eq!(key, BlockKey { response: 7, index: 0 });
        assert!(view.blocks[0].copy.is_copied());
        assert!(view.copy_block(3).is_none());
    }

    #[test]
    fn test_reset_for_other_response_is_ignored() {
        let mut view = view("```\nx\n```");
        let (_, _, reset) = view.copy_block(0).unwrap();
        let other = BlockKey { response: 8, index: 0 };
        assert!(!view.on_reset_elapsed(other, reset.generation));
        assert!(view.blocks[0].copy.is_copied());
    }

    #[test]
    fn test_empty_response_shows_placeholder() {
        let rendered = view("  \n").render_lines(20, false);
        assert_eq!(text(&rendered.lines[0]), "(empty response)");
        assert!(rendered.copy_rows.is_empty());
    }
}
