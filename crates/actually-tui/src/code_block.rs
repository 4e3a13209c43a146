//! Code block widget: header with language and copy affordance, highlighted
//! body, footer rule.
//!
//! ## Copy feedback
//!
//! `copied` is a two-state machine (`idle`, `copied`). Each copy bumps a
//! generation counter and schedules a reset after [`COPY_RESET_DELAY`]. A reset
//! only applies if its generation is still current, so the last invocation
//! wins. The pending reset is cancelled when the block is dropped.

use std::time::Duration;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use tokio_util::sync::CancellationToken;
use unicode_width::UnicodeWidthStr;

use crate::common::{WrapMode, wrap_line};
use crate::presenter::CodeBlockView;

pub const COPY_RESET_DELAY: Duration = Duration::from_secs(3);

const BORDER_COLOR: Color = Color::Rgb(90, 90, 90);
const COPIED_COLOR: Color = Color::Rgb(120, 200, 120);
const GUTTER: &str = "│ ";

/// Identifies a code block across responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockKey {
    pub response: u64,
    pub index: usize,
}

/// Scheduling instructions returned by [`CopyState::on_copy`].
#[derive(Debug)]
pub struct CopyReset {
    pub generation: u64,
    pub cancel: CancellationToken,
    /// Token of the reset this copy replaced, if one was pending.
    pub superseded: Option<CancellationToken>,
}

#[derive(Debug, Default)]
pub struct CopyState {
    copied: bool,
    generation: u64,
    pending: Option<CancellationToken>,
}

impl CopyState {
    pub fn is_copied(&self) -> bool {
        self.copied
    }

    /// Enters `copied` and restarts the reset window.
    pub fn on_copy(&mut self) -> CopyReset {
        self.copied = true;
        self.generation = self.generation.wrapping_add(1);
        let cancel = CancellationToken::new();
        let superseded = self.pending.replace(cancel.clone());
        CopyReset {
            generation: self.generation,
            cancel,
            superseded,
        }
    }

    /// Returns to `idle` if `generation` is the latest copy. Returns whether
    /// the state changed.
    pub fn on_reset_elapsed(&mut self, generation: u64) -> bool {
        if !self.copied || generation != self.generation {
            return false;
        }
        self.copied = false;
        self.pending = None;
        true
    }

    pub fn label(&self) -> &'static str {
        if self.copied { "[Copied]" } else { "[Copy]" }
    }
}

impl Drop for CopyState {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

#[derive(Debug)]
pub struct CodeBlockState {
    pub key: BlockKey,
    view: CodeBlockView,
    pub copy: CopyState,
}

impl CodeBlockState {
    pub fn new(key: BlockKey, view: CodeBlockView) -> Self {
        Self {
            key,
            view,
            copy: CopyState::default(),
        }
    }

    pub fn code(&self) -> &str {
        &self.view.code
    }

    pub fn language(&self) -> &str {
        &self.view.language
    }

    /// Lays the block out at `width`. Row 0 is the header holding the copy
    /// affordance.
    pub fn render(&self, width: usize, selected: bool) -> Vec<Line<'static>> {
        let border = Style::default().fg(BORDER_COLOR);
        let mut lines = vec![self.header(width, selected)];

        let body_width = width.saturating_sub(GUTTER.width()).max(1);
        for source in &self.view.highlighted {
            for wrapped in wrap_line(source, body_width, WrapMode::Chars) {
                let mut spans = vec![Span::styled(GUTTER, border)];
                spans.extend(wrapped.spans);
                lines.push(Line::from(spans));
            }
        }

        lines.push(Line::from(Span::styled(
            format!("└{}", "─".repeat(width.saturating_sub(1))),
            border,
        )));
        lines
    }

    fn header(&self, width: usize, selected: bool) -> Line<'static> {
        let border = Style::default().fg(BORDER_COLOR);
        let language = if self.language().is_empty() {
            "code"
        } else {
            self.language()
        };

        let mut label_style = if self.copy.is_copied() {
            Style::default().fg(COPIED_COLOR).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        if selected {
            label_style = label_style.add_modifier(Modifier::REVERSED);
        }

        let lead = "┌─ ";
        let label = self.copy.label();
        let used = lead.width() + language.width() + 2 + label.width();
        let fill = width.saturating_sub(used).max(1);

        Line::from(vec![
            Span::styled(lead, border),
            Span::styled(language.to_string(), Style::default().add_modifier(Modifier::ITALIC)),
            Span::styled(format!(" {} ", "─".repeat(fill)), border),
            Span::styled(label, label_style),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(code: &str) -> CodeBlockState {
        CodeBlockState::new(
            BlockKey {
                response: 0,
                index: 0,
            },
            CodeBlockView {
                language: "py".to_string(),
                code: code.to_string(),
                highlighted: code.split('\n').map(|l| Line::from(l.to_string())).collect(),
            },
        )
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_copy_then_reset_returns_to_idle() {
        let mut state = CopyState::default();
        let reset = state.on_copy();
        assert!(state.is_copied());
        assert!(reset.superseded.is_none());

        assert!(state.on_reset_elapsed(reset.generation));
        assert!(!state.is_copied());
    }

    #[test]
    fn test_second_copy_supersedes_first_reset() {
        let mut state = CopyState::default();
        let first = state.on_copy();
        let second = state.on_copy();

        assert!(second.superseded.is_some());
        assert!(!state.on_reset_elapsed(first.generation));
        assert!(state.is_copied());
        assert!(state.on_reset_elapsed(second.generation));
        assert!(!state.is_copied());
    }

    #[test]
    fn test_drop_cancels_pending_reset() {
        let mut state = CopyState::default();
        let reset = state.on_copy();
        drop(state);
        assert!(reset.cancel.is_cancelled());
    }

    #[test]
    fn test_copy_does_not_touch_code() {
        let mut block = block("x=1");
        let _ = block.copy.on_copy();
        assert_eq!(block.code(), "x=1");
    }

    #[test]
    fn test_render_layout() {
        let block = block("x=1\ny=2");
        let lines = block.render(30, false);

        assert_eq!(lines.len(), 4);
        let header = text(&lines[0]);
        assert!(header.starts_with("┌─ py "));
        assert!(header.ends_with("[Copy]"));
        assert_eq!(header.width(), 30);
        assert_eq!(text(&lines[1]), "│ x=1");
        assert!(text(&lines[3]).starts_with('└'));
    }

    #[test]
    fn test_header_shows_copied_label() {
        let mut block = block("x=1");
        let _ = block.copy.on_copy();
        assert!(text(&block.render(30, true)[0]).ends_with("[Copied]"));
    }
}
