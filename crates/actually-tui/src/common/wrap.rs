//! Width-aware wrapping of styled lines.
//!
//! Styles survive line breaks: each output line carries the spans (or span
//! fragments) that landed on it, merged when adjacent fragments share a style.

use std::mem;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Break at whitespace; whitespace at a break is dropped. Words longer
    /// than the width are split by character.
    Words,
    /// Break exactly at the width, keeping all whitespace (code).
    Chars,
}

/// Wraps `line` to `width` display columns. Always returns at least one line.
pub fn wrap_line(line: &Line<'static>, width: usize, mode: WrapMode) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line.clone()];
    }

    let mut builder = LineBuilder::new(width, line.style);
    for span in &line.spans {
        match mode {
            WrapMode::Words => {
                for token in tokens(&span.content) {
                    builder.push_word(token, span.style);
                }
            }
            WrapMode::Chars => builder.push_chars(&span.content, span.style),
        }
    }
    builder.finish()
}

/// Display width of a line.
pub fn line_width(line: &Line<'_>) -> usize {
    line.spans.iter().map(|s| s.content.width()).sum()
}

/// Splits text into alternating runs of whitespace and non-whitespace.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let ws = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != ws)
            .map_or(rest.len(), |(i, _)| i);
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}

struct LineBuilder {
    width: usize,
    line_style: Style,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    used: usize,
}

impl LineBuilder {
    fn new(width: usize, line_style: Style) -> Self {
        Self {
            width,
            line_style,
            lines: Vec::new(),
            spans: Vec::new(),
            used: 0,
        }
    }

    fn push_word(&mut self, token: &str, style: Style) {
        let token_width = token.width();
        if self.used + token_width <= self.width {
            self.append(token, style, token_width);
            return;
        }

        if token.chars().all(char::is_whitespace) {
            self.flush();
            return;
        }

        if token_width > self.width {
            self.push_chars(token, style);
        } else {
            self.flush();
            self.append(token, style, token_width);
        }
    }

    fn push_chars(&mut self, text: &str, style: Style) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if self.used + ch_width > self.width && self.used > 0 {
                self.flush();
            }
            self.append(ch.encode_utf8(&mut buf), style, ch_width);
        }
    }

    fn append(&mut self, text: &str, style: Style, width: usize) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.spans.push(Span::styled(text.to_string(), style)),
        }
        self.used += width;
    }

    fn flush(&mut self) {
        let spans = mem::take(&mut self.spans);
        self.lines.push(Line::from(spans).style(self.line_style));
        self.used = 0;
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.spans.is_empty() || self.lines.is_empty() {
            self.flush();
        }
        self.lines
    }
}
