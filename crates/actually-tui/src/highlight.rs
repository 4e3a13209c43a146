//! Syntax highlighting for code blocks.

use std::sync::LazyLock;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style as SynStyle, ThemeSet};
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME_NAME: &str = "base16-ocean.dark";

/// Fallback style for code without a known language.
pub const CODE_FG: Color = Color::Rgb(180, 180, 180);

/// Turns code text into styled lines, one per source line.
///
/// Implementations must return exactly the code's characters: concatenating
/// each line's span contents yields the corresponding source line.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &str) -> Vec<Line<'static>>;
}

/// No styling beyond the code foreground.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> Vec<Line<'static>> {
        plain_lines(code)
    }
}

/// `syntect`-backed highlighter using the bundled syntaxes and themes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Vec<Line<'static>> {
        let language = language.trim();
        if language.is_empty() {
            return plain_lines(code);
        }
        let Some(syntax) = SYNTAX_SET.find_syntax_by_token(language) else {
            return plain_lines(code);
        };
        let Some(theme) = THEME_SET.themes.get(THEME_NAME) else {
            return plain_lines(code);
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();
        for source in code.split('\n') {
            // Newline syntaxes expect the terminator to be present.
            let with_newline = format!("{source}\n");
            match highlighter.highlight_line(&with_newline, &SYNTAX_SET) {
                Ok(ranges) => lines.push(ranges_to_line(&ranges)),
                Err(err) => {
                    tracing::debug!(error = %err, language, "highlighting failed");
                    return plain_lines(code);
                }
            }
        }
        lines
    }
}

fn ranges_to_line(ranges: &[(SynStyle, &str)]) -> Line<'static> {
    let spans: Vec<Span<'static>> = ranges
        .iter()
        .filter_map(|(style, text)| {
            let text = text.trim_end_matches(['\n', '\r']);
            (!text.is_empty()).then(|| Span::styled(text.to_string(), to_ratatui(*style)))
        })
        .collect();
    Line::from(spans)
}

fn to_ratatui(style: SynStyle) -> Style {
    let fg = style.foreground;
    Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b))
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(CODE_FG))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let lines = SyntectHighlighter.highlight("a = 1\nb = 2", "no-such-lang");
        assert_eq!(text_of(&lines), vec!["a = 1", "b = 2"]);
        assert!(
            lines
                .iter()
                .flat_map(|l| &l.spans)
                .all(|s| s.style.fg == Some(CODE_FG))
        );
    }

    #[test]
    fn test_known_language_preserves_text_and_adds_color() {
        let code = "fn main() {\n    let x = 1;\n}";
        let lines = SyntectHighlighter.highlight(code, "rust");

        assert_eq!(text_of(&lines), code.split('\n').collect::<Vec<_>>());
        let styled = lines
            .iter()
            .flat_map(|l| &l.spans)
            .filter(|s| s.style.fg.is_some_and(|fg| fg != CODE_FG))
            .count();
        assert!(styled > 0);
    }

    #[test]
    fn test_empty_code_yields_one_empty_line() {
        let lines = SyntectHighlighter.highlight("", "python");
        assert_eq!(text_of(&lines), vec![String::new()]);
    }
}
