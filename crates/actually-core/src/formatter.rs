//! Response text formatter.
//!
//! Converts raw completion text into an ordered sequence of [`Node`]s with a
//! single left-to-right scan over lines. The only state carried between lines
//! is the local [`Scan`] accumulator: an open code fence or an open paragraph.
//!
//! Recognized syntax:
//! - fenced code blocks (three or more backticks or tildes, optional language)
//! - ATX headings `#` through `######` followed by whitespace
//! - bullet list items (`-`, `*` or `+` followed by whitespace)
//!
//! Everything else is paragraph text. Adjacent paragraph lines are coalesced
//! into one [`Node::Paragraph`] joined with `\n`; lines are kept verbatim.
//! Malformed heading markers degrade to [`Node::PlainLine`].
//!
//! `format` never fails: an unterminated fence is closed at end of input with
//! whatever it accumulated.

/// Deepest heading level recognized. A longer run of `#` is plain text.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Minimum run of fence characters that opens a code block.
const MIN_FENCE_LEN: usize = 3;

/// One renderable unit of a formatted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// ATX heading with the marker stripped. `level` is in `1..=6`.
    Heading { level: u8, text: String },
    /// One or more adjacent prose lines joined with `\n`.
    Paragraph { text: String },
    /// Fenced code. `language` is empty when the fence had no info token.
    CodeBlock { language: String, code: String },
    /// Bullet list item with the bullet stripped.
    ListItem { text: String },
    /// Line that looked like markup but was not well formed.
    PlainLine { text: String },
}

impl Node {
    /// Returns the user-visible text of the node (the code for code blocks).
    pub fn text(&self) -> &str {
        match self {
            Node::Heading { text, .. }
            | Node::Paragraph { text }
            | Node::ListItem { text }
            | Node::PlainLine { text } => text,
            Node::CodeBlock { code, .. } => code,
        }
    }

    pub fn is_code_block(&self) -> bool {
        matches!(self, Node::CodeBlock { .. })
    }
}

/// Formats raw response text into nodes, in order of appearance.
pub fn format(raw: &str) -> Vec<Node> {
    let mut scan = Scan::default();
    for line in raw.lines() {
        scan.push_line(line);
    }
    scan.finish()
}

/// Renders nodes back to terminal-friendly plain text.
///
/// Used by the non-interactive `ask` command. Nodes are separated by one blank
/// line, except consecutive list items which stay together.
pub fn render_plain(nodes: &[Node]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Node> = None;

    for node in nodes {
        if let Some(prev) = prev {
            let tight_list =
                matches!(prev, Node::ListItem { .. }) && matches!(node, Node::ListItem { .. });
            out.push('\n');
            if !tight_list {
                out.push('\n');
            }
        }

        match node {
            Node::Heading { level, text } => {
                out.push_str(&"#".repeat(usize::from(*level)));
                out.push(' ');
                out.push_str(text);
            }
            Node::Paragraph { text } | Node::PlainLine { text } => out.push_str(text),
            Node::ListItem { text } => {
                out.push_str("• ");
                out.push_str(text);
            }
            Node::CodeBlock { language, code } => {
                out.push_str("```");
                out.push_str(language);
                out.push('\n');
                if !code.is_empty() {
                    out.push_str(code);
                    out.push('\n');
                }
                out.push_str("```");
            }
        }
        prev = Some(node);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// An open code fence.
struct Fence {
    marker: char,
    len: usize,
    language: String,
    lines: Vec<String>,
}

impl Fence {
    /// Recognizes an opening fence line.
    ///
    /// Backtick fences whose info string contains a backtick are inline code,
    /// not fences.
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = trimmed.chars().take_while(|&c| c == marker).count();
        if len < MIN_FENCE_LEN {
            return None;
        }

        // `marker` is ASCII, so `len` is also a byte offset.
        let info = &trimmed[len..];
        if marker == '`' && info.contains('`') {
            return None;
        }

        Some(Self {
            marker,
            len,
            language: info.split_whitespace().next().unwrap_or_default().to_string(),
            lines: Vec::new(),
        })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.len() >= self.len && trimmed.chars().all(|c| c == self.marker)
    }

    fn into_node(self) -> Node {
        Node::CodeBlock {
            language: self.language,
            code: self.lines.join("\n"),
        }
    }
}

/// Classification of a single line outside a fence.
enum LineKind<'a> {
    Heading { level: u8, text: &'a str },
    ListItem(&'a str),
    Plain,
    Text,
}

fn classify(line: &str) -> LineKind<'_> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes > 0 {
        let rest = &line[hashes..];
        let text = rest.trim();
        let well_formed = hashes <= MAX_HEADING_LEVEL
            && rest.starts_with(char::is_whitespace)
            && !text.is_empty();
        return if well_formed {
            LineKind::Heading {
                level: hashes as u8,
                text,
            }
        } else {
            LineKind::Plain
        };
    }

    let mut chars = line.trim_start().chars();
    if let (Some('-' | '*' | '+'), Some(sep)) = (chars.next(), chars.next())
        && sep.is_whitespace()
    {
        let text = chars.as_str().trim();
        if !text.is_empty() {
            return LineKind::ListItem(text);
        }
    }

    LineKind::Text
}

/// Scan accumulator threaded through a single `format` call.
#[derive(Default)]
struct Scan {
    nodes: Vec<Node>,
    paragraph: Vec<String>,
    fence: Option<Fence>,
}

impl Scan {
    fn push_line(&mut self, line: &str) {
        if let Some(mut fence) = self.fence.take() {
            if fence.is_closed_by(line) {
                self.nodes.push(fence.into_node());
            } else {
                fence.lines.push(line.to_string());
                self.fence = Some(fence);
            }
            return;
        }

        if line.trim().is_empty() {
            self.flush_paragraph();
            return;
        }

        if let Some(fence) = Fence::open(line) {
            self.flush_paragraph();
            self.fence = Some(fence);
            return;
        }

        match classify(line) {
            LineKind::Heading { level, text } => {
                self.flush_paragraph();
                self.nodes.push(Node::Heading {
                    level,
                    text: text.to_string(),
                });
            }
            LineKind::ListItem(text) => {
                self.flush_paragraph();
                self.nodes.push(Node::ListItem {
                    text: text.to_string(),
                });
            }
            LineKind::Plain => {
                self.flush_paragraph();
                self.nodes.push(Node::PlainLine {
                    text: line.trim_end().to_string(),
                });
            }
            LineKind::Text => self.paragraph.push(line.to_string()),
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.paragraph).join("\n");
        self.nodes.push(Node::Paragraph { text });
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush_paragraph();
        if let Some(fence) = self.fence.take() {
            self.nodes.push(fence.into_node());
        }
        self.nodes
    }
}
