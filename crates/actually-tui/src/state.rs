//! Application state owned by the runtime and mutated by the reducer.

use std::sync::Arc;

use crate::common::{TaskSeq, TaskState};
use crate::highlight::Highlighter;
use crate::response::ResponseView;
use crate::text_field::TextField;

/// Focusable widgets, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Credential,
    ShowCredential,
    SaveCredential,
    Prompt,
    Submit,
    Result,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Credential,
        Focus::ShowCredential,
        Focus::SaveCredential,
        Focus::Prompt,
        Focus::Submit,
        Focus::Result,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Notice,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Notice,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

pub struct AppState {
    pub should_quit: bool,
    /// Model name shown in the title bar.
    pub model: String,
    pub focus: Focus,
    pub credential: TextField,
    /// Show the credential in plain text instead of masked.
    pub show_credential: bool,
    pub prompt: TextField,
    pub task_seq: TaskSeq,
    /// The single in-flight request, if any. Resubmission is refused while set.
    pub request: TaskState,
    pub response: Option<ResponseView>,
    pub response_seq: u64,
    pub status: Option<Status>,
    pub viewport: Viewport,
    /// First visible row of the result panel.
    pub scroll: usize,
    pub spinner_frame: usize,
    pub highlighter: Arc<dyn Highlighter>,
}

impl AppState {
    pub fn new(
        model: impl Into<String>,
        credential: impl Into<String>,
        show_credential: bool,
        highlighter: Arc<dyn Highlighter>,
    ) -> Self {
        let credential = TextField::with_value(credential);
        let focus = if credential.is_empty() {
            Focus::Credential
        } else {
            Focus::Prompt
        };

        Self {
            should_quit: false,
            model: model.into(),
            focus,
            credential,
            show_credential,
            prompt: TextField::default(),
            task_seq: TaskSeq::default(),
            request: TaskState::default(),
            response: None,
            response_seq: 0,
            status: None,
            viewport: Viewport::default(),
            scroll: 0,
            spinner_frame: 0,
            highlighter,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.request.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::PlainHighlighter;

    #[test]
    fn test_focus_cycles_both_ways() {
        let mut focus = Focus::Credential;
        for _ in 0..Focus::ORDER.len() {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Credential);
        assert_eq!(Focus::Credential.prev(), Focus::Result);
    }

    #[test]
    fn test_initial_focus_depends_on_credential() {
        let empty = AppState::new("m", "", false, Arc::new(PlainHighlighter));
        assert_eq!(empty.focus, Focus::Credential);
        let stored = AppState::new("m", "sk-1", false, Arc::new(PlainHighlighter));
        assert_eq!(stored.focus, Focus::Prompt);
    }
}
