//! Clipboard access for code block copy.
//!
//! Transports, in order:
//! 1. System clipboard via `arboard`
//! 2. OSC 52 escape sequence (works over SSH, no delivery confirmation)

use std::io::Write;

use base64::Engine;
use thiserror::Error;

/// Clipboard operation errors.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("System clipboard failed: {0}")]
    System(String),
    #[error("OSC 52 clipboard failed: {0}")]
    Osc52(String),
}

/// Destination for copied text.
pub trait ClipboardSink: Send + Sync {
    /// Places `text` on the clipboard verbatim.
    ///
    /// # Errors
    /// Returns an error if no transport accepted the text.
    fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Platform clipboard with an OSC 52 fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    fn write_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))
    }

    fn write_osc52(text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| ClipboardError::Osc52(e.to_string()))
    }
}

impl ClipboardSink for SystemClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        match Self::write_system(text) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::debug!(error = %err, "system clipboard failed, trying OSC 52");
                Self::write_osc52(text)
            }
        }
    }
}

/// OSC 52 format: ESC ] 52 ; c ; <base64-data> ESC \
fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{encoded}\x1b\\")
}
