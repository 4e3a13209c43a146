//! Full-screen TUI for actually.
//!
//! A form with an API key field, a prompt field and a result panel that shows
//! the formatted completion, with copyable code blocks.

pub mod clipboard;
pub mod code_block;
pub mod common;
pub mod effects;
pub mod events;
pub mod highlight;
pub mod presenter;
pub mod render;
pub mod response;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod text_field;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::sync::Arc;

use actually_core::api::{CompletionClient, CompletionConfig, resolve_credential};
use actually_core::config::Config;
use actually_core::storage::{KeyValueStore, Preferences};
use anyhow::Result;
pub use runtime::TuiRuntime;
use tokio::sync::mpsc;

use crate::clipboard::SystemClipboard;
use crate::highlight::SyntectHighlighter;
use crate::runtime::Executor;
use crate::state::AppState;

/// Runs the interactive form until the user quits.
///
/// Must be called from within a tokio runtime context: effects are spawned
/// on it.
///
/// # Errors
/// Returns an error if there is no terminal, the config is invalid, or the
/// terminal fails.
pub fn run_interactive(config: &Config, store: Arc<dyn KeyValueStore>) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Interactive mode requires a terminal.\n\
             Use `actually ask --prompt '...'` for non-interactive use."
        );
    }

    let client = CompletionClient::new(CompletionConfig::from_config(config)?);
    let prefs = Preferences::new(store);

    // Falls back to OPENAI_API_KEY when nothing is stored.
    let credential = resolve_credential(None, &prefs.credential()).unwrap_or_default();
    let state = AppState::new(
        client.model(),
        credential,
        prefs.show_credential(),
        Arc::new(SyntectHighlighter),
    );

    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let executor = Executor::new(inbox_tx, client, prefs, Arc::new(SystemClipboard::new()));

    tracing::info!(model = %config.model, "starting interactive session");
    let mut runtime = TuiRuntime::new(state, executor, inbox_rx)?;
    runtime.run()
}
