//! Default command: the interactive form.

use std::io::IsTerminal;
use std::sync::Arc;

use actually_core::config::Config;
use actually_core::logging;
use actually_core::storage::FileStore;
use anyhow::{Context, Result};

use super::ask;

pub async fn run(config: &Config, verbose: bool) -> Result<()> {
    // Piped stdin means a one-shot question.
    if !std::io::stdin().is_terminal() {
        logging::init_stderr_logging(verbose);
        return ask::run(ask::AskOptions {
            prompt: "-",
            api_key: None,
            model: None,
            raw: false,
            config,
        })
        .await;
    }

    let _guard = match logging::init_file_logging() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            None
        }
    };

    actually_tui::run_interactive(config, Arc::new(FileStore::open_default()))
        .context("interactive session failed")
}
