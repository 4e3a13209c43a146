//! Tracing subscriber setup.
//!
//! The interactive UI owns the terminal, so it logs to a file under
//! `${ACTUALLY_HOME}/logs`. One-shot commands log to stderr.
//! `ACTUALLY_LOG` takes an `EnvFilter` directive and overrides the defaults.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::paths;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "ACTUALLY_LOG";

const LOG_FILE_NAME: &str = "actually.log";

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs a file logger for the interactive UI.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_file_logging() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter("info"))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// Installs a stderr logger for one-shot commands. Quiet unless asked.
pub fn init_stderr_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter(default))
        .try_init();
}
