//! `actually ask`: one prompt, one formatted answer on stdout.

use std::io::{Read, Write};
use std::sync::Arc;

use actually_core::api::{ApiError, CompletionClient, CompletionConfig, resolve_credential};
use actually_core::config::Config;
use actually_core::formatter::render_plain;
use actually_core::storage::{FileStore, Preferences};
use anyhow::{Context, Result};

pub struct AskOptions<'a> {
    pub prompt: &'a str,
    pub api_key: Option<&'a str>,
    pub model: Option<&'a str>,
    /// Print the response verbatim instead of formatted.
    pub raw: bool,
    pub config: &'a Config,
}

/// Reads the prompt from stdin when it is `-`.
///
/// # Errors
/// Fails if stdin cannot be read.
pub fn read_prompt(prompt: &str) -> Result<String> {
    if prompt != "-" {
        return Ok(prompt.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .lock()
        .read_to_string(&mut buf)
        .context("read prompt from stdin")?;
    Ok(buf)
}

pub async fn run(opts: AskOptions<'_>) -> Result<()> {
    let prompt = read_prompt(opts.prompt)?;
    if prompt.trim().is_empty() {
        return Err(ApiError::EmptyPrompt.into());
    }

    let prefs = Preferences::new(Arc::new(FileStore::open_default()));
    let credential =
        resolve_credential(opts.api_key, &prefs.credential()).ok_or(ApiError::MissingCredential)?;

    let mut config = opts.config.clone();
    if let Some(model) = opts.model {
        config.model = model.to_string();
    }
    let client = CompletionClient::new(CompletionConfig::from_config(&config)?);

    let text = client
        .complete(&credential, prompt.trim())
        .await
        .context("completion request failed")?;

    let output = if opts.raw {
        let mut raw = text;
        if !raw.ends_with('\n') {
            raw.push('\n');
        }
        raw
    } else {
        render_plain(&actually_core::format(&text))
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
