//! Configuration management for actually.
//!
//! Loads configuration from ${ACTUALLY_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for actually configuration and data files.
    //!
    //! ACTUALLY_HOME resolution order:
    //! 1. ACTUALLY_HOME environment variable (if set)
    //! 2. ~/.config/actually (default)
    //! 3. ./.actually when no home directory can be determined

    use std::path::PathBuf;

    /// Environment variable overriding the home directory.
    pub const HOME_ENV: &str = "ACTUALLY_HOME";

    /// Returns the actually home directory.
    pub fn actually_home() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV)
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".actually"),
            |h| h.join(".config").join("actually"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        actually_home().join("config.toml")
    }

    /// Returns the path to the key-value storage file.
    pub fn storage_path() -> PathBuf {
        actually_home().join("storage.toml")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        actually_home().join("logs")
    }
}

/// Environment variable overriding the completion API base URL.
pub const BASE_URL_ENV: &str = "ACTUALLY_BASE_URL";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model requested from the completion service.
    pub model: String,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Upper bound on generated tokens. Omitted from the request when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds (0 disables the timeout).
    pub timeout_secs: u64,
    /// Optional system prompt sent ahead of every question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Config {
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Writes the commented default template to `path`.
    ///
    /// # Errors
    /// Fails if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Serializes `Config::default()` as TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn generate() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")
    }

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid absolute URL.
    pub fn effective_base_url(&self) -> Result<String> {
        let from_env = std::env::var(BASE_URL_ENV).ok();
        let chosen = [from_env.as_deref(), self.base_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(Self::DEFAULT_BASE_URL);

        url::Url::parse(chosen).with_context(|| format!("Invalid API base URL: {chosen}"))?;
        Ok(chosen.trim_end_matches('/').to_string())
    }

    /// Returns the request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Returns the trimmed system prompt, if one is configured.
    pub fn effective_system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: None,
            max_tokens: None,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            system_prompt: None,
        }
    }
}

/// Commented template written by `actually config init`.
pub fn default_config_template() -> &'static str {
    r#"# actually configuration

# Model requested from the completion service.
model = "gpt-4o-mini"

# OpenAI-compatible API base URL. ACTUALLY_BASE_URL overrides this.
# base_url = "https://api.openai.com/v1"

# Upper bound on generated tokens.
# max_tokens = 1024

# Request timeout in seconds (0 disables the timeout).
timeout_secs = 60

# System prompt sent ahead of every question.
# system_prompt = "Answer concisely."
"#
}
