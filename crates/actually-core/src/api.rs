//! Completion API client.
//!
//! Sends one prompt to an OpenAI-compatible Chat Completions endpoint and
//! returns the assistant text. There is no streaming and no retry; a request
//! either yields the full text or an [`ApiError`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Environment variable consulted when no credential is stored.
pub const CREDENTIAL_ENV: &str = "OPENAI_API_KEY";

/// User-Agent header for API requests.
pub const USER_AGENT: &str = concat!("actually/", env!("CARGO_PKG_VERSION"));

/// Longest error body excerpt kept in [`ApiError::Status`].
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no API key set; enter one in the form or set {CREDENTIAL_ENV}")]
    MissingCredential,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Settings for [`CompletionClient`].
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub timeout: Option<Duration>,
    pub system_prompt: Option<String>,
}

impl CompletionConfig {
    /// Builds client settings from the user config.
    ///
    /// # Errors
    /// Returns an error if the configured base URL is invalid.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: config.effective_base_url()?,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.request_timeout(),
            system_prompt: config.effective_system_prompt().map(str::to_string),
        })
    }
}

/// OpenAI-compatible chat completions client.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    config: CompletionConfig,
    http: reqwest::Client,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends `prompt` and returns the completion text.
    ///
    /// # Errors
    /// Fails on blank credential or prompt, transport errors, non-2xx status,
    /// or a response with no text choice.
    pub async fn complete(&self, credential: &str, prompt: &str) -> Result<String, ApiError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ApiError::MissingCredential);
        }
        if prompt.trim().is_empty() {
            return Err(ApiError::EmptyPrompt);
        }

        let request = ChatCompletionRequest::new(&self.config, prompt);
        let url = format!("{}{}", self.config.base_url, CHAT_COMPLETIONS_PATH);

        tracing::info!(model = %self.config.model, prompt_chars = prompt.len(), "sending completion request");

        let mut builder = self
            .http
            .post(&url)
            .headers(build_headers(credential))
            .json(&request);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "completion request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        let text = body
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| ApiError::InvalidResponse("no text in choices".to_string()))?;

        tracing::info!(response_chars = text.len(), "completion received");
        Ok(text)
    }

    /// Sends `prompt` and hands the completion text to `sink`.
    ///
    /// Resolves after `sink` has been called. On error `sink` is not called.
    ///
    /// # Errors
    /// Same as [`CompletionClient::complete`].
    pub async fn submit<F>(&self, credential: &str, prompt: &str, sink: F) -> Result<(), ApiError>
    where
        F: FnOnce(String),
    {
        let text = self.complete(credential, prompt).await?;
        sink(text);
        Ok(())
    }
}

/// Picks the credential for non-interactive use: explicit > stored > env.
pub fn resolve_credential(explicit: Option<&str>, stored: &str) -> Option<String> {
    let from_env = std::env::var(CREDENTIAL_ENV).ok();
    [explicit, Some(stored), from_env.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}

fn build_headers(credential: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {credential}"))
            .unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert("user-agent", HeaderValue::from_static(USER_AGENT));
    headers
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(config: &'a CompletionConfig, prompt: &'a str) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = config.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        Self {
            model: &config.model,
            messages,
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> CompletionClient {
        CompletionClient::new(CompletionConfig {
            base_url: server.uri(),
            model: "test-model".to_string(),
            max_tokens: None,
            timeout: Some(Duration::from_secs(5)),
            system_prompt: None,
        })
    }

    fn completion_body(text: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "messages": [{"role": "user", "content": "why?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("# Because")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).complete("sk-test", "why?").await.unwrap();
        assert_eq!(text, "# Because");
    }

    #[tokio::test]
    async fn test_submit_delivers_text_to_sink() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello")))
            .mount(&server)
            .await;

        let mut delivered = None;
        client_for(&server)
            .submit("sk", "hi", |text| delivered = Some(text))
            .await
            .unwrap();
        assert_eq!(delivered.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_system_prompt_is_sent_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "q"}
                ],
                "max_tokens": 64
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionClient::new(CompletionConfig {
            base_url: server.uri(),
            model: "m".to_string(),
            max_tokens: Some(64),
            timeout: None,
            system_prompt: Some("Be brief.".to_string()),
        });
        assert_eq!(client.complete("sk", "q").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_http_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("bad", "hi").await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_response_without_content_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("sk", "hi").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_blank_credential_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.complete("  ", "hi").await,
            Err(ApiError::MissingCredential)
        ));
        assert!(matches!(
            client.complete("sk", " \n").await,
            Err(ApiError::EmptyPrompt)
        ));
    }

    #[test]
    fn test_resolve_credential_prefers_explicit_then_stored() {
        assert_eq!(
            resolve_credential(Some(" sk-flag "), "sk-stored").as_deref(),
            Some("sk-flag")
        );
        assert_eq!(
            resolve_credential(Some(""), "sk-stored").as_deref(),
            Some("sk-stored")
        );
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(ERROR_BODY_LIMIT + 10);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), ERROR_BODY_LIMIT + 1);
        assert!(cut.ends_with('…'));
    }
}
