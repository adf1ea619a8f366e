//! Text-generation backends used for narration.
//!
//! Enum dispatch over an OpenAI-compatible chat completions API and the
//! Anthropic Messages API, both over `reqwest`. A backend returns `None`
//! when the call succeeds but carries no usable text, which the narrator
//! turns into its fallback line.

use std::time::Duration;

use tracing::debug;

use crate::config::{BackendType, LlmBackendConfig, NarratorConfig};
use crate::error::NarratorError;
use crate::prompt::RenderedPrompt;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The configured text-generation backend.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Send a prompt and return the response text, if any.
    ///
    /// # Errors
    ///
    /// Returns [`NarratorError::Backend`] if the HTTP call fails, the API
    /// answers with an error status, or the body is not JSON.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<Option<String>, NarratorError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(backend) => &backend.settings.model,
            Self::Anthropic(backend) => &backend.settings.model,
        }
    }
}

/// Connection settings shared by both backends.
struct Settings {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    max_tokens: u32,
}

impl Settings {
    fn new(config: &LlmBackendConfig, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout,
            max_tokens,
        }
    }
}

/// Read a response body as JSON, turning error statuses into errors.
async fn read_json(response: reqwest::Response, backend: &str) -> Result<serde_json::Value, NarratorError> {
    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(NarratorError::Backend(format!("{backend} returned {status}: {error_body}")));
    }
    response
        .json()
        .await
        .map_err(|e| NarratorError::Backend(format!("{backend} response parse failed: {e}")))
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Any gateway speaking the chat completions protocol, posted to
/// `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    settings: Settings,
}

impl OpenAiBackend {
    /// Build from connection settings.
    pub fn new(config: &LlmBackendConfig, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            settings: Settings::new(config, timeout, max_tokens),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<Option<String>, NarratorError> {
        let s = &self.settings;
        let url = format!("{}/chat/completions", s.api_url);

        let body = serde_json::json!({
            "model": s.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "max_tokens": s.max_tokens
        });

        debug!(url = %url, model = %s.model, "requesting narration");
        let response = s
            .client
            .post(&url)
            .timeout(s.timeout)
            .header("Authorization", format!("Bearer {}", s.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| NarratorError::Backend(format!("OpenAI request failed: {e}")))?;

        let json = read_json(response, "OpenAI").await?;
        Ok(extract_openai_content(&json))
    }
}

/// Extract `choices[0].message.content`, ignoring blank text.
pub fn extract_openai_content(json: &serde_json::Value) -> Option<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(ToOwned::to_owned)
}

// ---------------------------------------------------------------------------
// Anthropic
// ---------------------------------------------------------------------------

/// The Anthropic Messages API.
///
/// Uses the `x-api-key` header, a top-level `system` field, and answers
/// with `content[0].text`.
pub struct AnthropicBackend {
    settings: Settings,
}

impl AnthropicBackend {
    /// Build from connection settings.
    pub fn new(config: &LlmBackendConfig, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            settings: Settings::new(config, timeout, max_tokens),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<Option<String>, NarratorError> {
        let s = &self.settings;
        let url = format!("{}/messages", s.api_url);

        let body = serde_json::json!({
            "model": s.model,
            "max_tokens": s.max_tokens,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        debug!(url = %url, model = %s.model, "requesting narration");
        let response = s
            .client
            .post(&url)
            .timeout(s.timeout)
            .header("x-api-key", &s.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| NarratorError::Backend(format!("Anthropic request failed: {e}")))?;

        let json = read_json(response, "Anthropic").await?;
        Ok(extract_anthropic_content(&json))
    }
}

/// Extract `content[0].text`, ignoring blank text.
pub fn extract_anthropic_content(json: &serde_json::Value) -> Option<String> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(ToOwned::to_owned)
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create the configured LLM backend.
pub fn create_backend(config: &NarratorConfig) -> LlmBackend {
    let backend = &config.backend;
    match backend.backend_type {
        BackendType::OpenAi => {
            LlmBackend::OpenAi(OpenAiBackend::new(backend, config.timeout, config.max_tokens))
        }
        BackendType::Anthropic => {
            LlmBackend::Anthropic(AnthropicBackend::new(backend, config.timeout, config.max_tokens))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT};

    fn config(backend_type: BackendType) -> NarratorConfig {
        NarratorConfig {
            backend: LlmBackendConfig {
                backend_type,
                api_url: "https://gateway.example/v1".to_owned(),
                api_key: "test".to_owned(),
                model: "test-model".to_owned(),
            },
            timeout: DEFAULT_TIMEOUT,
            max_tokens: DEFAULT_MAX_TOKENS,
            templates_dir: None,
        }
    }

    #[test]
    fn chat_completion_text_is_extracted() {
        let json = serde_json::json!({
            "choices": [{ "message": { "content": "[00:00] Engines roar." } }]
        });
        assert_eq!(extract_openai_content(&json).as_deref(), Some("[00:00] Engines roar."));
    }

    #[test]
    fn chat_completion_without_text_is_none() {
        assert!(extract_openai_content(&serde_json::json!({"error": "rate_limit"})).is_none());
        let blank = serde_json::json!({ "choices": [{ "message": { "content": "  " } }] });
        assert!(extract_openai_content(&blank).is_none());
    }

    #[test]
    fn messages_text_is_extracted() {
        let json = serde_json::json!({
            "content": [{ "type": "text", "text": "[00:15] Sparks fly." }]
        });
        assert_eq!(extract_anthropic_content(&json).as_deref(), Some("[00:15] Sparks fly."));
    }

    #[test]
    fn messages_without_blocks_is_none() {
        assert!(extract_anthropic_content(&serde_json::json!({"content": []})).is_none());
    }

    #[test]
    fn backend_type_selects_protocol() {
        let backend = create_backend(&config(BackendType::OpenAi));
        assert_eq!(backend.name(), "openai-compatible");
        assert_eq!(backend.model(), "test-model");

        let backend = create_backend(&config(BackendType::Anthropic));
        assert_eq!(backend.name(), "anthropic");
    }
}
