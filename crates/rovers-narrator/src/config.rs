//! Configuration for the narrator.
//!
//! Loaded from `NARRATOR_*` environment variables. The narrator talks to a
//! single LLM backend; without one configured, callers skip narration.

use std::time::Duration;

use crate::error::NarratorError;

/// Default model for battle narration.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default response length cap in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Complete narrator configuration.
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    /// Backend to call.
    pub backend: LlmBackendConfig,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Response length cap in tokens.
    pub max_tokens: u32,
    /// Directory with `battle_system.j2` and `battle_user.j2` overriding
    /// the built-in templates.
    pub templates_dir: Option<String>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone)]
pub struct LlmBackendConfig {
    /// The backend type.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Supported LLM backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions API (also AI gateways, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl BackendType {
    /// Parse a backend name as written in the environment.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "gateway" | "ollama" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }
}

impl NarratorConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `NARRATOR_API_URL` -- backend base URL
    /// - `NARRATOR_API_KEY` -- backend API key
    ///
    /// Optional variables:
    /// - `NARRATOR_BACKEND` -- `openai` or `anthropic` (default `openai`)
    /// - `NARRATOR_MODEL` -- model name (default `google/gemini-2.5-flash`)
    /// - `NARRATOR_TIMEOUT_MS` -- request timeout (default 30000)
    /// - `NARRATOR_MAX_TOKENS` -- response cap (default 512)
    /// - `NARRATOR_TEMPLATES_DIR` -- template override directory
    pub fn from_env() -> Result<Self, NarratorError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, NarratorError> {
        let required = |name: &str| {
            var(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| NarratorError::Config(format!("missing required env var {name}")))
        };

        let api_url = required("NARRATOR_API_URL")?;
        let api_key = required("NARRATOR_API_KEY")?;

        let backend_type = match var("NARRATOR_BACKEND") {
            Some(name) => BackendType::parse(&name)
                .ok_or_else(|| NarratorError::Config(format!("unknown backend type: {name}")))?,
            None => BackendType::OpenAi,
        };

        let timeout = match var("NARRATOR_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .map_err(|e| NarratorError::Config(format!("invalid NARRATOR_TIMEOUT_MS: {e}")))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        let max_tokens = match var("NARRATOR_MAX_TOKENS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| NarratorError::Config(format!("invalid NARRATOR_MAX_TOKENS: {e}")))?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            backend: LlmBackendConfig {
                backend_type,
                api_url: api_url.trim_end_matches('/').to_owned(),
                api_key,
                model: var("NARRATOR_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            },
            timeout,
            max_tokens,
            templates_dir: var("NARRATOR_TEMPLATES_DIR"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_type_parsing() {
        assert_eq!(BackendType::parse("OpenAI"), Some(BackendType::OpenAi));
        assert_eq!(BackendType::parse("claude"), Some(BackendType::Anthropic));
        assert_eq!(BackendType::parse("carrier-pigeon"), None);
    }

    #[test]
    fn defaults_fill_optional_vars() {
        let config = NarratorConfig::from_vars(|name| match name {
            "NARRATOR_API_URL" => Some("https://gateway.example/v1/".to_owned()),
            "NARRATOR_API_KEY" => Some("secret".to_owned()),
            _ => None,
        });
        assert!(config.is_ok());
        if let Ok(config) = config {
            assert_eq!(config.backend.backend_type, BackendType::OpenAi);
            assert_eq!(config.backend.api_url, "https://gateway.example/v1");
            assert_eq!(config.backend.model, DEFAULT_MODEL);
            assert_eq!(config.timeout, DEFAULT_TIMEOUT);
            assert!(config.templates_dir.is_none());
        }
    }

    #[test]
    fn missing_key_is_rejected() {
        let config = NarratorConfig::from_vars(|name| {
            (name == "NARRATOR_API_URL").then(|| "https://gateway.example/v1".to_owned())
        });
        assert!(matches!(config, Err(NarratorError::Config(_))));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = NarratorConfig::from_vars(|name| match name {
            "NARRATOR_BACKEND" => Some("telegraph".to_owned()),
            _ => Some("x".to_owned()),
        });
        assert!(matches!(config, Err(NarratorError::Config(_))));
    }
}
