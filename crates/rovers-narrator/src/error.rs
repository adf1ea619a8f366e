//! Error types for battle narration.

/// Errors that can occur while narrating a battle.
#[derive(Debug, thiserror::Error)]
pub enum NarratorError {
    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// The LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization of the prompt context failed.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
