//! AI battle narration for the Rovers arena.
//!
//! The one-shot battle resolver decides who wins; this crate asks an LLM to
//! describe it. Prompts are `minijinja` templates rendered from the
//! [`rovers_core::BattleSummary`], and the backend is either an
//! OpenAI-compatible gateway or the Anthropic Messages API.
//!
//! # Modules
//!
//! - [`narrator`] -- Narration service and fallback text
//! - [`prompt`] -- Template loading and rendering
//! - [`llm`] -- Backend dispatch and response extraction
//! - [`config`] -- `NARRATOR_*` environment configuration
//! - [`error`] -- Narrator error type

pub mod config;
pub mod error;
pub mod llm;
pub mod narrator;
pub mod prompt;

pub use config::{BackendType, LlmBackendConfig, NarratorConfig};
pub use error::NarratorError;
pub use llm::{LlmBackend, create_backend};
pub use narrator::{FALLBACK_NARRATION, Narrator, narration_or_fallback};
pub use prompt::{PromptEngine, RenderedPrompt};
