//! Battle narration service.

use tracing::{info, warn};

use rovers_core::BattleSummary;

use crate::config::NarratorConfig;
use crate::error::NarratorError;
use crate::llm::{LlmBackend, create_backend};
use crate::prompt::PromptEngine;

/// Text used when the backend answers without any narration.
pub const FALLBACK_NARRATION: &str = "Battle simulation failed.";

/// Turns a one-shot [`BattleSummary`] into a short commentary.
pub struct Narrator {
    backend: LlmBackend,
    prompts: PromptEngine,
}

impl Narrator {
    /// Build a narrator from a backend and prompt engine.
    pub const fn new(backend: LlmBackend, prompts: PromptEngine) -> Self {
        Self { backend, prompts }
    }

    /// Build a narrator from configuration, loading template overrides
    /// when a directory is configured.
    pub fn from_config(config: &NarratorConfig) -> Result<Self, NarratorError> {
        let prompts = match &config.templates_dir {
            Some(dir) => PromptEngine::from_dir(dir)?,
            None => PromptEngine::new()?,
        };
        Ok(Self::new(create_backend(config), prompts))
    }

    /// Narrate a resolved battle.
    ///
    /// The summary already decides the winner; the backend only writes
    /// the commentary.
    ///
    /// # Errors
    ///
    /// Template failures and backend transport or status errors. A
    /// response without text is not an error; it yields
    /// [`FALLBACK_NARRATION`].
    pub async fn narrate_battle(&self, summary: &BattleSummary) -> Result<String, NarratorError> {
        let prompt = self.prompts.render_battle(summary)?;
        let content = self.backend.complete(&prompt).await?;
        let narration = narration_or_fallback(content);
        info!(
            backend = self.backend.name(),
            model = self.backend.model(),
            winner = %summary.winner_id,
            chars = narration.len(),
            "battle narrated"
        );
        Ok(narration)
    }
}

/// The backend text, or [`FALLBACK_NARRATION`] when there is none.
pub fn narration_or_fallback(content: Option<String>) -> String {
    content.unwrap_or_else(|| {
        warn!("narration backend returned no content");
        FALLBACK_NARRATION.to_owned()
    })
}
