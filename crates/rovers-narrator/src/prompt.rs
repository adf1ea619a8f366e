//! Prompt template loading and rendering via `minijinja`.
//!
//! The battle templates ship inside the binary. Operators can point
//! `NARRATOR_TEMPLATES_DIR` at a directory holding `battle_system.j2` and
//! `battle_user.j2` to tune the commentary without recompiling.

use minijinja::Environment;
use serde_json::json;

use rovers_core::BattleSummary;

use crate::error::NarratorError;

/// Target length of a battle log, in words.
pub const BATTLE_WORDS: (u32, u32) = (100, 150);

const SYSTEM: &str = "battle_system";
const USER: &str = "battle_user";

/// Manages prompt template loading and rendering.
pub struct PromptEngine {
    env: Environment<'static>,
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message setting the commentator's voice.
    pub system: String,
    /// User message describing the match.
    pub user: String,
}

impl PromptEngine {
    /// Create a prompt engine with the built-in templates.
    pub fn new() -> Result<Self, NarratorError> {
        let mut env = Environment::new();
        env.add_template(SYSTEM, include_str!("../templates/battle_system.j2"))
            .map_err(|e| NarratorError::Template(format!("failed to add system template: {e}")))?;
        env.add_template(USER, include_str!("../templates/battle_user.j2"))
            .map_err(|e| NarratorError::Template(format!("failed to add user template: {e}")))?;
        Ok(Self { env })
    }

    /// Create a prompt engine loading templates from `templates_dir`.
    pub fn from_dir(templates_dir: &str) -> Result<Self, NarratorError> {
        let mut env = Environment::new();
        for name in [SYSTEM, USER] {
            let source = load_template(templates_dir, &format!("{name}.j2"))?;
            env.add_template_owned(name, source)
                .map_err(|e| NarratorError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the system and user prompts for a one-shot battle.
    pub fn render_battle(&self, summary: &BattleSummary) -> Result<RenderedPrompt, NarratorError> {
        let winning = summary.winning();
        let context = json!({
            "rovers": [summary.rover1, summary.rover2],
            "winner": winning.name,
            "winner_trait": winning.dominant_trait,
            "min_words": BATTLE_WORDS.0,
            "max_words": BATTLE_WORDS.1,
        });

        Ok(RenderedPrompt {
            system: self.render(SYSTEM, &context)?,
            user: self.render(USER, &context)?,
        })
    }

    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, NarratorError> {
        self.env
            .get_template(name)
            .map_err(|e| NarratorError::Template(format!("missing {name} template: {e}")))?
            .render(context)
            .map_err(|e| NarratorError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read a template file from disk.
fn load_template(dir: &str, filename: &str) -> Result<String, NarratorError> {
    let path = format!("{dir}/{filename}");
    std::fs::read_to_string(&path)
        .map_err(|e| NarratorError::Template(format!("failed to read {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use rovers_core::{RarityModel, ScriptedRolls, summarize_battle};
    use rovers_types::{RarityLookup, Rover, RoverTrait, TokenId};

    use super::*;

    fn summary() -> BattleSummary {
        let mut lookup = RarityLookup::new();
        lookup.insert("Body", "Chrome", 250);
        lookup.insert("Eyes", "Laser", 50);
        lookup.insert("Body", "Rust", 2500);

        let alpha = Rover {
            identifier: TokenId::new("1"),
            name: "Rover #1".to_owned(),
            image_url: None,
            traits: vec![RoverTrait::new("Body", "Chrome"), RoverTrait::new("Eyes", "Laser")],
        };
        let beta = Rover {
            identifier: TokenId::new("2"),
            name: "Rover #2".to_owned(),
            image_url: None,
            traits: vec![RoverTrait::new("Body", "Rust")],
        };
        let model = RarityModel::without_exclusions(50.0);
        summarize_battle(&alpha, &beta, &lookup, 5000, &model, &mut ScriptedRolls::new(vec![0.0]))
    }

    #[test]
    fn battle_prompt_mentions_both_rovers_and_winner() {
        let engine = PromptEngine::new();
        assert!(engine.is_ok());
        let Ok(engine) = engine else { return };

        let prompt = engine.render_battle(&summary());
        assert!(prompt.is_ok());
        let Ok(prompt) = prompt else { return };

        assert!(prompt.system.contains("100-150 words"));
        assert!(prompt.system.contains("[00:00]"));
        assert!(prompt.user.contains("ROVER 1: Rover #1"));
        assert!(prompt.user.contains("ROVER 2: Rover #2"));
        assert!(prompt.user.contains("Dominant Trait: Eyes: Laser"));
        assert!(prompt.user.contains("Other Traits: Body: Chrome, Eyes: Laser"));
        assert!(prompt.user.contains("WINNER: Rover #1"));
        assert!(prompt.user.contains("DOMINANT TRAIT IN VICTORY: Eyes: Laser"));
    }

    #[test]
    fn missing_template_dir_returns_error() {
        let dir = std::env::temp_dir().join(format!("rovers_missing_templates_{}", std::process::id()));
        let result = PromptEngine::from_dir(dir.to_str().unwrap_or(""));
        assert!(result.is_err());
    }

    #[test]
    fn templates_load_from_disk() {
        let dir = std::env::temp_dir().join(format!(
            "rovers_templates_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        ));
        std::fs::create_dir_all(&dir).ok();
        std::fs::write(dir.join("battle_system.j2"), "Narrate in {{ max_words }} words.").ok();
        std::fs::write(dir.join("battle_user.j2"), "{{ winner }} wins.").ok();

        let engine = PromptEngine::from_dir(dir.to_str().unwrap_or(""));
        assert!(engine.is_ok());
        if let Ok(engine) = engine {
            let prompt = engine.render_battle(&summary());
            assert!(prompt.is_ok_and(|p| p.system == "Narrate in 150 words." && p.user == "Rover #1 wins."));
        }

        std::fs::remove_dir_all(&dir).ok();
    }
}
