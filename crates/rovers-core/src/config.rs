//! Configuration loading and typed config structures for the Rovers arena.
//!
//! The canonical configuration lives in `rovers-config.yaml` at the project
//! root. Every field has a serde default equal to the tuned constants of the
//! battle and expedition model, so an empty file (or no file at all) yields
//! the stock game.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but cannot be used.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `rovers-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Trait rarity and power settings.
    #[serde(default)]
    pub rarity: RarityConfig,

    /// Turn-based combat tuning.
    #[serde(default)]
    pub combat: CombatConfig,

    /// Expedition success and reward tuning.
    #[serde(default)]
    pub expedition: ExpeditionConfig,

    /// UX pacing delays between battle turns.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Coins a fresh armory starts with.
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rarity: RarityConfig::default(),
            combat: CombatConfig::default(),
            expedition: ExpeditionConfig::default(),
            pacing: PacingConfig::default(),
            starting_coins: default_starting_coins(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the model divide by zero or invert
    /// a range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };

        if self.rarity.total_supply == 0 {
            return invalid("rarity.total_supply must be at least 1");
        }
        if !(0.0..=100.0).contains(&self.rarity.fallback_rarity) {
            return invalid("rarity.fallback_rarity must be within 0-100");
        }
        let c = &self.combat;
        if c.health_divisor <= 0.0 || c.attack_divisor <= 0.0 || c.defense_divisor <= 0.0 {
            return invalid("combat stat divisors must be positive");
        }
        if c.underdog_divisor <= 0.0 {
            return invalid("combat.underdog_divisor must be positive");
        }
        if c.max_rounds == 0 {
            return invalid("combat.max_rounds must be at least 1");
        }
        if c.variance_min > c.variance_max {
            return invalid("combat.variance_min must not exceed combat.variance_max");
        }
        if self.expedition.steps == 0 {
            return invalid("expedition.steps must be at least 1");
        }
        Ok(())
    }
}

/// Trait rarity configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RarityConfig {
    /// Number of rovers in the collection.
    #[serde(default = "default_total_supply")]
    pub total_supply: u32,

    /// Rarity percentage used when a trait is missing from the lookup.
    #[serde(default = "default_fallback_rarity")]
    pub fallback_rarity: f64,

    /// Trait types ignored for power (compared case-insensitively).
    #[serde(default = "default_excluded_trait_types")]
    pub excluded_trait_types: BTreeSet<String>,

    /// Minimum trait count for a rover to be classed as an alpha.
    #[serde(default = "default_alpha_trait_threshold")]
    pub alpha_trait_threshold: usize,
}

impl Default for RarityConfig {
    fn default() -> Self {
        Self {
            total_supply: default_total_supply(),
            fallback_rarity: default_fallback_rarity(),
            excluded_trait_types: default_excluded_trait_types(),
            alpha_trait_threshold: default_alpha_trait_threshold(),
        }
    }
}

/// Combat tuning for the turn-based battle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CombatConfig {
    /// Health before the power bonus.
    #[serde(default = "default_base_health")]
    pub base_health: u32,
    /// Attack before the power bonus.
    #[serde(default = "default_base_attack")]
    pub base_attack: u32,
    /// Defense before the power bonus.
    #[serde(default = "default_base_defense")]
    pub base_defense: u32,
    /// `max_health = base_health + round(total_power / health_divisor)`.
    #[serde(default = "default_health_divisor")]
    pub health_divisor: f64,
    /// `base_attack += round(total_power / attack_divisor)`.
    #[serde(default = "default_attack_divisor")]
    pub attack_divisor: f64,
    /// `base_defense += round(total_power / defense_divisor)`.
    #[serde(default = "default_defense_divisor")]
    pub defense_divisor: f64,
    /// Rounds before the battle is decided on remaining health.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Lucky-strike chance before the underdog bonus.
    #[serde(default = "default_base_lucky_chance")]
    pub base_lucky_chance: f64,
    /// Damage multiplier on a lucky strike.
    #[serde(default = "default_lucky_multiplier")]
    pub lucky_multiplier: f64,
    /// Damage multiplier on aggressive attacks.
    #[serde(default = "default_aggressive_multiplier")]
    pub aggressive_multiplier: f64,
    /// `luck = min(power_difference / underdog_divisor, underdog_cap)`.
    #[serde(default = "default_underdog_divisor")]
    pub underdog_divisor: f64,
    /// Upper bound of the underdog luck bonus.
    #[serde(default = "default_underdog_cap")]
    pub underdog_cap: f64,
    /// Multiplier for `critical_strike`.
    #[serde(default = "default_critical_multiplier")]
    pub critical_multiplier: f64,
    /// Multiplier applied by a pending power surge.
    #[serde(default = "default_surge_multiplier")]
    pub surge_multiplier: f64,
    /// Multiplier for `shield_bash`.
    #[serde(default = "default_shield_bash_multiplier")]
    pub shield_bash_multiplier: f64,
    /// Minimum health restored by `heal`.
    #[serde(default = "default_heal_base")]
    pub heal_base: u32,
    /// Heal adds `round(roll * heal_spread)` on top of `heal_base`.
    #[serde(default = "default_heal_spread")]
    pub heal_spread: f64,
    /// Lower bound of the damage variance factor.
    #[serde(default = "default_variance_min")]
    pub variance_min: f64,
    /// Upper bound (exclusive) of the damage variance factor.
    #[serde(default = "default_variance_max")]
    pub variance_max: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_health: default_base_health(),
            base_attack: default_base_attack(),
            base_defense: default_base_defense(),
            health_divisor: default_health_divisor(),
            attack_divisor: default_attack_divisor(),
            defense_divisor: default_defense_divisor(),
            max_rounds: default_max_rounds(),
            base_lucky_chance: default_base_lucky_chance(),
            lucky_multiplier: default_lucky_multiplier(),
            aggressive_multiplier: default_aggressive_multiplier(),
            underdog_divisor: default_underdog_divisor(),
            underdog_cap: default_underdog_cap(),
            critical_multiplier: default_critical_multiplier(),
            surge_multiplier: default_surge_multiplier(),
            shield_bash_multiplier: default_shield_bash_multiplier(),
            heal_base: default_heal_base(),
            heal_spread: default_heal_spread(),
            variance_min: default_variance_min(),
            variance_max: default_variance_max(),
        }
    }
}

/// Expedition tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpeditionConfig {
    /// Number of paced steps a run is split into.
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Percent chance that a non-final step narrates a hazard.
    #[serde(default = "default_danger_chance")]
    pub danger_chance: f64,
    /// Base success percent for easy expeditions.
    #[serde(default = "default_easy_chance")]
    pub easy_chance: f64,
    /// Base success percent for medium expeditions.
    #[serde(default = "default_medium_chance")]
    pub medium_chance: f64,
    /// Base success percent for hard expeditions.
    #[serde(default = "default_hard_chance")]
    pub hard_chance: f64,
    /// Base success percent for extreme expeditions.
    #[serde(default = "default_extreme_chance")]
    pub extreme_chance: f64,
    /// Cap on the `rarity_score / 5` bonus.
    #[serde(default = "default_rarity_bonus_cap")]
    pub rarity_bonus_cap: f64,
    /// Cap on the final success percent.
    #[serde(default = "default_success_cap")]
    pub success_cap: f64,
}

impl Default for ExpeditionConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            danger_chance: default_danger_chance(),
            easy_chance: default_easy_chance(),
            medium_chance: default_medium_chance(),
            hard_chance: default_hard_chance(),
            extreme_chance: default_extreme_chance(),
            rarity_bonus_cap: default_rarity_bonus_cap(),
            success_cap: default_success_cap(),
        }
    }
}

/// Delays used to pace turn resolution for a human audience.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PacingConfig {
    /// Pause after the player's action before the enemy responds.
    #[serde(default = "default_player_turn_delay_ms")]
    pub player_turn_delay_ms: u64,
    /// Pause after the enemy's action before the next round.
    #[serde(default = "default_enemy_turn_delay_ms")]
    pub enemy_turn_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            player_turn_delay_ms: default_player_turn_delay_ms(),
            enemy_turn_delay_ms: default_enemy_turn_delay_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_starting_coins() -> u64 {
    100
}

const fn default_total_supply() -> u32 {
    5000
}

const fn default_fallback_rarity() -> f64 {
    50.0
}

fn default_excluded_trait_types() -> BTreeSet<String> {
    ["honorary", "biome"].into_iter().map(str::to_owned).collect()
}

const fn default_alpha_trait_threshold() -> usize {
    13
}

const fn default_base_health() -> u32 {
    100
}

const fn default_base_attack() -> u32 {
    15
}

const fn default_base_defense() -> u32 {
    5
}

const fn default_health_divisor() -> f64 {
    8.0
}

const fn default_attack_divisor() -> f64 {
    15.0
}

const fn default_defense_divisor() -> f64 {
    25.0
}

const fn default_max_rounds() -> u32 {
    3
}

const fn default_base_lucky_chance() -> f64 {
    0.05
}

const fn default_lucky_multiplier() -> f64 {
    1.75
}

const fn default_aggressive_multiplier() -> f64 {
    1.2
}

const fn default_underdog_divisor() -> f64 {
    200.0
}

const fn default_underdog_cap() -> f64 {
    0.15
}

const fn default_critical_multiplier() -> f64 {
    1.5
}

const fn default_surge_multiplier() -> f64 {
    1.3
}

const fn default_shield_bash_multiplier() -> f64 {
    0.7
}

const fn default_heal_base() -> u32 {
    20
}

const fn default_heal_spread() -> f64 {
    10.0
}

const fn default_variance_min() -> f64 {
    0.8
}

const fn default_variance_max() -> f64 {
    1.2
}

const fn default_steps() -> u32 {
    4
}

const fn default_danger_chance() -> f64 {
    30.0
}

const fn default_easy_chance() -> f64 {
    85.0
}

const fn default_medium_chance() -> f64 {
    65.0
}

const fn default_hard_chance() -> f64 {
    45.0
}

const fn default_extreme_chance() -> f64 {
    25.0
}

const fn default_rarity_bonus_cap() -> f64 {
    15.0
}

const fn default_success_cap() -> f64 {
    95.0
}

const fn default_player_turn_delay_ms() -> u64 {
    1500
}

const fn default_enemy_turn_delay_ms() -> u64 {
    1000
}
