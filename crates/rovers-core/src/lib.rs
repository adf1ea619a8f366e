//! Core game logic for the Rovers arena.
//!
//! Everything here is deterministic given its inputs and an injected
//! [`rng::RollSource`]. Rarity data comes in as a parameter, pacing goes
//! through a [`clock::Clock`], and nothing touches the network or disk
//! except [`config::GameConfig::from_file`].
//!
//! # Modules
//!
//! - [`config`] -- Typed game configuration loaded from YAML
//! - [`rng`] -- Injectable roll source and scripted rolls for tests
//! - [`clock`] -- Time source and pacing delays
//! - [`rarity`] -- Trait rarity to power, rarity score, leaderboard
//! - [`combat`] -- Combat stats and single-attack resolution
//! - [`battle`] -- Turn-based battle state machine, enemy policy, session
//! - [`summary`] -- One-shot battle summary with luck-weighted winner
//! - [`narrative`] -- Flavor text for battle and expedition logs
//! - [`armory`] -- Inventory, equipment and coins
//! - [`alpha`] -- Ledger of discovered alpha rovers
//! - [`error`] -- Battle and armory error types

pub mod alpha;
pub mod armory;
pub mod battle;
pub mod clock;
pub mod combat;
pub mod config;
pub mod error;
mod math;
pub mod narrative;
pub mod rarity;
pub mod rng;
pub mod summary;

pub use alpha::{AlphaEntry, AlphaLedger};
pub use armory::{Armory, EquipmentBonuses, ItemCatalog};
pub use battle::action::{Ability, BattleAction};
pub use battle::policy::{Autopilot, PlayerController, ScriptedController, choose_enemy_action};
pub use battle::session::{BattleReport, BattleSession};
pub use battle::{Battle, BattlePhase, TurnOutcome};
pub use clock::{Clock, ManualClock, TokioClock};
pub use combat::{AttackOutcome, CombatStats, resolve_attack, underdog_luck};
pub use config::{
    CombatConfig, ConfigError, ExpeditionConfig, GameConfig, PacingConfig, RarityConfig,
};
pub use error::{ArmoryError, BattleError};
pub use math::{floor_to_u32, round_to_u32};
pub use narrative::{BattleFlavor, ExpeditionFlavor};
pub use rarity::{LeaderboardRow, PowerProfile, RarityModel, dominant_trait, trait_leaderboard};
pub use rng::{RollSource, ScriptedRolls};
pub use summary::{BattleSummary, RoverSummary, SummaryWinner, summarize_battle};
