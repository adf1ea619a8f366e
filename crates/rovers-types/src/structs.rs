//! Core record types for the Rovers arena.
//!
//! These are plain value records. Rovers and traits come from the NFT
//! metadata provider; items, expeditions, runs and inventory rows are
//! owned by the persistence provider. Logic lives in `rovers-core` and
//! `rovers-expedition`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    Difficulty, EquipmentSlot, ItemRarity, ItemType, LogEntryType, RunStatus, Side,
};
use crate::ids::{EquipmentId, ExpeditionId, InventoryId, ItemId, RunId, TokenId};

// ---------------------------------------------------------------------------
// Rovers and traits
// ---------------------------------------------------------------------------

/// A named attribute on a rover, e.g. `{ trait_type: "Body", value: "Chrome" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoverTrait {
    /// Attribute category.
    pub trait_type: String,
    /// Attribute value within the category.
    pub value: String,
}

impl RoverTrait {
    /// Build a trait from its category and value.
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

/// A rover as seen by the battle and expedition logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rover {
    /// Token id of the NFT.
    pub identifier: TokenId,
    /// Display name.
    pub name: String,
    /// Image or video URL from the metadata provider.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Attribute list in metadata order.
    #[serde(default)]
    pub traits: Vec<RoverTrait>,
}

/// Rarity and power derived for one trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TraitPower {
    /// The trait this entry describes.
    #[serde(flatten)]
    pub attribute: RoverTrait,
    /// Percentage of the collection sharing this value (0-100, 1 decimal).
    pub rarity: f64,
    /// Inverse-rarity power contribution (0-100).
    pub power: u32,
}

/// Collection-wide trait counts: `trait_type -> value -> count`.
///
/// Supplied by the trait-rarity provider. Absent entries are expected;
/// callers apply a fallback rarity rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RarityLookup(pub BTreeMap<String, BTreeMap<String, u32>>);

impl RarityLookup {
    /// Create an empty lookup.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of rovers carrying `value` for `trait_type`, if known.
    pub fn count(&self, trait_type: &str, value: &str) -> Option<u32> {
        self.0.get(trait_type)?.get(value).copied()
    }

    /// Record a count, replacing any previous one.
    pub fn insert(&mut self, trait_type: impl Into<String>, value: impl Into<String>, count: u32) {
        self.0
            .entry(trait_type.into())
            .or_default()
            .insert(value.into(), count);
    }

    /// Iterate `(trait_type, value, count)` in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.0.iter().flat_map(|(trait_type, values)| {
            values
                .iter()
                .map(move |(value, count)| (trait_type.as_str(), value.as_str(), *count))
        })
    }

    /// Number of distinct trait types.
    pub fn trait_type_count(&self) -> usize {
        self.0.len()
    }

    /// Whether the lookup holds no counts at all.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }
}

// ---------------------------------------------------------------------------
// Items, inventory, equipment
// ---------------------------------------------------------------------------

/// An item definition that can be found on expeditions and equipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Item {
    /// Item id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    #[serde(default)]
    pub description: Option<String>,
    /// Category.
    pub item_type: ItemType,
    /// Rarity tier, used to pick expedition rewards.
    pub rarity: ItemRarity,
    /// Power granted while equipped.
    pub power_bonus: i32,
    /// Defense granted while equipped.
    pub defense_bonus: i32,
    /// Luck granted while equipped.
    pub luck_bonus: i32,
    /// Artwork URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// When the definition was created.
    pub created_at: DateTime<Utc>,
}

/// A stack of one item in the player's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// Inventory row id.
    pub id: InventoryId,
    /// Which item this stack holds.
    pub item_id: ItemId,
    /// Number of units held (always at least 1).
    pub quantity: u32,
    /// When the stack was first created.
    pub acquired_at: DateTime<Utc>,
}

/// An item equipped on a rover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoverEquipment {
    /// Equipment row id.
    pub id: EquipmentId,
    /// The rover wearing the item.
    pub rover_token_id: TokenId,
    /// The equipped item.
    pub item_id: ItemId,
    /// The slot it occupies.
    pub slot: EquipmentSlot,
    /// When it was equipped.
    pub equipped_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Expeditions
// ---------------------------------------------------------------------------

/// A timed mission definition. Read-only configuration data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Expedition {
    /// Expedition id.
    pub id: ExpeditionId,
    /// Display name.
    pub name: String,
    /// Briefing text.
    #[serde(default)]
    pub description: Option<String>,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Total mission length in minutes.
    pub duration_minutes: u32,
    /// Traits a rover should have to be eligible (informational).
    #[serde(default)]
    pub required_traits: Vec<String>,
    /// Item ids this expedition may award (informational).
    #[serde(default)]
    pub reward_item_pool: Vec<ItemId>,
    /// Lower bound of the coin reward.
    pub coin_reward_min: u32,
    /// Upper bound of the coin reward.
    pub coin_reward_max: u32,
}

/// One narrated line of an expedition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExpeditionLogEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Narrative text.
    pub message: String,
    /// Tone of the line.
    #[serde(rename = "type")]
    pub entry_type: LogEntryType,
}

/// A single deployment of a rover on an expedition.
///
/// `log_entries` only grows while the run is in progress and `status`
/// changes exactly once, from `InProgress` to a terminal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExpeditionRun {
    /// Run id.
    pub id: RunId,
    /// The expedition being run.
    pub expedition_id: ExpeditionId,
    /// The deployed rover.
    pub rover_token_id: TokenId,
    /// Name of the deployed rover, captured at deployment.
    pub rover_name: String,
    /// Normalized 0-100 rarity score of the rover at deployment.
    pub rover_rarity_score: u32,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Deployment time.
    pub started_at: DateTime<Utc>,
    /// Time the run reached a terminal status.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Item awarded on success, if any.
    #[serde(default)]
    pub reward_item_id: Option<ItemId>,
    /// Coins awarded on success.
    #[serde(default)]
    pub reward_coins: Option<u32>,
    /// Narrated progress, oldest first.
    #[serde(default)]
    pub log_entries: Vec<ExpeditionLogEntry>,
}

impl ExpeditionRun {
    /// Create a fresh in-progress run with an empty log.
    pub fn new(
        expedition_id: ExpeditionId,
        rover_token_id: TokenId,
        rover_name: impl Into<String>,
        rover_rarity_score: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RunId::new(),
            expedition_id,
            rover_token_id,
            rover_name: rover_name.into(),
            rover_rarity_score,
            status: RunStatus::InProgress,
            started_at,
            completed_at: None,
            reward_item_id: None,
            reward_coins: None,
            log_entries: Vec::new(),
        }
    }

    /// Whether the rover is still out on the expedition.
    pub const fn is_active(&self) -> bool {
        matches!(self.status, RunStatus::InProgress)
    }
}

// ---------------------------------------------------------------------------
// Battles
// ---------------------------------------------------------------------------

/// One resolved action in a turn-based battle. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BattleLogEntry {
    /// Round the action happened in (1-based).
    pub round: u32,
    /// Which side acted.
    pub turn: Side,
    /// Short uppercase action label, e.g. `SHIELD BASH`.
    pub action: String,
    /// Damage dealt, when the action attacked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
    /// Health restored, when the action healed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing: Option<u32>,
    /// Narrated description.
    pub description: String,
}
