//! Enumeration types shared across the Rovers arena.
//!
//! Serialized names match the lowercase / `snake_case` strings the browser
//! client and the persistence provider already use (`"in_progress"`,
//! `"legendary"`, `"player"`, ...).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Rarity tier of an item. Ordered from most common to rarest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ItemRarity {
    /// Baseline tier.
    Common,
    /// Slightly better than common.
    Uncommon,
    /// Noticeably rarer drops.
    Rare,
    /// High-tier drops.
    Epic,
    /// The rarest tier.
    Legendary,
}

impl ItemRarity {
    /// All tiers, rarest first.
    pub const RAREST_FIRST: [Self; 5] = [
        Self::Legendary,
        Self::Epic,
        Self::Rare,
        Self::Uncommon,
        Self::Common,
    ];

    /// Lowercase name as stored by the persistence provider.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// Parse a stored tier name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "common" => Some(Self::Common),
            "uncommon" => Some(Self::Uncommon),
            "rare" => Some(Self::Rare),
            "epic" => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            _ => None,
        }
    }
}

/// Category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ItemType {
    /// Equippable in the weapon slot.
    Weapon,
    /// Equippable in the armor slot.
    Armor,
    /// Single-use item; never equipped.
    Consumable,
    /// Equippable in the accessory slot.
    Accessory,
}

impl ItemType {
    /// Lowercase name as stored by the persistence provider.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Consumable => "consumable",
            Self::Accessory => "accessory",
        }
    }

    /// Parse a stored item type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "weapon" => Some(Self::Weapon),
            "armor" => Some(Self::Armor),
            "consumable" => Some(Self::Consumable),
            "accessory" => Some(Self::Accessory),
            _ => None,
        }
    }
}

/// Equipment slot on a rover. Each rover holds at most one item per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EquipmentSlot {
    /// Weapon slot.
    Weapon,
    /// Armor slot.
    Armor,
    /// Accessory slot.
    Accessory,
}

impl EquipmentSlot {
    /// Lowercase name as stored by the persistence provider.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Accessory => "accessory",
        }
    }

    /// Parse a stored slot name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "weapon" => Some(Self::Weapon),
            "armor" => Some(Self::Armor),
            "accessory" => Some(Self::Accessory),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Expeditions
// ---------------------------------------------------------------------------

/// Difficulty of an expedition; drives the base success chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// Base success 85%.
    Easy,
    /// Base success 65%.
    Medium,
    /// Base success 45%.
    Hard,
    /// Base success 25%.
    Extreme,
}

impl Difficulty {
    /// Lowercase name as stored by the persistence provider.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
        }
    }

    /// Parse a stored difficulty name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "extreme" => Some(Self::Extreme),
            _ => None,
        }
    }
}

/// Lifecycle status of an [`ExpeditionRun`](crate::ExpeditionRun).
///
/// A run starts `InProgress` and moves exactly once to `Completed` or
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RunStatus {
    /// The rover is still out on the expedition.
    InProgress,
    /// The rover returned successfully with rewards.
    Completed,
    /// The rover failed the expedition.
    Failed,
}

impl RunStatus {
    /// Whether this status is final.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// `snake_case` name as stored by the persistence provider.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a stored status name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Tone of an expedition log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LogEntryType {
    /// Neutral exploration progress.
    Info,
    /// The expedition succeeded.
    Success,
    /// A hazard, or the expedition failed.
    Danger,
    /// A reward was granted.
    Reward,
}

// ---------------------------------------------------------------------------
// Battles
// ---------------------------------------------------------------------------

/// One of the two sides of a turn-based battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Side {
    /// The human-controlled rover.
    Player,
    /// The AI-controlled rover.
    Enemy,
}

impl Side {
    /// The other side.
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Final result of a turn-based battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum BattleWinner {
    /// The player's rover won.
    Player,
    /// The enemy rover won.
    Enemy,
    /// Both rovers ended with equal health.
    Draw,
}

impl From<Side> for BattleWinner {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Self::Player,
            Side::Enemy => Self::Enemy,
        }
    }
}
