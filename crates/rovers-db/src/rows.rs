//! Table rows and their mapping to domain records.
//!
//! Integers are stored as signed `PostgreSQL` types; conversion back into
//! the domain's unsigned fields is checked and reported as
//! [`DbError::Decode`].

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use rovers_core::AlphaEntry;
use rovers_types::{
    Difficulty, EquipmentId, EquipmentSlot, Expedition, ExpeditionId, ExpeditionLogEntry,
    ExpeditionRun, InventoryId, InventoryItem, Item, ItemId, ItemRarity, ItemType, RoverEquipment,
    RunId, RunStatus, TokenId,
};

use crate::error::DbError;

/// Signed column value to `u32`.
pub(crate) fn to_u32(column: &'static str, value: i32) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|e| DbError::Decode {
        column,
        value: format!("{value} ({e})"),
    })
}

/// Domain `u32` to a signed column value.
pub(crate) fn to_i32(column: &'static str, value: u32) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|e| DbError::Decode {
        column,
        value: format!("{value} ({e})"),
    })
}

fn parse_enum<T>(column: &'static str, raw: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, DbError> {
    parse(raw).ok_or_else(|| DbError::Decode {
        column,
        value: raw.to_owned(),
    })
}

/// A row from the `items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    /// Item UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: Option<String>,
    /// Category name.
    pub item_type: String,
    /// Rarity tier name.
    pub rarity: String,
    /// Power bonus.
    pub power_bonus: i32,
    /// Defense bonus.
    pub defense_bonus: i32,
    /// Luck bonus.
    pub luck_bonus: i32,
    /// Artwork URL.
    pub image_url: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = DbError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ItemId(row.id),
            item_type: parse_enum("item_type", &row.item_type, ItemType::parse)?,
            rarity: parse_enum("rarity", &row.rarity, ItemRarity::parse)?,
            name: row.name,
            description: row.description,
            power_bonus: row.power_bonus,
            defense_bonus: row.defense_bonus,
            luck_bonus: row.luck_bonus,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

/// A row from the `expeditions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExpeditionRow {
    /// Expedition UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Briefing text.
    pub description: Option<String>,
    /// Difficulty name.
    pub difficulty: String,
    /// Mission length in minutes.
    pub duration_minutes: i32,
    /// Informational trait requirements.
    pub required_traits: Vec<String>,
    /// Items this expedition may award.
    pub reward_item_pool: Vec<Uuid>,
    /// Lower coin bound.
    pub coin_reward_min: i32,
    /// Upper coin bound.
    pub coin_reward_max: i32,
}

impl TryFrom<ExpeditionRow> for Expedition {
    type Error = DbError;

    fn try_from(row: ExpeditionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ExpeditionId(row.id),
            difficulty: parse_enum("difficulty", &row.difficulty, Difficulty::parse)?,
            duration_minutes: to_u32("duration_minutes", row.duration_minutes)?,
            coin_reward_min: to_u32("coin_reward_min", row.coin_reward_min)?,
            coin_reward_max: to_u32("coin_reward_max", row.coin_reward_max)?,
            name: row.name,
            description: row.description,
            required_traits: row.required_traits,
            reward_item_pool: row.reward_item_pool.into_iter().map(ItemId).collect(),
        })
    }
}

/// Columns selected for a run, in [`RunRow`] order.
pub(crate) const RUN_COLUMNS: &str = "id, expedition_id, rover_token_id, rover_name, rover_rarity_score, \
     status, started_at, completed_at, reward_item_id, reward_coins, log_entries";

/// A row from the `expedition_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunRow {
    /// Run UUID.
    pub id: Uuid,
    /// Expedition UUID.
    pub expedition_id: Uuid,
    /// Deployed rover.
    pub rover_token_id: String,
    /// Rover name at deployment.
    pub rover_name: String,
    /// Rarity score at deployment.
    pub rover_rarity_score: i32,
    /// Status name.
    pub status: String,
    /// Deployment time.
    pub started_at: DateTime<Utc>,
    /// Terminal time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Awarded item.
    pub reward_item_id: Option<Uuid>,
    /// Awarded coins.
    pub reward_coins: Option<i32>,
    /// Narrated progress.
    pub log_entries: Json<Vec<ExpeditionLogEntry>>,
}

impl TryFrom<RunRow> for ExpeditionRun {
    type Error = DbError;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RunId(row.id),
            expedition_id: ExpeditionId(row.expedition_id),
            rover_token_id: TokenId::new(row.rover_token_id),
            rover_name: row.rover_name,
            rover_rarity_score: to_u32("rover_rarity_score", row.rover_rarity_score)?,
            status: parse_enum("status", &row.status, RunStatus::parse)?,
            started_at: row.started_at,
            completed_at: row.completed_at,
            reward_item_id: row.reward_item_id.map(ItemId),
            reward_coins: row.reward_coins.map(|c| to_u32("reward_coins", c)).transpose()?,
            log_entries: row.log_entries.0,
        })
    }
}

/// A row from the `inventory` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InventoryRow {
    /// Row UUID.
    pub id: Uuid,
    /// Held item.
    pub item_id: Uuid,
    /// Units held.
    pub quantity: i32,
    /// First acquisition time.
    pub acquired_at: DateTime<Utc>,
}

impl TryFrom<InventoryRow> for InventoryItem {
    type Error = DbError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InventoryId(row.id),
            item_id: ItemId(row.item_id),
            quantity: to_u32("quantity", row.quantity)?,
            acquired_at: row.acquired_at,
        })
    }
}

/// A row from the `rover_equipment` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EquipmentRow {
    /// Row UUID.
    pub id: Uuid,
    /// Rover wearing the item.
    pub rover_token_id: String,
    /// Equipped item.
    pub item_id: Uuid,
    /// Slot name.
    pub slot: String,
    /// Equip time.
    pub equipped_at: DateTime<Utc>,
}

impl TryFrom<EquipmentRow> for RoverEquipment {
    type Error = DbError;

    fn try_from(row: EquipmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EquipmentId(row.id),
            rover_token_id: TokenId::new(row.rover_token_id),
            item_id: ItemId(row.item_id),
            slot: parse_enum("slot", &row.slot, EquipmentSlot::parse)?,
            equipped_at: row.equipped_at,
        })
    }
}

/// A row from the `alpha_rovers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlphaRow {
    /// Rover token id.
    pub rover_token_id: String,
    /// Display name.
    pub name: String,
    /// Image or video URL.
    pub image_url: Option<String>,
    /// Traits at discovery.
    pub trait_count: i32,
    /// Discovery time.
    pub discovered_at: DateTime<Utc>,
}

impl TryFrom<AlphaRow> for AlphaEntry {
    type Error = DbError;

    fn try_from(row: AlphaRow) -> Result<Self, Self::Error> {
        let trait_count = usize::try_from(row.trait_count).map_err(|e| DbError::Decode {
            column: "trait_count",
            value: format!("{} ({e})", row.trait_count),
        })?;
        Ok(Self {
            identifier: TokenId::new(row.rover_token_id),
            name: row.name,
            image_url: row.image_url,
            trait_count,
            discovered_at: row.discovered_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_row(status: &str, coins: Option<i32>) -> RunRow {
        RunRow {
            id: Uuid::now_v7(),
            expedition_id: Uuid::now_v7(),
            rover_token_id: "42".to_owned(),
            rover_name: "Rover #42".to_owned(),
            rover_rarity_score: 61,
            status: status.to_owned(),
            started_at: Utc::now(),
            completed_at: None,
            reward_item_id: None,
            reward_coins: coins,
            log_entries: Json(Vec::new()),
        }
    }

    #[test]
    fn run_row_maps_to_domain() {
        let run = ExpeditionRun::try_from(run_row("completed", Some(40)));
        assert!(run.is_ok_and(|r| r.status == RunStatus::Completed && r.reward_coins == Some(40)));
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let run = ExpeditionRun::try_from(run_row("paused", None));
        assert!(matches!(run, Err(DbError::Decode { column: "status", .. })));
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(to_u32("quantity", -1).is_err());
        assert_eq!(to_u32("quantity", 3).ok(), Some(3));
        assert!(to_i32("reward_coins", u32::MAX).is_err());
    }

    #[test]
    fn item_row_maps_enums() {
        let row = ItemRow {
            id: Uuid::now_v7(),
            name: "Plasma Cutter".to_owned(),
            description: None,
            item_type: "weapon".to_owned(),
            rarity: "epic".to_owned(),
            power_bonus: 12,
            defense_bonus: 0,
            luck_bonus: 2,
            image_url: None,
            created_at: Utc::now(),
        };
        let item = Item::try_from(row);
        assert!(item.is_ok_and(|i| i.item_type == ItemType::Weapon && i.rarity == ItemRarity::Epic));
    }
}
