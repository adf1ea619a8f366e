//! Item and expedition definitions.
//!
//! Both tables are read-mostly configuration. The upserts exist for
//! seeding and for operators editing the catalog.

use sqlx::PgPool;

use rovers_types::{Expedition, ExpeditionId, Item};

use crate::error::DbError;
use crate::rows::{ExpeditionRow, ItemRow, to_i32};

/// Operations on the `items` and `expeditions` tables.
pub struct CatalogStore<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogStore<'a> {
    /// Create a new catalog store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every item definition, by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Decode`] for rows with unknown enum values.
    pub async fn list_items(&self) -> Result<Vec<Item>, DbError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"SELECT id, name, description, item_type, rarity, power_bonus, defense_bonus,
                     luck_bonus, image_url, created_at
              FROM items
              ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    /// Insert or replace an item definition.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the write fails.
    pub async fn upsert_item(&self, item: &Item) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO items (id, name, description, item_type, rarity, power_bonus,
                                 defense_bonus, luck_bonus, image_url, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
              ON CONFLICT (id) DO UPDATE SET
                  name = EXCLUDED.name,
                  description = EXCLUDED.description,
                  item_type = EXCLUDED.item_type,
                  rarity = EXCLUDED.rarity,
                  power_bonus = EXCLUDED.power_bonus,
                  defense_bonus = EXCLUDED.defense_bonus,
                  luck_bonus = EXCLUDED.luck_bonus,
                  image_url = EXCLUDED.image_url",
        )
        .bind(item.id.into_inner())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.item_type.as_str())
        .bind(item.rarity.as_str())
        .bind(item.power_bonus)
        .bind(item.defense_bonus)
        .bind(item.luck_bonus)
        .bind(&item.image_url)
        .bind(item.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Every expedition definition, by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails and
    /// [`DbError::Decode`] for rows with invalid values.
    pub async fn list_expeditions(&self) -> Result<Vec<Expedition>, DbError> {
        let rows = sqlx::query_as::<_, ExpeditionRow>(
            r"SELECT id, name, description, difficulty, duration_minutes, required_traits,
                     reward_item_pool, coin_reward_min, coin_reward_max
              FROM expeditions
              ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Expedition::try_from).collect()
    }

    /// Fetch one expedition.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get_expedition(&self, id: ExpeditionId) -> Result<Option<Expedition>, DbError> {
        let row = sqlx::query_as::<_, ExpeditionRow>(
            r"SELECT id, name, description, difficulty, duration_minutes, required_traits,
                     reward_item_pool, coin_reward_min, coin_reward_max
              FROM expeditions
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(Expedition::try_from).transpose()
    }

    /// Insert or replace an expedition definition.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the write fails and
    /// [`DbError::Decode`] if a number does not fit its column.
    pub async fn upsert_expedition(&self, expedition: &Expedition) -> Result<(), DbError> {
        let pool: Vec<uuid::Uuid> = expedition
            .reward_item_pool
            .iter()
            .map(|id| id.0)
            .collect();

        sqlx::query(
            r"INSERT INTO expeditions (id, name, description, difficulty, duration_minutes,
                                       required_traits, reward_item_pool, coin_reward_min,
                                       coin_reward_max)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              ON CONFLICT (id) DO UPDATE SET
                  name = EXCLUDED.name,
                  description = EXCLUDED.description,
                  difficulty = EXCLUDED.difficulty,
                  duration_minutes = EXCLUDED.duration_minutes,
                  required_traits = EXCLUDED.required_traits,
                  reward_item_pool = EXCLUDED.reward_item_pool,
                  coin_reward_min = EXCLUDED.coin_reward_min,
                  coin_reward_max = EXCLUDED.coin_reward_max",
        )
        .bind(expedition.id.into_inner())
        .bind(&expedition.name)
        .bind(&expedition.description)
        .bind(expedition.difficulty.as_str())
        .bind(to_i32("duration_minutes", expedition.duration_minutes)?)
        .bind(&expedition.required_traits)
        .bind(&pool)
        .bind(to_i32("coin_reward_min", expedition.coin_reward_min)?)
        .bind(to_i32("coin_reward_max", expedition.coin_reward_max)?)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
