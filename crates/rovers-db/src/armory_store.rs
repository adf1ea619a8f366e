//! Persistence for the player's armory: coins, inventory and equipment.
//!
//! The armory's rules live in [`rovers_core::Armory`]; this store loads it
//! and writes it back as a whole inside one transaction.

use sqlx::PgPool;

use rovers_core::Armory;

use crate::error::DbError;
use crate::rows::{EquipmentRow, InventoryRow, to_i32};

/// Operations on the `wallet`, `inventory` and `rover_equipment` tables.
pub struct ArmoryStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ArmoryStore<'a> {
    /// Create a new armory store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the armory. A player with no wallet row yet gets
    /// `starting_coins`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails and
    /// [`DbError::Decode`] for rows with invalid values.
    pub async fn load(&self, starting_coins: u64) -> Result<Armory, DbError> {
        let wallet: Option<(i64,)> = sqlx::query_as(r"SELECT coins FROM wallet WHERE id")
            .fetch_optional(self.pool)
            .await?;
        let coins = match wallet {
            Some((coins,)) => u64::try_from(coins).map_err(|e| DbError::Decode {
                column: "coins",
                value: format!("{coins} ({e})"),
            })?,
            None => starting_coins,
        };

        let inventory = sqlx::query_as::<_, InventoryRow>(
            r"SELECT id, item_id, quantity, acquired_at FROM inventory ORDER BY acquired_at",
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, DbError>>()?;

        let equipment = sqlx::query_as::<_, EquipmentRow>(
            r"SELECT id, rover_token_id, item_id, slot, equipped_at FROM rover_equipment",
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryFrom::try_from)
        .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Armory::restore(coins, inventory, equipment))
    }

    /// Replace the stored armory with `armory`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if any write fails (nothing is
    /// committed then) and [`DbError::Decode`] if a number does not fit its
    /// column.
    pub async fn save(&self, armory: &Armory) -> Result<(), DbError> {
        let coins = i64::try_from(armory.coins()).map_err(|e| DbError::Decode {
            column: "coins",
            value: format!("{} ({e})", armory.coins()),
        })?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"INSERT INTO wallet (id, coins) VALUES (TRUE, $1)
              ON CONFLICT (id) DO UPDATE SET coins = EXCLUDED.coins",
        )
        .bind(coins)
        .execute(&mut *tx)
        .await?;

        sqlx::query(r"DELETE FROM rover_equipment").execute(&mut *tx).await?;
        sqlx::query(r"DELETE FROM inventory").execute(&mut *tx).await?;

        for stack in armory.inventory() {
            sqlx::query(
                r"INSERT INTO inventory (id, item_id, quantity, acquired_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(stack.id.into_inner())
            .bind(stack.item_id.into_inner())
            .bind(to_i32("quantity", stack.quantity)?)
            .bind(stack.acquired_at)
            .execute(&mut *tx)
            .await?;
        }

        for equipped in armory.all_equipment() {
            sqlx::query(
                r"INSERT INTO rover_equipment (id, rover_token_id, item_id, slot, equipped_at)
                  VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(equipped.id.into_inner())
            .bind(equipped.rover_token_id.as_str())
            .bind(equipped.item_id.into_inner())
            .bind(equipped.slot.as_str())
            .bind(equipped.equipped_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(coins = armory.coins(), "Saved armory");
        Ok(())
    }
}
