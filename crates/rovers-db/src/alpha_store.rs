//! Persistence for the alpha rover ledger.

use sqlx::PgPool;

use rovers_core::{AlphaEntry, AlphaLedger};
use rovers_types::TokenId;

use crate::error::DbError;
use crate::rows::AlphaRow;

/// Operations on the `alpha_rovers` table.
pub struct AlphaStore<'a> {
    pool: &'a PgPool,
}

impl<'a> AlphaStore<'a> {
    /// Create a new alpha store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a discovered alpha. Returns `false` if it was already listed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn record(&self, entry: &AlphaEntry) -> Result<bool, DbError> {
        let trait_count = i32::try_from(entry.trait_count).unwrap_or(i32::MAX);
        let result = sqlx::query(
            r"INSERT INTO alpha_rovers (rover_token_id, name, image_url, trait_count, discovered_at)
              VALUES ($1, $2, $3, $4, $5)
              ON CONFLICT (rover_token_id) DO NOTHING",
        )
        .bind(entry.identifier.as_str())
        .bind(&entry.name)
        .bind(&entry.image_url)
        .bind(trait_count)
        .bind(entry.discovered_at)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Load the ledger, oldest discovery first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load(&self, threshold: usize) -> Result<AlphaLedger, DbError> {
        let entries = sqlx::query_as::<_, AlphaRow>(
            r"SELECT rover_token_id, name, image_url, trait_count, discovered_at
              FROM alpha_rovers
              ORDER BY discovered_at",
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(AlphaEntry::try_from)
        .collect::<Result<Vec<_>, DbError>>()?;

        Ok(AlphaLedger::restore(threshold, entries))
    }

    /// Drop one rover. Returns whether it was listed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn remove(&self, identifier: &TokenId) -> Result<bool, DbError> {
        let result = sqlx::query(r"DELETE FROM alpha_rovers WHERE rover_token_id = $1")
            .bind(identifier.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Forget every rover. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn clear(&self) -> Result<u64, DbError> {
        let result = sqlx::query(r"DELETE FROM alpha_rovers").execute(self.pool).await?;
        tracing::info!(removed = result.rows_affected(), "Cleared alpha ledger");
        Ok(result.rows_affected())
    }
}
