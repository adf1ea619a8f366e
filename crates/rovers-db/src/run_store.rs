//! `PostgreSQL` implementation of the expedition persistence provider.
//!
//! Log appends and completion are guarded by `status = 'in_progress'` in
//! the `WHERE` clause, so a terminal run is never modified even when two
//! writers race. Completion appends the closing entries in the same
//! statement that sets the terminal status.

use sqlx::PgPool;

use rovers_expedition::{ExpeditionStore, RunCompletion, StoreError};
use rovers_types::{ExpeditionLogEntry, ExpeditionRun, RunId, RunStatus};

use crate::error::DbError;
use crate::rows::{RUN_COLUMNS, RunRow, to_i32};

/// Expedition runs stored in the `expedition_runs` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_run(&self, run: &ExpeditionRun) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO expedition_runs (id, expedition_id, rover_token_id, rover_name,
                                           rover_rarity_score, status, started_at, log_entries)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(run.id.into_inner())
        .bind(run.expedition_id.into_inner())
        .bind(run.rover_token_id.as_str())
        .bind(&run.rover_name)
        .bind(to_i32("rover_rarity_score", run.rover_rarity_score)?)
        .bind(run.status.as_str())
        .bind(run.started_at)
        .bind(serde_json::to_value(&run.log_entries)?)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            run_id = %run.id,
            rover = %run.rover_token_id,
            "Inserted expedition run"
        );
        Ok(())
    }

    async fn status_of(&self, run_id: RunId) -> Result<Option<RunStatus>, DbError> {
        let row: Option<(String,)> = sqlx::query_as(r"SELECT status FROM expedition_runs WHERE id = $1")
            .bind(run_id.into_inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(status,)| {
            RunStatus::parse(&status).ok_or(DbError::Decode {
                column: "status",
                value: status,
            })
        })
        .transpose()
    }

    /// Explain why a guarded update touched no row.
    async fn rejected(&self, run_id: RunId) -> StoreError {
        match self.status_of(run_id).await {
            Ok(None) => StoreError::NotFound { run_id },
            Ok(Some(_)) => StoreError::AlreadyTerminal { run_id },
            Err(e) => e.into(),
        }
    }

    async fn append(&self, run_id: RunId, entries: &[ExpeditionLogEntry]) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"UPDATE expedition_runs
              SET log_entries = log_entries || $2
              WHERE id = $1 AND status = 'in_progress'",
        )
        .bind(run_id.into_inner())
        .bind(serde_json::to_value(entries)?)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn complete(
        &self,
        run_id: RunId,
        final_entries: &[ExpeditionLogEntry],
        completion: RunCompletion,
    ) -> Result<Option<ExpeditionRun>, DbError> {
        let coins = completion
            .reward_coins
            .map(|c| to_i32("reward_coins", c))
            .transpose()?;

        let row = sqlx::query_as::<_, RunRow>(&format!(
            r"UPDATE expedition_runs
              SET status = $2, completed_at = $3, reward_item_id = $4, reward_coins = $5,
                  log_entries = log_entries || $6
              WHERE id = $1 AND status = 'in_progress'
              RETURNING {RUN_COLUMNS}"
        ))
        .bind(run_id.into_inner())
        .bind(completion.status().as_str())
        .bind(completion.completed_at)
        .bind(completion.reward_item_id.map(|id| id.0))
        .bind(coins)
        .bind(serde_json::to_value(final_entries)?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ExpeditionRun::try_from).transpose()
    }

    async fn active(&self) -> Result<Vec<ExpeditionRun>, DbError> {
        let rows = sqlx::query_as::<_, RunRow>(&format!(
            "SELECT {RUN_COLUMNS} FROM expedition_runs WHERE status = 'in_progress' ORDER BY started_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExpeditionRun::try_from).collect()
    }

    async fn fetch(&self, run_id: RunId) -> Result<Option<ExpeditionRun>, DbError> {
        let row = sqlx::query_as::<_, RunRow>(&format!(
            "SELECT {RUN_COLUMNS} FROM expedition_runs WHERE id = $1"
        ))
        .bind(run_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ExpeditionRun::try_from).transpose()
    }
}

impl ExpeditionStore for PgStore {
    async fn create_run(&self, run: &ExpeditionRun) -> Result<(), StoreError> {
        self.insert_run(run).await.map_err(StoreError::from)
    }

    async fn append_log(&self, run_id: RunId, entries: &[ExpeditionLogEntry]) -> Result<(), StoreError> {
        if self.append(run_id, entries).await? == 0 {
            return Err(self.rejected(run_id).await);
        }
        Ok(())
    }

    async fn complete_run(
        &self,
        run_id: RunId,
        final_entries: &[ExpeditionLogEntry],
        completion: RunCompletion,
    ) -> Result<ExpeditionRun, StoreError> {
        match self.complete(run_id, final_entries, completion).await? {
            Some(run) => {
                tracing::info!(run_id = %run_id, status = run.status.as_str(), "Completed expedition run");
                Ok(run)
            }
            None => Err(self.rejected(run_id).await),
        }
    }

    async fn active_runs(&self) -> Result<Vec<ExpeditionRun>, StoreError> {
        self.active().await.map_err(StoreError::from)
    }

    async fn get_run(&self, run_id: RunId) -> Result<ExpeditionRun, StoreError> {
        self.fetch(run_id).await?.ok_or(StoreError::NotFound { run_id })
    }
}
