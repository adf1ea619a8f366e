//! Persistence-provider interface for expedition runs.
//!
//! The store is the source of truth for a run's progress: the simulator
//! appends each log entry as it happens and resumes from whatever the store
//! already holds. [`MemoryStore`] backs tests and the CLI; the `PostgreSQL`
//! implementation lives in `rovers-db`.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use rovers_types::{ExpeditionLogEntry, ExpeditionRun, ItemId, RunId, RunStatus};

use crate::error::StoreError;

/// Terminal update for a run. Only terminal statuses can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCompletion {
    status: RunStatus,
    /// When the run ended.
    pub completed_at: DateTime<Utc>,
    /// Item awarded on success.
    pub reward_item_id: Option<ItemId>,
    /// Coins awarded on success.
    pub reward_coins: Option<u32>,
}

impl RunCompletion {
    /// A successful run with its rewards.
    pub const fn completed(
        completed_at: DateTime<Utc>,
        reward_item_id: Option<ItemId>,
        reward_coins: u32,
    ) -> Self {
        Self {
            status: RunStatus::Completed,
            completed_at,
            reward_item_id,
            reward_coins: Some(reward_coins),
        }
    }

    /// A failed run.
    pub const fn failed(completed_at: DateTime<Utc>) -> Self {
        Self {
            status: RunStatus::Failed,
            completed_at,
            reward_item_id: None,
            reward_coins: None,
        }
    }

    /// The terminal status this completion applies.
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Apply this completion to an in-progress run.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyTerminal`] if the run already ended.
    pub fn apply(&self, run: &mut ExpeditionRun) -> Result<(), StoreError> {
        if run.status.is_terminal() {
            return Err(StoreError::AlreadyTerminal { run_id: run.id });
        }
        run.status = self.status;
        run.completed_at = Some(self.completed_at);
        run.reward_item_id = self.reward_item_id;
        run.reward_coins = self.reward_coins;
        Ok(())
    }
}

/// Persistence operations the expedition simulator needs.
pub trait ExpeditionStore: Send + Sync {
    /// Persist a newly deployed run.
    fn create_run(&self, run: &ExpeditionRun) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Append log entries, in order, to an in-progress run.
    fn append_log(
        &self,
        run_id: RunId,
        entries: &[ExpeditionLogEntry],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Append the closing log entries and move the run to its terminal
    /// status as one write. Fails, writing nothing, if it is already
    /// terminal.
    fn complete_run(
        &self,
        run_id: RunId,
        final_entries: &[ExpeditionLogEntry],
        completion: RunCompletion,
    ) -> impl Future<Output = Result<ExpeditionRun, StoreError>> + Send;

    /// Every run still in progress, oldest first.
    fn active_runs(&self) -> impl Future<Output = Result<Vec<ExpeditionRun>, StoreError>> + Send;

    /// Fetch one run.
    fn get_run(&self, run_id: RunId) -> impl Future<Output = Result<ExpeditionRun, StoreError>> + Send;
}

/// In-memory [`ExpeditionStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    runs: RwLock<BTreeMap<RunId, ExpeditionRun>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run, active or not, oldest first.
    pub async fn all_runs(&self) -> Vec<ExpeditionRun> {
        let mut runs: Vec<ExpeditionRun> = self.runs.read().await.values().cloned().collect();
        runs.sort_by_key(|r| r.started_at);
        runs
    }
}

impl ExpeditionStore for MemoryStore {
    async fn create_run(&self, run: &ExpeditionRun) -> Result<(), StoreError> {
        self.runs.write().await.insert(run.id, run.clone());
        Ok(())
    }

    async fn append_log(&self, run_id: RunId, entries: &[ExpeditionLogEntry]) -> Result<(), StoreError> {
        let mut runs = self.runs.write().await;
        let run = runs.get_mut(&run_id).ok_or(StoreError::NotFound { run_id })?;
        if run.status.is_terminal() {
            return Err(StoreError::AlreadyTerminal { run_id });
        }
        run.log_entries.extend_from_slice(entries);
        Ok(())
    }

    async fn complete_run(
        &self,
        run_id: RunId,
        final_entries: &[ExpeditionLogEntry],
        completion: RunCompletion,
    ) -> Result<ExpeditionRun, StoreError> {
        let mut runs = self.runs.write().await;
        let run = runs.get_mut(&run_id).ok_or(StoreError::NotFound { run_id })?;
        completion.apply(run)?;
        run.log_entries.extend_from_slice(final_entries);
        Ok(run.clone())
    }

    async fn active_runs(&self) -> Result<Vec<ExpeditionRun>, StoreError> {
        let mut runs: Vec<ExpeditionRun> = self
            .runs
            .read()
            .await
            .values()
            .filter(|r| r.is_active())
            .cloned()
            .collect();
        runs.sort_by_key(|r| r.started_at);
        Ok(runs)
    }

    async fn get_run(&self, run_id: RunId) -> Result<ExpeditionRun, StoreError> {
        self.runs
            .read()
            .await
            .get(&run_id)
            .cloned()
            .ok_or(StoreError::NotFound { run_id })
    }
}
