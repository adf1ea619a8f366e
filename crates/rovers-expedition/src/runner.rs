//! Deployment and execution service around the simulator.
//!
//! [`ExpeditionRunner`] owns the store, clock and tuning, enforces one
//! active run per rover, and resolves an expedition's reward pool from the
//! item catalog.

use tracing::info;

use rovers_core::{Clock, ExpeditionConfig, ItemCatalog, RollSource};
use rovers_types::{Expedition, ExpeditionRun, Item, RunId, TokenId};

use crate::abort::AbortHandle;
use crate::error::ExpeditionError;
use crate::simulator::{ExpeditionContext, ExpeditionOutcome, run_expedition};
use crate::store::ExpeditionStore;

/// Deploys rovers and drives their runs.
#[derive(Debug)]
pub struct ExpeditionRunner<S, C> {
    store: S,
    clock: C,
    config: ExpeditionConfig,
}

impl<S: ExpeditionStore, C: Clock> ExpeditionRunner<S, C> {
    /// Create a runner.
    pub const fn new(store: S, clock: C, config: ExpeditionConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Start a run for a rover.
    ///
    /// # Errors
    ///
    /// [`ExpeditionError::RoverBusy`] when the rover already has an active
    /// run, or a store failure.
    pub async fn deploy(
        &self,
        expedition: &Expedition,
        rover_token_id: TokenId,
        rover_name: &str,
        rarity_score: u32,
    ) -> Result<ExpeditionRun, ExpeditionError> {
        let active = self.store.active_runs().await?;
        if let Some(busy) = active.iter().find(|r| r.rover_token_id == rover_token_id) {
            return Err(ExpeditionError::RoverBusy {
                rover: rover_token_id,
                run_id: busy.id,
            });
        }

        let run = ExpeditionRun::new(
            expedition.id,
            rover_token_id,
            rover_name,
            rarity_score,
            self.clock.now(),
        );
        self.store.create_run(&run).await?;
        info!(
            run_id = %run.id,
            rover = %run.rover_token_id,
            expedition = %expedition.name,
            rarity_score,
            "Rover deployed"
        );
        Ok(run)
    }

    /// Drive a stored run to its end from wherever it left off.
    ///
    /// # Errors
    ///
    /// See [`run_expedition`].
    pub async fn run<R: RollSource + Send>(
        &self,
        run_id: RunId,
        expedition: &Expedition,
        item_pool: &[Item],
        abort: &AbortHandle,
        rolls: &mut R,
    ) -> Result<ExpeditionOutcome, ExpeditionError> {
        let run = self.store.get_run(run_id).await?;
        let ctx = ExpeditionContext {
            store: &self.store,
            clock: &self.clock,
            config: &self.config,
            abort,
        };
        run_expedition(&ctx, &run, expedition, item_pool, rolls).await
    }
}

/// Candidate reward items for an expedition.
///
/// The expedition's own pool when it names one, otherwise the whole
/// catalog. Ids missing from the catalog are skipped.
pub fn reward_pool(expedition: &Expedition, catalog: &ItemCatalog) -> Vec<Item> {
    if expedition.reward_item_pool.is_empty() {
        return catalog.iter().cloned().collect();
    }
    expedition
        .reward_item_pool
        .iter()
        .filter_map(|id| catalog.get(*id).cloned())
        .collect()
}
