//! Error types for expedition persistence and simulation.

use rovers_types::{RunId, TokenId};

/// Errors returned by an [`ExpeditionStore`](crate::store::ExpeditionStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No run with this id exists.
    #[error("expedition run not found: {run_id}")]
    NotFound {
        /// The requested run.
        run_id: RunId,
    },

    /// The run already reached a terminal status.
    #[error("expedition run {run_id} is already terminal")]
    AlreadyTerminal {
        /// The terminal run.
        run_id: RunId,
    },

    /// The backing store failed.
    #[error("store backend error: {message}")]
    Backend {
        /// Backend-specific description.
        message: String,
    },
}

/// Errors raised while deploying or running an expedition.
#[derive(Debug, thiserror::Error)]
pub enum ExpeditionError {
    /// The persistence collaborator failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// The rover is already out on another run.
    #[error("rover {rover} already has an active expedition run {run_id}")]
    RoverBusy {
        /// The busy rover.
        rover: TokenId,
        /// Its active run.
        run_id: RunId,
    },

    /// The run passed in was not in progress.
    #[error("expedition run {run_id} is not in progress")]
    NotInProgress {
        /// The finished run.
        run_id: RunId,
    },

    /// The run belongs to a different expedition than the one supplied.
    #[error("expedition run {run_id} does not belong to this expedition")]
    ExpeditionMismatch {
        /// The mismatched run.
        run_id: RunId,
    },
}
