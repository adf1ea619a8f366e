//! Expedition simulator for the Rovers arena.
//!
//! A rover sent on an expedition is narrated over a fixed number of paced
//! steps and then succeeds or fails by a roll scaled by its rarity score.
//! Progress is written to an [`ExpeditionStore`] as it happens, so a run
//! abandoned halfway resumes from its last persisted entry.
//!
//! # Modules
//!
//! - [`simulator`] -- Success odds, reward rolls and the paced run loop
//! - [`runner`] -- Deployment service enforcing one active run per rover
//! - [`store`] -- Persistence-provider trait and in-memory store
//! - [`abort`] -- Cooperative abort flag
//! - [`error`] -- Store and expedition error types

pub mod abort;
pub mod error;
pub mod runner;
pub mod simulator;
pub mod store;

pub use abort::AbortHandle;
pub use error::{ExpeditionError, StoreError};
pub use runner::{ExpeditionRunner, reward_pool};
pub use simulator::{
    ExpeditionContext, ExpeditionOutcome, resume_step, roll_coins, roll_reward_rarity,
    run_expedition, step_delay, success_chance,
};
pub use store::{ExpeditionStore, MemoryStore, RunCompletion};
