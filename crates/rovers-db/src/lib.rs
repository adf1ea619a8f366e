//! `PostgreSQL` persistence for the Rovers arena.
//!
//! Implements the expedition persistence provider ([`PgStore`]) and stores
//! the rest of the meta-game: item and expedition definitions, the player's
//! armory, and discovered alpha rovers.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration, migrations
//! - [`run_store`] -- Expedition runs behind the `ExpeditionStore` trait
//! - [`catalog_store`] -- Item and expedition definitions
//! - [`armory_store`] -- Coins, inventory and equipment
//! - [`alpha_store`] -- Alpha rover ledger
//! - [`rows`] -- Row types and domain conversions
//! - [`error`] -- Shared error type

pub mod alpha_store;
pub mod armory_store;
pub mod catalog_store;
pub mod error;
pub mod postgres;
pub mod rows;
pub mod run_store;

pub use alpha_store::AlphaStore;
pub use armory_store::ArmoryStore;
pub use catalog_store::CatalogStore;
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use run_store::PgStore;
