//! Collection providers for the Rovers arena.
//!
//! Supplies the two external inputs the game logic needs: collection-wide
//! trait counts (for rarity and power) and per-rover metadata. Both are
//! traits so the marketplace client, the one-hour cache around it, and the
//! fixture provider used offline are interchangeable.
//!
//! # Modules
//!
//! - [`provider`] -- Provider traits, rarity snapshot, fixture provider
//! - [`cache`] -- TTL cache around any rarity provider
//! - [`opensea`] -- HTTP client and response parsing
//! - [`config`] -- `COLLECTION_*` environment configuration
//! - [`error`] -- Provider error type

pub mod cache;
pub mod config;
pub mod error;
pub mod opensea;
pub mod provider;

pub use cache::CachedRarityProvider;
pub use config::CollectionConfig;
pub use error::ProviderError;
pub use opensea::{OpenSeaClient, parse_collection_traits, parse_nft};
pub use provider::{MetadataProvider, RaritySnapshot, RarityProvider, StaticProvider};
