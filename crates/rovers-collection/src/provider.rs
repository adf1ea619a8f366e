//! Provider interfaces for trait rarity and rover metadata.
//!
//! The game logic never talks to the network itself. It receives a
//! [`RaritySnapshot`] and [`Rover`] records from these providers, which
//! may be the marketplace client, a cache around it, or fixtures.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rovers_types::{RarityLookup, Rover, TokenId};

use crate::error::ProviderError;

/// Collection-wide trait counts at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaritySnapshot {
    /// `trait_type -> value -> count`.
    #[serde(rename = "traits")]
    pub lookup: RarityLookup,
    /// Number of rovers in the collection.
    #[serde(rename = "totalSupply")]
    pub total_supply: u32,
    /// Whether this snapshot was served from a cache.
    #[serde(default)]
    pub cached: bool,
    /// When the counts were fetched from the source.
    #[serde(default = "Utc::now", skip_serializing)]
    pub fetched_at: DateTime<Utc>,
}

/// Source of collection trait counts.
pub trait RarityProvider: Send + Sync {
    /// Fetch the current trait counts.
    fn fetch_rarity(&self) -> impl Future<Output = Result<RaritySnapshot, ProviderError>> + Send;
}

/// Source of per-rover metadata.
pub trait MetadataProvider: Send + Sync {
    /// Fetch one rover by token id.
    fn fetch_rover(&self, token: &TokenId) -> impl Future<Output = Result<Rover, ProviderError>> + Send;
}

/// Fixed data serving both provider roles, for offline runs and tests.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    snapshot: RaritySnapshot,
    rovers: BTreeMap<TokenId, Rover>,
}

impl StaticProvider {
    /// Serve `snapshot` and the given rovers.
    pub fn new(snapshot: RaritySnapshot, rovers: impl IntoIterator<Item = Rover>) -> Self {
        Self {
            snapshot,
            rovers: rovers
                .into_iter()
                .map(|rover| (rover.identifier.clone(), rover))
                .collect(),
        }
    }

    /// Rovers known to this provider, by token id.
    pub fn rovers(&self) -> impl Iterator<Item = &Rover> {
        self.rovers.values()
    }
}

impl RarityProvider for StaticProvider {
    async fn fetch_rarity(&self) -> Result<RaritySnapshot, ProviderError> {
        Ok(self.snapshot.clone())
    }
}

impl MetadataProvider for StaticProvider {
    async fn fetch_rover(&self, token: &TokenId) -> Result<Rover, ProviderError> {
        self.rovers
            .get(token)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                token: token.to_string(),
            })
    }
}
