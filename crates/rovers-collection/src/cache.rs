//! Time-bounded cache around a [`RarityProvider`].
//!
//! Trait counts change slowly and the marketplace API is rate limited, so
//! a snapshot is reused until it is older than the configured TTL. When a
//! refresh fails and an older snapshot exists, the stale snapshot is
//! served instead of failing the caller.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use rovers_core::Clock;

use crate::error::ProviderError;
use crate::provider::{RaritySnapshot, RarityProvider};

/// A [`RarityProvider`] that remembers its last answer for `ttl`.
#[derive(Debug)]
pub struct CachedRarityProvider<P, C> {
    inner: P,
    clock: C,
    ttl: Duration,
    entry: Mutex<Option<RaritySnapshot>>,
}

impl<P: RarityProvider, C: Clock> CachedRarityProvider<P, C> {
    /// Wrap `inner`, measuring age with `clock`.
    pub fn new(inner: P, clock: C, ttl: Duration) -> Self {
        Self {
            inner,
            clock,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// The wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop the cached snapshot so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }

    fn is_fresh(&self, snapshot: &RaritySnapshot) -> bool {
        let age = self.clock.now().signed_duration_since(snapshot.fetched_at);
        age.to_std().is_ok_and(|age| age < self.ttl)
    }
}

impl<P: RarityProvider, C: Clock> RarityProvider for CachedRarityProvider<P, C> {
    async fn fetch_rarity(&self) -> Result<RaritySnapshot, ProviderError> {
        let mut entry = self.entry.lock().await;

        if let Some(snapshot) = entry.as_ref().filter(|s| self.is_fresh(s)) {
            return Ok(RaritySnapshot {
                cached: true,
                ..snapshot.clone()
            });
        }

        match self.inner.fetch_rarity().await {
            Ok(mut fresh) => {
                fresh.cached = false;
                fresh.fetched_at = self.clock.now();
                info!(
                    trait_types = fresh.lookup.trait_type_count(),
                    total_supply = fresh.total_supply,
                    "rarity cache refreshed"
                );
                *entry = Some(fresh.clone());
                Ok(fresh)
            }
            Err(error) => match entry.as_ref() {
                Some(stale) => {
                    warn!(%error, fetched_at = %stale.fetched_at, "rarity refresh failed, serving stale snapshot");
                    Ok(RaritySnapshot {
                        cached: true,
                        ..stale.clone()
                    })
                }
                None => Err(error),
            },
        }
    }
}
