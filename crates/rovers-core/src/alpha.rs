//! Ledger of discovered alpha rovers.
//!
//! A rover carrying at least `alpha_trait_threshold` traits is an alpha.
//! The ledger keeps each one once, newest discovery last.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use rovers_types::{Rover, TokenId};

/// One discovered alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphaEntry {
    /// Token id.
    pub identifier: TokenId,
    /// Display name.
    pub name: String,
    /// Image or video URL.
    pub image_url: Option<String>,
    /// Number of traits at discovery.
    pub trait_count: usize,
    /// When it was recorded.
    pub discovered_at: DateTime<Utc>,
}

/// Deduplicated alpha rovers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlphaLedger {
    threshold: usize,
    entries: Vec<AlphaEntry>,
}

impl AlphaLedger {
    /// An empty ledger using `threshold` traits as the cut-off.
    pub const fn new(threshold: usize) -> Self {
        Self {
            threshold,
            entries: Vec::new(),
        }
    }

    /// Rebuild a ledger from persisted entries, dropping duplicate ids.
    pub fn restore(threshold: usize, entries: impl IntoIterator<Item = AlphaEntry>) -> Self {
        let mut ledger = Self::new(threshold);
        for entry in entries {
            if !ledger.contains(&entry.identifier) {
                ledger.entries.push(entry);
            }
        }
        ledger
    }

    /// Whether a rover qualifies.
    pub fn is_alpha(&self, rover: &Rover) -> bool {
        rover.traits.len() >= self.threshold
    }

    /// Record a rover if it qualifies and is not already listed.
    ///
    /// Returns whether it was added.
    pub fn record(&mut self, rover: &Rover, now: DateTime<Utc>) -> bool {
        if !self.is_alpha(rover) || self.contains(&rover.identifier) {
            return false;
        }
        info!(
            rover = %rover.identifier,
            name = %rover.name,
            traits = rover.traits.len(),
            "Alpha rover discovered"
        );
        self.entries.push(AlphaEntry {
            identifier: rover.identifier.clone(),
            name: rover.name.clone(),
            image_url: rover.image_url.clone(),
            trait_count: rover.traits.len(),
            discovered_at: now,
        });
        true
    }

    /// Record every qualifying rover in a batch. Returns how many were new.
    pub fn scan<'a>(&mut self, rovers: impl IntoIterator<Item = &'a Rover>, now: DateTime<Utc>) -> usize {
        rovers.into_iter().filter(|r| self.record(r, now)).count()
    }

    /// Whether a rover is listed.
    pub fn contains(&self, identifier: &TokenId) -> bool {
        self.entries.iter().any(|e| &e.identifier == identifier)
    }

    /// Drop one rover. Returns whether it was listed.
    pub fn remove(&mut self, identifier: &TokenId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.identifier != identifier);
        self.entries.len() != before
    }

    /// Forget every rover.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Listed rovers, oldest first.
    pub fn entries(&self) -> &[AlphaEntry] {
        &self.entries
    }
}
