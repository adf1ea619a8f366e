//! Local JSON data used when running offline.
//!
//! A fixtures directory holds four files:
//!
//! - `rarity.json`: a rarity snapshot (`traits` and `totalSupply`)
//! - `rovers.json`: rover metadata
//! - `items.json`: the item catalog
//! - `expeditions.json`: expedition definitions

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use rovers_collection::RaritySnapshot;
use rovers_types::{Expedition, Item, Rover};

/// Everything loaded from a fixtures directory.
#[derive(Debug, Clone)]
pub struct Fixtures {
    /// Collection trait counts.
    pub snapshot: RaritySnapshot,
    /// Known rovers.
    pub rovers: Vec<Rover>,
    /// Item catalog.
    pub items: Vec<Item>,
    /// Available expeditions.
    pub expeditions: Vec<Expedition>,
}

impl Fixtures {
    /// Read all four files from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            snapshot: read(dir, "rarity.json")?,
            rovers: read(dir, "rovers.json")?,
            items: read(dir, "items.json")?,
            expeditions: read(dir, "expeditions.json")?,
        })
    }

    /// Find an expedition by id or by case-insensitive name.
    pub fn expedition(&self, key: &str) -> Option<&Expedition> {
        self.expeditions
            .iter()
            .find(|e| e.id.to_string() == key || e.name.eq_ignore_ascii_case(key))
    }
}

fn read<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid fixture {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use rovers_core::{RarityConfig, RarityModel};

    use super::*;

    fn shipped() -> Fixtures {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        Fixtures::load(&dir).unwrap()
    }

    #[test]
    fn shipped_fixtures_parse() {
        let fixtures = shipped();
        assert_eq!(fixtures.snapshot.total_supply, 5000);
        assert_eq!(fixtures.rovers.len(), 4);
        assert_eq!(fixtures.items.len(), 6);
        assert_eq!(fixtures.expeditions.len(), 3);
    }

    #[test]
    fn expedition_pools_reference_known_items() {
        let fixtures = shipped();
        for expedition in &fixtures.expeditions {
            for id in &expedition.reward_item_pool {
                assert!(fixtures.items.iter().any(|i| i.id == *id), "{} lists {id}", expedition.name);
            }
        }
    }

    #[test]
    fn expedition_lookup_by_name_or_id() {
        let fixtures = shipped();
        let by_name = fixtures.expedition("debris field").unwrap();
        let by_id = fixtures.expedition(&by_name.id.to_string()).unwrap();
        assert_eq!(by_name, by_id);
        assert!(fixtures.expedition("Nowhere").is_none());
    }

    #[test]
    fn every_fixture_trait_is_counted() {
        let fixtures = shipped();
        let lookup = &fixtures.snapshot.lookup;
        for rover in &fixtures.rovers {
            for t in &rover.traits {
                assert!(
                    lookup.count(&t.trait_type, &t.value).is_some(),
                    "{} {}: {}",
                    rover.name,
                    t.trait_type,
                    t.value
                );
            }
        }
        let model = RarityModel::new(&RarityConfig::default());
        let chrome = fixtures.rovers.first().unwrap();
        // Chrome 5.0% -> 95, Laser 1.0% -> 99, Legs 10.0% -> 90, Nebula 6.8% -> 93
        let profile = model.trait_power(&chrome.traits, lookup, fixtures.snapshot.total_supply);
        assert_eq!(profile.total_power, 377);
        assert_eq!(profile.trait_powers.len(), 4);
    }
}
