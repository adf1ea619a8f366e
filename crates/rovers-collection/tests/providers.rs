//! Provider composition tests: fixture data through the cache into the
//! rarity model.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use rovers_collection::{
    CachedRarityProvider, MetadataProvider, RaritySnapshot, RarityProvider, StaticProvider, parse_nft,
};
use rovers_core::{Clock, ManualClock, RarityConfig, RarityModel};
use rovers_types::{RarityLookup, TokenId};

fn fixture() -> StaticProvider {
    let mut lookup = RarityLookup::new();
    lookup.insert("Body", "Chrome", 250);
    lookup.insert("Eyes", "Laser", 50);
    lookup.insert("Biome", "Tundra", 5);

    let rover = parse_nft(&serde_json::json!({
        "nft": {
            "identifier": "42",
            "name": "Rover #42",
            "traits": [
                { "trait_type": "Body", "value": "Chrome" },
                { "trait_type": "Eyes", "value": "Laser" },
                { "trait_type": "Biome", "value": "Tundra" }
            ]
        }
    }))
    .unwrap();

    StaticProvider::new(
        RaritySnapshot {
            lookup,
            total_supply: 5000,
            cached: false,
            fetched_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        },
        [rover],
    )
}

#[tokio::test]
async fn cached_snapshot_feeds_power_calculation() {
    let clock = ManualClock::starting_at(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    let provider = fixture();
    let rover = provider.fetch_rover(&TokenId::new("42")).await.unwrap();
    let cache = CachedRarityProvider::new(provider, clock.clone(), Duration::from_secs(3600));

    let first = cache.fetch_rarity().await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.fetched_at, clock.now());

    let model = RarityModel::new(&RarityConfig::default());
    let profile = model.trait_power(&rover.traits, &first.lookup, first.total_supply);
    // Chrome: 5% -> 95, Laser: 1% -> 99, the biome trait is excluded.
    assert_eq!(profile.total_power, 194);
    assert_eq!(profile.trait_powers.len(), 2);

    clock.advance(Duration::from_secs(60));
    let second = cache.fetch_rarity().await.unwrap();
    assert!(second.cached);
    assert_eq!(second.lookup, first.lookup);
}
