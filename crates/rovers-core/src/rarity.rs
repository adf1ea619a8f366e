//! Trait rarity to power conversion.
//!
//! A trait's rarity is the share of the collection carrying it, in percent
//! rounded to one decimal. Its power is the inverse, `round(max(0, 100 -
//! rarity))`. Two rover-level aggregates are derived from trait powers and
//! they are not interchangeable:
//!
//! - **total power**: the sum, used to derive combat stats.
//! - **rarity score**: the rounded average (0-100), used to scale
//!   expedition success and loot.
//!
//! Traits absent from the lookup get the configured fallback rarity. That is
//! a degraded-mode default, never an error.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use rovers_types::{RarityLookup, RoverTrait, TraitPower};

use crate::config::RarityConfig;
use crate::math;

/// Per-trait powers and their sum for one rover.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerProfile {
    /// Sum of every counted trait's power.
    pub total_power: u32,
    /// One entry per counted trait, in input order.
    pub trait_powers: Vec<TraitPower>,
}

impl PowerProfile {
    /// The highest-power trait, first one wins on ties.
    pub fn dominant_trait(&self) -> Option<&TraitPower> {
        dominant_trait(&self.trait_powers)
    }
}

/// Converts trait lists into power using a rarity lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RarityModel {
    fallback_rarity: f64,
    /// Lowercased trait types that carry no power.
    excluded: BTreeSet<String>,
}

impl RarityModel {
    /// Build a model from the rarity section of the game config.
    pub fn new(config: &RarityConfig) -> Self {
        Self {
            fallback_rarity: config.fallback_rarity,
            excluded: config
                .excluded_trait_types
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// A model that counts every trait type.
    pub fn without_exclusions(fallback_rarity: f64) -> Self {
        Self {
            fallback_rarity,
            excluded: BTreeSet::new(),
        }
    }

    /// Rarity substituted for traits missing from the lookup.
    pub const fn fallback_rarity(&self) -> f64 {
        self.fallback_rarity
    }

    /// Whether this trait type is cosmetic and carries no power.
    pub fn is_excluded(&self, trait_type: &str) -> bool {
        self.excluded.contains(&trait_type.to_lowercase())
    }

    /// Rarity percentage of a single trait.
    ///
    /// Uses the fallback rarity when the pair is missing from the lookup or
    /// the supply is zero.
    pub fn trait_rarity(&self, attribute: &RoverTrait, lookup: &RarityLookup, total_supply: u32) -> f64 {
        match lookup.count(&attribute.trait_type, &attribute.value) {
            Some(count) if total_supply > 0 => {
                math::round_one_decimal(f64::from(count) / f64::from(total_supply) * 100.0)
            }
            _ => {
                warn!(
                    trait_type = %attribute.trait_type,
                    value = %attribute.value,
                    fallback = self.fallback_rarity,
                    "Trait missing from rarity lookup, using fallback"
                );
                self.fallback_rarity
            }
        }
    }

    /// Compute per-trait power and the total for a rover's traits.
    ///
    /// Excluded trait types are skipped. An empty list yields zero power.
    pub fn trait_power(
        &self,
        traits: &[RoverTrait],
        lookup: &RarityLookup,
        total_supply: u32,
    ) -> PowerProfile {
        let trait_powers: Vec<TraitPower> = traits
            .iter()
            .filter(|t| !self.is_excluded(&t.trait_type))
            .map(|t| {
                let rarity = self.trait_rarity(t, lookup, total_supply);
                TraitPower {
                    attribute: t.clone(),
                    rarity,
                    power: power_from_rarity(rarity),
                }
            })
            .collect();

        let total_power = trait_powers
            .iter()
            .fold(0_u32, |acc, tp| acc.saturating_add(tp.power));

        PowerProfile {
            total_power,
            trait_powers,
        }
    }

    /// Average trait power rounded to an integer in 0-100.
    ///
    /// Zero when no traits are counted.
    pub fn rarity_score(&self, traits: &[RoverTrait], lookup: &RarityLookup, total_supply: u32) -> u32 {
        let profile = self.trait_power(traits, lookup, total_supply);
        if profile.trait_powers.is_empty() {
            return 0;
        }
        let count = math::usize_to_f64(profile.trait_powers.len());
        math::round_to_u32(f64::from(profile.total_power) / count)
    }
}

/// `round(max(0, 100 - rarity))`.
pub fn power_from_rarity(rarity: f64) -> u32 {
    math::round_to_u32((100.0 - rarity).max(0.0))
}

/// The first trait holding the maximum power.
pub fn dominant_trait(trait_powers: &[TraitPower]) -> Option<&TraitPower> {
    let mut best: Option<&TraitPower> = None;
    for tp in trait_powers {
        match best {
            Some(current) if tp.power <= current.power => {}
            _ => best = Some(tp),
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// One trait value in the collection-wide ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    /// Trait category.
    pub trait_type: String,
    /// Trait value.
    pub value: String,
    /// Number of rovers carrying this value.
    pub count: u32,
    /// Rarity percentage, one decimal.
    pub rarity: f64,
    /// Power derived from the rarity.
    pub power: u32,
}

/// Flatten a lookup into rows sorted by power, strongest first.
///
/// Ties keep lookup order. With `trait_type` set, only that category is
/// listed (case-insensitive).
pub fn trait_leaderboard(
    lookup: &RarityLookup,
    total_supply: u32,
    trait_type: Option<&str>,
) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = lookup
        .iter()
        .filter(|(tt, _, _)| trait_type.is_none_or(|want| tt.eq_ignore_ascii_case(want)))
        .map(|(tt, value, count)| {
            let rarity = if total_supply == 0 {
                0.0
            } else {
                math::round_one_decimal(f64::from(count) / f64::from(total_supply) * 100.0)
            };
            LeaderboardRow {
                trait_type: tt.to_owned(),
                value: value.to_owned(),
                count,
                rarity,
                power: power_from_rarity(rarity),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.power.cmp(&a.power));
    rows
}

/// Sorted list of trait categories present in the lookup.
pub fn trait_types(lookup: &RarityLookup) -> Vec<String> {
    let types: BTreeSet<&str> = lookup.iter().map(|(tt, _, _)| tt).collect();
    types.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn lookup() -> RarityLookup {
        let mut lookup = RarityLookup::default();
        lookup.insert("Body", "Chrome", 250);
        lookup.insert("Body", "Rust", 2500);
        lookup.insert("Eyes", "Laser", 50);
        lookup.insert("Biome", "Desert", 1000);
        lookup
    }

    fn model() -> RarityModel {
        RarityModel::new(&RarityConfig::default())
    }

    #[test]
    fn count_250_of_5000_is_rarity_5_power_95() {
        let profile = model().trait_power(&[RoverTrait::new("Body", "Chrome")], &lookup(), 5000);
        assert_eq!(profile.trait_powers.len(), 1);
        assert_eq!(profile.trait_powers[0].rarity, 5.0);
        assert_eq!(profile.trait_powers[0].power, 95);
        assert_eq!(profile.total_power, 95);
    }

    #[test]
    fn empty_traits_yield_zero() {
        let profile = model().trait_power(&[], &lookup(), 5000);
        assert_eq!(profile.total_power, 0);
        assert!(profile.trait_powers.is_empty());
        assert_eq!(model().rarity_score(&[], &lookup(), 5000), 0);
    }

    #[test]
    fn missing_trait_uses_fallback() {
        let profile = model().trait_power(&[RoverTrait::new("Hat", "Crown")], &lookup(), 5000);
        assert_eq!(profile.trait_powers[0].rarity, 50.0);
        assert_eq!(profile.total_power, 50);

        let low = RarityModel::without_exclusions(15.0);
        let profile = low.trait_power(&[RoverTrait::new("Hat", "Crown")], &lookup(), 5000);
        assert_eq!(profile.total_power, 85);
    }

    #[test]
    fn zero_supply_uses_fallback() {
        let profile = model().trait_power(&[RoverTrait::new("Body", "Chrome")], &lookup(), 0);
        assert_eq!(profile.trait_powers[0].rarity, 50.0);
    }

    #[test]
    fn excluded_types_are_case_insensitive() {
        let traits = [
            RoverTrait::new("biome", "Desert"),
            RoverTrait::new("HONORARY", "Yes"),
            RoverTrait::new("Eyes", "Laser"),
        ];
        let profile = model().trait_power(&traits, &lookup(), 5000);
        assert_eq!(profile.trait_powers.len(), 1);
        assert_eq!(profile.total_power, 99);

        let all = RarityModel::without_exclusions(50.0).trait_power(&traits, &lookup(), 5000);
        assert_eq!(all.trait_powers.len(), 3);
    }

    #[test]
    fn power_is_monotone_in_count() {
        let m = RarityModel::without_exclusions(50.0);
        let mut lookup = RarityLookup::default();
        let mut previous = u32::MAX;
        for count in (0..=6000).step_by(37) {
            lookup.insert("T", "v", count);
            let p = m.trait_power(&[RoverTrait::new("T", "v")], &lookup, 5000).total_power;
            assert!(p <= previous, "count {count} gave {p} > {previous}");
            previous = p;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn rarity_score_is_rounded_average() {
        let traits = [RoverTrait::new("Body", "Chrome"), RoverTrait::new("Body", "Rust")];
        // 95 + 50 = 145, average 72.5 rounds to 73
        let m = model();
        assert_eq!(m.trait_power(&traits, &lookup(), 5000).total_power, 145);
        assert_eq!(m.rarity_score(&traits, &lookup(), 5000), 73);
    }

    #[test]
    fn dominant_trait_first_max_wins() {
        let tp = |v: &str, power| TraitPower {
            attribute: RoverTrait::new("T", v),
            rarity: 0.0,
            power,
        };
        let powers = [tp("a", 40), tp("b", 90), tp("c", 90), tp("d", 10)];
        assert_eq!(dominant_trait(&powers).unwrap().attribute.value, "b");
        assert!(dominant_trait(&[]).is_none());
    }

    #[test]
    fn leaderboard_sorted_by_power() {
        let rows = trait_leaderboard(&lookup(), 5000, None);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].value, "Laser");
        assert_eq!(rows[0].rarity, 1.0);
        assert_eq!(rows[0].power, 99);
        assert!(rows.windows(2).all(|w| w[0].power >= w[1].power));

        let body = trait_leaderboard(&lookup(), 5000, Some("body"));
        assert_eq!(body.len(), 2);
        assert_eq!(body[1].value, "Rust");
        assert_eq!(body[1].power, 50);
    }

    #[test]
    fn trait_types_are_sorted() {
        assert_eq!(trait_types(&lookup()), vec!["Biome", "Body", "Eyes"]);
    }
}
