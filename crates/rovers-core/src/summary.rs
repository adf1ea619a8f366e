//! One-shot battle summary.
//!
//! Each rover's total power gets an independent luck term in
//! `[0, SUMMARY_LUCK_RANGE)`; the higher score wins, so the weaker rover can
//! still take it. Ties go to the second rover. Narrative text is left to
//! the narrator collaborator, which receives this summary as context.

use serde::Serialize;
use tracing::info;

use rovers_types::{RarityLookup, Rover, TokenId, TraitPower};

use crate::rarity::RarityModel;
use crate::rng::RollSource;

/// Upper bound of the additive luck term.
pub const SUMMARY_LUCK_RANGE: f64 = 50.0;

/// Which rover won the one-shot battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryWinner {
    /// The first rover.
    Rover1,
    /// The second rover.
    Rover2,
}

/// One rover's side of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoverSummary {
    /// Token id.
    pub identifier: TokenId,
    /// Display name.
    pub name: String,
    /// Sum of counted trait powers.
    pub total_power: u32,
    /// Counted traits with their rarity and power.
    pub trait_powers: Vec<TraitPower>,
    /// Highest-power trait, first one on ties.
    pub dominant_trait: Option<TraitPower>,
    /// Total power plus the luck term.
    pub battle_score: f64,
}

impl RoverSummary {
    /// Counted traits other than the dominant one.
    pub fn supporting_traits(&self) -> impl Iterator<Item = &TraitPower> {
        let dominant = self.dominant_trait.as_ref();
        self.trait_powers
            .iter()
            .filter(move |tp| dominant.is_none_or(|d| d.attribute != tp.attribute))
    }
}

/// Outcome of a one-shot battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleSummary {
    /// First rover's stats.
    pub rover1: RoverSummary,
    /// Second rover's stats.
    pub rover2: RoverSummary,
    /// Which side won.
    pub winner: SummaryWinner,
    /// Token id of the winner.
    pub winner_id: TokenId,
}

impl BattleSummary {
    /// The winning rover's summary.
    pub const fn winning(&self) -> &RoverSummary {
        match self.winner {
            SummaryWinner::Rover1 => &self.rover1,
            SummaryWinner::Rover2 => &self.rover2,
        }
    }

    /// The losing rover's summary.
    pub const fn losing(&self) -> &RoverSummary {
        match self.winner {
            SummaryWinner::Rover1 => &self.rover2,
            SummaryWinner::Rover2 => &self.rover1,
        }
    }
}

/// Resolve a one-shot battle between two rovers.
///
/// Draws two rolls, first rover's luck then the second's.
pub fn summarize_battle(
    rover1: &Rover,
    rover2: &Rover,
    lookup: &RarityLookup,
    total_supply: u32,
    model: &RarityModel,
    rolls: &mut impl RollSource,
) -> BattleSummary {
    let mut side = |rover: &Rover| {
        let profile = model.trait_power(&rover.traits, lookup, total_supply);
        let dominant_trait = profile.dominant_trait().cloned();
        let battle_score = f64::from(profile.total_power) + rolls.roll() * SUMMARY_LUCK_RANGE;
        RoverSummary {
            identifier: rover.identifier.clone(),
            name: rover.name.clone(),
            total_power: profile.total_power,
            trait_powers: profile.trait_powers,
            dominant_trait,
            battle_score,
        }
    };
    let rover1 = side(rover1);
    let rover2 = side(rover2);

    let (winner, winner_id) = if rover1.battle_score > rover2.battle_score {
        (SummaryWinner::Rover1, rover1.identifier.clone())
    } else {
        (SummaryWinner::Rover2, rover2.identifier.clone())
    };

    info!(
        rover1 = %rover1.name,
        rover1_power = rover1.total_power,
        rover2 = %rover2.name,
        rover2_power = rover2.total_power,
        winner = %winner_id,
        "One-shot battle resolved"
    );

    BattleSummary {
        rover1,
        rover2,
        winner,
        winner_id,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rovers_types::RoverTrait;

    use super::*;
    use crate::config::RarityConfig;
    use crate::rng::ScriptedRolls;

    fn rover(id: &str, traits: &[(&str, &str)]) -> Rover {
        Rover {
            identifier: TokenId::new(id),
            name: format!("Rover #{id}"),
            image_url: None,
            traits: traits.iter().map(|(t, v)| RoverTrait::new(*t, *v)).collect(),
        }
    }

    fn lookup() -> RarityLookup {
        let mut lookup = RarityLookup::new();
        lookup.insert("Body", "Gold", 50);
        lookup.insert("Body", "Steel", 2000);
        lookup.insert("Eyes", "Visor", 500);
        lookup.insert("Biome", "Ice", 10);
        lookup
    }

    fn model() -> RarityModel {
        RarityModel::new(&RarityConfig::default())
    }

    #[test]
    fn stronger_rover_wins_with_equal_luck() {
        let strong = rover("1", &[("Body", "Gold"), ("Eyes", "Visor")]);
        let weak = rover("2", &[("Body", "Steel")]);
        let mut rolls = ScriptedRolls::new([0.5, 0.5]);
        let summary = summarize_battle(&strong, &weak, &lookup(), 5000, &model(), &mut rolls);
        assert_eq!(summary.rover1.total_power, 99 + 90);
        assert_eq!(summary.rover2.total_power, 60);
        assert_eq!(summary.winner, SummaryWinner::Rover1);
        assert_eq!(summary.winner_id, TokenId::new("1"));
        assert_eq!(summary.losing().name, "Rover #2");
    }

    #[test]
    fn luck_can_flip_the_result() {
        // 99 + 0 against 90 + 49.5
        let a = rover("1", &[("Body", "Gold")]);
        let b = rover("2", &[("Eyes", "Visor")]);
        let mut rolls = ScriptedRolls::new([0.0, 0.99]);
        let summary = summarize_battle(&a, &b, &lookup(), 5000, &model(), &mut rolls);
        assert_eq!(summary.winner, SummaryWinner::Rover2);
    }

    #[test]
    fn tie_goes_to_second_rover() {
        let a = rover("1", &[("Body", "Gold")]);
        let b = rover("2", &[("Body", "Gold")]);
        let mut rolls = ScriptedRolls::new([0.3, 0.3]);
        let summary = summarize_battle(&a, &b, &lookup(), 5000, &model(), &mut rolls);
        assert_eq!(summary.winner, SummaryWinner::Rover2);
        assert_eq!(summary.winning().identifier, TokenId::new("2"));
    }

    #[test]
    fn excluded_traits_are_ignored_for_dominance() {
        // Biome/Ice would be power 100 but is cosmetic
        let a = rover("1", &[("Biome", "Ice"), ("Eyes", "Visor"), ("Body", "Steel")]);
        let b = rover("2", &[]);
        let mut rolls = ScriptedRolls::new([0.0, 0.0]);
        let summary = summarize_battle(&a, &b, &lookup(), 5000, &model(), &mut rolls);
        let dominant = summary.rover1.dominant_trait.as_ref().unwrap();
        assert_eq!(dominant.attribute.value, "Visor");
        assert_eq!(summary.rover1.supporting_traits().count(), 1);
        assert!(summary.rover2.dominant_trait.is_none());
        assert_eq!(summary.rover2.total_power, 0);
    }
}
