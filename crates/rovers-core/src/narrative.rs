//! Flavor text for battle and expedition logs.
//!
//! Lines are picked through the injected roll source so a seeded battle
//! replays the same log text.

use crate::rng::RollSource;

/// Battle description pools, keyed by what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleFlavor {
    /// An aggressive attack.
    Aggressive,
    /// Taking a defensive stance.
    Defensive,
    /// A critical strike.
    CriticalStrike,
    /// Emergency repair.
    Heal,
    /// Charging a power surge.
    PowerSurge,
    /// Shield bash counter.
    ShieldBash,
    /// The target took the hit unprotected.
    DamageTaken,
    /// The target was defending.
    DamageReduced,
}

impl BattleFlavor {
    /// Candidate phrases for this flavor.
    pub const fn lines(self) -> &'static [&'static str] {
        match self {
            Self::Aggressive => &[
                "charges forward with relentless fury",
                "unleashes a devastating assault",
                "strikes with overwhelming force",
                "launches an all-out offensive",
            ],
            Self::Defensive => &[
                "raises shields and braces for impact",
                "activates defensive protocols",
                "hunkers down behind reinforced plating",
                "engages evasive maneuvers",
            ],
            Self::CriticalStrike => &[
                "targets a critical weak point",
                "executes a precision strike",
                "delivers a devastating blow to vital systems",
            ],
            Self::Heal => &[
                "activates emergency repair protocols",
                "initiates self-repair sequence",
                "deploys nanobots for rapid healing",
            ],
            Self::PowerSurge => &[
                "overcharges power cores",
                "channels excess energy",
                "activates overdrive mode",
            ],
            Self::ShieldBash => &[
                "combines defense with a counter-strike",
                "deflects and retaliates simultaneously",
                "uses shield as a battering weapon",
            ],
            Self::DamageTaken => &[
                "takes a heavy hit",
                "absorbs significant damage",
                "staggers from the impact",
                "systems rattle from the blow",
            ],
            Self::DamageReduced => &[
                "absorbs most of the impact",
                "deflects the brunt of the attack",
                "shrugs off the damage",
            ],
        }
    }

    /// Pick one phrase.
    pub fn pick(self, rolls: &mut impl RollSource) -> &'static str {
        pick_line(self.lines(), rolls)
    }
}

/// Expedition narrative pools. `{rover}` is replaced with the rover name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpeditionFlavor {
    /// An uneventful step.
    Exploring,
    /// A hazard on a non-final step.
    Danger,
    /// The run succeeded.
    Success,
    /// The run failed.
    Failure,
}

impl ExpeditionFlavor {
    /// Candidate templates for this flavor.
    pub const fn lines(self) -> &'static [&'static str] {
        match self {
            Self::Exploring => &[
                "{rover} scans the horizon with enhanced sensors...",
                "{rover} navigates through the debris field...",
                "{rover} detects unusual energy signatures ahead...",
                "{rover} proceeds cautiously into unknown territory...",
            ],
            Self::Danger => &[
                "WARNING: Hostile activity detected!",
                "ALERT: Environmental hazards ahead!",
                "DANGER: Unstable ground detected!",
                "CAUTION: Radiation levels rising!",
            ],
            Self::Success => &[
                "{rover} found something valuable!",
                "{rover} discovered a hidden cache!",
                "{rover} successfully navigated the obstacle!",
                "{rover} secured the objective!",
            ],
            Self::Failure => &[
                "{rover} was forced to retreat...",
                "{rover} encountered overwhelming odds...",
                "{rover} lost track in the chaos...",
                "{rover} barely escaped intact...",
            ],
        }
    }

    /// Pick one line and substitute the rover name.
    pub fn render(self, rover_name: &str, rolls: &mut impl RollSource) -> String {
        pick_line(self.lines(), rolls).replace("{rover}", rover_name)
    }
}

fn pick_line(lines: &'static [&'static str], rolls: &mut impl RollSource) -> &'static str {
    rolls
        .pick_index(lines.len())
        .and_then(|i| lines.get(i).copied())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;

    #[test]
    fn every_pool_is_non_empty() {
        for flavor in [
            BattleFlavor::Aggressive,
            BattleFlavor::Defensive,
            BattleFlavor::CriticalStrike,
            BattleFlavor::Heal,
            BattleFlavor::PowerSurge,
            BattleFlavor::ShieldBash,
            BattleFlavor::DamageTaken,
            BattleFlavor::DamageReduced,
        ] {
            assert!(!flavor.lines().is_empty());
        }
    }

    #[test]
    fn pick_follows_roll() {
        let mut rolls = ScriptedRolls::new([0.0, 0.99]);
        assert_eq!(BattleFlavor::Heal.pick(&mut rolls), "activates emergency repair protocols");
        assert_eq!(BattleFlavor::Heal.pick(&mut rolls), "deploys nanobots for rapid healing");
    }

    #[test]
    fn rover_name_is_substituted() {
        let mut rolls = ScriptedRolls::new([0.0]);
        assert_eq!(
            ExpeditionFlavor::Success.render("Rover #7", &mut rolls),
            "Rover #7 found something valuable!"
        );
        let mut rolls = ScriptedRolls::new([0.3]);
        assert_eq!(
            ExpeditionFlavor::Danger.render("Rover #7", &mut rolls),
            "ALERT: Environmental hazards ahead!"
        );
    }
}
