//! Battle actions and trait abilities.

use serde::{Deserialize, Serialize};

/// A trait ability usable in place of a plain attack or defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    /// Aggressive attack at x1.5.
    CriticalStrike,
    /// Restore `heal_base + round(roll * heal_spread)` health.
    Heal,
    /// Arm a surge consumed by the next aggressive attack.
    PowerSurge,
    /// Defend and counter with a non-aggressive attack at x0.7.
    ShieldBash,
}

impl Ability {
    /// Every ability, in menu order.
    pub const ALL: [Self; 4] = [
        Self::CriticalStrike,
        Self::Heal,
        Self::PowerSurge,
        Self::ShieldBash,
    ];

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CriticalStrike => "critical_strike",
            Self::Heal => "heal",
            Self::PowerSurge => "power_surge",
            Self::ShieldBash => "shield_bash",
        }
    }

    /// Log label shown for this ability.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CriticalStrike => "CRITICAL STRIKE",
            Self::Heal => "EMERGENCY REPAIR",
            Self::PowerSurge => "POWER SURGE",
            Self::ShieldBash => "SHIELD BASH",
        }
    }

    /// Parse a wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// One action for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "ability")]
pub enum BattleAction {
    /// Aggressive attack, boosted by a pending power surge.
    Aggressive,
    /// Defend against the opponent's next attack.
    Defensive,
    /// Use a trait ability. `None` resolves as a plain attack.
    Trait(Option<Ability>),
}

impl BattleAction {
    /// Build an action from request names.
    ///
    /// `"trait"` with a missing or unknown ability becomes `Trait(None)`,
    /// and any unknown action name does too.
    pub fn from_names(action: &str, ability: Option<&str>) -> Self {
        match action.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Self::Aggressive,
            "defensive" => Self::Defensive,
            "trait" => Self::Trait(ability.and_then(Ability::parse)),
            _ => Self::Trait(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_names_round_trip() {
        for ability in Ability::ALL {
            assert_eq!(Ability::parse(ability.as_str()), Some(ability));
        }
        assert_eq!(Ability::parse("SHIELD_BASH"), Some(Ability::ShieldBash));
        assert_eq!(Ability::parse("teleport"), None);
    }

    #[test]
    fn unknown_names_fall_back_to_plain_trait() {
        assert_eq!(BattleAction::from_names("aggressive", None), BattleAction::Aggressive);
        assert_eq!(
            BattleAction::from_names("trait", Some("heal")),
            BattleAction::Trait(Some(Ability::Heal))
        );
        assert_eq!(BattleAction::from_names("trait", Some("warp")), BattleAction::Trait(None));
        assert_eq!(BattleAction::from_names("trait", None), BattleAction::Trait(None));
        assert_eq!(BattleAction::from_names("dance", None), BattleAction::Trait(None));
    }
}
