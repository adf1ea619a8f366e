//! Combat stats and single-attack resolution.
//!
//! Stats are derived once from a rover's total power at battle start:
//!
//! - `max_health = base_health + round(total_power / health_divisor)`
//! - `base_attack = base_attack + round(total_power / attack_divisor)`
//! - `base_defense = base_defense + round(total_power / defense_divisor)`
//!
//! [`resolve_attack`] applies, in order: lucky-strike roll, aggressive
//! bonus, action multiplier, defense mitigation (only when the defender is
//! defending, floored at 1), variance, rounding.

use serde::Serialize;

use rovers_types::{TokenId, TraitPower};

use crate::config::CombatConfig;
use crate::math;
use crate::rarity::PowerProfile;
use crate::rng::RollSource;

/// A combatant's state for the duration of one battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatStats {
    /// Display name.
    pub name: String,
    /// Token id of the rover.
    pub identifier: TokenId,
    /// Sum of trait powers.
    pub total_power: u32,
    /// Health ceiling.
    pub max_health: u32,
    /// Remaining health, always within `0..=max_health`.
    current_health: u32,
    /// Damage before modifiers.
    pub base_attack: u32,
    /// Mitigation applied while defending.
    pub base_defense: u32,
    /// Whether the next incoming attack is mitigated.
    pub is_defending: bool,
    /// Per-trait powers the stats were derived from.
    pub traits: Vec<TraitPower>,
}

impl CombatStats {
    /// Derive battle stats from a power profile.
    pub fn derive(
        name: impl Into<String>,
        identifier: TokenId,
        profile: PowerProfile,
        config: &CombatConfig,
    ) -> Self {
        let power = f64::from(profile.total_power);
        let max_health = config
            .base_health
            .saturating_add(math::round_to_u32(power / config.health_divisor));
        Self {
            name: name.into(),
            identifier,
            total_power: profile.total_power,
            max_health,
            current_health: max_health,
            base_attack: config
                .base_attack
                .saturating_add(math::round_to_u32(power / config.attack_divisor)),
            base_defense: config
                .base_defense
                .saturating_add(math::round_to_u32(power / config.defense_divisor)),
            is_defending: false,
            traits: profile.trait_powers,
        }
    }

    /// Remaining health.
    pub const fn current_health(&self) -> u32 {
        self.current_health
    }

    /// Remaining health as a fraction of maximum.
    pub fn health_fraction(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        f64::from(self.current_health) / f64::from(self.max_health)
    }

    /// Whether health has reached zero.
    pub const fn is_knocked_out(&self) -> bool {
        self.current_health == 0
    }

    /// Subtract damage, stopping at zero.
    pub const fn take_damage(&mut self, damage: u32) {
        self.current_health = self.current_health.saturating_sub(damage);
    }

    /// Restore health, capped at maximum. Returns the amount rolled.
    pub fn heal(&mut self, amount: u32) -> u32 {
        self.current_health = self.current_health.saturating_add(amount).min(self.max_health);
        amount
    }
}

/// Result of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    /// Damage dealt after every modifier.
    pub damage: u32,
    /// Whether the lucky-strike roll hit.
    pub is_lucky_strike: bool,
}

/// Resolve a single attack.
///
/// Draws two rolls: the lucky-strike roll, then the variance roll.
pub fn resolve_attack(
    attacker: &CombatStats,
    defender: &CombatStats,
    is_aggressive: bool,
    multiplier: f64,
    luck_bonus: f64,
    config: &CombatConfig,
    rolls: &mut impl RollSource,
) -> AttackOutcome {
    let mut damage = f64::from(attacker.base_attack);

    let is_lucky_strike = rolls.roll() < config.base_lucky_chance + luck_bonus;
    if is_lucky_strike {
        damage *= config.lucky_multiplier;
    }
    if is_aggressive {
        damage *= config.aggressive_multiplier;
    }
    damage *= multiplier;

    if defender.is_defending {
        let defense = f64::from(defender.base_defense);
        let mitigation = if is_aggressive { defense } else { defense * 2.0 };
        damage = (damage - mitigation).max(1.0);
    }

    damage *= rolls.roll_between(config.variance_min, config.variance_max);

    let mut damage = math::round_to_u32(damage);
    if defender.is_defending {
        damage = damage.max(1);
    }

    AttackOutcome {
        damage,
        is_lucky_strike,
    }
}

/// Extra lucky-strike chance for the weaker side.
///
/// `min(|own - opponent| / underdog_divisor, underdog_cap)` when `own` is
/// lower, zero otherwise.
pub fn underdog_luck(own_power: u32, opponent_power: u32, config: &CombatConfig) -> f64 {
    if own_power >= opponent_power {
        return 0.0;
    }
    let difference = f64::from(opponent_power.abs_diff(own_power));
    (difference / config.underdog_divisor).min(config.underdog_cap)
}
