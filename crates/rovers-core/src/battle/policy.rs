//! Enemy decision policy and autopilot controllers.
//!
//! The enemy checks its branches in a fixed order with early exit. Each
//! branch draws its own roll, and only when its health precondition holds,
//! so the branch probabilities are not slices of one roll.

use std::collections::VecDeque;

use super::action::{Ability, BattleAction};
use super::Battle;
use crate::rng::RollSource;

/// Below this health fraction the enemy considers healing.
pub const HEAL_HEALTH_THRESHOLD: f64 = 0.3;
/// Chance to heal once below [`HEAL_HEALTH_THRESHOLD`].
pub const HEAL_CHANCE: f64 = 0.6;
/// Below this health fraction the enemy considers defending.
pub const DEFEND_HEALTH_THRESHOLD: f64 = 0.5;
/// Chance to defend once below [`DEFEND_HEALTH_THRESHOLD`].
pub const LOW_HEALTH_DEFEND_CHANCE: f64 = 0.3;
/// Chance to use a special ability.
pub const SPECIAL_CHANCE: f64 = 0.15;
/// Chance to defend at any health.
pub const DEFEND_CHANCE: f64 = 0.35;

/// Abilities the enemy picks from on a special turn.
const SPECIALS: [Ability; 3] = [Ability::CriticalStrike, Ability::PowerSurge, Ability::ShieldBash];

/// Choose the enemy's action from its health fraction.
pub fn choose_enemy_action(health_fraction: f64, rolls: &mut impl RollSource) -> BattleAction {
    if health_fraction < HEAL_HEALTH_THRESHOLD && rolls.roll() < HEAL_CHANCE {
        return BattleAction::Trait(Some(Ability::Heal));
    }
    if health_fraction < DEFEND_HEALTH_THRESHOLD && rolls.roll() < LOW_HEALTH_DEFEND_CHANCE {
        return BattleAction::Defensive;
    }
    if rolls.roll() < SPECIAL_CHANCE {
        let ability = rolls
            .pick_index(SPECIALS.len())
            .and_then(|i| SPECIALS.get(i).copied());
        return BattleAction::Trait(ability);
    }
    if rolls.roll() < DEFEND_CHANCE {
        return BattleAction::Defensive;
    }
    BattleAction::Aggressive
}

/// Supplies the player's action each turn.
pub trait PlayerController {
    /// Pick the next action given the current battle state.
    fn next_action(&mut self, battle: &Battle) -> BattleAction;
}

/// Plays the player's side with the enemy policy.
#[derive(Debug, Clone)]
pub struct Autopilot<R> {
    rolls: R,
}

impl<R: RollSource> Autopilot<R> {
    /// Create an autopilot drawing from `rolls`.
    pub const fn new(rolls: R) -> Self {
        Self { rolls }
    }
}

impl<R: RollSource> PlayerController for Autopilot<R> {
    fn next_action(&mut self, battle: &Battle) -> BattleAction {
        choose_enemy_action(battle.player().health_fraction(), &mut self.rolls)
    }
}

/// Replays a fixed list of actions, then attacks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedController {
    actions: VecDeque<BattleAction>,
}

impl ScriptedController {
    /// Create a controller that plays `actions` in order.
    pub fn new(actions: impl IntoIterator<Item = BattleAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }
}

impl PlayerController for ScriptedController {
    fn next_action(&mut self, _battle: &Battle) -> BattleAction {
        self.actions.pop_front().unwrap_or(BattleAction::Aggressive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;

    #[test]
    fn low_health_heals_on_first_roll() {
        let mut rolls = ScriptedRolls::new([0.5]);
        assert_eq!(choose_enemy_action(0.2, &mut rolls), BattleAction::Trait(Some(Ability::Heal)));
        assert_eq!(rolls.drawn(), 1);
    }

    #[test]
    fn healthy_enemy_skips_health_rolls() {
        // only the special roll and the defend roll are drawn
        let mut rolls = ScriptedRolls::new([0.9, 0.9]);
        assert_eq!(choose_enemy_action(1.0, &mut rolls), BattleAction::Aggressive);
        assert_eq!(rolls.drawn(), 2);
    }

    #[test]
    fn each_branch_draws_independently() {
        // heal roll fails, defend roll fails, special roll fails, defend-any hits
        let mut rolls = ScriptedRolls::new([0.7, 0.4, 0.2, 0.3]);
        assert_eq!(choose_enemy_action(0.1, &mut rolls), BattleAction::Defensive);
        assert_eq!(rolls.drawn(), 4);
    }

    #[test]
    fn wounded_enemy_defends() {
        let mut rolls = ScriptedRolls::new([0.1]);
        assert_eq!(choose_enemy_action(0.4, &mut rolls), BattleAction::Defensive);
    }

    #[test]
    fn special_picks_from_three() {
        let mut rolls = ScriptedRolls::new([0.1, 0.0]);
        assert_eq!(
            choose_enemy_action(1.0, &mut rolls),
            BattleAction::Trait(Some(Ability::CriticalStrike))
        );
        let mut rolls = ScriptedRolls::new([0.1, 0.5]);
        assert_eq!(
            choose_enemy_action(1.0, &mut rolls),
            BattleAction::Trait(Some(Ability::PowerSurge))
        );
        let mut rolls = ScriptedRolls::new([0.1, 0.9]);
        assert_eq!(
            choose_enemy_action(1.0, &mut rolls),
            BattleAction::Trait(Some(Ability::ShieldBash))
        );
    }
}
