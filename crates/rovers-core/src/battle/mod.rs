//! Turn-based battle state machine.
//!
//! A battle runs between a human-controlled player rover and an
//! AI-controlled enemy rover for at most `max_rounds` rounds. Each round is
//! one player turn followed by one enemy turn:
//!
//! ```text
//! AwaitingPlayerAction --player_turn--> AwaitingEnemyAction --enemy_turn--+
//!        ^                                                                |
//!        +------------------- next round ---------------------------------+
//!                 knockout or round limit --> Ended(winner)
//! ```
//!
//! Resolution happens inside [`Battle::player_turn`] and
//! [`Battle::enemy_turn`]; there is no observable resolving phase. A
//! knockout ends the battle at once, even mid-round. After the enemy turn of
//! the last round the side with more health wins, equal health is a draw.
//!
//! # Modules
//!
//! - [`action`] -- Player/enemy actions and trait abilities
//! - [`policy`] -- Enemy decision policy and player controllers
//! - [`session`] -- Paced async driver for a whole battle

pub mod action;
pub mod policy;
pub mod session;

use serde::Serialize;
use tracing::{debug, info};

use rovers_types::{BattleLogEntry, BattleWinner, Side};

use crate::combat::{AttackOutcome, CombatStats, resolve_attack, underdog_luck};
use crate::config::CombatConfig;
use crate::error::BattleError;
use crate::math;
use crate::narrative::BattleFlavor;
use crate::rng::RollSource;

use self::action::{Ability, BattleAction};
use self::policy::choose_enemy_action;

/// Appended to a description when the lucky-strike roll hits.
const LUCKY_TEXT: &str = " \u{26a1} LUCKY STRIKE!";

/// Where the battle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "winner")]
pub enum BattlePhase {
    /// Waiting for the player's action.
    AwaitingPlayerAction,
    /// Waiting for the enemy's automatic action.
    AwaitingEnemyAction,
    /// Terminal.
    Ended(BattleWinner),
}

/// What one turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The log entry appended for this turn.
    pub entry: BattleLogEntry,
    /// Set when this turn ended the battle.
    pub winner: Option<BattleWinner>,
}

/// One side's battle-scoped state.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct Combatant {
    stats: CombatStats,
    luck_bonus: f64,
    surge_pending: bool,
}

/// A battle between the player and the enemy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Battle {
    player: Combatant,
    enemy: Combatant,
    round: u32,
    phase: BattlePhase,
    log: Vec<BattleLogEntry>,
    #[serde(skip)]
    config: CombatConfig,
}

impl Battle {
    /// Start a battle in round 1, awaiting the player's action.
    ///
    /// The weaker side receives the underdog luck bonus.
    pub fn new(player: CombatStats, enemy: CombatStats, config: CombatConfig) -> Self {
        let player_luck = underdog_luck(player.total_power, enemy.total_power, &config);
        let enemy_luck = underdog_luck(enemy.total_power, player.total_power, &config);

        info!(
            player = %player.name,
            player_power = player.total_power,
            enemy = %enemy.name,
            enemy_power = enemy.total_power,
            player_luck,
            enemy_luck,
            "Battle started"
        );

        Self {
            player: Combatant {
                stats: player,
                luck_bonus: player_luck,
                surge_pending: false,
            },
            enemy: Combatant {
                stats: enemy,
                luck_bonus: enemy_luck,
                surge_pending: false,
            },
            round: 1,
            phase: BattlePhase::AwaitingPlayerAction,
            log: Vec::new(),
            config,
        }
    }

    /// Current round, 1-based.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Current phase.
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// The outcome, once ended.
    pub const fn winner(&self) -> Option<BattleWinner> {
        match self.phase {
            BattlePhase::Ended(winner) => Some(winner),
            _ => None,
        }
    }

    /// Whether the battle has ended.
    pub const fn is_over(&self) -> bool {
        matches!(self.phase, BattlePhase::Ended(_))
    }

    /// Player's stats.
    pub const fn player(&self) -> &CombatStats {
        &self.player.stats
    }

    /// Enemy's stats.
    pub const fn enemy(&self) -> &CombatStats {
        &self.enemy.stats
    }

    /// Stats of one side.
    pub const fn stats(&self, side: Side) -> &CombatStats {
        match side {
            Side::Player => &self.player.stats,
            Side::Enemy => &self.enemy.stats,
        }
    }

    /// Underdog bonus of one side.
    pub const fn luck_bonus(&self, side: Side) -> f64 {
        match side {
            Side::Player => self.player.luck_bonus,
            Side::Enemy => self.enemy.luck_bonus,
        }
    }

    /// Whether a power surge is armed for one side.
    pub const fn surge_pending(&self, side: Side) -> bool {
        match side {
            Side::Player => self.player.surge_pending,
            Side::Enemy => self.enemy.surge_pending,
        }
    }

    /// Every resolved action so far, in order.
    pub fn log(&self) -> &[BattleLogEntry] {
        &self.log
    }

    /// Consume the battle, returning its log.
    pub fn into_log(self) -> Vec<BattleLogEntry> {
        self.log
    }

    /// Resolve the player's action.
    ///
    /// # Errors
    ///
    /// [`BattleError::NotYourTurn`] outside the player's turn,
    /// [`BattleError::AlreadyEnded`] after the battle ended.
    pub fn player_turn(
        &mut self,
        action: BattleAction,
        rolls: &mut impl RollSource,
    ) -> Result<TurnOutcome, BattleError> {
        self.expect_phase(Side::Player)?;
        let entry = self.act(Side::Player, action, rolls);

        let winner = if self.enemy.stats.is_knocked_out() {
            Some(BattleWinner::Player)
        } else {
            None
        };
        self.phase = winner.map_or(BattlePhase::AwaitingEnemyAction, BattlePhase::Ended);
        Ok(self.finish_turn(entry, winner))
    }

    /// Let the enemy policy choose and resolve the enemy's action.
    ///
    /// # Errors
    ///
    /// [`BattleError::NotYourTurn`] outside the enemy's turn,
    /// [`BattleError::AlreadyEnded`] after the battle ended.
    pub fn enemy_turn(&mut self, rolls: &mut impl RollSource) -> Result<TurnOutcome, BattleError> {
        self.expect_phase(Side::Enemy)?;
        let action = choose_enemy_action(self.enemy.stats.health_fraction(), rolls);
        self.enemy_action(action, rolls)
    }

    /// Resolve a given enemy action, bypassing the policy.
    ///
    /// # Errors
    ///
    /// Same as [`Battle::enemy_turn`].
    pub fn enemy_action(
        &mut self,
        action: BattleAction,
        rolls: &mut impl RollSource,
    ) -> Result<TurnOutcome, BattleError> {
        self.expect_phase(Side::Enemy)?;
        let entry = self.act(Side::Enemy, action, rolls);

        let winner = if self.player.stats.is_knocked_out() {
            Some(BattleWinner::Enemy)
        } else if self.round >= self.config.max_rounds {
            Some(self.compare_health())
        } else {
            None
        };

        match winner {
            Some(w) => self.phase = BattlePhase::Ended(w),
            None => {
                self.round = self.round.saturating_add(1);
                self.phase = BattlePhase::AwaitingPlayerAction;
            }
        }
        Ok(self.finish_turn(entry, winner))
    }

    fn expect_phase(&self, side: Side) -> Result<(), BattleError> {
        match (self.phase, side) {
            (BattlePhase::Ended(winner), _) => Err(BattleError::AlreadyEnded { winner }),
            (BattlePhase::AwaitingPlayerAction, Side::Player)
            | (BattlePhase::AwaitingEnemyAction, Side::Enemy) => Ok(()),
            _ => Err(BattleError::NotYourTurn { side }),
        }
    }

    fn compare_health(&self) -> BattleWinner {
        let p = self.player.stats.current_health();
        let e = self.enemy.stats.current_health();
        match p.cmp(&e) {
            std::cmp::Ordering::Greater => BattleWinner::Player,
            std::cmp::Ordering::Less => BattleWinner::Enemy,
            std::cmp::Ordering::Equal => BattleWinner::Draw,
        }
    }

    fn finish_turn(&mut self, entry: BattleLogEntry, winner: Option<BattleWinner>) -> TurnOutcome {
        debug!(
            round = entry.round,
            turn = ?entry.turn,
            action = %entry.action,
            damage = ?entry.damage,
            healing = ?entry.healing,
            "Turn resolved"
        );
        if let Some(w) = winner {
            info!(
                winner = ?w,
                round = self.round,
                player_health = self.player.stats.current_health(),
                enemy_health = self.enemy.stats.current_health(),
                "Battle ended"
            );
        }
        self.log.push(entry.clone());
        TurnOutcome { entry, winner }
    }

    /// Resolve `action` for `side` against the other side.
    fn act(&mut self, side: Side, action: BattleAction, rolls: &mut impl RollSource) -> BattleLogEntry {
        let (actor, target) = match side {
            Side::Player => (&mut self.player, &mut self.enemy),
            Side::Enemy => (&mut self.enemy, &mut self.player),
        };
        // Defending only covers the opponent's single following action.
        actor.stats.is_defending = false;

        let resolved = resolve_action(actor, target, action, &self.config, rolls);
        BattleLogEntry {
            round: self.round,
            turn: side,
            action: resolved.label.to_owned(),
            damage: (resolved.damage > 0).then_some(resolved.damage),
            healing: (resolved.healing > 0).then_some(resolved.healing),
            description: resolved.description,
        }
    }
}

struct Resolved {
    label: &'static str,
    damage: u32,
    healing: u32,
    description: String,
}

fn resolve_action(
    actor: &mut Combatant,
    target: &mut Combatant,
    action: BattleAction,
    config: &CombatConfig,
    rolls: &mut impl RollSource,
) -> Resolved {
    let actor_name = actor.stats.name.clone();
    let target_was_defending = target.stats.is_defending;

    match action {
        BattleAction::Aggressive => {
            let surged = actor.surge_pending;
            let multiplier = if surged { config.surge_multiplier } else { 1.0 };
            let out = strike(actor, target, true, multiplier, config, rolls);
            actor.surge_pending = false;
            let reaction = if target_was_defending {
                BattleFlavor::DamageReduced
            } else {
                BattleFlavor::DamageTaken
            };
            let description = format!(
                "{actor_name} {}! Deals {} damage{}{} {} {}.",
                BattleFlavor::Aggressive.pick(rolls),
                out.damage,
                if surged { " (Power Surge!)" } else { "" },
                lucky(out.is_lucky_strike),
                target.stats.name,
                reaction.pick(rolls),
            );
            Resolved {
                label: if surged {
                    "POWER SURGE + AGGRESSIVE ATTACK"
                } else {
                    "AGGRESSIVE ATTACK"
                },
                damage: out.damage,
                healing: 0,
                description,
            }
        }
        BattleAction::Defensive => {
            actor.stats.is_defending = true;
            Resolved {
                label: "DEFENSIVE MANEUVER",
                damage: 0,
                healing: 0,
                description: format!(
                    "{actor_name} {}. Defense doubled for this turn!",
                    BattleFlavor::Defensive.pick(rolls)
                ),
            }
        }
        BattleAction::Trait(Some(Ability::CriticalStrike)) => {
            let out = strike(actor, target, true, config.critical_multiplier, config, rolls);
            Resolved {
                label: Ability::CriticalStrike.label(),
                damage: out.damage,
                healing: 0,
                description: format!(
                    "{actor_name} {}! Critical hit for {} damage!{}",
                    BattleFlavor::CriticalStrike.pick(rolls),
                    out.damage,
                    lucky(out.is_lucky_strike),
                ),
            }
        }
        BattleAction::Trait(Some(Ability::Heal)) => {
            let amount = config
                .heal_base
                .saturating_add(math::round_to_u32(rolls.roll() * config.heal_spread));
            let healing = actor.stats.heal(amount);
            Resolved {
                label: Ability::Heal.label(),
                damage: 0,
                healing,
                description: format!(
                    "{actor_name} {}! Recovered {healing} HP!",
                    BattleFlavor::Heal.pick(rolls)
                ),
            }
        }
        BattleAction::Trait(Some(Ability::PowerSurge)) => {
            actor.surge_pending = true;
            let bonus = math::round_to_u32((config.surge_multiplier - 1.0) * 100.0);
            Resolved {
                label: Ability::PowerSurge.label(),
                damage: 0,
                healing: 0,
                description: format!(
                    "{actor_name} {}! Next attack will deal +{bonus}% damage!",
                    BattleFlavor::PowerSurge.pick(rolls)
                ),
            }
        }
        BattleAction::Trait(Some(Ability::ShieldBash)) => {
            let out = strike(actor, target, false, config.shield_bash_multiplier, config, rolls);
            actor.stats.is_defending = true;
            Resolved {
                label: Ability::ShieldBash.label(),
                damage: out.damage,
                healing: 0,
                description: format!(
                    "{actor_name} {}! Deals {} damage while defending!{}",
                    BattleFlavor::ShieldBash.pick(rolls),
                    out.damage,
                    lucky(out.is_lucky_strike),
                ),
            }
        }
        BattleAction::Trait(None) => {
            // Plain attack; a pending surge stays armed.
            let out = strike(actor, target, true, 1.0, config, rolls);
            Resolved {
                label: "AGGRESSIVE ATTACK",
                damage: out.damage,
                healing: 0,
                description: format!(
                    "{actor_name} {}! Deals {} damage!{}",
                    BattleFlavor::Aggressive.pick(rolls),
                    out.damage,
                    lucky(out.is_lucky_strike),
                ),
            }
        }
    }
}

fn strike(
    actor: &Combatant,
    target: &mut Combatant,
    is_aggressive: bool,
    multiplier: f64,
    config: &CombatConfig,
    rolls: &mut impl RollSource,
) -> AttackOutcome {
    let out = resolve_attack(
        &actor.stats,
        &target.stats,
        is_aggressive,
        multiplier,
        actor.luck_bonus,
        config,
        rolls,
    );
    target.stats.take_damage(out.damage);
    out
}

const fn lucky(is_lucky: bool) -> &'static str {
    if is_lucky { LUCKY_TEXT } else { "" }
}
