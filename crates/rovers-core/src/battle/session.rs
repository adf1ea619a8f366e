//! Paced driver for a full battle.
//!
//! Alternates player and enemy turns until the battle ends, pausing after
//! each turn so a human can follow along. Dropping the session abandons the
//! battle; nothing outlives it.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use rovers_types::{BattleLogEntry, BattleWinner};

use super::policy::PlayerController;
use super::{Battle, BattlePhase};
use crate::clock::Clock;
use crate::config::PacingConfig;
use crate::error::BattleError;
use crate::rng::RollSource;

/// Final result of a driven battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleReport {
    /// Outcome.
    pub winner: BattleWinner,
    /// Rounds played.
    pub rounds: u32,
    /// Player health at the end.
    pub player_health: u32,
    /// Enemy health at the end.
    pub enemy_health: u32,
    /// Every action, in order.
    pub log: Vec<BattleLogEntry>,
}

/// Drives one [`Battle`] to completion.
#[derive(Debug)]
pub struct BattleSession<C> {
    battle: Battle,
    pacing: PacingConfig,
    clock: C,
}

impl<C: Clock> BattleSession<C> {
    /// Wrap a battle with pacing and a clock.
    pub const fn new(battle: Battle, pacing: PacingConfig, clock: C) -> Self {
        Self {
            battle,
            pacing,
            clock,
        }
    }

    /// The battle being driven.
    pub const fn battle(&self) -> &Battle {
        &self.battle
    }

    /// Play until the battle ends.
    ///
    /// Sleeps `player_turn_delay_ms` after every player action and
    /// `enemy_turn_delay_ms` after every enemy action.
    pub async fn run<P, R>(
        mut self,
        controller: &mut P,
        rolls: &mut R,
    ) -> Result<BattleReport, BattleError>
    where
        P: PlayerController + Send,
        R: RollSource + Send,
    {
        let player_delay = Duration::from_millis(self.pacing.player_turn_delay_ms);
        let enemy_delay = Duration::from_millis(self.pacing.enemy_turn_delay_ms);

        let winner = loop {
            match self.battle.phase() {
                BattlePhase::Ended(winner) => break winner,
                BattlePhase::AwaitingPlayerAction => {
                    let action = controller.next_action(&self.battle);
                    self.battle.player_turn(action, rolls)?;
                    self.clock.sleep(player_delay).await;
                }
                BattlePhase::AwaitingEnemyAction => {
                    self.battle.enemy_turn(rolls)?;
                    self.clock.sleep(enemy_delay).await;
                }
            }
        };

        let report = BattleReport {
            winner,
            rounds: self.battle.round(),
            player_health: self.battle.player().current_health(),
            enemy_health: self.battle.enemy().current_health(),
            log: self.battle.into_log(),
        };
        info!(
            winner = ?report.winner,
            rounds = report.rounds,
            entries = report.log.len(),
            "Battle session finished"
        );
        Ok(report)
    }
}
