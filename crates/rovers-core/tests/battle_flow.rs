//! Integration tests for the turn-based battle state machine and session.
//!
//! These drive whole battles through the public API with seeded and
//! scripted randomness and check the invariants every battle must keep.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::arithmetic_side_effects
)]

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use rovers_core::{
    Ability, Autopilot, Battle, BattleAction, BattleError, BattlePhase, BattleSession,
    CombatConfig, CombatStats, ManualClock, PacingConfig, PowerProfile, ScriptedController,
    ScriptedRolls,
};
use rovers_types::{BattleWinner, Side, TokenId};

fn stats(name: &str, total_power: u32) -> CombatStats {
    CombatStats::derive(
        name,
        TokenId::new(name),
        PowerProfile {
            total_power,
            trait_powers: Vec::new(),
        },
        &CombatConfig::default(),
    )
}

fn battle(player_power: u32, enemy_power: u32) -> Battle {
    Battle::new(
        stats("player", player_power),
        stats("enemy", enemy_power),
        CombatConfig::default(),
    )
}

// A constant 0.5 misses every lucky strike, leaves variance at exactly
// 1.0 and makes a healthy enemy attack, whatever the roll order.
const PLAIN: [f64; 1] = [0.5];

#[test]
fn starts_in_round_one_awaiting_player() {
    let b = battle(150, 100);
    assert_eq!(b.round(), 1);
    assert_eq!(b.phase(), BattlePhase::AwaitingPlayerAction);
    assert!(b.log().is_empty());
    assert_eq!(b.luck_bonus(Side::Player), 0.0);
    assert_eq!(b.luck_bonus(Side::Enemy), 0.15);
}

#[test]
fn turns_must_alternate() {
    let mut b = battle(100, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);
    assert_eq!(
        b.enemy_turn(&mut rolls),
        Err(BattleError::NotYourTurn { side: Side::Enemy })
    );
    b.player_turn(BattleAction::Defensive, &mut rolls).unwrap();
    assert_eq!(
        b.player_turn(BattleAction::Aggressive, &mut rolls),
        Err(BattleError::NotYourTurn { side: Side::Player })
    );
}

#[test]
fn aggressive_attack_logs_damage() {
    let mut b = battle(150, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);
    let out = b.player_turn(BattleAction::Aggressive, &mut rolls).unwrap();
    // 25 * 1.2 = 30
    assert_eq!(out.entry.damage, Some(30));
    assert_eq!(out.entry.action, "AGGRESSIVE ATTACK");
    assert_eq!(out.entry.turn, Side::Player);
    assert_eq!(out.entry.round, 1);
    assert_eq!(b.enemy().current_health(), 113 - 30);
    assert!(out.winner.is_none());
    assert_eq!(b.phase(), BattlePhase::AwaitingEnemyAction);
}

#[test]
fn power_surge_is_consumed_by_next_aggressive_only() {
    let mut b = battle(150, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);

    let out = b
        .player_turn(BattleAction::Trait(Some(Ability::PowerSurge)), &mut rolls)
        .unwrap();
    assert_eq!(out.entry.action, "POWER SURGE");
    assert_eq!(out.entry.damage, None);
    assert!(out.entry.description.contains("+30% damage"));
    assert!(b.surge_pending(Side::Player));

    b.enemy_action(BattleAction::Defensive, &mut rolls).unwrap();

    // Fallback plain attack leaves the surge armed.
    let out = b.player_turn(BattleAction::Trait(None), &mut rolls).unwrap();
    assert_eq!(out.entry.action, "AGGRESSIVE ATTACK");
    assert!(b.surge_pending(Side::Player));

    b.enemy_action(BattleAction::Defensive, &mut rolls).unwrap();

    let out = b.player_turn(BattleAction::Aggressive, &mut rolls).unwrap();
    assert_eq!(out.entry.action, "POWER SURGE + AGGRESSIVE ATTACK");
    assert!(out.entry.description.contains("(Power Surge!)"));
    // 25 * 1.2 * 1.3 = 39, minus defense 9 against a defending enemy
    assert_eq!(out.entry.damage, Some(30));
    assert!(!b.surge_pending(Side::Player));
}

#[test]
fn defending_lasts_one_opponent_action() {
    let mut b = battle(100, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);
    b.player_turn(BattleAction::Defensive, &mut rolls).unwrap();
    assert!(b.player().is_defending);

    // 15 + 7 = 22 attack, * 1.2 = 26.4, minus defense 9 = 17.4
    let out = b.enemy_action(BattleAction::Aggressive, &mut rolls).unwrap();
    assert_eq!(out.entry.damage, Some(17));

    b.player_turn(BattleAction::Aggressive, &mut rolls).unwrap();
    assert!(!b.player().is_defending);
}

#[test]
fn shield_bash_defends_and_deals_partial_damage() {
    let mut b = battle(200, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);
    let out = b
        .player_turn(BattleAction::Trait(Some(Ability::ShieldBash)), &mut rolls)
        .unwrap();
    // 28 * 0.7 = 19.6
    assert_eq!(out.entry.damage, Some(20));
    assert_eq!(out.entry.action, "SHIELD BASH");
    assert!(b.player().is_defending);
}

#[test]
fn heal_is_capped_at_max_health() {
    let mut b = battle(100, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);
    b.player_turn(BattleAction::Defensive, &mut rolls).unwrap();
    b.enemy_action(BattleAction::Trait(Some(Ability::CriticalStrike)), &mut rolls)
        .unwrap();
    let wounded = b.player().current_health();
    assert!(wounded < b.player().max_health);

    // heal roll 0.99 gives 20 + 10 = 30
    let mut heal_rolls = ScriptedRolls::new([0.99, 0.0]);
    let out = b
        .player_turn(BattleAction::Trait(Some(Ability::Heal)), &mut heal_rolls)
        .unwrap();
    assert_eq!(out.entry.healing, Some(30));
    assert_eq!(out.entry.action, "EMERGENCY REPAIR");
    assert_eq!(
        b.player().current_health(),
        (wounded + 30).min(b.player().max_health)
    );
}

#[test]
fn knockout_ends_battle_mid_round() {
    let mut b = Battle::new(stats("giant", 5000), stats("pebble", 0), CombatConfig::default());
    let mut rolls = ScriptedRolls::new(PLAIN);
    let out = b.player_turn(BattleAction::Aggressive, &mut rolls).unwrap();
    assert_eq!(out.winner, Some(BattleWinner::Player));
    assert_eq!(b.phase(), BattlePhase::Ended(BattleWinner::Player));
    assert_eq!(b.enemy().current_health(), 0);
    assert_eq!(
        b.enemy_turn(&mut rolls),
        Err(BattleError::AlreadyEnded {
            winner: BattleWinner::Player
        })
    );
}

#[test]
fn round_limit_compares_health() {
    let mut b = battle(100, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);
    for round in 1..=3 {
        assert_eq!(b.round(), round);
        b.player_turn(BattleAction::Aggressive, &mut rolls).unwrap();
        b.enemy_action(BattleAction::Defensive, &mut rolls).unwrap();
    }
    assert_eq!(b.winner(), Some(BattleWinner::Player));
    assert_eq!(b.log().len(), 6);
}

#[test]
fn equal_health_at_limit_is_a_draw() {
    let mut b = battle(100, 100);
    let mut rolls = ScriptedRolls::new(PLAIN);
    for _ in 0..3 {
        b.player_turn(BattleAction::Defensive, &mut rolls).unwrap();
        b.enemy_action(BattleAction::Defensive, &mut rolls).unwrap();
    }
    assert_eq!(b.winner(), Some(BattleWinner::Draw));
}

#[test]
fn seeded_battles_always_terminate_within_bounds() {
    let actions = [
        BattleAction::Aggressive,
        BattleAction::Defensive,
        BattleAction::Trait(Some(Ability::CriticalStrike)),
        BattleAction::Trait(Some(Ability::Heal)),
        BattleAction::Trait(Some(Ability::PowerSurge)),
        BattleAction::Trait(Some(Ability::ShieldBash)),
        BattleAction::Trait(None),
    ];
    for seed in 0..300_u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let player_power = u32::try_from(seed % 7).unwrap() * 120;
        let enemy_power = u32::try_from(seed % 5).unwrap() * 150;
        let mut b = battle(player_power, enemy_power);
        let mut turns = 0;
        let mut last_len = 0;

        while !b.is_over() {
            let action = actions[usize::try_from(seed).unwrap().wrapping_add(turns) % actions.len()];
            let out = b.player_turn(action, &mut rng).unwrap();
            assert_eq!(out.entry.turn, Side::Player);
            if !b.is_over() {
                let out = b.enemy_turn(&mut rng).unwrap();
                assert_eq!(out.entry.turn, Side::Enemy);
            }
            for side in [Side::Player, Side::Enemy] {
                let s = b.stats(side);
                assert!(s.current_health() <= s.max_health);
            }
            assert!(b.log().len() > last_len);
            last_len = b.log().len();
            turns += 1;
            assert!(turns <= 3, "seed {seed} exceeded the round limit");
        }

        assert!(b.round() <= 3);
        let log = b.log();
        for pair in log.windows(2) {
            assert!(pair[0].round <= pair[1].round);
            if pair[0].round == pair[1].round {
                assert_eq!(pair[0].turn, Side::Player);
                assert_eq!(pair[1].turn, Side::Enemy);
            }
        }
        assert!(b.luck_bonus(Side::Player) <= 0.15);
        assert!(b.luck_bonus(Side::Enemy) <= 0.15);
    }
}

#[tokio::test]
async fn session_paces_each_turn() {
    let clock = ManualClock::default();
    let session = BattleSession::new(battle(100, 100), PacingConfig::default(), clock.clone());
    let mut controller = ScriptedController::new([BattleAction::Defensive; 3]);
    let mut rolls = ScriptedRolls::new([0.9]);

    let report = session.run(&mut controller, &mut rolls).await.unwrap();

    // Healthy enemy with 0.9 rolls always attacks; player defends.
    assert_eq!(report.winner, BattleWinner::Enemy);
    assert_eq!(report.rounds, 3);
    assert_eq!(report.log.len(), 6);
    assert_eq!(
        clock.sleeps(),
        [1500, 1000, 1500, 1000, 1500, 1000].map(Duration::from_millis).to_vec()
    );
}

#[tokio::test]
async fn autopilot_session_completes() {
    let clock = ManualClock::default();
    let session = BattleSession::new(battle(300, 250), PacingConfig::default(), clock.clone());
    let mut controller = Autopilot::new(SmallRng::seed_from_u64(7));
    let mut rng = SmallRng::seed_from_u64(42);

    let report = session.run(&mut controller, &mut rng).await.unwrap();

    assert!(!report.log.is_empty());
    assert!(report.rounds <= 3);
    assert_eq!(clock.sleeps().len(), report.log.len());
}
