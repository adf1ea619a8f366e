//! Expedition odds, rewards and the paced run loop.
//!
//! A run is split into `steps` equal steps of `duration_minutes * 60000 /
//! steps` milliseconds. Every step sleeps first, then draws one roll out of
//! 100:
//!
//! - non-final steps narrate a hazard when the roll is under
//!   `danger_chance`, otherwise an exploring line;
//! - the final step succeeds when the roll is under [`success_chance`].
//!
//! Each step's entry is appended to the store as soon as it is produced,
//! so the store always reflects how far the run got. The closing entries
//! are written together with the terminal status, so a run is either still
//! before its final step or finished.

use std::time::Duration;

use tracing::{debug, info, warn};

use rovers_core::{Clock, ExpeditionConfig, ExpeditionFlavor, RollSource, floor_to_u32};
use rovers_types::{
    Difficulty, Expedition, ExpeditionLogEntry, ExpeditionRun, Item, ItemId, ItemRarity,
    LogEntryType,
};

use crate::abort::AbortHandle;
use crate::error::ExpeditionError;
use crate::store::{ExpeditionStore, RunCompletion};

/// How a call to [`run_expedition`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpeditionOutcome {
    /// The rover succeeded.
    Completed {
        /// Item awarded, if the rolled tier had any candidates.
        reward_item: Option<ItemId>,
        /// Coins awarded.
        reward_coins: u32,
    },
    /// The rover failed.
    Failed,
    /// The abort flag was raised; the run stays in progress.
    Aborted {
        /// Step the run will resume from.
        next_step: u32,
    },
}

/// Base success percent for a difficulty.
pub const fn base_chance(difficulty: Difficulty, config: &ExpeditionConfig) -> f64 {
    match difficulty {
        Difficulty::Easy => config.easy_chance,
        Difficulty::Medium => config.medium_chance,
        Difficulty::Hard => config.hard_chance,
        Difficulty::Extreme => config.extreme_chance,
    }
}

/// `min(base + min(rarity_score / 5, bonus_cap), success_cap)` in percent.
pub fn success_chance(difficulty: Difficulty, rarity_score: u32, config: &ExpeditionConfig) -> f64 {
    let bonus = (f64::from(rarity_score) / 5.0).min(config.rarity_bonus_cap);
    (base_chance(difficulty, config) + bonus).min(config.success_cap)
}

/// Roll the reward tier. Higher rarity scores push toward rarer tiers.
///
/// With `bonus = rarity_score / 2` and a roll out of 100: legendary under
/// `5 + bonus / 2`, epic under `15 + bonus`, rare under `35 + bonus * 1.5`,
/// uncommon under `60 + bonus * 2`, common otherwise.
pub fn roll_reward_rarity(rarity_score: u32, rolls: &mut impl RollSource) -> ItemRarity {
    let roll = rolls.roll() * 100.0;
    let bonus = f64::from(rarity_score) / 2.0;
    if roll < 5.0 + bonus / 2.0 {
        ItemRarity::Legendary
    } else if roll < 15.0 + bonus {
        ItemRarity::Epic
    } else if roll < bonus.mul_add(1.5, 35.0) {
        ItemRarity::Rare
    } else if roll < bonus.mul_add(2.0, 60.0) {
        ItemRarity::Uncommon
    } else {
        ItemRarity::Common
    }
}

/// `floor(min + roll * (max - min))`.
pub fn roll_coins(min: u32, max: u32, rolls: &mut impl RollSource) -> u32 {
    let span = f64::from(max) - f64::from(min);
    floor_to_u32(rolls.roll().mul_add(span, f64::from(min)))
}

/// Delay before each step.
pub fn step_delay(duration_minutes: u32, steps: u32) -> Duration {
    let total_ms = u64::from(duration_minutes).saturating_mul(60_000);
    Duration::from_millis(total_ms.checked_div(u64::from(steps)).unwrap_or(0))
}

/// Step a persisted run should resume from.
///
/// One entry is written per non-final step, so the log length counts the
/// finished steps. The final step's entries only land with the terminal
/// status, so an active run that reached it replays it.
pub fn resume_step(run: &ExpeditionRun, steps: u32) -> u32 {
    let logged = u32::try_from(run.log_entries.len()).unwrap_or(u32::MAX);
    logged.min(steps.saturating_sub(1))
}

/// Everything [`run_expedition`] needs besides the run itself.
#[derive(Debug)]
pub struct ExpeditionContext<'a, S, C> {
    /// Persistence collaborator, the source of truth for progress.
    pub store: &'a S,
    /// Pacing clock.
    pub clock: &'a C,
    /// Expedition tuning.
    pub config: &'a ExpeditionConfig,
    /// Cooperative abort flag.
    pub abort: &'a AbortHandle,
}

/// Drive an in-progress run to its end, or until aborted.
///
/// Starts at [`resume_step`], so a run abandoned mid-flight picks up after
/// its last persisted entry. Rolls drawn per step: the step roll, then the
/// narrative pick; on success also the tier roll, the item pick (only when
/// the tier has candidates) and the coin roll.
///
/// # Errors
///
/// [`ExpeditionError::NotInProgress`] for a terminal run,
/// [`ExpeditionError::ExpeditionMismatch`] when `expedition` is not the
/// run's expedition, and store failures.
pub async fn run_expedition<S, C, R>(
    ctx: &ExpeditionContext<'_, S, C>,
    run: &ExpeditionRun,
    expedition: &Expedition,
    item_pool: &[Item],
    rolls: &mut R,
) -> Result<ExpeditionOutcome, ExpeditionError>
where
    S: ExpeditionStore,
    C: Clock,
    R: RollSource + Send,
{
    if !run.is_active() {
        return Err(ExpeditionError::NotInProgress { run_id: run.id });
    }
    if run.expedition_id != expedition.id {
        return Err(ExpeditionError::ExpeditionMismatch { run_id: run.id });
    }

    let steps = ctx.config.steps.max(1);
    let delay = step_delay(expedition.duration_minutes, steps);
    let start = resume_step(run, steps);
    let final_step = steps.saturating_sub(1);

    info!(
        run_id = %run.id,
        rover = %run.rover_name,
        expedition = %expedition.name,
        difficulty = expedition.difficulty.as_str(),
        start_step = start,
        step_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        "Expedition running"
    );

    for step in start..final_step {
        if aborted(ctx, run, step) {
            return Ok(ExpeditionOutcome::Aborted { next_step: step });
        }
        ctx.clock.sleep(delay).await;

        let roll = rolls.roll() * 100.0;
        let (flavor, entry_type) = if roll < ctx.config.danger_chance {
            (ExpeditionFlavor::Danger, LogEntryType::Danger)
        } else {
            (ExpeditionFlavor::Exploring, LogEntryType::Info)
        };
        let entry = log_entry(ctx.clock, flavor.render(&run.rover_name, rolls), entry_type);
        debug!(run_id = %run.id, step, message = %entry.message, "Expedition step");
        ctx.store.append_log(run.id, &[entry]).await?;
    }

    if aborted(ctx, run, final_step) {
        return Ok(ExpeditionOutcome::Aborted {
            next_step: final_step,
        });
    }
    ctx.clock.sleep(delay).await;

    let roll = rolls.roll() * 100.0;
    let chance = success_chance(expedition.difficulty, run.rover_rarity_score, ctx.config);
    if roll < chance {
        return finish_success(ctx, run, expedition, item_pool, rolls).await;
    }

    let entry = log_entry(
        ctx.clock,
        ExpeditionFlavor::Failure.render(&run.rover_name, rolls),
        LogEntryType::Danger,
    );
    ctx.store
        .complete_run(run.id, &[entry], RunCompletion::failed(ctx.clock.now()))
        .await?;
    info!(run_id = %run.id, roll, chance, "Expedition failed");
    Ok(ExpeditionOutcome::Failed)
}

fn aborted<S, C>(ctx: &ExpeditionContext<'_, S, C>, run: &ExpeditionRun, step: u32) -> bool {
    let aborted = ctx.abort.is_aborted();
    if aborted {
        warn!(run_id = %run.id, next_step = step, "Expedition aborted");
    }
    aborted
}

fn log_entry(clock: &impl Clock, message: String, entry_type: LogEntryType) -> ExpeditionLogEntry {
    ExpeditionLogEntry {
        timestamp: clock.now().timestamp_millis(),
        message,
        entry_type,
    }
}

async fn finish_success<S, C, R>(
    ctx: &ExpeditionContext<'_, S, C>,
    run: &ExpeditionRun,
    expedition: &Expedition,
    item_pool: &[Item],
    rolls: &mut R,
) -> Result<ExpeditionOutcome, ExpeditionError>
where
    S: ExpeditionStore,
    C: Clock,
    R: RollSource + Send,
{
    let tier = roll_reward_rarity(run.rover_rarity_score, rolls);
    let eligible: Vec<&Item> = item_pool.iter().filter(|i| i.rarity == tier).collect();
    let reward = rolls
        .pick_index(eligible.len())
        .and_then(|i| eligible.get(i).copied());
    let coins = roll_coins(expedition.coin_reward_min, expedition.coin_reward_max, rolls);

    let mut entries = vec![log_entry(
        ctx.clock,
        ExpeditionFlavor::Success.render(&run.rover_name, rolls),
        LogEntryType::Success,
    )];
    if let Some(item) = reward {
        entries.push(log_entry(
            ctx.clock,
            format!("REWARD: {} acquired!", item.name),
            LogEntryType::Reward,
        ));
    }
    entries.push(log_entry(
        ctx.clock,
        format!("REWARD: {coins} coins earned!"),
        LogEntryType::Reward,
    ));

    let reward_item = reward.map(|i| i.id);
    ctx.store
        .complete_run(
            run.id,
            &entries,
            RunCompletion::completed(ctx.clock.now(), reward_item, coins),
        )
        .await?;

    info!(
        run_id = %run.id,
        tier = tier.as_str(),
        item = ?reward.map(|i| i.name.as_str()),
        coins,
        "Expedition completed"
    );
    Ok(ExpeditionOutcome::Completed {
        reward_item,
        reward_coins: coins,
    })
}
