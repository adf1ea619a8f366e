//! Subcommand arguments and their execution.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Args;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::{info, warn};

use rovers_collection::RaritySnapshot;
use rovers_core::rarity::trait_types;
use rovers_core::{
    AlphaLedger, Armory, Autopilot, Battle, BattleSession, Clock, CombatStats, ItemCatalog,
    ManualClock, RarityModel, TokioClock, summarize_battle, trait_leaderboard,
};
use rovers_expedition::{
    AbortHandle, ExpeditionOutcome, ExpeditionRunner, ExpeditionStore, MemoryStore, reward_pool,
};
use rovers_db::{CatalogStore, PgStore, PostgresConfig, PostgresPool};
use rovers_narrator::{Narrator, NarratorConfig};
use rovers_types::{ExpeditionRun, Rover, RunId};
use uuid::Uuid;

use crate::app::App;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Randomness and pacing options.
#[derive(Args, Debug, Clone, Copy)]
pub struct RollArgs {
    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Skip pacing delays
    #[arg(long)]
    fast: bool,
}

/// A generator for one independent roll stream.
fn rng(seed: Option<u64>, stream: u64) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(stream)),
        None => SmallRng::from_os_rng(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn combat_stats(app: &App, rover: &Rover, snapshot: &RaritySnapshot) -> CombatStats {
    let model = RarityModel::new(&app.config.rarity);
    let profile = model.trait_power(&rover.traits, &snapshot.lookup, snapshot.total_supply);
    CombatStats::derive(
        rover.name.clone(),
        rover.identifier.clone(),
        profile,
        &app.config.combat,
    )
}

// ---------------------------------------------------------------------------
// battle
// ---------------------------------------------------------------------------

/// Play a turn-based battle on autopilot.
#[derive(Args, Debug)]
pub struct BattleCmd {
    /// Token id of the player's rover
    player: String,

    /// Token id of the opponent
    enemy: String,

    #[command(flatten)]
    rolls: RollArgs,
}

impl BattleCmd {
    /// Run the battle and print the report.
    pub async fn execute(self, app: &App) -> Result<()> {
        let snapshot = app.source.snapshot().await?;
        let player = app.source.rover(&self.player).await?;
        let enemy = app.source.rover(&self.enemy).await?;

        let battle = Battle::new(
            combat_stats(app, &player, &snapshot),
            combat_stats(app, &enemy, &snapshot),
            app.config.combat.clone(),
        );
        let mut controller = Autopilot::new(rng(self.rolls.seed, 0));
        let mut rolls = rng(self.rolls.seed, 1);
        let pacing = app.config.pacing.clone();

        let report = if self.rolls.fast {
            BattleSession::new(battle, pacing, ManualClock::starting_at(Utc::now()))
                .run(&mut controller, &mut rolls)
                .await?
        } else {
            BattleSession::new(battle, pacing, TokioClock)
                .run(&mut controller, &mut rolls)
                .await?
        };
        print_json(&report)
    }
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

/// Resolve a one-shot battle from trait power.
#[derive(Args, Debug)]
pub struct SummaryCmd {
    /// Token id of the first rover
    rover1: String,

    /// Token id of the second rover
    rover2: String,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Ask the narration backend (`NARRATOR_*` variables) for commentary
    #[arg(long)]
    narrate: bool,
}

impl SummaryCmd {
    /// Resolve, print, and optionally narrate.
    pub async fn execute(self, app: &App) -> Result<()> {
        let snapshot = app.source.snapshot().await?;
        let rover1 = app.source.rover(&self.rover1).await?;
        let rover2 = app.source.rover(&self.rover2).await?;

        let model = RarityModel::new(&app.config.rarity);
        let summary = summarize_battle(
            &rover1,
            &rover2,
            &snapshot.lookup,
            snapshot.total_supply,
            &model,
            &mut rng(self.seed, 0),
        );
        print_json(&summary)?;

        if self.narrate {
            let config = NarratorConfig::from_env()?;
            let narrator = Narrator::from_config(&config)?;
            let narration = narrator.narrate_battle(&summary).await?;
            println!("\n{narration}");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// expedition
// ---------------------------------------------------------------------------

/// Send a rover on an expedition from the fixtures, or resume a stored run.
///
/// With `DATABASE_URL` set, runs are kept in `PostgreSQL` and an
/// interrupted run can be continued with `--resume`. Without it, runs live
/// in memory for the length of the command.
#[derive(Args, Debug)]
pub struct ExpeditionCmd {
    /// Token id of the rover
    #[arg(required_unless_present = "resume")]
    rover: Option<String>,

    /// Expedition name or id
    #[arg(required_unless_present = "resume")]
    expedition: Option<String>,

    /// Continue an in-progress run instead of deploying a new one
    #[arg(long, value_name = "RUN_ID", conflicts_with_all = ["rover", "expedition"])]
    resume: Option<Uuid>,

    #[command(flatten)]
    rolls: RollArgs,
}

impl ExpeditionCmd {
    /// Deploy or resume, run to the end, and print the finished run.
    pub async fn execute(self, app: &App) -> Result<()> {
        if !database_configured() {
            if self.resume.is_some() {
                bail!("--resume needs DATABASE_URL, in-memory runs end with the process");
            }
            return self.with_store(app, MemoryStore::new()).await;
        }

        let pool = PostgresPool::connect(&PostgresConfig::from_env()?).await?;
        pool.run_migrations().await?;
        sync_catalog(app, &CatalogStore::new(pool.pool())).await?;
        let result = self.with_store(app, PgStore::new(pool.pool().clone())).await;
        pool.close().await;
        result
    }

    async fn with_store<S: ExpeditionStore>(&self, app: &App, store: S) -> Result<()> {
        let mut rolls = rng(self.rolls.seed, 0);
        let config = app.config.expedition.clone();
        if self.rolls.fast {
            let clock = ManualClock::starting_at(Utc::now());
            let runner = ExpeditionRunner::new(store, clock, config);
            self.drive(app, &runner, &mut rolls).await
        } else {
            let runner = ExpeditionRunner::new(store, TokioClock, config);
            self.drive(app, &runner, &mut rolls).await
        }
    }

    async fn deploy<S: ExpeditionStore, C: Clock>(
        &self,
        app: &App,
        runner: &ExpeditionRunner<S, C>,
    ) -> Result<ExpeditionRun> {
        let (Some(token), Some(key)) = (&self.rover, &self.expedition) else {
            bail!("a rover and an expedition are required unless resuming");
        };
        let Some(expedition) = app.fixtures.expedition(key) else {
            bail!("unknown expedition {key:?}");
        };

        let snapshot = app.source.snapshot().await?;
        let rover = app.source.rover(token).await?;
        let model = RarityModel::new(&app.config.rarity);
        let rarity_score = model.rarity_score(&rover.traits, &snapshot.lookup, snapshot.total_supply);

        let run = runner
            .deploy(expedition, rover.identifier.clone(), &rover.name, rarity_score)
            .await?;
        Ok(run)
    }

    async fn drive<S: ExpeditionStore, C: Clock>(
        &self,
        app: &App,
        runner: &ExpeditionRunner<S, C>,
        rolls: &mut SmallRng,
    ) -> Result<()> {
        let run = match self.resume {
            Some(id) => {
                let run = runner.store().get_run(RunId::from(id)).await?;
                info!(
                    run_id = %run.id,
                    rover = %run.rover_token_id,
                    logged = run.log_entries.len(),
                    "Resuming expedition"
                );
                run
            }
            None => self.deploy(app, runner).await?,
        };
        let Some(expedition) = app.fixtures.expeditions.iter().find(|e| e.id == run.expedition_id) else {
            bail!("run {} belongs to expedition {} missing from the fixtures", run.id, run.expedition_id);
        };
        let catalog = ItemCatalog::new(app.fixtures.items.iter().cloned());
        let pool = reward_pool(expedition, &catalog);

        let abort = AbortHandle::new();
        let on_interrupt = abort.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping at the next step");
                on_interrupt.abort();
            }
        });
        let outcome = runner.run(run.id, expedition, &pool, &abort, rolls).await;
        watcher.abort();

        let mut armory = Armory::new(app.config.starting_coins);
        match outcome? {
            ExpeditionOutcome::Completed {
                reward_item,
                reward_coins,
            } => {
                armory
                    .claim_reward(reward_item, reward_coins, Utc::now())
                    .context("failed to credit expedition reward")?;
                info!(coins = armory.coins(), items = armory.inventory().count(), "Reward claimed");
            }
            ExpeditionOutcome::Failed => info!("Expedition failed, no reward"),
            ExpeditionOutcome::Aborted { next_step } => {
                warn!(run_id = %run.id, next_step, "Expedition left in progress, continue it with --resume");
            }
        }

        let finished = runner.store().get_run(run.id).await?;
        print_json(&finished)
    }
}

fn database_configured() -> bool {
    std::env::var("DATABASE_URL").is_ok_and(|url| !url.trim().is_empty())
}

/// Runs reference their expedition and reward item, so the fixture
/// catalog must exist in the database first.
async fn sync_catalog(app: &App, catalog: &CatalogStore<'_>) -> Result<()> {
    for item in &app.fixtures.items {
        catalog.upsert_item(item).await?;
    }
    for expedition in &app.fixtures.expeditions {
        catalog.upsert_expedition(expedition).await?;
    }
    info!(
        items = app.fixtures.items.len(),
        expeditions = app.fixtures.expeditions.len(),
        "Catalog synced"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// leaderboard
// ---------------------------------------------------------------------------

/// Rank trait values by power.
#[derive(Args, Debug)]
pub struct LeaderboardCmd {
    /// Only list this trait type
    #[arg(long)]
    trait_type: Option<String>,

    /// Maximum rows to print
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// List the trait types instead of values
    #[arg(long)]
    types: bool,
}

impl LeaderboardCmd {
    /// Print the ranking.
    pub async fn execute(self, app: &App) -> Result<()> {
        let snapshot = app.source.snapshot().await?;
        if self.types {
            return print_json(&trait_types(&snapshot.lookup));
        }
        let rows = trait_leaderboard(&snapshot.lookup, snapshot.total_supply, self.trait_type.as_deref());
        let shown: Vec<_> = rows.into_iter().take(self.limit).collect();
        print_json(&shown)
    }
}

// ---------------------------------------------------------------------------
// alphas
// ---------------------------------------------------------------------------

/// Scan the fixture rovers and print the alpha ledger.
pub fn alphas(app: &App) -> Result<()> {
    let mut ledger = AlphaLedger::new(app.config.rarity.alpha_trait_threshold);
    let found = ledger.scan(&app.fixtures.rovers, Utc::now());
    info!(found, threshold = app.config.rarity.alpha_trait_threshold, "Alpha scan finished");
    print_json(ledger.entries())
}
