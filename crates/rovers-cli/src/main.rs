//! Command line driver for the Rovers arena.
//!
//! Runs the game logic against local JSON fixtures, or against the
//! marketplace API with `--live`:
//!
//! ```text
//! rovers battle 1 2 --seed 42 --fast
//! rovers summary 1 13 --narrate
//! rovers expedition 7 "Debris Field"
//! DATABASE_URL=postgresql://localhost/rovers rovers expedition --resume <run-id>
//! rovers leaderboard --trait-type Body
//! rovers alphas
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr. Expedition
//! runs are stored in `PostgreSQL` when `DATABASE_URL` is set.

mod app;
mod commands;
mod fixtures;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::commands::{BattleCmd, ExpeditionCmd, LeaderboardCmd, SummaryCmd};

/// Rovers arena command line
#[derive(Parser, Debug)]
#[command(name = "rovers")]
#[command(about = "Battles, summaries and expeditions for the Rovers collection", long_about = None)]
#[command(version)]
struct Cli {
    /// Game configuration file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = "rovers-config.yaml")]
    config: PathBuf,

    /// Directory with rarity, rover, item and expedition fixtures
    #[arg(long, global = true, default_value = "crates/rovers-cli/fixtures")]
    fixtures: PathBuf,

    /// Fetch rarity and rover metadata from the marketplace API
    #[arg(long, global = true)]
    live: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a turn-based battle on autopilot
    Battle(BattleCmd),

    /// Resolve a one-shot battle, optionally narrated
    Summary(SummaryCmd),

    /// Send a rover on an expedition
    Expedition(ExpeditionCmd),

    /// Rank trait values by power
    Leaderboard(LeaderboardCmd),

    /// List rovers with enough traits to be alphas
    Alphas,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let app = App::load(&cli.config, &cli.fixtures, cli.live)?;
    info!(
        config = %cli.config.display(),
        live = cli.live,
        "rovers starting"
    );

    match cli.command {
        Command::Battle(cmd) => cmd.execute(&app).await,
        Command::Summary(cmd) => cmd.execute(&app).await,
        Command::Expedition(cmd) => cmd.execute(&app).await,
        Command::Leaderboard(cmd) => cmd.execute(&app).await,
        Command::Alphas => commands::alphas(&app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expedition_takes_rover_and_expedition_or_resume() {
        assert!(Cli::try_parse_from(["rovers", "expedition", "7", "Debris Field"]).is_ok());
        assert!(
            Cli::try_parse_from([
                "rovers",
                "expedition",
                "--resume",
                "0190f3a0-0000-7000-8000-0000000000aa",
                "--fast",
            ])
            .is_ok()
        );
        assert!(Cli::try_parse_from(["rovers", "expedition", "7"]).is_err());
        assert!(Cli::try_parse_from(["rovers", "expedition", "--resume", "not-a-uuid"]).is_err());
        assert!(
            Cli::try_parse_from([
                "rovers",
                "expedition",
                "7",
                "Debris Field",
                "--resume",
                "0190f3a0-0000-7000-8000-0000000000aa",
            ])
            .is_err()
        );
    }
}
