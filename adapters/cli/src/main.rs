#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Tower Duel training matches.

mod logs;
mod policy;
mod skirmish;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tower_duel_core::{Command, LevelState, Team};
use tower_duel_simulation::{Simulation, SimulationConfig};
use tower_duel_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::logs::{LogWriter, RunSummary};
use crate::policy::RandomPolicy;
use crate::skirmish::Skirmish;

const DEFAULT_EPISODES: u64 = 10;

/// Runs attacker and defender random policies against each other.
#[derive(Debug, Parser)]
#[command(name = "tower-duel", version, about)]
struct Cli {
    /// TOML configuration file; defaults apply to everything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured global seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of finished games before the run stops.
    #[arg(long)]
    episodes: Option<u64>,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Ticks after which an unfinished game is truncated.
    #[arg(long, default_value_t = 6_000)]
    max_ticks: u64,
    /// Simulated milliseconds between agent decisions.
    #[arg(long, default_value_t = 1_000)]
    decision_ms: u64,
    /// Simulated seconds the building phase lasts when it does not end on its own.
    #[arg(long, default_value_t = 5.0)]
    building_secs: f64,
    /// Directory receiving one JSON event log per game.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also write the combined log of every game.
    #[arg(long)]
    all_games: bool,
}

/// Entry point for the Tower Duel command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    run(&cli, config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SimulationConfig::from_toml_str(&contents)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let episodes = cli
        .episodes
        .or(config.episodes.max_episodes)
        .unwrap_or(DEFAULT_EPISODES);
    if episodes == 0 {
        bail!("at least one episode must be played");
    }
    config.episodes.max_episodes = Some(episodes);
    Ok(config)
}

fn run(cli: &Cli, config: SimulationConfig) -> Result<()> {
    if cli.tick_ms == 0 || cli.decision_ms == 0 {
        bail!("tick and decision intervals must be positive");
    }
    let building_time = Duration::try_from_secs_f64(cli.building_secs)
        .context("building time must be a non-negative number of seconds")?;
    let dt = Duration::from_millis(cli.tick_ms);
    let decision_interval = Duration::from_millis(cli.decision_ms);
    let seed = config.seed;
    let home_bases = config.arena.home_bases;

    let mut simulation = Simulation::new(config).context("simulation config rejected")?;
    let catalog = query::catalog(simulation.world()).clone();
    let mut skirmish = Skirmish::new(seed, home_bases);
    let mut attacker = RandomPolicy::new(Team::Attacker, seed, decision_interval);
    let mut defender = RandomPolicy::new(Team::Defender, seed, decision_interval);
    let mut writer = LogWriter::new(cli.output.clone())?;
    let mut summary = RunSummary::default();
    let mut episode_ticks = 0_u64;
    let mut building_elapsed = Duration::ZERO;

    info!(seed, episodes = ?simulation.config().episodes.max_episodes, "run started");
    while !simulation.should_halt() {
        match simulation.level_state() {
            LevelState::Intro => simulation.submit(Command::CompleteIntro),
            LevelState::Building => {
                building_elapsed += dt;
                if building_elapsed >= building_time {
                    simulation.submit(Command::CompleteBuilding);
                }
            }
            _ => building_elapsed = Duration::ZERO,
        }

        for (policy, team) in [(&mut attacker, Team::Attacker), (&mut defender, Team::Defender)] {
            let snapshot = simulation.snapshot(team);
            if let Some(action) = policy.decide(dt, &snapshot, &catalog) {
                simulation.submit_action(action);
            }
        }
        for command in skirmish.step(dt) {
            simulation.submit(command);
        }

        let report = simulation.tick(dt);
        skirmish.observe(&report.events);
        writer.append(report.records)?;
        episode_ticks += 1;

        if let Some(outcome) = report.outcome {
            summary.record_win(outcome.winner);
            info!(
                game = outcome.game,
                winner = outcome.winner.label(),
                ticks = episode_ticks,
                "game finished"
            );
            episode_ticks = 0;
        } else if episode_ticks >= cli.max_ticks {
            warn!(ticks = episode_ticks, "game truncated at the tick limit");
            writer.discard_game();
            let report = simulation.truncate_episode();
            skirmish.observe(&report.events);
            writer.append(report.records)?;
            summary.truncated += 1;
            episode_ticks = 0;
        }
    }

    summary.simulated_secs = simulation.elapsed().as_secs_f64();
    if cli.all_games {
        if let Some(path) = writer.write_all("all_games.json")? {
            info!(path = %path.display(), "combined log written");
        }
    }
    summary.write(cli.output.as_deref())?;
    info!(
        games = summary.games,
        attacker_wins = summary.attacker_wins,
        defender_wins = summary.defender_wins,
        truncated = summary.truncated,
        logs = writer.files_written(),
        "run finished"
    );
    Ok(())
}
