//! Tessera CLI - polyomino placement tournament runner
//!
//! Plays a configurable number of matches between the built-in strategies on
//! a pool of worker threads and prints running rankings. Ctrl-C stops the
//! run and reports the partial results.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tessera_tournament::{
    Engine, LargestPieceEngine, MaximizeMoveDifferenceEngine, MostOpenCornersEngine, PlayOptions,
    RandomEngine, SortBy, SortDir, Tournament,
};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Polyomino placement tournament runner")]
struct Cli {
    /// Competing strategy, repeatable; defaults to one of each built-in
    /// (random, largest-piece, most-open-corners, move-difference)
    #[arg(long = "engine", value_name = "NAME")]
    engines: Vec<String>,
    /// Number of matches to play
    #[arg(long, default_value = "10")]
    games: u32,
    /// Worker threads playing matches concurrently
    #[arg(long, default_value = "1")]
    workers: usize,
    /// Seats per match
    #[arg(long, default_value = "4")]
    players: usize,
    /// Advisory per-move time budget in seconds
    #[arg(long, default_value = "60")]
    move_seconds: u64,
    /// Seed for the seating draws; omit for a random tournament
    #[arg(long)]
    seed: Option<u64>,
    /// Print the terminal board of every match
    #[arg(long)]
    show_boards: bool,
    /// Suppress the periodic and final ranking tables
    #[arg(long)]
    no_rankings: bool,
    /// Ranking sort field (rating, games, score, avg-score, wins, win-rate)
    #[arg(long, default_value = "rating")]
    sort_by: SortBy,
    /// Ranking sort direction (asc, desc)
    #[arg(long, default_value = "desc")]
    sort_dir: SortDir,
}

fn build_engine(name: &str) -> Result<Arc<dyn Engine>> {
    Ok(match name {
        "random" => Arc::new(RandomEngine::new()),
        "largest-piece" => Arc::new(LargestPieceEngine::new()),
        "most-open-corners" => Arc::new(MostOpenCornersEngine::new()),
        "move-difference" => Arc::new(MaximizeMoveDifferenceEngine::new()),
        other => bail!(
            "unknown engine '{other}', expected one of: \
             random, largest-piece, most-open-corners, move-difference"
        ),
    })
}

fn default_roster() -> Vec<String> {
    ["random", "largest-piece", "most-open-corners", "move-difference"]
        .map(String::from)
        .to_vec()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let names = if cli.engines.is_empty() {
        default_roster()
    } else {
        cli.engines.clone()
    };
    let engines = names
        .iter()
        .map(|name| build_engine(name))
        .collect::<Result<Vec<_>>>()?;

    let tournament = Tournament::new(engines)?;
    let abort = tournament.abort_flag();
    ctrlc::set_handler(move || abort.store(true, Ordering::SeqCst))?;

    info!(
        engines = ?names,
        games = cli.games,
        workers = cli.workers,
        players = cli.players,
        "starting tournament"
    );

    let options = PlayOptions {
        games: cli.games,
        workers: cli.workers,
        players_per_game: cli.players,
        move_budget: Duration::from_secs(cli.move_seconds),
        seed: cli.seed,
        verbose_rankings: !cli.no_rankings,
        show_boards: cli.show_boards,
        sort_by: cli.sort_by,
        sort_dir: cli.sort_dir,
    };
    let results = tournament.play(&options)?;

    println!(
        "Played {} games ({} failed) in {:.1?} wall time, {:.1?} average per game",
        results.total_games(),
        results.failed_games,
        results.real_time,
        results.average_match_duration(),
    );
    Ok(())
}
