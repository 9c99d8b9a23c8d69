//! Tournament scheduler
//!
//! Runs a fixed number of matches between randomly seated agents on a pool
//! of worker threads and folds results into running standings in completion
//! order. An abort flag stops job submission early and returns the partial
//! results accumulated so far.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, Receiver, Sender};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use tessera_core::MAX_PLAYERS;

use crate::elo;
use crate::engine::Engine;
use crate::outcome::{MatchOutcome, MatchRecord, TournamentResults};
use crate::runner::play_match;
use crate::standings::{RatingUpdater, SortBy, SortDir, Standings};

/// Invalid tournament setup, reported before any game is played
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tournament needs at least one engine")]
    NoEngines,
    #[error(
        "players per game must be between 1 and {max} and at most the \
         roster size {roster}, got {requested}"
    )]
    InvalidPlayersPerGame {
        requested: usize,
        roster: usize,
        max: usize,
    },
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("game count must be at least 1")]
    NoGames,
    #[error("per-move time budget must be greater than zero")]
    ZeroBudget,
}

/// Knobs for one `Tournament::play` run
#[derive(Clone, Debug)]
pub struct PlayOptions {
    /// Number of matches to schedule
    pub games: u32,
    /// Worker threads playing matches concurrently
    pub workers: usize,
    /// Seats per match, capped by the board's player limit
    pub players_per_game: usize,
    /// Advisory per-move time budget handed to the engines
    pub move_budget: Duration,
    /// Seed for seating draws; None draws from the OS
    pub seed: Option<u64>,
    /// Print periodic and final ranking tables
    pub verbose_rankings: bool,
    /// Print the terminal board of every match
    pub show_boards: bool,
    pub sort_by: SortBy,
    pub sort_dir: SortDir,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            games: 1,
            workers: 1,
            players_per_game: MAX_PLAYERS,
            move_budget: Duration::from_secs(60),
            seed: None,
            verbose_rankings: true,
            show_boards: false,
            sort_by: SortBy::Rating,
            sort_dir: SortDir::Desc,
        }
    }
}

/// One scheduled match: seats in turn order, as global agent indices
#[derive(Clone, Debug)]
struct MatchJob {
    seating: Vec<usize>,
}

/// A roster of agents and the machinery to play them against each other
pub struct Tournament {
    engines: Vec<Arc<dyn Engine>>,
    abort: Arc<AtomicBool>,
    rating_updater: Box<RatingUpdater>,
}

impl Tournament {
    pub fn new(engines: Vec<Arc<dyn Engine>>) -> Result<Self, ConfigError> {
        if engines.is_empty() {
            return Err(ConfigError::NoEngines);
        }
        Ok(Self {
            engines,
            abort: Arc::new(AtomicBool::new(false)),
            rating_updater: Box::new(elo::adjustments_n),
        })
    }

    /// Swap the default Elo updater for a custom rating scheme
    pub fn with_rating_updater(
        mut self,
        updater: impl Fn(&[f64], &[f64]) -> Vec<f64> + Send + Sync + 'static,
    ) -> Self {
        self.rating_updater = Box::new(updater);
        self
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    pub fn engine_names(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.name().to_string()).collect()
    }

    /// Shared flag that stops the run when set (e.g. from a Ctrl-C handler)
    ///
    /// Games already in flight are played to completion but their results
    /// are discarded; everything folded in before the flag was seen is
    /// returned as partial results.
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Play the whole tournament and return the final report
    pub fn play(&self, options: &PlayOptions) -> Result<TournamentResults, ConfigError> {
        let roster = self.engines.len();
        let seats = options.players_per_game;
        if seats == 0 || seats > MAX_PLAYERS || seats > roster {
            return Err(ConfigError::InvalidPlayersPerGame {
                requested: seats,
                roster,
                max: MAX_PLAYERS,
            });
        }
        if options.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if options.games == 0 {
            return Err(ConfigError::NoGames);
        }
        if options.move_budget.is_zero() {
            return Err(ConfigError::ZeroBudget);
        }

        let started = Instant::now();
        let mut jobs = self.draw_jobs(options);
        let (job_tx, res_rx, handles) = self.spawn_workers(options);

        let mut standings = Standings::new(self.engine_names());
        let mut records: Vec<MatchRecord> = Vec::new();
        let mut failed_games = 0u32;
        let mut total_time = Duration::ZERO;
        let mut in_flight = 0usize;
        let mut next_job = jobs.pop_front();

        let rankings_every = options.workers.max(10) as u32;

        loop {
            if self.abort.load(Ordering::SeqCst) {
                info!("abort requested, returning partial results");
                break;
            }
            if next_job.is_none() && in_flight == 0 {
                break;
            }

            let outcome = if let Some(job) = next_job.clone() {
                select! {
                    send(job_tx, job) -> sent => {
                        if sent.is_err() {
                            break;
                        }
                        in_flight += 1;
                        next_job = jobs.pop_front();
                        continue;
                    }
                    recv(res_rx) -> msg => match msg {
                        Ok(outcome) => outcome,
                        Err(_) => break,
                    },
                }
            } else {
                match res_rx.recv() {
                    Ok(outcome) => outcome,
                    Err(_) => break,
                }
            };

            in_flight -= 1;
            self.fold_outcome(
                outcome,
                &mut standings,
                &mut records,
                &mut failed_games,
                &mut total_time,
                options,
            );

            let played = records.len() as u32;
            if options.verbose_rankings
                && played > 0
                && played % rankings_every == 0
                && played != options.games
            {
                println!("{}", standings.render(options.sort_by, options.sort_dir));
            }
        }

        // Dropping both channel ends releases the workers
        drop(job_tx);
        drop(res_rx);
        for handle in handles {
            let _ = handle.join();
        }

        let results = TournamentResults {
            engine_names: standings.names().to_vec(),
            games: standings.games().to_vec(),
            wins: standings.wins().to_vec(),
            total_scores: standings.total_scores().to_vec(),
            ratings_start: vec![elo::SEED_RATING; roster],
            ratings_end: standings.ratings().to_vec(),
            records,
            failed_games,
            real_time: started.elapsed(),
            total_time,
        };

        if options.verbose_rankings {
            println!("{}", standings.render(options.sort_by, options.sort_dir));
        }
        Ok(results)
    }

    /// Draw the seating for every scheduled match up front
    fn draw_jobs(&self, options: &PlayOptions) -> VecDeque<MatchJob> {
        let mut rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        (0..options.games)
            .map(|_| {
                let mut seating: Vec<usize> = (0..self.engines.len()).collect();
                seating.shuffle(&mut rng);
                seating.truncate(options.players_per_game);
                MatchJob { seating }
            })
            .collect()
    }

    fn spawn_workers(
        &self,
        options: &PlayOptions,
    ) -> (
        Sender<MatchJob>,
        Receiver<MatchOutcome>,
        Vec<thread::JoinHandle<()>>,
    ) {
        // Rendezvous channels: a job is handed over only when a worker is
        // free, so an abort leaves at most one game per worker in flight
        let (job_tx, job_rx) = bounded::<MatchJob>(0);
        let (res_tx, res_rx) = bounded::<MatchOutcome>(0);
        let handles = (0..options.workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                let res_tx = res_tx.clone();
                let roster = self.engines.clone();
                let budget = options.move_budget;
                thread::spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        let outcome = play_match(&roster, &job.seating, budget);
                        if res_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        (job_tx, res_rx, handles)
    }

    /// Fold one finished or failed match into the running state
    fn fold_outcome(
        &self,
        outcome: MatchOutcome,
        standings: &mut Standings,
        records: &mut Vec<MatchRecord>,
        failed_games: &mut u32,
        total_time: &mut Duration,
        options: &PlayOptions,
    ) {
        if outcome.is_failed() {
            // Failed games count nowhere, but each gets its own notice
            *failed_games += 1;
            warn!(
                seating = ?outcome.seating(),
                duration = ?outcome.duration(),
                "game failed to terminate"
            );
            return;
        }
        let MatchOutcome::Finished {
            seating,
            winners,
            scores,
            board,
            duration,
        } = outcome
        else {
            return;
        };

        let ratings = standings.record_match(&seating, &winners, &scores, &self.rating_updater);
        *total_time += duration;

        let names: Vec<&str> = seating.iter().map(|&a| self.engines[a].name()).collect();
        let winner_names: Vec<&str> = winners.iter().map(|&a| self.engines[a].name()).collect();
        let table_scores: Vec<u32> = seating.iter().map(|&a| scores[a]).collect();
        info!(
            game = records.len() + 1,
            players = ?names,
            scores = ?table_scores,
            winners = ?winner_names,
            "match finished"
        );
        debug!(ply = board.ply(), ?duration, "match detail");
        if options.show_boards {
            println!("{board}");
        }

        records.push(MatchRecord {
            seating,
            board,
            duration,
            ratings,
        });
    }
}
