//! Tessera Tournament - match scheduling and agent rating
//!
//! This crate turns a roster of agents into tournament results:
//! - The `Engine` trait and four built-in baseline strategies
//! - A single-match runner with per-match failure isolation
//! - A multi-threaded scheduler that folds results in completion order
//! - Elo ratings generalized to N-player games
//! - Running standings with sortable ranking tables

pub mod elo;
pub mod engine;
pub mod outcome;
pub mod runner;
pub mod standings;
pub mod tournament;

// Re-exports for convenient access
pub use engine::{
    Engine, LargestPieceEngine, MaximizeMoveDifferenceEngine, MostOpenCornersEngine, RandomEngine,
    SearchClock,
};
pub use outcome::{MatchOutcome, MatchRecord, RatingChange, TournamentResults};
pub use runner::play_match;
pub use standings::{RatingUpdater, SortBy, SortDir, Standings};
pub use tournament::{ConfigError, PlayOptions, Tournament};
