//! Agent contract and built-in strategies
//!
//! An engine is handed an immutable view of the position and an advisory
//! search clock; it must return exactly one move. The clock is informational:
//! the host never interrupts a strategy that overruns its budget, a slow
//! engine only slows down its own match.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use rand::seq::SliceRandom;

use tessera_core::{piece, Board, Move};

/// Advisory per-move deadline, created by the match runner for each search
#[derive(Clone, Copy, Debug)]
pub struct SearchClock {
    deadline: Instant,
    budget: Duration,
}

impl SearchClock {
    /// Start the clock: deadline = now + budget
    pub fn start(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn out_of_time(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// A pluggable competing strategy
///
/// Implementations take `&self` so a single instance can be shared across
/// worker threads; per-search state belongs on the stack of `search`.
/// Errors returned here are treated as a failure of the whole match.
pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    /// Produce one move for the position. Checking `clock` is the strategy's
    /// own responsibility; overrunning it is not separately signaled.
    fn search(&self, board: &Board, clock: &SearchClock) -> Result<Move>;
}

fn any_legal_move(board: &Board) -> Result<Vec<Move>> {
    let moves = board.legal_moves(true);
    if moves.is_empty() {
        bail!(
            "no legal moves for seat {} in an unfinished game",
            board.current_player()
        );
    }
    Ok(moves)
}

/// Plays a uniformly random legal move
pub struct RandomEngine {
    name: String,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self::named("Random")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, board: &Board, _clock: &SearchClock) -> Result<Move> {
        let moves = any_legal_move(board)?;
        Ok(*moves.choose(&mut rand::thread_rng()).unwrap())
    }
}

/// Always places the highest-scoring piece it still can, random among ties
pub struct LargestPieceEngine {
    name: String,
}

impl LargestPieceEngine {
    pub fn new() -> Self {
        Self::named("LargestPiece")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LargestPieceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for LargestPieceEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, board: &Board, _clock: &SearchClock) -> Result<Move> {
        let moves = any_legal_move(board)?;
        let best = moves.iter().map(|m| piece(m.piece).score).max().unwrap();
        let candidates: Vec<Move> = moves
            .into_iter()
            .filter(|m| piece(m.piece).score == best)
            .collect();
        Ok(*candidates.choose(&mut rand::thread_rng()).unwrap())
    }
}

/// Maximizes the number of open corners it has after its move
pub struct MostOpenCornersEngine {
    name: String,
}

impl MostOpenCornersEngine {
    pub fn new() -> Self {
        Self::named("MostOpenCorners")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for MostOpenCornersEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MostOpenCornersEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, board: &Board, _clock: &SearchClock) -> Result<Move> {
        let moves = any_legal_move(board)?;
        let me = board.current_player();
        let mut best = Vec::new();
        let mut best_corners = 0usize;
        for mv in moves {
            let mut scratch = board.clone();
            scratch.push(mv)?;
            let corners = scratch.corner_count(me);
            if best.is_empty() || corners > best_corners {
                best_corners = corners;
                best.clear();
            }
            if corners == best_corners {
                best.push(mv);
            }
        }
        Ok(*best.choose(&mut rand::thread_rng()).unwrap())
    }
}

/// Maximizes own mobility minus the summed mobility of all opponents
pub struct MaximizeMoveDifferenceEngine {
    name: String,
}

impl MaximizeMoveDifferenceEngine {
    pub fn new() -> Self {
        Self::named("MaxMoveDiff")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for MaximizeMoveDifferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MaximizeMoveDifferenceEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, board: &Board, _clock: &SearchClock) -> Result<Move> {
        let moves = any_legal_move(board)?;
        let me = board.current_player();
        let mut best = Vec::new();
        let mut best_diff = i64::MIN;
        for mv in moves {
            let mut scratch = board.clone();
            scratch.push(mv)?;
            let mut diff = 0i64;
            for p in 0..scratch.player_count() {
                let mobility = scratch.legal_moves_for(p, true).len() as i64;
                diff += if p == me { mobility } else { -mobility };
            }
            if diff > best_diff {
                best_diff = diff;
                best.clear();
            }
            if diff == best_diff {
                best.push(mv);
            }
        }
        Ok(*best.choose(&mut rand::thread_rng()).unwrap())
    }
}
