//! Single-match runner
//!
//! Plays one game from the opening position to termination and reports it as
//! a `MatchOutcome`. Any engine error or rule violation fails the match in
//! isolation; the caller decides what a failed match means for the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use tessera_core::Board;

use crate::engine::{Engine, SearchClock};
use crate::outcome::MatchOutcome;

/// Play one match between the seated agents
///
/// `roster` is the full tournament roster; `seating` maps seats (turn order)
/// to roster indices. Scores in the returned outcome are indexed over the
/// full roster, with zero for agents not at the table.
pub fn play_match(
    roster: &[Arc<dyn Engine>],
    seating: &[usize],
    budget: Duration,
) -> MatchOutcome {
    let started = Instant::now();
    let fail = |error: String| {
        warn!(seating = ?seating, error = %error, "match failed");
        MatchOutcome::Failed {
            seating: seating.to_vec(),
            duration: started.elapsed(),
            error,
        }
    };

    let mut board = match Board::new(seating.len()) {
        Ok(board) => board,
        Err(err) => return fail(err.to_string()),
    };

    while !board.finished() {
        let seat = board.current_player();
        let engine = &roster[seating[seat]];
        let clock = SearchClock::start(budget);
        let mv = match engine.search(&board, &clock) {
            Ok(mv) => mv,
            Err(err) => {
                return fail(format!("engine '{}' at seat {seat}: {err:#}", engine.name()))
            }
        };
        if let Err(err) = board.push(mv) {
            return fail(format!(
                "engine '{}' at seat {seat} played {mv}: {err}",
                engine.name()
            ));
        }
    }

    let winners = match board.winners() {
        Some(seats) => seats.into_iter().map(|seat| seating[seat]).collect(),
        None => return fail("game failed to terminate".to_string()),
    };

    let mut scores = vec![0u32; roster.len()];
    for (seat, &agent) in seating.iter().enumerate() {
        scores[agent] = board.score(seat);
    }

    MatchOutcome::Finished {
        seating: seating.to_vec(),
        winners,
        scores,
        board,
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    use crate::engine::RandomEngine;
    use tessera_core::Move;

    struct FailingEngine;

    impl Engine for FailingEngine {
        fn name(&self) -> &str {
            "Failing"
        }

        fn search(&self, _board: &Board, _clock: &SearchClock) -> anyhow::Result<Move> {
            bail!("deliberate test failure")
        }
    }

    fn random_roster(n: usize) -> Vec<Arc<dyn Engine>> {
        (0..n)
            .map(|i| Arc::new(RandomEngine::named(format!("r{i}"))) as Arc<dyn Engine>)
            .collect()
    }

    #[test]
    fn test_two_player_match_finishes() {
        let roster = random_roster(3);
        let outcome = play_match(&roster, &[2, 0], Duration::from_secs(1));
        match outcome {
            MatchOutcome::Finished {
                seating,
                winners,
                scores,
                board,
                ..
            } => {
                assert_eq!(seating, vec![2, 0]);
                assert!(board.finished());
                assert!(!winners.is_empty());
                assert!(winners.iter().all(|&w| seating.contains(&w)));
                // Scores cover the full roster, zero for the benched agent
                assert_eq!(scores.len(), 3);
                assert_eq!(scores[1], 0);
                assert!(scores[0] > 0 && scores[2] > 0);
            }
            MatchOutcome::Failed { error, .. } => panic!("match failed: {error}"),
        }
    }

    #[test]
    fn test_single_player_match_finishes() {
        let roster = random_roster(1);
        let outcome = play_match(&roster, &[0], Duration::from_secs(1));
        match outcome {
            MatchOutcome::Finished { winners, .. } => assert_eq!(winners, vec![0]),
            MatchOutcome::Failed { error, .. } => panic!("match failed: {error}"),
        }
    }

    #[test]
    fn test_engine_error_fails_the_match() {
        let roster: Vec<Arc<dyn Engine>> = vec![
            Arc::new(RandomEngine::new()),
            Arc::new(FailingEngine),
        ];
        let outcome = play_match(&roster, &[0, 1], Duration::from_secs(1));
        match outcome {
            MatchOutcome::Failed { seating, error, .. } => {
                assert_eq!(seating, vec![0, 1]);
                assert!(error.contains("deliberate test failure"));
            }
            MatchOutcome::Finished { .. } => panic!("expected the match to fail"),
        }
    }
}
