//! Integration tests for the tessera tournament runner
//!
//! Tests the full stack: game rules, the built-in strategies, the match
//! runner and the multi-threaded scheduler.

use std::sync::Arc;
use std::time::Duration;

use tessera_core::{Board, Move, MAX_PLAYERS};
use tessera_tournament::{
    Engine, LargestPieceEngine, MatchOutcome, MaximizeMoveDifferenceEngine, MostOpenCornersEngine,
    PlayOptions, RandomEngine, SearchClock, SortBy, SortDir, Standings, Tournament,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn full_roster() -> Vec<Arc<dyn Engine>> {
    vec![
        Arc::new(RandomEngine::new()),
        Arc::new(LargestPieceEngine::new()),
        Arc::new(MostOpenCornersEngine::new()),
        Arc::new(MaximizeMoveDifferenceEngine::new()),
    ]
}

fn quiet_options(games: u32) -> PlayOptions {
    PlayOptions {
        games,
        verbose_rankings: false,
        move_budget: Duration::from_secs(1),
        seed: Some(1234),
        ..PlayOptions::default()
    }
}

struct FailingEngine;

impl Engine for FailingEngine {
    fn name(&self) -> &str {
        "Failing"
    }

    fn search(&self, _board: &Board, _clock: &SearchClock) -> anyhow::Result<Move> {
        anyhow::bail!("deliberate test failure")
    }
}

// ============================================================================
// FULL GAMES
// ============================================================================

#[test]
fn test_full_game_plays_to_termination() {
    let roster = full_roster();
    let outcome = tessera_tournament::play_match(&roster, &[0, 1, 2, 3], Duration::from_secs(1));
    let (winners, scores, board) = match outcome {
        MatchOutcome::Finished {
            winners,
            scores,
            board,
            ..
        } => (winners, scores, board),
        MatchOutcome::Failed { error, .. } => panic!("match failed: {error}"),
    };

    assert!(board.finished());
    // Winners are exactly the agents with the highest score
    let top = *scores.iter().max().unwrap();
    for (agent, &score) in scores.iter().enumerate() {
        assert_eq!(winners.contains(&agent), score == top);
    }
    // Board scores and outcome scores agree seat by seat
    for seat in 0..MAX_PLAYERS {
        assert_eq!(board.score(seat), scores[seat]);
    }
}

#[test]
fn test_two_player_game_alternates_seats() {
    let roster = full_roster();
    let outcome = tessera_tournament::play_match(&roster, &[3, 1], Duration::from_secs(1));
    match outcome {
        MatchOutcome::Finished { seating, scores, .. } => {
            assert_eq!(seating, vec![3, 1]);
            assert_eq!(scores[0], 0);
            assert_eq!(scores[2], 0);
            assert!(scores[1] > 0 && scores[3] > 0);
        }
        MatchOutcome::Failed { error, .. } => panic!("match failed: {error}"),
    }
}

// ============================================================================
// TOURNAMENT RUNS
// ============================================================================

#[test]
fn test_tournament_counts_every_seat() {
    let tournament = Tournament::new(full_roster()).unwrap();
    let options = quiet_options(5);
    let results = tournament.play(&options).unwrap();

    assert_eq!(results.total_games(), 5);
    assert_eq!(results.failed_games, 0);
    // Each game seats the whole 4-agent roster
    assert_eq!(results.games, vec![5, 5, 5, 5]);
    // Every game crowns at least one winner
    assert!(results.wins.iter().sum::<u32>() >= 5);
    // Game counts sum to games x seats
    let seats: u32 = results.records.iter().map(|r| r.seating.len() as u32).sum();
    assert_eq!(results.games.iter().sum::<u32>(), seats);
}

#[test]
fn test_multi_worker_run_completes_all_games() {
    let tournament = Tournament::new(full_roster()).unwrap();
    let options = PlayOptions {
        workers: 4,
        players_per_game: 2,
        ..quiet_options(8)
    };
    let results = tournament.play(&options).unwrap();

    assert_eq!(results.total_games(), 8);
    assert_eq!(results.games.iter().sum::<u32>(), 16);
    // Rating deltas stay zero-sum no matter the completion order
    let drift: f64 = (0..4).map(|a| results.rating_delta(a)).sum();
    assert!(drift.abs() < 1e-9);
    // Rating bookkeeping in the records is consistent
    for record in &results.records {
        let change = record.ratings.as_ref().unwrap();
        for ((before, delta), after) in change.before.iter().zip(&change.delta).zip(&change.after)
        {
            assert!((before + delta - after).abs() < 1e-12);
        }
    }
}

#[test]
fn test_single_agent_tournament_skips_ratings() {
    let roster: Vec<Arc<dyn Engine>> = vec![Arc::new(RandomEngine::new())];
    let tournament = Tournament::new(roster).unwrap();
    let options = PlayOptions {
        players_per_game: 1,
        ..quiet_options(1)
    };
    let results = tournament.play(&options).unwrap();

    assert_eq!(results.games, vec![1]);
    assert_eq!(results.wins, vec![1]);
    assert!(results.total_scores[0] > 0);
    assert_eq!(results.ratings_start, results.ratings_end);
    assert!(results.records[0].ratings.is_none());
}

#[test]
fn test_failing_engine_spoils_only_its_own_matches() {
    let roster: Vec<Arc<dyn Engine>> = vec![
        Arc::new(RandomEngine::new()),
        Arc::new(LargestPieceEngine::new()),
        Arc::new(FailingEngine),
    ];
    let tournament = Tournament::new(roster).unwrap();
    let options = PlayOptions {
        players_per_game: 2,
        ..quiet_options(24)
    };
    let results = tournament.play(&options).unwrap();

    // Every scheduled game either finished or failed, none vanished
    assert_eq!(results.total_games() as u32 + results.failed_games, 24);
    // The failing engine never finishes a game
    assert_eq!(results.games[2], 0);
    // Two-seat tables without the failing engine all finish
    assert!(results.total_games() > 0);
    for record in &results.records {
        assert!(!record.seating.contains(&2));
    }
}

// ============================================================================
// STANDINGS
// ============================================================================

#[test]
fn test_refolding_records_reproduces_the_standings() {
    let tournament = Tournament::new(full_roster()).unwrap();
    let options = PlayOptions {
        players_per_game: 2,
        ..quiet_options(6)
    };
    let results = tournament.play(&options).unwrap();

    // Replaying the recorded deltas lands on the same final ratings
    let mut ratings = results.ratings_start.clone();
    for record in &results.records {
        let change = record.ratings.as_ref().unwrap();
        for (&agent, &delta) in record.seating.iter().zip(&change.delta) {
            ratings[agent] += delta;
        }
    }
    for (replayed, &actual) in ratings.iter().zip(&results.ratings_end) {
        assert!((replayed - actual).abs() < 1e-9);
    }
}

#[test]
fn test_ranking_table_lists_every_engine() {
    let mut standings = Standings::new(vec!["alpha".into(), "beta".into()]);
    let _ = standings.record_match(
        &[0, 1],
        &[0],
        &[30, 12],
        &tessera_tournament::elo::adjustments_n,
    );
    let table = standings.render(SortBy::Rating, SortDir::Desc);
    assert!(table.contains("alpha"));
    assert!(table.contains("beta"));
    // The winner ranks first
    let alpha_line = table.lines().position(|l| l.contains("alpha")).unwrap();
    let beta_line = table.lines().position(|l| l.contains("beta")).unwrap();
    assert!(alpha_line < beta_line);
}
