//! Match and tournament result records

use std::time::Duration;

use tessera_core::Board;

/// Result of one match runner invocation
///
/// `Failed` is the single failure signal the scheduler checks: it increments
/// no counters and does not halt the tournament.
#[derive(Clone, Debug)]
pub enum MatchOutcome {
    Finished {
        /// Turn order as global agent indices
        seating: Vec<usize>,
        /// Winning agents, global indices, never empty
        winners: Vec<usize>,
        /// Scores indexed over the full roster, zero for non-participants
        scores: Vec<u32>,
        /// Terminal position
        board: Board,
        duration: Duration,
    },
    Failed {
        seating: Vec<usize>,
        duration: Duration,
        error: String,
    },
}

impl MatchOutcome {
    pub fn seating(&self) -> &[usize] {
        match self {
            MatchOutcome::Finished { seating, .. } => seating,
            MatchOutcome::Failed { seating, .. } => seating,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            MatchOutcome::Finished { duration, .. } => *duration,
            MatchOutcome::Failed { duration, .. } => *duration,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MatchOutcome::Failed { .. })
    }
}

/// Ratings of a match's participants around one rating update, in seating
/// order
#[derive(Clone, Debug)]
pub struct RatingChange {
    pub before: Vec<f64>,
    pub delta: Vec<f64>,
    pub after: Vec<f64>,
}

/// One completed match as kept in the final report
#[derive(Clone, Debug)]
pub struct MatchRecord {
    /// Turn order as global agent indices
    pub seating: Vec<usize>,
    /// Terminal position
    pub board: Board,
    pub duration: Duration,
    /// None for single-participant matches, which skip rating updates
    pub ratings: Option<RatingChange>,
}

impl MatchRecord {
    pub fn involves(&self, agent: usize) -> bool {
        self.seating.contains(&agent)
    }
}

/// Immutable final report of one tournament run
#[derive(Clone, Debug)]
pub struct TournamentResults {
    /// Per-match detail for every successfully completed match
    pub records: Vec<MatchRecord>,
    pub engine_names: Vec<String>,
    /// Completed (non-failed) matches each agent took part in
    pub games: Vec<u32>,
    pub wins: Vec<u32>,
    pub total_scores: Vec<u32>,
    pub ratings_start: Vec<f64>,
    pub ratings_end: Vec<f64>,
    /// Matches that failed to terminate and were excluded from all counters
    pub failed_games: u32,
    /// Wall-clock time of the whole run
    pub real_time: Duration,
    /// Summed duration of the individual games
    pub total_time: Duration,
}

impl TournamentResults {
    pub fn total_games(&self) -> usize {
        self.records.len()
    }

    pub fn engine_count(&self) -> usize {
        self.engine_names.len()
    }

    pub fn win_rate(&self, agent: usize) -> f64 {
        self.wins[agent] as f64 / (self.games[agent].max(1)) as f64
    }

    pub fn avg_score(&self, agent: usize) -> f64 {
        self.total_scores[agent] as f64 / (self.games[agent].max(1)) as f64
    }

    pub fn rating_delta(&self, agent: usize) -> f64 {
        self.ratings_end[agent] - self.ratings_start[agent]
    }

    pub fn average_match_duration(&self) -> Duration {
        self.total_time / (self.total_games().max(1)) as u32
    }

    pub fn matches_for(&self, agent: usize) -> Vec<&MatchRecord> {
        self.records.iter().filter(|r| r.involves(agent)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> TournamentResults {
        let board = Board::new(2).unwrap();
        TournamentResults {
            records: vec![
                MatchRecord {
                    seating: vec![0, 2],
                    board: board.clone(),
                    duration: Duration::from_secs(2),
                    ratings: Some(RatingChange {
                        before: vec![0.0, 0.0],
                        delta: vec![16.0, -16.0],
                        after: vec![16.0, -16.0],
                    }),
                },
                MatchRecord {
                    seating: vec![1, 2],
                    board,
                    duration: Duration::from_secs(4),
                    ratings: None,
                },
            ],
            engine_names: vec!["a".into(), "b".into(), "c".into()],
            games: vec![1, 1, 2],
            wins: vec![1, 0, 1],
            total_scores: vec![30, 10, 44],
            ratings_start: vec![0.0, 0.0, 0.0],
            ratings_end: vec![16.0, -4.0, -12.0],
            failed_games: 1,
            real_time: Duration::from_secs(3),
            total_time: Duration::from_secs(6),
        }
    }

    #[test]
    fn test_accessors() {
        let results = sample_results();
        assert_eq!(results.total_games(), 2);
        assert_eq!(results.engine_count(), 3);
        assert_eq!(results.win_rate(0), 1.0);
        assert_eq!(results.win_rate(1), 0.0);
        assert_eq!(results.avg_score(2), 22.0);
        assert_eq!(results.rating_delta(2), -12.0);
        assert_eq!(results.average_match_duration(), Duration::from_secs(3));
        assert_eq!(results.matches_for(2).len(), 2);
        assert_eq!(results.matches_for(0).len(), 1);
    }

    #[test]
    fn test_zero_games_accessors_do_not_divide_by_zero() {
        let mut results = sample_results();
        results.games = vec![0, 0, 0];
        results.records.clear();
        results.total_time = Duration::ZERO;
        assert_eq!(results.win_rate(0), 0.0);
        assert_eq!(results.avg_score(0), 0.0);
        assert_eq!(results.average_match_duration(), Duration::ZERO);
    }

    #[test]
    fn test_outcome_failure_flag() {
        let seating = vec![0, 1];
        let failed = MatchOutcome::Failed {
            seating: seating.clone(),
            duration: Duration::from_millis(5),
            error: "agent exploded".into(),
        };
        assert!(failed.is_failed());
        assert_eq!(failed.seating(), &seating[..]);
        assert_eq!(failed.duration(), Duration::from_millis(5));
    }
}
