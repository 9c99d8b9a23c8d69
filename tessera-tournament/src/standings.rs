//! Running tournament standings
//!
//! The scheduler folds every finished match into a `Standings` value and
//! renders ranking tables from it, both periodically during a run and at the
//! end. Failed matches never reach this module.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::elo::SEED_RATING;
use crate::outcome::RatingChange;

/// Computes rating deltas from per-participant ratings and match scores
///
/// Both slices are in seating order; the returned deltas must line up with
/// them. Swappable so a tournament can rate with something other than Elo.
pub type RatingUpdater = dyn Fn(&[f64], &[f64]) -> Vec<f64> + Send + Sync;

/// Field the ranking table is sorted on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortBy {
    Rating,
    Games,
    Score,
    AvgScore,
    Wins,
    WinRate,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" | "elo" => Ok(SortBy::Rating),
            "games" => Ok(SortBy::Games),
            "score" => Ok(SortBy::Score),
            "avg-score" => Ok(SortBy::AvgScore),
            "wins" => Ok(SortBy::Wins),
            "win-rate" => Ok(SortBy::WinRate),
            other => Err(format!(
                "unknown sort field '{other}', expected one of: \
                 rating, games, score, avg-score, wins, win-rate"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(format!("unknown sort direction '{other}', try 'asc' or 'desc'")),
        }
    }
}

/// Aggregated per-agent counters, indexed by global agent index
#[derive(Clone, Debug)]
pub struct Standings {
    names: Vec<String>,
    games: Vec<u32>,
    wins: Vec<u32>,
    total_scores: Vec<u32>,
    ratings: Vec<f64>,
}

impl Standings {
    pub fn new(names: Vec<String>) -> Self {
        let n = names.len();
        Self {
            names,
            games: vec![0; n],
            wins: vec![0; n],
            total_scores: vec![0; n],
            ratings: vec![SEED_RATING; n],
        }
    }

    pub fn agent_count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn games(&self) -> &[u32] {
        &self.games
    }

    pub fn wins(&self) -> &[u32] {
        &self.wins
    }

    pub fn total_scores(&self) -> &[u32] {
        &self.total_scores
    }

    pub fn ratings(&self) -> &[f64] {
        &self.ratings
    }

    /// Fold one finished match into the counters
    ///
    /// `scores` covers the full roster (zero for agents not at the table);
    /// `seating` and `winners` hold global agent indices. Ratings only move
    /// when at least two agents were at the table, and the returned change
    /// is in seating order.
    pub fn record_match(
        &mut self,
        seating: &[usize],
        winners: &[usize],
        scores: &[u32],
        updater: &RatingUpdater,
    ) -> Option<RatingChange> {
        for &agent in seating {
            self.games[agent] += 1;
        }
        for &agent in winners {
            self.wins[agent] += 1;
        }
        for (agent, &score) in scores.iter().enumerate() {
            self.total_scores[agent] += score;
        }

        if seating.len() < 2 {
            return None;
        }

        let before: Vec<f64> = seating.iter().map(|&a| self.ratings[a]).collect();
        let match_scores: Vec<f64> = seating.iter().map(|&a| scores[a] as f64).collect();
        let delta = updater(&before, &match_scores);
        let after: Vec<f64> = before.iter().zip(&delta).map(|(b, d)| b + d).collect();
        for (&agent, &rating) in seating.iter().zip(&after) {
            self.ratings[agent] = rating;
        }
        Some(RatingChange { before, delta, after })
    }

    fn sort_key(&self, field: SortBy, agent: usize) -> f64 {
        let games = self.games[agent];
        match field {
            SortBy::Rating => self.ratings[agent],
            SortBy::Games => games as f64,
            SortBy::Score => self.total_scores[agent] as f64,
            SortBy::AvgScore if games > 0 => self.total_scores[agent] as f64 / games as f64,
            SortBy::Wins => self.wins[agent] as f64,
            SortBy::WinRate if games > 0 => self.wins[agent] as f64 / games as f64,
            // Agents without a finished game sink to the bottom
            SortBy::AvgScore | SortBy::WinRate => f64::NEG_INFINITY,
        }
    }

    /// Agent indices in display order, ties broken by roster order
    pub fn ranking(&self, sort_by: SortBy, sort_dir: SortDir) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.agent_count()).collect();
        // Stable sort keeps roster order for equal keys
        order.sort_by(|&a, &b| {
            let (ka, kb) = (self.sort_key(sort_by, a), self.sort_key(sort_by, b));
            let cmp = ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal);
            match sort_dir {
                SortDir::Asc => cmp,
                SortDir::Desc => cmp.reverse(),
            }
        });
        order
    }

    /// Render the ranking table
    pub fn render(&self, sort_by: SortBy, sort_dir: SortDir) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<4} {:<24} {:>7} {:>6} {:>10} {:>10} {:>6} {:>9}",
            "Rank", "Name", "Rating", "Games", "Score", "Avg Score", "Wins", "Win Rate"
        );
        for (rank, agent) in self.ranking(sort_by, sort_dir).into_iter().enumerate() {
            let games = self.games[agent];
            let avg_score = if games > 0 {
                format!("{:>10.2}", self.total_scores[agent] as f64 / games as f64)
            } else {
                format!("{:>10}", "-")
            };
            let win_rate = if games > 0 {
                format!("{:>8.2}%", self.wins[agent] as f64 / games as f64 * 100.0)
            } else {
                format!("{:>9}", "-")
            };
            let _ = writeln!(
                out,
                "{:>4} {:<24.24} {:>7.1} {:>6} {:>10} {avg_score} {:>6} {win_rate}",
                rank + 1,
                self.names[agent],
                self.ratings[agent],
                games,
                self.total_scores[agent],
                self.wins[agent],
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elo;

    fn standings(n: usize) -> Standings {
        Standings::new((0..n).map(|i| format!("agent-{i}")).collect())
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("rating".parse::<SortBy>().unwrap(), SortBy::Rating);
        assert_eq!("elo".parse::<SortBy>().unwrap(), SortBy::Rating);
        assert_eq!("win-rate".parse::<SortBy>().unwrap(), SortBy::WinRate);
        assert!("bogus".parse::<SortBy>().is_err());
        assert_eq!("asc".parse::<SortDir>().unwrap(), SortDir::Asc);
        assert!("up".parse::<SortDir>().is_err());
    }

    #[test]
    fn test_record_match_updates_counters() {
        let mut standings = standings(3);
        let change = standings
            .record_match(&[2, 0], &[0], &[18, 0, 12], &elo::adjustments_n)
            .unwrap();

        assert_eq!(standings.games(), &[1, 0, 1]);
        assert_eq!(standings.wins(), &[1, 0, 0]);
        assert_eq!(standings.total_scores(), &[18, 0, 12]);

        // Seating order is [2, 0]: agent 0 won and gains, agent 2 drops
        assert_eq!(change.before, vec![0.0, 0.0]);
        assert!(change.delta[1] > 0.0 && change.delta[0] < 0.0);
        assert!(standings.ratings()[0] > 0.0);
        assert!(standings.ratings()[2] < 0.0);
        assert_eq!(standings.ratings()[1], elo::SEED_RATING);
    }

    #[test]
    fn test_single_participant_match_skips_ratings() {
        let mut standings = standings(2);
        let change = standings.record_match(&[1], &[1], &[0, 40], &elo::adjustments_n);
        assert!(change.is_none());
        assert_eq!(standings.games(), &[0, 1]);
        assert_eq!(standings.wins(), &[0, 1]);
        assert_eq!(standings.ratings(), &[elo::SEED_RATING; 2]);
    }

    #[test]
    fn test_ranking_ties_keep_roster_order() {
        let standings = standings(3);
        assert_eq!(standings.ranking(SortBy::Rating, SortDir::Desc), vec![0, 1, 2]);
        assert_eq!(standings.ranking(SortBy::Rating, SortDir::Asc), vec![0, 1, 2]);
    }

    #[test]
    fn test_ranking_orders_by_field() {
        let mut standings = standings(3);
        standings
            .record_match(&[0, 1, 2], &[1], &[5, 20, 10], &elo::adjustments_n)
            .unwrap();
        assert_eq!(standings.ranking(SortBy::Score, SortDir::Desc), vec![1, 2, 0]);
        assert_eq!(standings.ranking(SortBy::Score, SortDir::Asc), vec![0, 2, 1]);
        assert_eq!(standings.ranking(SortBy::Wins, SortDir::Desc)[0], 1);
    }

    #[test]
    fn test_unplayed_agents_rank_last_on_rate_fields() {
        let mut standings = standings(3);
        standings
            .record_match(&[0, 1], &[1], &[5, 20, 0], &elo::adjustments_n)
            .unwrap();
        let order = standings.ranking(SortBy::WinRate, SortDir::Desc);
        assert_eq!(*order.last().unwrap(), 2);
    }

    #[test]
    fn test_render_contains_names_and_placeholders() {
        let mut standings = standings(2);
        let _ = standings.record_match(&[0], &[0], &[33, 0], &elo::adjustments_n);
        let table = standings.render(SortBy::Rating, SortDir::Desc);
        assert!(table.contains("agent-0"));
        assert!(table.contains("Win Rate"));
        // agent-1 has no games: rate columns show a dash
        let unplayed = table.lines().find(|l| l.contains("agent-1")).unwrap();
        assert!(unplayed.contains('-'));
    }
}
