//! Elo rating adjustment
//!
//! Standard logistic Elo for two players, plus an N-player generalization
//! that averages the pairwise adjustment against every opponent. The
//! N-player deltas are zero-sum by construction.

/// K-factor for rating updates (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Rating every agent starts a tournament with
pub const SEED_RATING: f64 = 0.0;

/// Probability that `rating` beats `opponent`
pub fn win_probability(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

/// Rating change for one player of a two-player game
///
/// `score` is 1 for a win, 0.5 for a draw, 0 for a loss.
pub fn adjustment_2(rating: f64, opponent: f64, score: f64, k: f64) -> f64 {
    k * (score - win_probability(rating, opponent))
}

/// Rating changes for the players of an N-player game
///
/// Match scores are compared pairwise: beating an opponent on points counts
/// as a win against them, matching them counts as a draw. Each player's
/// delta is the average of its pairwise adjustments, so a game between
/// evenly rated players moves nobody when everyone ties.
pub fn adjustments_n(ratings: &[f64], scores: &[f64]) -> Vec<f64> {
    let n = ratings.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut deltas = vec![0.0; n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let outcome = if scores[i] > scores[j] {
                1.0
            } else if scores[i] < scores[j] {
                0.0
            } else {
                0.5
            };
            deltas[i] += adjustment_2(ratings[i], ratings[j], outcome, K_FACTOR);
        }
        deltas[i] /= (n - 1) as f64;
    }
    deltas
}
