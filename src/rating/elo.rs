//! Logistic (Elo) expected score and delta formulas
//!
//! Pure functions over team ratings. The expected score comes from the
//! skillratings crate; the second team's share is derived as the complement so
//! the pair always sums to exactly 1.

use crate::config::DeltaRounding;
use crate::types::Rating;
use skillratings::elo::{expected_score, EloRating};

/// Expected scores of (team A, team B) given their team ratings
pub fn expected_scores(team_a: f64, team_b: f64) -> (f64, f64) {
    let (expected_a, _) = expected_score(
        &EloRating { rating: team_a },
        &EloRating { rating: team_b },
    );
    (expected_a, 1.0 - expected_a)
}

/// Integer rating change for one team
pub fn rating_delta(k_factor: i64, actual: f64, expected: f64, rounding: DeltaRounding) -> Rating {
    rounding.apply(k_factor as f64 * (actual - expected))
}
