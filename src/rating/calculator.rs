//! Rating calculator for two-team matches
//!
//! Turns team ratings and an outcome into expected scores and one integer delta
//! per team, then spreads each team's delta over its members.

use crate::config::RatingConfig;
use crate::rating::elo::{expected_scores, rating_delta};
use crate::types::{MatchType, Outcome, Rating};
use serde::{Deserialize, Serialize};

/// Result of settling one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Expected scores of (team 1, team 2)
    pub expected_scores: (f64, f64),
    /// Rating change applied to every member of (team 1, team 2)
    pub team_deltas: (Rating, Rating),
}

/// Elo rating calculator
#[derive(Debug, Clone, Default)]
pub struct EloCalculator {
    config: RatingConfig,
}

impl EloCalculator {
    /// Create a new calculator from a validated configuration
    pub fn new(config: RatingConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    /// Rating for newly registered players
    pub fn starting_rating(&self) -> Rating {
        self.config.starting_rating
    }

    pub fn k_factor(&self) -> i64 {
        self.config.k_factor
    }

    /// Expected scores and team deltas for a match between two team ratings
    pub fn settle(&self, team_ratings: (f64, f64), outcome: Outcome) -> Settlement {
        let expected = expected_scores(team_ratings.0, team_ratings.1);
        let actual = outcome.actual_scores();
        let rounding = self.config.delta_rounding;

        Settlement {
            expected_scores: expected,
            team_deltas: (
                rating_delta(self.config.k_factor, actual.0, expected.0, rounding),
                rating_delta(self.config.k_factor, actual.1, expected.1, rounding),
            ),
        }
    }

    /// New ratings in participant order: team 1 members take the first delta,
    /// team 2 members the second.
    pub fn apply(
        &self,
        match_type: MatchType,
        ratings_before: &[Rating],
        settlement: &Settlement,
    ) -> Vec<Rating> {
        let team_size = match_type.team_size();
        ratings_before
            .iter()
            .enumerate()
            .map(|(i, rating)| {
                if i < team_size {
                    rating + settlement.team_deltas.0
                } else {
                    rating + settlement.team_deltas.1
                }
            })
            .collect()
    }

    /// Current configuration as JSON
    pub fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}
