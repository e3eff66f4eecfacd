//! Common types used throughout the ladder

use crate::error::LadderError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for players (exact, case-sensitive match)
pub type PlayerId = String;

/// Integer skill rating
pub type Rating = i64;

/// Kind of match, which fixes the team size and how team ratings are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Singles,
    Doubles,
}

impl MatchType {
    /// Players per side
    pub fn team_size(self) -> usize {
        match self {
            MatchType::Singles => 1,
            MatchType::Doubles => 2,
        }
    }

    /// Players in a full match, both sides
    pub fn participant_count(self) -> usize {
        2 * self.team_size()
    }

    /// Team rating from member ratings: the rating itself for singles,
    /// the unrounded mean for doubles. `members` must hold exactly one team.
    pub fn team_rating(self, members: &[Rating]) -> Result<f64, LadderError> {
        match (self, members) {
            (MatchType::Singles, [rating]) => Ok(*rating as f64),
            (MatchType::Doubles, [first, second]) => Ok((first + second) as f64 / 2.0),
            _ => Err(LadderError::validation(format!(
                "a {} team has {} players, got {}",
                self,
                self.team_size(),
                members.len()
            ))),
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Singles => write!(f, "singles"),
            MatchType::Doubles => write!(f, "doubles"),
        }
    }
}

impl FromStr for MatchType {
    type Err = LadderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "singles" => Ok(MatchType::Singles),
            "d" | "doubles" => Ok(MatchType::Doubles),
            other => Err(LadderError::validation(format!(
                "unknown match type '{}', expected singles (S) or doubles (D)",
                other
            ))),
        }
    }
}

/// Result of a match from team 1's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    TeamOneLost,
    TeamOneWon,
}

impl Outcome {
    /// Score as written to the match history (0 or 1)
    pub fn score(self) -> u8 {
        match self {
            Outcome::TeamOneLost => 0,
            Outcome::TeamOneWon => 1,
        }
    }

    /// Actual scores for (team 1, team 2); they always sum to 1
    pub fn actual_scores(self) -> (f64, f64) {
        let team_one = f64::from(self.score());
        (team_one, 1.0 - team_one)
    }
}

impl TryFrom<i64> for Outcome {
    type Error = LadderError;

    fn try_from(score: i64) -> Result<Self, Self::Error> {
        match score {
            0 => Ok(Outcome::TeamOneLost),
            1 => Ok(Outcome::TeamOneWon),
            other => Err(LadderError::validation(format!(
                "outcome must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl FromStr for Outcome {
    type Err = LadderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let score: i64 = s.trim().parse().map_err(|_| {
            LadderError::validation(format!("outcome must be 0 or 1, got '{}'", s.trim()))
        })?;
        Outcome::try_from(score)
    }
}

/// One row of the player store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub rating: Rating,
    pub games_played: u32,
}

impl PlayerRecord {
    /// Create a record for a freshly registered player
    pub fn new(player_id: impl Into<PlayerId>, starting_rating: Rating) -> Self {
        Self {
            player_id: player_id.into(),
            rating: starting_rating,
            games_played: 0,
        }
    }
}

/// Replacement values for one participant's record after a settled match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub player_id: PlayerId,
    pub new_rating: Rating,
    pub games_played: u32,
}

/// Durable history row of one settled match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    /// Team 1 players first, then team 2
    pub participants: Vec<PlayerId>,
    pub ratings_before: Vec<Rating>,
    /// Expected scores in team order
    pub expected_scores: (f64, f64),
    pub outcome: Outcome,
    pub k_factor: i64,
    pub ratings_after: Vec<Rating>,
}

impl MatchRecord {
    pub fn match_type(&self) -> MatchType {
        if self.participants.len() == MatchType::Doubles.participant_count() {
            MatchType::Doubles
        } else {
            MatchType::Singles
        }
    }

    /// Rating change of each participant, in participant order
    pub fn deltas(&self) -> Vec<Rating> {
        self.ratings_before
            .iter()
            .zip(&self.ratings_after)
            .map(|(before, after)| after - before)
            .collect()
    }
}
