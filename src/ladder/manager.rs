//! Ladder manager: registration, match settlement and leaderboard
//!
//! One manager serves one rating pool (singles or doubles). Recording a match
//! validates the lineup, reads current ratings, settles the outcome with the
//! Elo calculator and persists the result in two phases:
//!
//! 1. the full replacement player set is staged,
//! 2. the history row is appended,
//! 3. the staged set is swapped in.
//!
//! Anything failing before step 3 leaves both the store and the history as
//! they were. A failed swap after a successful append is reported as
//! [`LadderError::InconsistentState`].

use crate::error::{LadderError, Result};
use crate::ladder::leaderboard::Leaderboard;
use crate::ladder::lineup::{Lineup, RatedLineup};
use crate::rating::EloCalculator;
use crate::storage::{MatchHistory, PlayerStore};
use crate::types::{MatchRecord, MatchType, Outcome, PlayerId, PlayerRecord, Rating, RatingUpdate};
use crate::utils::today;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A match that has been settled and persisted
#[derive(Debug, Clone, PartialEq)]
pub struct SettledMatch {
    /// The row written to the match history
    pub record: MatchRecord,
    /// (team 1, team 2) ratings before the match
    pub team_ratings: (f64, f64),
    /// (team 1, team 2) rating change
    pub team_deltas: (Rating, Rating),
}

/// Coordinates one rating pool
#[derive(Clone)]
pub struct LadderManager {
    match_type: MatchType,
    /// Player records of this pool
    player_store: Arc<dyn PlayerStore>,
    /// Settled matches of this pool
    match_history: Arc<dyn MatchHistory>,
    calculator: EloCalculator,
    /// Date source for history rows
    clock: fn() -> NaiveDate,
}

impl LadderManager {
    /// Create a new ladder manager
    pub fn new(
        match_type: MatchType,
        player_store: Arc<dyn PlayerStore>,
        match_history: Arc<dyn MatchHistory>,
        calculator: EloCalculator,
    ) -> Self {
        Self {
            match_type,
            player_store,
            match_history,
            calculator,
            clock: today,
        }
    }

    /// Replace the date source (for testing)
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn calculator(&self) -> &EloCalculator {
        &self.calculator
    }

    /// Whether a player is registered in this pool
    pub fn is_registered(&self, player_id: &str) -> Result<bool> {
        self.player_store.contains(player_id)
    }

    /// Register a new player at the starting rating
    pub fn register_player(&self, player_id: &str) -> Result<PlayerRecord> {
        if player_id.trim().is_empty() {
            return Err(LadderError::validation("player name cannot be empty").into());
        }

        if self.player_store.contains(player_id)? {
            warn!("Registration rejected, '{}' already exists", player_id);
            return Err(LadderError::DuplicatePlayer {
                player_id: player_id.to_string(),
            }
            .into());
        }

        let record = PlayerRecord::new(player_id, self.calculator.starting_rating());
        self.player_store.add_player(record.clone())?;

        info!(
            "Registered {} player '{}' at {}",
            self.match_type, record.player_id, record.rating
        );
        Ok(record)
    }

    /// Validate participants and read their current ratings
    pub fn prepare(&self, participants: &[PlayerId]) -> Result<RatedLineup> {
        let lineup = Lineup::new(
            self.match_type,
            participants.to_vec(),
            self.player_store.as_ref(),
        )?;
        debug!("Lineup accepted: {:?}", lineup.participants());

        let rated = lineup.fetch_ratings(self.player_store.as_ref())?;
        let (team_one, team_two) = rated.team_ratings()?;
        debug!("Team ratings {:.1} vs {:.1}", team_one, team_two);
        Ok(rated)
    }

    /// Record one match result
    pub fn record_match(&self, participants: &[PlayerId], outcome: Outcome) -> Result<SettledMatch> {
        let rated = self.prepare(participants)?;
        self.settle(rated, outcome)
    }

    /// Record one match result given as a raw score (0 or 1)
    pub fn record_score(&self, participants: &[PlayerId], score: i64) -> Result<SettledMatch> {
        let rated = self.prepare(participants)?;
        let outcome = Outcome::try_from(score)?;
        self.settle(rated, outcome)
    }

    /// Settle a prepared lineup and persist the result
    pub fn settle(&self, rated: RatedLineup, outcome: Outcome) -> Result<SettledMatch> {
        let team_ratings = rated.team_ratings()?;
        let settlement = self.calculator.settle(team_ratings, outcome);
        let ratings_before = rated.ratings_before();
        let ratings_after = self
            .calculator
            .apply(self.match_type, &ratings_before, &settlement);

        let updates: Vec<RatingUpdate> = rated
            .records()
            .iter()
            .zip(&ratings_after)
            .map(|(record, new_rating)| RatingUpdate {
                player_id: record.player_id.clone(),
                new_rating: *new_rating,
                games_played: record.games_played + 1,
            })
            .collect();

        let record = MatchRecord {
            date: (self.clock)(),
            participants: rated.lineup().participants().to_vec(),
            ratings_before,
            expected_scores: settlement.expected_scores,
            outcome,
            k_factor: self.calculator.k_factor(),
            ratings_after,
        };

        self.persist(&record, &updates)?;

        info!(
            "Settled {} match {:?}: expected {:.3}/{:.3}, outcome {}, deltas {:+}/{:+}",
            self.match_type,
            record.participants,
            settlement.expected_scores.0,
            settlement.expected_scores.1,
            outcome.score(),
            settlement.team_deltas.0,
            settlement.team_deltas.1
        );

        Ok(SettledMatch {
            record,
            team_ratings,
            team_deltas: settlement.team_deltas,
        })
    }

    fn persist(&self, record: &MatchRecord, updates: &[RatingUpdate]) -> Result<()> {
        if let Err(e) = self.player_store.stage_updates(updates) {
            self.discard_staged();
            return Err(e);
        }

        if let Err(e) = self.match_history.append(record) {
            self.discard_staged();
            return Err(e);
        }

        if let Err(e) = self.player_store.commit_staged() {
            error!(
                "Match {:?} is in the history but player ratings were NOT updated: {:#}",
                record.participants, e
            );
            return Err(LadderError::InconsistentState {
                message: format!("{:#}", e),
            }
            .into());
        }

        Ok(())
    }

    fn discard_staged(&self) {
        if let Err(e) = self.player_store.discard_staged() {
            warn!("Failed to discard staged player records: {:#}", e);
        }
    }

    /// Current ranking of players with at least one game
    pub fn leaderboard(&self) -> Result<Leaderboard> {
        Ok(Leaderboard::from_records(self.player_store.all_players()?))
    }

    /// Every settled match of this pool, oldest first
    pub fn history(&self) -> Result<Vec<MatchRecord>> {
        self.match_history.entries()
    }
}
