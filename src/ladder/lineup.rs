//! Participant validation and rating lookup for a single match
//!
//! A [`Lineup`] only exists once its participants are known to be the right
//! number, distinct and registered. Fetching their ratings turns it into a
//! [`RatedLineup`], from which the team ratings are derived.

use crate::error::{LadderError, Result};
use crate::storage::PlayerStore;
use crate::types::{MatchType, PlayerId, PlayerRecord, Rating};
use std::collections::HashSet;
use tracing::debug;

/// Validated participants of one match, team 1 first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    match_type: MatchType,
    participants: Vec<PlayerId>,
}

impl Lineup {
    /// Validate participants against the store
    pub fn new(
        match_type: MatchType,
        participants: Vec<PlayerId>,
        store: &dyn PlayerStore,
    ) -> Result<Self> {
        let expected = match_type.participant_count();
        if participants.len() != expected {
            return Err(LadderError::validation(format!(
                "{} needs {} players, got {}",
                match_type,
                expected,
                participants.len()
            ))
            .into());
        }

        let mut seen = HashSet::with_capacity(participants.len());
        for player_id in &participants {
            if !seen.insert(player_id.as_str()) {
                return Err(LadderError::validation(format!(
                    "please provide {} different names, '{}' appears more than once",
                    expected, player_id
                ))
                .into());
            }
        }

        for player_id in &participants {
            if !store.contains(player_id)? {
                return Err(LadderError::validation(format!(
                    "the player '{}' does not exist",
                    player_id
                ))
                .into());
            }
        }

        Ok(Self {
            match_type,
            participants,
        })
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn participants(&self) -> &[PlayerId] {
        &self.participants
    }

    /// (team 1, team 2)
    pub fn teams(&self) -> (&[PlayerId], &[PlayerId]) {
        self.participants.split_at(self.match_type.team_size())
    }

    /// Look up every participant's current record
    pub fn fetch_ratings(self, store: &dyn PlayerStore) -> Result<RatedLineup> {
        let mut records = Vec::with_capacity(self.participants.len());
        for player_id in &self.participants {
            let record = store
                .get_player(player_id)?
                .ok_or_else(|| LadderError::PlayerNotFound {
                    player_id: player_id.clone(),
                })?;
            debug!("Fetched '{}' at {}", record.player_id, record.rating);
            records.push(record);
        }

        Ok(RatedLineup {
            lineup: self,
            records,
        })
    }
}

/// Lineup with the participants' records as they were before the match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedLineup {
    lineup: Lineup,
    records: Vec<PlayerRecord>,
}

impl RatedLineup {
    pub fn lineup(&self) -> &Lineup {
        &self.lineup
    }

    /// Records in participant order
    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn ratings_before(&self) -> Vec<Rating> {
        self.records.iter().map(|r| r.rating).collect()
    }

    /// (team 1, team 2) ratings
    pub fn team_ratings(&self) -> Result<(f64, f64)> {
        let match_type = self.lineup.match_type;
        let ratings = self.ratings_before();
        let (team_one, team_two) = ratings.split_at(match_type.team_size());
        Ok((
            match_type.team_rating(team_one)?,
            match_type.team_rating(team_two)?,
        ))
    }
}
