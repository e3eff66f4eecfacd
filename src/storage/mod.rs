//! Player store and match history interfaces
//!
//! This module defines the interfaces for persisting player records and settled
//! matches, with CSV-file and in-memory implementations. A player store rewrite
//! is two-phase: the complete replacement record set is staged first and only
//! swapped in by [`PlayerStore::commit_staged`], so readers see either the old
//! set or the new one.

pub mod file;
pub mod memory;

use crate::error::{LadderError, Result};
use crate::types::{MatchRecord, PlayerRecord, RatingUpdate};
use std::collections::HashMap;

pub use file::{CsvMatchHistory, CsvPlayerStore};
pub use memory::{InMemoryMatchHistory, InMemoryPlayerStore};

/// Trait for player record storage
#[cfg_attr(test, mockall::automock)]
pub trait PlayerStore: Send + Sync {
    /// Get a player's record
    fn get_player(&self, player_id: &str) -> Result<Option<PlayerRecord>>;

    /// Check whether a player is registered
    fn contains(&self, player_id: &str) -> Result<bool>;

    /// Append a new record; the caller has already checked the id is free
    fn add_player(&self, record: PlayerRecord) -> Result<()>;

    /// All records in store order
    fn all_players(&self) -> Result<Vec<PlayerRecord>>;

    /// Stage a full replacement record set with `updates` applied, leaving the
    /// live set untouched
    fn stage_updates(&self, updates: &[RatingUpdate]) -> Result<()>;

    /// Atomically replace the live set with the staged one
    fn commit_staged(&self) -> Result<()>;

    /// Drop a staged set without touching the live one
    fn discard_staged(&self) -> Result<()>;
}

/// Trait for the append-only match history
#[cfg_attr(test, mockall::automock)]
pub trait MatchHistory: Send + Sync {
    /// Append one settled match
    fn append(&self, record: &MatchRecord) -> Result<()>;

    /// Every settled match, oldest first
    fn entries(&self) -> Result<Vec<MatchRecord>>;
}

/// Copy `records` in order, replacing the rating and game count of every
/// updated player. Every update must name an existing record.
pub fn apply_updates(
    records: &[PlayerRecord],
    updates: &[RatingUpdate],
) -> Result<Vec<PlayerRecord>> {
    let by_id: HashMap<&str, &RatingUpdate> = updates
        .iter()
        .map(|update| (update.player_id.as_str(), update))
        .collect();

    let mut applied = 0;
    let updated: Vec<PlayerRecord> = records
        .iter()
        .map(|record| match by_id.get(record.player_id.as_str()) {
            Some(update) => {
                applied += 1;
                PlayerRecord {
                    player_id: record.player_id.clone(),
                    rating: update.new_rating,
                    games_played: update.games_played,
                }
            }
            None => record.clone(),
        })
        .collect();

    if applied != by_id.len() {
        let missing = updates
            .iter()
            .find(|update| !records.iter().any(|r| r.player_id == update.player_id))
            .map(|update| update.player_id.clone())
            .unwrap_or_default();
        return Err(LadderError::PlayerNotFound { player_id: missing }.into());
    }

    Ok(updated)
}
