//! In-memory player store and match history
//!
//! Used by tests and benchmarks. The staged record set lives next to the live
//! one and replaces it wholesale on commit.

use crate::error::{LadderError, Result};
use crate::storage::{apply_updates, MatchHistory, PlayerStore};
use crate::types::{MatchRecord, PlayerRecord, RatingUpdate};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| LadderError::persistence("Failed to acquire read lock").into())
}

fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| LadderError::persistence("Failed to acquire write lock").into())
}

/// In-memory player store keeping records in insertion order
#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    players: RwLock<Vec<PlayerRecord>>,
    staged: RwLock<Option<Vec<PlayerRecord>>>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records (for testing)
    pub fn with_players(players: Vec<PlayerRecord>) -> Self {
        Self {
            players: RwLock::new(players),
            staged: RwLock::new(None),
        }
    }

    /// Whether a rewrite is staged but not yet committed
    pub fn has_staged(&self) -> bool {
        self.staged
            .read()
            .map(|staged| staged.is_some())
            .unwrap_or(false)
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn get_player(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        let players = read_lock(&self.players)?;
        Ok(players.iter().find(|p| p.player_id == player_id).cloned())
    }

    fn contains(&self, player_id: &str) -> Result<bool> {
        let players = read_lock(&self.players)?;
        Ok(players.iter().any(|p| p.player_id == player_id))
    }

    fn add_player(&self, record: PlayerRecord) -> Result<()> {
        write_lock(&self.players)?.push(record);
        Ok(())
    }

    fn all_players(&self) -> Result<Vec<PlayerRecord>> {
        Ok(read_lock(&self.players)?.clone())
    }

    fn stage_updates(&self, updates: &[RatingUpdate]) -> Result<()> {
        let next = apply_updates(&read_lock(&self.players)?, updates)?;
        *write_lock(&self.staged)? = Some(next);
        Ok(())
    }

    fn commit_staged(&self) -> Result<()> {
        let next = write_lock(&self.staged)?
            .take()
            .ok_or_else(|| LadderError::persistence("No staged player records to commit"))?;
        *write_lock(&self.players)? = next;
        Ok(())
    }

    fn discard_staged(&self) -> Result<()> {
        write_lock(&self.staged)?.take();
        Ok(())
    }
}

/// In-memory match history
#[derive(Debug, Default)]
pub struct InMemoryMatchHistory {
    entries: RwLock<Vec<MatchRecord>>,
}

impl InMemoryMatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MatchHistory for InMemoryMatchHistory {
    fn append(&self, record: &MatchRecord) -> Result<()> {
        write_lock(&self.entries)?.push(record.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<MatchRecord>> {
        Ok(read_lock(&self.entries)?.clone())
    }
}
