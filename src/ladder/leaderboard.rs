//! Leaderboard view over the player store

use crate::types::{PlayerId, PlayerRecord, Rating};
use serde::{Deserialize, Serialize};
use std::fmt;

const NAME_WIDTH: usize = 8;

/// One ranked player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub player_id: PlayerId,
    pub rating: Rating,
    pub games_played: u32,
}

/// Players with at least one game, best rating first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Rank records in store order. Players without games are left out, and
    /// equal ratings keep the order in which they appear in the store.
    pub fn from_records(records: Vec<PlayerRecord>) -> Self {
        let mut active: Vec<PlayerRecord> = records
            .into_iter()
            .filter(|record| record.games_played > 0)
            .collect();
        // Stable sort
        active.sort_by(|a, b| b.rating.cmp(&a.rating));

        let entries = active
            .into_iter()
            .enumerate()
            .map(|(i, record)| LeaderboardEntry {
                rank: i + 1,
                player_id: record.player_id,
                rating: record.rating,
                games_played: record.games_played,
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keeps the game counts aligned for three-digit ratings
        let pad = if self.rating < 1000 { " " } else { "" };
        write!(
            f,
            "{}. {:<width$}  ({}, {}{} games)",
            self.rank,
            self.player_id,
            self.rating,
            pad,
            self.games_played,
            width = NAME_WIDTH
        )
    }
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "The current ranking is given by: (Only players with more than 0 games are shown)"
        )?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
