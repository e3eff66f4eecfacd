//! Paddle Ladder - Elo ladder for singles and doubles matches
//!
//! This crate keeps one rating pool per match type in flat CSV files,
//! settles match results with the Elo formula and keeps an append-only
//! history of every settled match.

pub mod cli;
pub mod config;
pub mod error;
pub mod interactive;
pub mod ladder;
pub mod rating;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use ladder::{LadderManager, Leaderboard, SettledMatch};
pub use rating::EloCalculator;
pub use storage::{CsvMatchHistory, CsvPlayerStore, MatchHistory, PlayerStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
