//! Ladder operations over one rating pool

pub mod leaderboard;
pub mod lineup;
pub mod manager;

pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use lineup::{Lineup, RatedLineup};
pub use manager::{LadderManager, SettledMatch};
