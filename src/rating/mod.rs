//! Elo rating engine
//!
//! This module provides the logistic expected score formula and the calculator
//! that turns a match outcome into per-player rating changes.

pub mod calculator;
pub mod elo;

// Re-export commonly used types
pub use calculator::{EloCalculator, Settlement};
pub use elo::{expected_scores, rating_delta};
