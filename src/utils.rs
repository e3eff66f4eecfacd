//! Utility functions for the ladder

use chrono::{Local, NaiveDate};

/// Today's calendar date in local time, as stamped on match history rows
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Clean up a name typed by an operator
pub fn normalize_input(raw: &str) -> String {
    raw.trim().to_string()
}
