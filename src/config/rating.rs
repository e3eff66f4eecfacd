//! Rating system configuration

use crate::error::{LadderError, Result};
use crate::types::Rating;
use serde::{Deserialize, Serialize};

/// How the fractional part of a rating delta is discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaRounding {
    /// Toward zero; matches every historical row written so far
    #[default]
    Truncate,
    /// To the nearest integer, halves away from zero
    Nearest,
}

impl DeltaRounding {
    pub fn apply(self, raw: f64) -> Rating {
        match self {
            DeltaRounding::Truncate => raw.trunc() as Rating,
            DeltaRounding::Nearest => raw.round() as Rating,
        }
    }
}

/// Parameters of the rating engine, fixed for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating given to newly registered players
    pub starting_rating: Rating,
    /// Maximum rating exchanged in a single match
    pub k_factor: i64,
    pub delta_rounding: DeltaRounding,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            starting_rating: 1000,
            k_factor: 40,
            delta_rounding: DeltaRounding::Truncate,
        }
    }
}

impl RatingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k_factor <= 0 {
            return Err(LadderError::ConfigurationError {
                message: "K-factor must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
