//! Error types for the ladder
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Callers that need to branch on the kind of failure
//! downcast to [`LadderError`].

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LadderError {
    #[error("Invalid input: {reason}")]
    Validation { reason: String },

    #[error("Player already exists: {player_id}")]
    DuplicatePlayer { player_id: String },

    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Storage failure: {message}")]
    Persistence { message: String },

    #[error("Match was logged but player ratings were not updated: {message}")]
    InconsistentState { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl LadderError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn persistence(message: impl std::fmt::Display) -> Self {
        Self::Persistence {
            message: message.to_string(),
        }
    }
}

/// Borrow the typed ladder error behind an `anyhow::Error`, if there is one
pub fn kind_of(err: &anyhow::Error) -> Option<&LadderError> {
    err.downcast_ref::<LadderError>()
}
