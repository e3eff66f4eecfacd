//! Main application configuration
//!
//! This module defines the primary configuration structures for the ladder,
//! including environment variable loading, TOML file loading and validation.

use crate::config::rating::{DeltaRounding, RatingConfig};
use crate::types::MatchType;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub rating: RatingConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name shown in logs
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where the two rating pools live on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding every pool file
    pub data_dir: PathBuf,
    pub singles: PoolFiles,
    pub doubles: PoolFiles,
}

/// File names of one rating pool, relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFiles {
    /// Player records
    pub players: String,
    /// Staging copy written before the player file is swapped
    pub staging: String,
    /// Append-only match history
    pub history: String,
}

/// Resolved absolute-or-relative paths of one rating pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPaths {
    pub players: PathBuf,
    pub staging: PathBuf,
    pub history: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "paddle-ladder".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            singles: PoolFiles::singles(),
            doubles: PoolFiles::doubles(),
        }
    }
}

impl PoolFiles {
    pub fn singles() -> Self {
        Self {
            players: "players.csv".to_string(),
            staging: "players_temp.csv".to_string(),
            history: "raw_games_data.csv".to_string(),
        }
    }

    pub fn doubles() -> Self {
        Self {
            players: "players_doubles.csv".to_string(),
            staging: "players_doubles_temp.csv".to_string(),
            history: "raw_games_doubles_data.csv".to_string(),
        }
    }
}

impl StorageSettings {
    /// File names configured for a pool
    pub fn pool(&self, match_type: MatchType) -> &PoolFiles {
        match match_type {
            MatchType::Singles => &self.singles,
            MatchType::Doubles => &self.doubles,
        }
    }

    /// Paths of a pool joined onto the data directory
    pub fn pool_paths(&self, match_type: MatchType) -> PoolPaths {
        let files = self.pool(match_type);
        PoolPaths {
            players: self.data_dir.join(&files.players),
            staging: self.data_dir.join(&files.staging),
            history: self.data_dir.join(&files.history),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse TOML text; missing sections and keys take their defaults
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Storage settings
        if let Ok(data_dir) = env::var("LADDER_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        // Rating settings
        if let Ok(starting) = env::var("LADDER_STARTING_RATING") {
            self.rating.starting_rating = starting
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_STARTING_RATING value: {}", starting))?;
        }
        if let Ok(k_factor) = env::var("LADDER_K_FACTOR") {
            self.rating.k_factor = k_factor
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_K_FACTOR value: {}", k_factor))?;
        }
        if let Ok(rounding) = env::var("LADDER_DELTA_ROUNDING") {
            self.rating.delta_rounding = match rounding.to_lowercase().as_str() {
                "truncate" => DeltaRounding::Truncate,
                "nearest" => DeltaRounding::Nearest,
                _ => return Err(anyhow!("Invalid LADDER_DELTA_ROUNDING value: {}", rounding)),
            };
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate pool files
    for match_type in [MatchType::Singles, MatchType::Doubles] {
        let files = config.storage.pool(match_type);
        if files.players.is_empty() || files.staging.is_empty() || files.history.is_empty() {
            return Err(anyhow!("{} pool file names cannot be empty", match_type));
        }
    }

    // No two of the six resolved paths may coincide, across pools included
    let mut seen: Vec<(MatchType, PathBuf)> = Vec::with_capacity(6);
    for match_type in [MatchType::Singles, MatchType::Doubles] {
        let paths = config.storage.pool_paths(match_type);
        for path in [paths.players, paths.staging, paths.history] {
            if let Some((owner, _)) = seen.iter().find(|(_, p)| *p == path) {
                if *owner == match_type {
                    return Err(anyhow!(
                        "{} pool player, staging and history files must be distinct",
                        match_type
                    ));
                }
                return Err(anyhow!(
                    "{} is used by both the {} and {} pool files",
                    path.display(),
                    owner,
                    match_type
                ));
            }
            seen.push((match_type, path));
        }
    }

    config.rating.validate()?;

    Ok(())
}
