//! Test fixtures for integration testing against real CSV pools

use chrono::NaiveDate;
use paddle_ladder::config::{AppConfig, PoolPaths};
use paddle_ladder::ladder::LadderManager;
use paddle_ladder::rating::EloCalculator;
use paddle_ladder::storage::{CsvMatchHistory, CsvPlayerStore};
use paddle_ladder::types::MatchType;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A data directory holding both pools, removed when dropped
pub struct TestPools {
    pub dir: TempDir,
    pub config: AppConfig,
}

impl TestPools {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        Self { dir, config }
    }

    pub fn paths(&self, match_type: MatchType) -> PoolPaths {
        self.config.storage.pool_paths(match_type)
    }

    /// Ladder over the CSV files of one pool, stamping a fixed date
    pub fn ladder(&self, match_type: MatchType) -> LadderManager {
        let paths = self.paths(match_type);
        LadderManager::new(
            match_type,
            Arc::new(CsvPlayerStore::from_paths(&paths)),
            Arc::new(CsvMatchHistory::from_paths(&paths)),
            EloCalculator::new(self.config.rating.clone()).expect("valid rating config"),
        )
        .with_clock(match_date)
    }

    /// Seed a pool's player file with raw CSV text
    pub fn seed_players(&self, match_type: MatchType, contents: &str) {
        fs::write(&self.paths(match_type).players, contents).expect("seed player file");
    }

    pub fn players_file(&self, match_type: MatchType) -> String {
        read_or_empty(&self.paths(match_type).players)
    }

    pub fn history_file(&self, match_type: MatchType) -> String {
        read_or_empty(&self.paths(match_type).history)
    }
}

pub fn match_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 5, 14).expect("valid date")
}

pub fn names(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn read_or_empty(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}
