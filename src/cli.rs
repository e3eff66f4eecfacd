//! Command-line surface
//!
//! Argument parsing, configuration merging and the one-shot commands. The
//! interactive menu lives in [`crate::interactive`].

use crate::config::{validate_config, AppConfig};
use crate::ladder::{LadderManager, SettledMatch};
use crate::rating::EloCalculator;
use crate::storage::{CsvMatchHistory, CsvPlayerStore};
use crate::types::{MatchRecord, MatchType, PlayerId};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Paddle Ladder - Elo ratings for singles and doubles matches
#[derive(Parser, Debug)]
#[command(
    name = "paddle-ladder",
    version,
    about = "Keep Elo ratings for singles and doubles matches in flat CSV files",
    long_about = "Paddle Ladder registers players, records match results and prints the \
                 current ranking. Singles and doubles are separate rating pools, each kept \
                 in its own player file and append-only match history."
)]
pub struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    pub log_level: Option<String>,

    /// Data directory override
    #[arg(long, value_name = "DIR", help = "Directory holding the pool files")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    pub debug: bool,

    /// Rating pool to work on
    #[arg(
        short,
        long,
        value_name = "TYPE",
        help = "Rating pool: singles (s) or doubles (d)"
    )]
    pub match_type: Option<MatchType>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a new player at the starting rating
    Register {
        /// Exact, case-sensitive player name
        name: String,
    },
    /// Record one match result; team 1 is listed first
    Record {
        /// 1 if team 1 won, 0 if team 1 lost
        #[arg(short, long, value_name = "0|1", allow_negative_numbers = true)]
        outcome: i64,
        /// Participants: team 1 then team 2
        #[arg(required = true, num_args = 1..)]
        players: Vec<PlayerId>,
    },
    /// Show the current ranking
    Leaderboard {
        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every settled match, oldest first
    History,
    /// Menu-driven session (default)
    Interactive,
}

impl Args {
    /// Rating pool for one-shot commands
    pub fn pool(&self) -> MatchType {
        self.match_type.unwrap_or(MatchType::Singles)
    }
}

/// Load and merge configuration from environment, file and CLI arguments
pub fn load_config(args: &Args) -> Result<AppConfig> {
    // Start with file or environment-based config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    validate_config(&config)?;
    Ok(config)
}

/// Wire a ladder manager to the CSV files of one pool
pub fn build_ladder(config: &AppConfig, match_type: MatchType) -> Result<LadderManager> {
    let paths = config.storage.pool_paths(match_type);
    let calculator = EloCalculator::new(config.rating.clone())?;

    info!(
        "Opening {} pool at {}",
        match_type,
        paths.players.display()
    );

    Ok(LadderManager::new(
        match_type,
        Arc::new(CsvPlayerStore::from_paths(&paths)),
        Arc::new(CsvMatchHistory::from_paths(&paths)),
        calculator,
    ))
}

/// Run a one-shot command, writing its report to `out`
pub fn execute(ladder: &LadderManager, command: &Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Register { name } => {
            let record = ladder.register_player(name)?;
            writeln!(
                out,
                "Player {} successfully added to the {} ladder with a rating of {}",
                record.player_id,
                ladder.match_type(),
                record.rating
            )?;
        }
        Command::Record { outcome, players } => {
            let settled = ladder.record_score(players, *outcome)?;
            writeln!(out, "{}", describe_settlement(&settled))?;
        }
        Command::Leaderboard { json } => {
            let board = ladder.leaderboard()?;
            if *json {
                let text = serde_json::to_string_pretty(&board.to_json())
                    .context("Failed to encode leaderboard")?;
                writeln!(out, "{}", text)?;
            } else {
                write!(out, "{}", board)?;
            }
        }
        Command::History => {
            let entries = ladder.history()?;
            if entries.is_empty() {
                writeln!(out, "No {} matches recorded yet", ladder.match_type())?;
            }
            for record in &entries {
                writeln!(out, "{}", describe_record(record))?;
            }
        }
        Command::Interactive => {
            anyhow::bail!("interactive mode is not a one-shot command");
        }
    }
    Ok(())
}

/// One-line report of a freshly settled match
pub fn describe_settlement(settled: &SettledMatch) -> String {
    let record = &settled.record;
    let (team_one, team_two) = split_teams(record);
    let verdict = if record.outcome.score() == 1 {
        "won"
    } else {
        "lost"
    };
    let changes: Vec<String> = record
        .participants
        .iter()
        .zip(record.ratings_before.iter().zip(&record.ratings_after))
        .map(|(name, (before, after))| format!("{} {} -> {}", name, before, after))
        .collect();

    format!(
        "{} ({:.0}) vs {} ({:.0}): team 1 {} (expected {:.3}), {:+}/{:+}; {}",
        team_one,
        settled.team_ratings.0,
        team_two,
        settled.team_ratings.1,
        verdict,
        record.expected_scores.0,
        settled.team_deltas.0,
        settled.team_deltas.1,
        changes.join(", ")
    )
}

/// One-line listing of a history row
pub fn describe_record(record: &MatchRecord) -> String {
    let (team_one, team_two) = split_teams(record);
    let deltas: Vec<String> = record.deltas().iter().map(|d| format!("{:+}", d)).collect();
    format!(
        "{}  {} vs {}  score {}  k {}  [{}]",
        record.date,
        team_one,
        team_two,
        record.outcome.score(),
        record.k_factor,
        deltas.join(" ")
    )
}

fn split_teams(record: &MatchRecord) -> (String, String) {
    let team_size = record.match_type().team_size();
    let (one, two) = record.participants.split_at(team_size);
    (one.join(" & "), two.join(" & "))
}
