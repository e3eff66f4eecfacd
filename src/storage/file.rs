//! CSV file-backed player store and match history.
//!
//! Files have no header row, use `,` as delimiter and `|` as quote character.
//! The player file is never modified in place: a rewrite goes to a staging file
//! which is then renamed over the live file.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, info};

use crate::config::PoolPaths;
use crate::error::{LadderError, Result};
use crate::storage::{apply_updates, MatchHistory, PlayerStore};
use crate::types::{MatchRecord, MatchType, Outcome, PlayerRecord, Rating, RatingUpdate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Player store kept in a CSV file, re-read on every operation.
#[derive(Debug, Clone)]
pub struct CsvPlayerStore {
    path: PathBuf,
    staging_path: PathBuf,
}

impl CsvPlayerStore {
    pub fn new(path: impl Into<PathBuf>, staging_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            staging_path: staging_path.into(),
        }
    }

    pub fn from_paths(paths: &PoolPaths) -> Self {
        Self::new(&paths.players, &paths.staging)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    fn load(&self) -> Result<Vec<PlayerRecord>> {
        read_rows(&self.path)?
            .iter()
            .map(|row| parse_player_row(row).map_err(|e| in_file(&self.path, e).into()))
            .collect()
    }
}

impl PlayerStore for CsvPlayerStore {
    fn get_player(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        Ok(self.load()?.into_iter().find(|p| p.player_id == player_id))
    }

    fn contains(&self, player_id: &str) -> Result<bool> {
        Ok(self.get_player(player_id)?.is_some())
    }

    fn add_player(&self, record: PlayerRecord) -> Result<()> {
        append_row(&self.path, &player_row(&record))?;
        debug!("Appended player '{}' to {}", record.player_id, self.path.display());
        Ok(())
    }

    fn all_players(&self) -> Result<Vec<PlayerRecord>> {
        self.load()
    }

    fn stage_updates(&self, updates: &[RatingUpdate]) -> Result<()> {
        let next = apply_updates(&self.load()?, updates)?;
        let rows: Vec<Vec<String>> = next.iter().map(player_row).collect();

        // A leftover staging file from an interrupted run is overwritten
        write_rows(&self.staging_path, &rows)?;
        debug!(
            "Staged {} player records at {}",
            rows.len(),
            self.staging_path.display()
        );
        Ok(())
    }

    fn commit_staged(&self) -> Result<()> {
        if !self.staging_path.exists() {
            return Err(LadderError::persistence(format!(
                "No staged player records at {}",
                self.staging_path.display()
            ))
            .into());
        }

        fs::rename(&self.staging_path, &self.path).map_err(|e| in_file(&self.path, e))?;
        info!("Player records replaced at {}", self.path.display());
        Ok(())
    }

    fn discard_staged(&self) -> Result<()> {
        match fs::remove_file(&self.staging_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(in_file(&self.staging_path, e).into()),
        }
    }
}

/// Append-only match history kept in a CSV file.
#[derive(Debug, Clone)]
pub struct CsvMatchHistory {
    path: PathBuf,
}

impl CsvMatchHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_paths(paths: &PoolPaths) -> Self {
        Self::new(&paths.history)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MatchHistory for CsvMatchHistory {
    fn append(&self, record: &MatchRecord) -> Result<()> {
        append_row(&self.path, &match_row(record))?;
        debug!("Appended match row to {}", self.path.display());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<MatchRecord>> {
        read_rows(&self.path)?
            .iter()
            .map(|row| parse_match_row(row).map_err(|e| in_file(&self.path, e).into()))
            .collect()
    }
}

fn in_file(path: &Path, err: impl std::fmt::Display) -> LadderError {
    LadderError::persistence(format!("{}: {}", path.display(), err))
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .quote(b'|')
        .terminator(Terminator::CRLF);
    builder
}

/// Every row of a file; a missing file has no rows.
fn read_rows(path: &Path) -> Result<Vec<StringRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote(b'|')
        .from_path(path)
        .map_err(|e| in_file(path, e))?;

    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row.map_err(|e| in_file(path, e))?);
    }
    Ok(rows)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| in_file(parent, e))?;
        }
    }
    Ok(())
}

fn finish(path: &Path, writer: csv::Writer<File>) -> Result<()> {
    let file = writer.into_inner().map_err(|e| in_file(path, e.error()))?;
    file.sync_all().map_err(|e| in_file(path, e))?;
    Ok(())
}

fn append_row(path: &Path, row: &[String]) -> Result<()> {
    ensure_parent(path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| in_file(path, e))?;

    let mut writer = writer_builder().from_writer(file);
    writer.write_record(row).map_err(|e| in_file(path, e))?;
    writer.flush().map_err(|e| in_file(path, e))?;
    finish(path, writer)
}

fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| in_file(path, e))?;

    let mut writer = writer_builder().from_writer(file);
    for row in rows {
        writer.write_record(row).map_err(|e| in_file(path, e))?;
    }
    writer.flush().map_err(|e| in_file(path, e))?;
    finish(path, writer)
}

/// Integers may have been written as floats (`1020.0`); the fraction is dropped.
fn parse_integer(field: &str) -> std::result::Result<i64, String> {
    let field = field.trim();
    if let Ok(value) = field.parse::<i64>() {
        return Ok(value);
    }

    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive
    match field.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f.trunc() as i64)
        }
        _ => Err(format!("'{}' is not a number", field)),
    }
}

fn parse_player_row(row: &StringRecord) -> std::result::Result<PlayerRecord, String> {
    if row.len() < 3 {
        return Err(format!("expected 3 player fields, found {}", row.len()));
    }

    let games = parse_integer(&row[2])?;
    Ok(PlayerRecord {
        player_id: row[0].to_string(),
        rating: parse_integer(&row[1])?,
        games_played: u32::try_from(games)
            .map_err(|_| format!("game count {} out of range", games))?,
    })
}

fn player_row(record: &PlayerRecord) -> Vec<String> {
    vec![
        record.player_id.clone(),
        record.rating.to_string(),
        record.games_played.to_string(),
    ]
}

fn match_row(record: &MatchRecord) -> Vec<String> {
    let mut row = Vec::with_capacity(3 * record.participants.len() + 5);
    row.push(record.date.format(DATE_FORMAT).to_string());
    row.extend(record.participants.iter().cloned());
    row.extend(record.ratings_before.iter().map(Rating::to_string));
    row.push(format_score(record.expected_scores.0));
    row.push(format_score(record.expected_scores.1));
    row.push(record.outcome.score().to_string());
    row.push(record.k_factor.to_string());
    row.extend(record.ratings_after.iter().map(Rating::to_string));
    row
}

/// Shortest round-trip form with a decimal point and a two-digit signed
/// exponent: `1.0`, `0.5`, `1e-20`, `1e-05`.
fn format_score(score: f64) -> String {
    let text = format!("{:?}", score);
    match text.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => text,
        },
        None => text,
    }
}

fn parse_match_row(row: &StringRecord) -> std::result::Result<MatchRecord, String> {
    // date, n names, n ratings, 2 expected scores, outcome, k, n ratings
    let n = row.len().saturating_sub(5) / 3;
    if row.len() != 3 * n + 5
        || ![MatchType::Singles, MatchType::Doubles]
            .iter()
            .any(|t| t.participant_count() == n)
    {
        return Err(format!("unexpected match row width {}", row.len()));
    }

    let fields: Vec<&str> = row.iter().collect();
    let date = NaiveDate::parse_from_str(fields[0].trim(), DATE_FORMAT)
        .map_err(|e| format!("bad date '{}': {}", fields[0], e))?;
    let ratings = |range: std::ops::Range<usize>| -> std::result::Result<Vec<Rating>, String> {
        fields[range].iter().map(|f| parse_integer(f)).collect()
    };
    let float = |field: &str| -> std::result::Result<f64, String> {
        field
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", field))
    };

    let at = 1 + 2 * n;
    let outcome = Outcome::try_from(parse_integer(fields[at + 2])?).map_err(|e| e.to_string())?;

    Ok(MatchRecord {
        date,
        participants: fields[1..1 + n].iter().map(|s| s.to_string()).collect(),
        ratings_before: ratings(1 + n..at)?,
        expected_scores: (float(fields[at])?, float(fields[at + 1])?),
        outcome,
        k_factor: parse_integer(fields[at + 3])?,
        ratings_after: ratings(at + 4..at + 4 + n)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind_of;

    fn store_in(dir: &Path) -> CsvPlayerStore {
        CsvPlayerStore::new(dir.join("players.csv"), dir.join("players_temp.csv"))
    }

    fn sample_match() -> MatchRecord {
        MatchRecord {
            date: NaiveDate::from_ymd_opt(2021, 5, 14).unwrap(),
            participants: vec!["boverwoe".to_string(), "jdoe".to_string()],
            ratings_before: vec![1000, 1000],
            expected_scores: (0.5, 0.5),
            outcome: Outcome::TeamOneWon,
            k_factor: 40,
            ratings_after: vec![1020, 980],
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        assert!(store.all_players().unwrap().is_empty());
        assert!(!store.contains("boverwoe").unwrap());
    }

    #[test]
    fn test_add_and_get_player() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        store.add_player(PlayerRecord::new("boverwoe", 1000)).unwrap();
        store.add_player(PlayerRecord::new("jdoe", 1000)).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents, "boverwoe,1000,0\r\njdoe,1000,0\r\n");
        assert_eq!(
            store.get_player("jdoe").unwrap(),
            Some(PlayerRecord::new("jdoe", 1000))
        );
    }

    #[test]
    fn test_comma_in_name_is_quoted_with_pipes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        store.add_player(PlayerRecord::new("doe, j", 1000)).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents, "|doe, j|,1000,0\r\n");
        assert!(store.contains("doe, j").unwrap());
    }

    #[test]
    fn test_float_encoded_numbers_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "boverwoe,1020.0,3.0\n").unwrap();

        let record = store.get_player("boverwoe").unwrap().unwrap();
        assert_eq!(record.rating, 1020);
        assert_eq!(record.games_played, 3);
    }

    #[test]
    fn test_malformed_row_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "boverwoe,lots,3\n").unwrap();

        let err = store.all_players().unwrap_err();
        assert!(matches!(kind_of(&err), Some(LadderError::Persistence { .. })));
    }

    #[test]
    fn test_stage_and_commit() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        for id in ["a", "b", "c"] {
            store.add_player(PlayerRecord::new(id, 1000)).unwrap();
        }

        store
            .stage_updates(&[RatingUpdate {
                player_id: "b".to_string(),
                new_rating: 1020,
                games_played: 1,
            }])
            .unwrap();

        // Live file untouched until the swap
        assert!(store.staging_path().exists());
        assert_eq!(store.get_player("b").unwrap().unwrap().rating, 1000);

        store.commit_staged().unwrap();

        assert!(!store.staging_path().exists());
        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents, "a,1000,0\r\nb,1020,1\r\nc,1000,0\r\n");
    }

    #[test]
    fn test_stale_staging_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.add_player(PlayerRecord::new("a", 1000)).unwrap();
        fs::write(store.staging_path(), "ghost,1,1\r\n").unwrap();

        store
            .stage_updates(&[RatingUpdate {
                player_id: "a".to_string(),
                new_rating: 990,
                games_played: 1,
            }])
            .unwrap();
        store.commit_staged().unwrap();

        let players = store.all_players().unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].rating, 990);
    }

    #[test]
    fn test_discard_staged() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.add_player(PlayerRecord::new("a", 1000)).unwrap();

        // Nothing staged is fine
        store.discard_staged().unwrap();

        store
            .stage_updates(&[RatingUpdate {
                player_id: "a".to_string(),
                new_rating: 990,
                games_played: 1,
            }])
            .unwrap();
        store.discard_staged().unwrap();

        assert!(!store.staging_path().exists());
        assert!(store.commit_staged().is_err());
        assert_eq!(store.get_player("a").unwrap().unwrap().rating, 1000);
    }

    #[test]
    fn test_history_row_layout() {
        let dir = tempfile::tempdir().unwrap();
        let history = CsvMatchHistory::new(dir.path().join("raw_games_data.csv"));

        history.append(&sample_match()).unwrap();

        let contents = fs::read_to_string(history.path()).unwrap();
        assert_eq!(
            contents,
            "2021-05-14,boverwoe,jdoe,1000,1000,0.5,0.5,1,40,1020,980\r\n"
        );
    }

    #[test]
    fn test_history_entries() {
        let dir = tempfile::tempdir().unwrap();
        let history = CsvMatchHistory::new(dir.path().join("raw_games_data.csv"));
        assert!(history.entries().unwrap().is_empty());

        let doubles = MatchRecord {
            date: NaiveDate::from_ymd_opt(2021, 5, 15).unwrap(),
            participants: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ratings_before: vec![1000, 1200, 1000, 1000],
            expected_scores: (0.6400649998028851, 0.3599350001971149),
            outcome: Outcome::TeamOneLost,
            k_factor: 40,
            ratings_after: vec![975, 1175, 1025, 1025],
        };
        history.append(&sample_match()).unwrap();
        history.append(&doubles).unwrap();

        let entries = history.entries().unwrap();
        assert_eq!(entries, vec![sample_match(), doubles]);
        assert_eq!(entries[1].match_type(), MatchType::Doubles);
    }

    #[test]
    fn test_history_rejects_odd_width() {
        let dir = tempfile::tempdir().unwrap();
        let history = CsvMatchHistory::new(dir.path().join("raw_games_data.csv"));
        fs::write(history.path(), "2021-05-14,a,b,1000\n").unwrap();

        assert!(history.entries().is_err());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("1020"), Ok(1020));
        assert_eq!(parse_integer("1020.0"), Ok(1020));
        assert_eq!(parse_integer(" -7 "), Ok(-7));
        assert!(parse_integer("abc").is_err());
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.5), "0.5");
        assert_eq!(format_score(1.0), "1.0");
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(1e-20), "1e-20");
        assert_eq!(format_score(1e-5), "1e-05");
        assert_eq!(format_score(0.0001), "0.0001");
        assert_eq!(format_score(0.6400649998028851), "0.6400649998028851");
    }

    #[test]
    fn test_extreme_expected_scores_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let history = CsvMatchHistory::new(dir.path().join("raw_games_data.csv"));
        let record = MatchRecord {
            expected_scores: (1.0, 1e-20),
            ..sample_match()
        };

        history.append(&record).unwrap();

        assert_eq!(
            fs::read_to_string(history.path()).unwrap(),
            "2021-05-14,boverwoe,jdoe,1000,1000,1.0,1e-20,1,40,1020,980\r\n"
        );
        assert_eq!(history.entries().unwrap(), vec![record]);
    }

    #[test]
    fn test_parse_integer_rejects_non_finite_and_huge() {
        for field in ["nan", "NaN", "inf", "-inf", "infinity", "1e300", "-1e300"] {
            assert!(parse_integer(field).is_err(), "{} was accepted", field);
        }
    }

    #[test]
    fn test_non_finite_rating_fails_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "a,nan,1\r\nb,inf,1\r\n").unwrap();

        let err = store.all_players().unwrap_err();
        assert!(matches!(kind_of(&err), Some(LadderError::Persistence { .. })));
    }
}
