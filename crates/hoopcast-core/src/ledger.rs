// Prop ledger: the flat CSV file of saved projections and their outcomes.
//
// Every mutation reads the whole file, changes it in memory and rewrites it
// through a temp file + rename. Loading is permissive: missing columns read as
// empty, malformed rows are skipped, and an unreadable file loads as an empty
// ledger. When anything was skipped the original file is copied to `.bak`
// before the first rewrite so nothing is silently lost.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::stat::StatKind;

/// Column order of the ledger file.
pub const LEDGER_COLUMNS: [&str; 11] = [
    "timestamp",
    "player",
    "player_id",
    "team",
    "stat",
    "line",
    "odds",
    "projection",
    "opponent",
    "outcome",
    "game_id",
];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Real-world result of a saved prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Pending,
    LineAchieved,
    LineNotAchieved,
    /// A stored outcome this version does not understand. The cell is kept
    /// verbatim and the row is never resolved.
    Unrecognized,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "Pending",
            Outcome::LineAchieved => "Line Achieved",
            Outcome::LineNotAchieved => "Line Not Achieved",
            Outcome::Unrecognized => "Unrecognized",
        }
    }

    /// Parse a stored outcome. Empty cells read as `Pending`.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "" | "pending" => Some(Outcome::Pending),
            "lineachieved" | "hit" | "won" => Some(Outcome::LineAchieved),
            "linenotachieved" | "miss" | "lost" => Some(Outcome::LineNotAchieved),
            _ => None,
        }
    }

    /// `actual >= line` achieves the line.
    pub fn from_actual(actual: f64, line: f64) -> Self {
        if actual >= line {
            Outcome::LineAchieved
        } else {
            Outcome::LineNotAchieved
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Outcome::LineAchieved | Outcome::LineNotAchieved)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One persisted prop.
///
/// Numeric columns are optional because older ledger files may lack them.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedProp {
    pub timestamp: String,
    pub player_id: Option<u64>,
    pub player_name: String,
    pub team_abbreviation: String,
    /// Stat label as written (see `StatKind::label`).
    pub stat: String,
    pub line: Option<f64>,
    pub odds: String,
    /// `None` when the analysis had insufficient data to project.
    pub projection: Option<f64>,
    pub opponent_abbreviation: String,
    pub outcome: Outcome,
    /// Upstream id of the game the prop was made for, when known.
    pub game_id: Option<u64>,
}

impl SavedProp {
    pub fn stat_kind(&self) -> Option<StatKind> {
        StatKind::parse(&self.stat)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("ledger CSV error at {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// A ledger row as read from disk. Every column is optional text so that
/// files written by older versions (or edited by hand) still load.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLedgerRow {
    timestamp: Option<String>,
    player: Option<String>,
    player_id: Option<String>,
    team: Option<String>,
    stat: Option<String>,
    line: Option<String>,
    odds: Option<String>,
    projection: Option<String>,
    opponent: Option<String>,
    outcome: Option<String>,
    game_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct LedgerRecord<'a> {
    timestamp: &'a str,
    player: &'a str,
    player_id: Option<u64>,
    team: &'a str,
    stat: &'a str,
    line: Option<f64>,
    odds: &'a str,
    projection: Option<f64>,
    opponent: &'a str,
    outcome: &'a str,
    game_id: Option<u64>,
}

impl<'a> LedgerRecord<'a> {
    fn new(p: &'a SavedProp, outcome: &'a str) -> Self {
        Self {
            timestamp: &p.timestamp,
            player: &p.player_name,
            player_id: p.player_id,
            team: &p.team_abbreviation,
            stat: &p.stat,
            line: p.line,
            odds: &p.odds,
            projection: p.projection,
            opponent: &p.opponent_abbreviation,
            outcome,
            game_id: p.game_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn text(cell: Option<String>) -> String {
    cell.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn number(cell: &Option<String>) -> Option<f64> {
    cell.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Ids may have been widened to floats ("237.0") by other tools.
fn identifier(cell: &Option<String>) -> Option<u64> {
    let v = number(cell)?;
    if v >= 0.0 && v.fract() == 0.0 {
        Some(v as u64)
    } else {
        None
    }
}

/// Convert a raw row, returning the outcome cell verbatim when it names no
/// known outcome.
fn from_raw(raw: RawLedgerRow) -> (SavedProp, Option<String>) {
    let (outcome, verbatim) = match raw.outcome {
        None => (Outcome::Pending, None),
        Some(s) => match Outcome::parse(&s) {
            Some(outcome) => (outcome, None),
            None => {
                warn!("unrecognized ledger outcome '{}', leaving the row untouched", s.trim());
                (Outcome::Unrecognized, Some(s))
            }
        },
    };
    let prop = SavedProp {
        player_id: identifier(&raw.player_id),
        line: number(&raw.line),
        projection: number(&raw.projection),
        game_id: identifier(&raw.game_id),
        timestamp: text(raw.timestamp),
        player_name: text(raw.player),
        team_abbreviation: text(raw.team),
        stat: text(raw.stat),
        odds: text(raw.odds),
        opponent_abbreviation: text(raw.opponent),
        outcome,
    };
    (prop, verbatim)
}

/// What a ledger file parsed into.
#[derive(Debug, Default)]
struct ParsedRows {
    rows: Vec<SavedProp>,
    /// Verbatim outcome cells of `Unrecognized` rows, by row index.
    unknown_outcomes: HashMap<usize, String>,
    skipped: usize,
}

/// Parse ledger rows, returning them plus the number of rows that could not
/// be read. A header that cannot be read counts as one skipped row.
fn read_rows<R: Read>(rdr: R) -> ParsedRows {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(rdr);
    if let Err(e) = reader.headers() {
        warn!("ledger header unreadable, loading as empty: {}", e);
        return ParsedRows {
            skipped: 1,
            ..ParsedRows::default()
        };
    }

    let mut parsed = ParsedRows::default();
    for result in reader.deserialize::<RawLedgerRow>() {
        match result {
            Ok(raw) => {
                let (prop, verbatim) = from_raw(raw);
                if let Some(text) = verbatim {
                    parsed.unknown_outcomes.insert(parsed.rows.len(), text);
                }
                parsed.rows.push(prop);
            }
            Err(e) => {
                warn!("skipping malformed ledger row: {}", e);
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

fn write_rows<W: Write>(
    wtr: W,
    rows: &[SavedProp],
    unknown_outcomes: &HashMap<usize, String>,
) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(wtr);
    writer.write_record(LEDGER_COLUMNS)?;
    for (index, row) in rows.iter().enumerate() {
        let outcome = unknown_outcomes
            .get(&index)
            .map(String::as_str)
            .unwrap_or(row.outcome.label());
        writer.serialize(LedgerRecord::new(row, outcome))?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// In-memory copy of the ledger file.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    rows: Vec<SavedProp>,
    unknown_outcomes: HashMap<usize, String>,
    /// Rows (or the whole file) that failed to parse on load.
    skipped: usize,
}

impl Ledger {
    /// Load the ledger at `path`. Never fails: a missing file is an empty
    /// ledger, an unreadable one loads as empty and is backed up on save.
    pub fn load(path: &Path) -> Self {
        let parsed = match std::fs::File::open(path) {
            Ok(file) => read_rows(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no ledger at {}, starting empty", path.display());
                ParsedRows::default()
            }
            Err(e) => {
                warn!("failed to open ledger {}: {}", path.display(), e);
                ParsedRows {
                    skipped: 1,
                    ..ParsedRows::default()
                }
            }
        };
        debug!(rows = parsed.rows.len(), skipped = parsed.skipped, "ledger loaded");
        Self {
            path: path.to_path_buf(),
            rows: parsed.rows,
            unknown_outcomes: parsed.unknown_outcomes,
            skipped: parsed.skipped,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[SavedProp] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows dropped while loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Rows sorted by timestamp, newest first.
    pub fn newest_first(&self) -> Vec<&SavedProp> {
        let mut rows: Vec<&SavedProp> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }

    /// Indices of rows still waiting on a result.
    pub fn pending_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.outcome.is_pending())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&SavedProp> {
        self.rows.get(index)
    }

    /// Replace a `Pending` outcome with a final one. Returns false (and
    /// changes nothing) if the row does not exist or is already resolved.
    pub fn resolve(&mut self, index: usize, outcome: Outcome) -> bool {
        match self.rows.get_mut(index) {
            Some(row) if row.outcome.is_pending() && outcome.is_final() => {
                row.outcome = outcome;
                true
            }
            _ => false,
        }
    }

    /// Append a row and persist the whole ledger.
    pub fn append(&mut self, prop: SavedProp) -> Result<(), LedgerError> {
        self.rows.push(prop);
        self.save()
    }

    /// Rewrite the ledger file atomically (temp file + rename).
    pub fn save(&mut self) -> Result<(), LedgerError> {
        let io_err = |source: std::io::Error| LedgerError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }

        if self.skipped > 0 && self.path.exists() {
            let backup = append_extension(&self.path, "bak");
            std::fs::copy(&self.path, &backup).map_err(io_err)?;
            warn!(
                "ledger had {} unreadable row(s); original kept at {}",
                self.skipped,
                backup.display()
            );
        }

        let tmp = append_extension(&self.path, "tmp");
        let file = std::fs::File::create(&tmp).map_err(io_err)?;
        write_rows(file, &self.rows, &self.unknown_outcomes).map_err(|source| LedgerError::Csv {
            path: tmp.display().to_string(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        self.skipped = 0;
        info!(rows = self.rows.len(), "ledger written to {}", self.path.display());
        Ok(())
    }
}

/// `props.csv` + `bak` -> `props.csv.bak`.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Load the ledger at `path`, append `prop`, and rewrite it.
pub fn append_prop(path: &Path, prop: SavedProp) -> Result<(), LedgerError> {
    Ledger::load(path).append(prop)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
