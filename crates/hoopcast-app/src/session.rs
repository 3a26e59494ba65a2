// Analysis orchestration and the single-slot pending save.
//
// `analyze` runs the whole pipeline for one request: game log -> splits,
// team directory -> opponent defense and schedule -> projection. It only
// fails on invalid input; missing upstream data shows up as empty splits and
// `None` averages in the report.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use tracing::{debug, info};

use hoopcast_analysis::defense;
use hoopcast_analysis::normalize::fetch_game_log;
use hoopcast_analysis::projection::{project, ProjectionInputs, Venue};
use hoopcast_analysis::schedule::{find_upcoming, UpcomingGame};
use hoopcast_analysis::{DefensiveRating, GameStatRow, SplitReport};
use hoopcast_api::types::{Player, Team};
use hoopcast_api::{soft, StatsSource};
use hoopcast_core::config::Config;
use hoopcast_core::ledger::{Ledger, Outcome, SavedProp};
use hoopcast_core::stat::StatKind;

use crate::AppError;

// ---------------------------------------------------------------------------
// Request / report types
// ---------------------------------------------------------------------------

/// Everything the user picks before running an analysis.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub player: Player,
    pub stat: StatKind,
    pub line: f64,
    pub odds: String,
    /// Opponent team abbreviation.
    pub opponent: String,
    pub season: i32,
    /// Explicit venue; when `None` the schedule decides, falling back to home.
    pub venue: Option<Venue>,
}

/// How the projection's home/away context was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenueSource {
    Explicit,
    Schedule,
    Default,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub player: Player,
    pub stat: StatKind,
    pub line: f64,
    pub odds: String,
    pub opponent: String,
    pub season: i32,
    /// Rows in the fetched game log.
    pub games: usize,
    pub splits: SplitReport,
    pub opponent_team: Option<Team>,
    pub defense: DefensiveRating,
    pub upcoming: Option<UpcomingGame>,
    pub venue: Venue,
    pub venue_source: VenueSource,
    /// `None` when a split the blend needs had no data.
    pub projection: Option<f64>,
}

impl AnalysisReport {
    /// The ledger row for this report, stamped with `now`.
    pub fn to_saved_prop(&self, now: DateTime<Utc>) -> SavedProp {
        SavedProp {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            player_id: Some(self.player.id),
            player_name: self.player.full_name(),
            team_abbreviation: self.player.team_abbreviation().to_string(),
            stat: self.stat.label().to_string(),
            line: Some(self.line),
            odds: self.odds.trim().to_string(),
            projection: self.projection,
            opponent_abbreviation: self.opponent.clone(),
            outcome: Outcome::Pending,
            game_id: self.upcoming.map(|u| u.game_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A line must be a finite, non-negative multiple of 0.5.
pub fn validate_line(line: f64) -> Result<f64, AppError> {
    if !line.is_finite() || line < 0.0 {
        return Err(AppError::InvalidLine {
            line,
            reason: "must be a non-negative number",
        });
    }
    if (line * 2.0).fract() != 0.0 {
        return Err(AppError::InvalidLine {
            line,
            reason: "must be a multiple of 0.5",
        });
    }
    Ok(line)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Active players matching `query`. A failed search reads as no matches.
pub async fn find_players(source: &dyn StatsSource, query: &str) -> Vec<Player> {
    let found = soft(source.search_players(query).await, "player search");
    debug!(query, matches = found.len(), "player search");
    found
}

/// The team the player suited up for, preferring the directory entry and
/// falling back to the most recent game in the log.
fn player_team_id(player: &Player, rows: &[GameStatRow]) -> Option<u64> {
    player.team.as_ref().map(|t| t.id).or_else(|| {
        rows.iter()
            .filter(|r| r.team_id.is_some())
            .max_by_key(|r| r.date)
            .and_then(|r| r.team_id)
    })
}

/// Run the full analysis for `request`, treating `today` as the current date
/// when looking for the upcoming game.
pub async fn analyze(
    source: &dyn StatsSource,
    config: &Config,
    request: AnalysisRequest,
    today: NaiveDate,
) -> Result<AnalysisReport, AppError> {
    let line = validate_line(request.line)?;
    let opponent = request.opponent.trim().to_ascii_uppercase();
    info!(
        player_id = request.player.id,
        stat = %request.stat,
        line,
        opponent = %opponent,
        season = request.season,
        "running analysis"
    );

    let rows = fetch_game_log(source, request.player.id, request.season).await;
    let teams = soft(source.teams().await, "team directory");
    let opp = defense::estimate(source, &teams, &opponent, request.season).await;
    let opponent_id = opp.team.as_ref().map(|t| t.id);

    let splits = SplitReport::build(
        &rows,
        request.stat,
        line,
        config.analysis.last_n,
        opponent_id,
    );

    let upcoming = match (player_team_id(&request.player, &rows), opponent_id) {
        (Some(team_id), Some(opp_id)) => find_upcoming(&opp.games, team_id, opp_id, today),
        _ => None,
    };

    let (venue, venue_source) = match (request.venue, upcoming) {
        (Some(v), _) => (v, VenueSource::Explicit),
        (None, Some(u)) => (u.venue, VenueSource::Schedule),
        (None, None) => (Venue::Home, VenueSource::Default),
    };

    let inputs = ProjectionInputs::from_report(&splits, venue, opp.rating.value());
    let projection = project(&inputs, &config.projection);
    debug!(?inputs, ?projection, %venue, "projection blended");

    Ok(AnalysisReport {
        player: request.player,
        stat: request.stat,
        line,
        odds: request.odds,
        opponent,
        season: request.season,
        games: rows.len(),
        splits,
        opponent_team: opp.team,
        defense: opp.rating,
        upcoming,
        venue,
        venue_source,
        projection,
    })
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// Append `report` to the ledger as a new `Pending` prop.
pub fn save_report(
    ledger: &mut Ledger,
    report: &AnalysisReport,
    now: DateTime<Utc>,
) -> Result<SavedProp, AppError> {
    let prop = report.to_saved_prop(now);
    ledger.append(prop.clone())?;
    info!(
        player = %prop.player_name,
        stat = %prop.stat,
        game_id = ?prop.game_id,
        "prop saved"
    );
    Ok(prop)
}

/// Holds the most recent analysis until the user saves or replaces it.
#[derive(Debug, Default)]
pub struct Session {
    pending: Option<AnalysisReport>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `report` the pending result, replacing any earlier one.
    pub fn record(&mut self, report: AnalysisReport) -> &AnalysisReport {
        self.pending.insert(report)
    }

    pub fn pending(&self) -> Option<&AnalysisReport> {
        self.pending.as_ref()
    }

    /// Save the pending result and clear the slot. The slot is kept if the
    /// write fails so the user can retry.
    pub fn save_pending(
        &mut self,
        ledger: &mut Ledger,
        now: DateTime<Utc>,
    ) -> Result<SavedProp, AppError> {
        let report = self.pending.as_ref().ok_or(AppError::NothingToSave)?;
        let prop = save_report(ledger, report, now)?;
        self.pending = None;
        Ok(prop)
    }
}
