// Stat normalizer: raw API stat lines -> uniform `GameStatRow`s.
//
// All null-handling happens here. Downstream aggregation can assume every
// row is well formed, if sparse: ids and stats are `Option`, minutes is
// always a finite float >= 0, dates are parsed or `None`.

use chrono::NaiveDate;
use tracing::debug;

use hoopcast_api::types::{MinutesField, RawStat};
use hoopcast_api::{soft, StatsSource};
use hoopcast_core::stat::StatKind;

/// One player-game observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStatRow {
    pub game_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub season: Option<i32>,
    /// The team the player played for in this game.
    pub team_id: Option<u64>,
    pub home_team_id: Option<u64>,
    pub visitor_team_id: Option<u64>,
    pub points: Option<f64>,
    pub rebounds: Option<f64>,
    pub assists: Option<f64>,
    pub threes_made: Option<f64>,
    pub steals: Option<f64>,
    pub blocks: Option<f64>,
    pub turnovers: Option<f64>,
    pub minutes: f64,
}

impl GameStatRow {
    /// The value of `stat` in this game, `None` when the API had no value.
    pub fn value(&self, stat: StatKind) -> Option<f64> {
        match stat {
            StatKind::Points => self.points,
            StatKind::Rebounds => self.rebounds,
            StatKind::Assists => self.assists,
            StatKind::ThreesMade => self.threes_made,
            StatKind::Steals => self.steals,
            StatKind::Blocks => self.blocks,
            StatKind::Turnovers => self.turnovers,
            StatKind::Minutes => Some(self.minutes),
        }
    }

    pub fn is_home(&self) -> bool {
        self.team_id.is_some() && self.team_id == self.home_team_id
    }

    pub fn involves(&self, team_id: u64) -> bool {
        self.home_team_id == Some(team_id) || self.visitor_team_id == Some(team_id)
    }
}

/// Parse minutes played into fractional minutes.
///
/// `"32:30"` -> 32.5, `"32"` / `32` -> 32.0; anything missing, blank,
/// negative or unparseable -> 0.0.
pub fn parse_minutes(raw: Option<&MinutesField>) -> f64 {
    let minutes = match raw {
        None => 0.0,
        Some(MinutesField::Number(n)) => *n,
        Some(MinutesField::Text(s)) => parse_minutes_text(s.trim()).unwrap_or(0.0),
    };
    if minutes.is_finite() && minutes > 0.0 {
        minutes
    } else {
        0.0
    }
}

fn parse_minutes_text(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    match s.split_once(':') {
        Some((mm, ss)) => {
            let mm: f64 = mm.trim().parse().ok()?;
            let ss: f64 = ss.trim().parse().ok()?;
            Some(mm + ss / 60.0)
        }
        None => s.parse().ok(),
    }
}

/// Parse the `YYYY-MM-DD` prefix of an API date (`"2024-01-15T00:00:00.000Z"`).
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let prefix: String = raw.trim().chars().take(10).collect();
    NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").ok()
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Flatten one raw stat line.
pub fn normalize_stat(raw: &RawStat) -> GameStatRow {
    let game = raw.game.as_ref();
    GameStatRow {
        game_id: game.and_then(|g| g.id),
        date: game
            .and_then(|g| g.date.as_deref())
            .and_then(parse_game_date),
        season: game.and_then(|g| g.season),
        team_id: raw.team.as_ref().map(|t| t.id),
        home_team_id: game.and_then(|g| g.home_id()),
        visitor_team_id: game.and_then(|g| g.visitor_id()),
        points: finite(raw.pts),
        rebounds: finite(raw.reb),
        assists: finite(raw.ast),
        threes_made: finite(raw.fg3m),
        steals: finite(raw.stl),
        blocks: finite(raw.blk),
        turnovers: finite(raw.turnover),
        minutes: parse_minutes(raw.min.as_ref()),
    }
}

/// Flatten a sequence of raw stat lines. Rows are kept in input order; no
/// row is dropped for missing data.
pub fn normalize(raw: &[RawStat]) -> Vec<GameStatRow> {
    raw.iter().map(normalize_stat).collect()
}

/// Fetch every stat line for a player-season and normalize it. Transport
/// failures yield an empty log.
pub async fn fetch_game_log(
    source: &dyn StatsSource,
    player_id: u64,
    season: i32,
) -> Vec<GameStatRow> {
    let raw = soft(
        source.season_stats(player_id, season).await,
        "player season stats",
    );
    let rows = normalize(&raw);
    debug!(player_id, season, rows = rows.len(), "game log normalized");
    rows
}
