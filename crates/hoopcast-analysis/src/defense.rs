// Opponent defensive rating: mean points allowed per completed game.
//
// This is a points-allowed average, not the possession-based efficiency
// rating. A game counts only when it is final and both team ids and both
// scores are present.

use tracing::{debug, info};

use hoopcast_api::types::{RawGame, Team};
use hoopcast_api::{soft, StatsSource};

/// Points allowed by one team over a season's qualifying games.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DefensiveRating {
    /// Qualifying games the mean was taken over.
    pub games: usize,
    /// `None` when no game qualified.
    pub points_allowed: Option<f64>,
}

impl DefensiveRating {
    pub const UNKNOWN: DefensiveRating = DefensiveRating {
        games: 0,
        points_allowed: None,
    };

    /// The rating as a plain number; 0.0 when there is no data.
    pub fn value(&self) -> f64 {
        self.points_allowed.unwrap_or(0.0)
    }
}

/// Find a team by abbreviation, ignoring case.
pub fn resolve_team<'a>(teams: &'a [Team], abbreviation: &str) -> Option<&'a Team> {
    let wanted = abbreviation.trim();
    if wanted.is_empty() {
        return None;
    }
    teams
        .iter()
        .find(|t| t.abbreviation.trim().eq_ignore_ascii_case(wanted))
}

/// Points `team_id` allowed in `game`, if the game qualifies.
fn allowed_in(game: &RawGame, team_id: u64) -> Option<f64> {
    if !game.is_final() {
        return None;
    }
    let home = game.home_id()?;
    let visitor = game.visitor_id()?;
    let home_score = game.home_team_score?;
    let visitor_score = game.visitor_team_score?;
    if home == team_id {
        Some(visitor_score as f64)
    } else if visitor == team_id {
        Some(home_score as f64)
    } else {
        None
    }
}

/// Mean points allowed by `team_id` across the qualifying games in `games`.
pub fn points_allowed(games: &[RawGame], team_id: u64) -> DefensiveRating {
    let allowed: Vec<f64> = games.iter().filter_map(|g| allowed_in(g, team_id)).collect();
    if allowed.is_empty() {
        return DefensiveRating::UNKNOWN;
    }
    DefensiveRating {
        games: allowed.len(),
        points_allowed: Some(allowed.iter().sum::<f64>() / allowed.len() as f64),
    }
}

/// An opponent's resolved identity, its season schedule and its rating.
#[derive(Debug, Clone, Default)]
pub struct OpponentSeason {
    pub team: Option<Team>,
    /// Every game of the season involving the opponent, completed or not.
    pub games: Vec<RawGame>,
    pub rating: DefensiveRating,
}

/// Resolve `abbreviation` against `teams`, page through the season's games
/// for that team and compute its defensive rating.
///
/// Never fails: an unknown abbreviation or a failed fetch yields
/// `DefensiveRating::UNKNOWN`.
pub async fn estimate(
    source: &dyn StatsSource,
    teams: &[Team],
    abbreviation: &str,
    season: i32,
) -> OpponentSeason {
    let Some(team) = resolve_team(teams, abbreviation).cloned() else {
        info!("opponent '{}' not found in team directory", abbreviation.trim());
        return OpponentSeason::default();
    };

    let games: Vec<RawGame> = soft(
        source.season_games(season, team.id).await,
        "opponent season games",
    )
    .into_iter()
    .filter(|g| g.involves(team.id))
    .collect();

    let rating = points_allowed(&games, team.id);
    debug!(
        team = %team.abbreviation,
        season,
        fetched = games.len(),
        qualifying = rating.games,
        "defensive rating computed"
    );
    OpponentSeason {
        team: Some(team),
        games,
        rating,
    }
}
