// Linear projection blend.
//
// projection = (w_last * last_n + w_season * season + w_ctx * context) * adj
// adj        = 1 + ((league_avg - def_rating) / league_avg) * k, or 1 when the
//              rating is unknown (<= 0).
//
// A transparent heuristic: no error bounds, no fitting.

use std::fmt;
use std::str::FromStr;

use hoopcast_core::config::ProjectionConfig;

use crate::aggregate::SplitReport;

/// Where the upcoming game is played, from the analysed player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Venue {
    #[default]
    Home,
    Away,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Home => f.write_str("home"),
            Venue::Away => f.write_str("away"),
        }
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" | "h" => Ok(Venue::Home),
            "away" | "a" | "road" => Ok(Venue::Away),
            other => Err(format!("unknown venue '{other}' (expected home or away)")),
        }
    }
}

/// The three averages the blend consumes plus the opponent's rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInputs {
    pub last_n_avg: Option<f64>,
    pub season_avg: Option<f64>,
    /// Home or away average, matching the upcoming venue.
    pub context_avg: Option<f64>,
    /// Opponent points allowed per game; 0.0 when unknown.
    pub defensive_rating: f64,
}

impl ProjectionInputs {
    pub fn from_report(report: &SplitReport, venue: Venue, defensive_rating: f64) -> Self {
        let context = match venue {
            Venue::Home => &report.home,
            Venue::Away => &report.away,
        };
        Self {
            last_n_avg: report.last_n.average,
            season_avg: report.season.average,
            context_avg: context.average,
            defensive_rating,
        }
    }
}

/// Multiplier for opponent defense, scaled by how far the rating sits from
/// the league average.
pub fn adjustment_factor(defensive_rating: f64, config: &ProjectionConfig) -> f64 {
    if !defensive_rating.is_finite() || defensive_rating <= 0.0 {
        return 1.0;
    }
    let league = config.league_average;
    1.0 + ((league - defensive_rating) / league) * config.defense_k
}

/// Blend the averages into a projected stat value.
///
/// Returns `None` when any of the three averages is missing; a projection
/// over an empty split would be meaningless.
pub fn project(inputs: &ProjectionInputs, config: &ProjectionConfig) -> Option<f64> {
    let last_n = inputs.last_n_avg?;
    let season = inputs.season_avg?;
    let context = inputs.context_avg?;
    let base = config.weight_last_n * last_n
        + config.weight_season * season
        + config.weight_context * context;
    Some(base * adjustment_factor(inputs.defensive_rating, config))
}
