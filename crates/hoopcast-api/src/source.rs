// The seam between analysis code and the upstream API.
//
// Analysis is written against `StatsSource` so tests can feed it fixed data.
// Transport errors stop here: `soft` turns any failure into an empty listing
// and a warning, which is the behaviour every caller wants.

use async_trait::async_trait;
use tracing::warn;

use crate::types::{Player, RawGame, RawStat, Team};
use crate::ApiResult;

#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Active players whose name matches `search`.
    async fn search_players(&self, search: &str) -> ApiResult<Vec<Player>>;

    /// The full team directory.
    async fn teams(&self) -> ApiResult<Vec<Team>>;

    /// Every stat line for one player in one season, all pages.
    async fn season_stats(&self, player_id: u64, season: i32) -> ApiResult<Vec<RawStat>>;

    /// Every game in `season` involving `team_id`, all pages.
    async fn season_games(&self, season: i32, team_id: u64) -> ApiResult<Vec<RawGame>>;

    /// The stat line(s) for one player in one game.
    async fn game_stats(&self, player_id: u64, game_id: u64) -> ApiResult<Vec<RawStat>>;
}

/// Degrade a failed listing to an empty one, logging what was lost.
pub fn soft<T>(result: ApiResult<Vec<T>>, what: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!("{} unavailable, continuing with no data: {}", what, e);
            Vec::new()
        }
    }
}
