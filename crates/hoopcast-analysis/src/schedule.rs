// Upcoming-game lookup: which game the prop is for, and where it is played.

use chrono::NaiveDate;

use hoopcast_api::types::RawGame;

use crate::normalize::parse_game_date;
use crate::projection::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingGame {
    pub game_id: u64,
    pub date: NaiveDate,
    /// Venue from `team_id`'s point of view.
    pub venue: Venue,
}

/// The earliest unfinished game between `team_id` and `opponent_id` dated
/// `today` or later. Games without an id or a parseable date are ignored.
pub fn find_upcoming(
    games: &[RawGame],
    team_id: u64,
    opponent_id: u64,
    today: NaiveDate,
) -> Option<UpcomingGame> {
    games
        .iter()
        .filter(|g| !g.is_final() && g.involves(team_id) && g.involves(opponent_id))
        .filter_map(|g| {
            let game_id = g.id?;
            let date = g.date.as_deref().and_then(parse_game_date)?;
            let venue = if g.home_id() == Some(team_id) {
                Venue::Home
            } else {
                Venue::Away
            };
            Some(UpcomingGame {
                game_id,
                date,
                venue,
            })
        })
        .filter(|u| u.date >= today)
        .min_by_key(|u| (u.date, u.game_id))
}
