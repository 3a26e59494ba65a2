// Wire types for the upstream statistics API.
//
// Every nested object and most scalars are optional: the API omits or nulls
// fields freely (scheduled games have no scores, some stat lines have no
// team), and a missing piece must never reject the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Decode an optional nested object, reading one that does not fit its type
/// (e.g. a `team` with no `id`) as absent instead of failing the parent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

// ---------------------------------------------------------------------------
// Pagination envelope
// ---------------------------------------------------------------------------

/// `{ data: [...], meta: { next_cursor } }`
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl<T> Page<T> {
    /// The continuation cursor, if the server reported one.
    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.meta.as_ref().and_then(|m| m.next_cursor.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
}

/// Opaque continuation token. The server sends a number today; strings are
/// accepted so the client does not care.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "CursorRepr")]
pub struct Cursor(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum CursorRepr {
    Number(u64),
    Text(String),
}

impl From<CursorRepr> for Cursor {
    fn from(repr: CursorRepr) -> Self {
        match repr {
            CursorRepr::Number(n) => Cursor(n.to_string()),
            CursorRepr::Text(s) => Cursor(s),
        }
    }
}

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Teams and players
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Team {
    pub id: u64,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Player {
    pub id: u64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, deserialize_with = "lenient")]
    pub team: Option<Team>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Team abbreviation, or an empty string for free agents.
    pub fn team_abbreviation(&self) -> &str {
        self.team.as_ref().map(|t| t.abbreviation.as_str()).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// A game as returned by `/games`, or nested inside a stat line.
///
/// `/games` nests `home_team`/`visitor_team` objects while stat lines carry
/// flat `home_team_id`/`visitor_team_id`; both shapes land here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawGame {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub home_team_id: Option<u64>,
    #[serde(default)]
    pub visitor_team_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub home_team: Option<Team>,
    #[serde(default, deserialize_with = "lenient")]
    pub visitor_team: Option<Team>,
    #[serde(default)]
    pub home_team_score: Option<i64>,
    #[serde(default)]
    pub visitor_team_score: Option<i64>,
}

impl RawGame {
    pub fn home_id(&self) -> Option<u64> {
        self.home_team_id
            .or_else(|| self.home_team.as_ref().map(|t| t.id))
    }

    pub fn visitor_id(&self) -> Option<u64> {
        self.visitor_team_id
            .or_else(|| self.visitor_team.as_ref().map(|t| t.id))
    }

    /// Whether the status marks the game as finished ("Final", "Final/OT").
    pub fn is_final(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.trim().to_ascii_lowercase().starts_with("final"))
            .unwrap_or(false)
    }

    pub fn involves(&self, team_id: u64) -> bool {
        self.home_id() == Some(team_id) || self.visitor_id() == Some(team_id)
    }
}

// ---------------------------------------------------------------------------
// Stat lines
// ---------------------------------------------------------------------------

/// The `min` field: `"32:30"`, `"32"`, `32`, `""` or null depending on season.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MinutesField {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerRef {
    pub id: u64,
}

/// One player's box-score line for one game.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStat {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub min: Option<MinutesField>,
    #[serde(default)]
    pub pts: Option<f64>,
    #[serde(default)]
    pub reb: Option<f64>,
    #[serde(default)]
    pub ast: Option<f64>,
    #[serde(default)]
    pub fg3m: Option<f64>,
    #[serde(default)]
    pub stl: Option<f64>,
    #[serde(default)]
    pub blk: Option<f64>,
    #[serde(default)]
    pub turnover: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub player: Option<PlayerRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub team: Option<Team>,
    #[serde(default, deserialize_with = "lenient")]
    pub game: Option<RawGame>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_with_numeric_cursor() {
        let json = r#"{"data":[{"id":1,"abbreviation":"ATL"}],"meta":{"next_cursor":25,"per_page":100}}"#;
        let page: Page<Team> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.next_cursor().map(Cursor::as_str), Some("25"));
    }

    #[test]
    fn page_without_cursor_ends_pagination() {
        let json = r#"{"data":[],"meta":{"per_page":100}}"#;
        let page: Page<Team> = serde_json::from_str(json).unwrap();
        assert!(page.next_cursor().is_none());

        let json = r#"{"data":[]}"#;
        let page: Page<Team> = serde_json::from_str(json).unwrap();
        assert!(page.next_cursor().is_none());
    }

    #[test]
    fn stat_line_with_nulls_and_missing_game() {
        let json = r#"{"id":9,"min":null,"pts":null,"reb":7,"team":null}"#;
        let stat: RawStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.min, None);
        assert_eq!(stat.pts, None);
        assert_eq!(stat.reb, Some(7.0));
        assert!(stat.game.is_none());
        assert!(stat.team.is_none());
    }

    #[test]
    fn nested_objects_without_ids_read_as_absent() {
        let json = r#"{"id":9,"pts":24,"player":{"first_name":"x"},"team":{"abbreviation":"LAL"},
                       "game":{"id":3,"home_team":{"abbreviation":"BOS"},"visitor_team_id":14}}"#;
        let stat: RawStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.pts, Some(24.0));
        assert!(stat.player.is_none());
        assert!(stat.team.is_none());
        let game = stat.game.unwrap();
        assert_eq!(game.home_id(), None);
        assert_eq!(game.visitor_id(), Some(14));

        let player: Player =
            serde_json::from_str(r#"{"id":1,"first_name":"A","team":{"full_name":"?"}}"#).unwrap();
        assert!(player.team.is_none());
    }

    #[test]
    fn minutes_accepts_text_and_numbers() {
        let text: RawStat = serde_json::from_str(r#"{"min":"32:30"}"#).unwrap();
        assert_eq!(text.min, Some(MinutesField::Text("32:30".into())));
        let num: RawStat = serde_json::from_str(r#"{"min":32}"#).unwrap();
        assert_eq!(num.min, Some(MinutesField::Number(32.0)));
    }

    #[test]
    fn game_ids_from_either_shape() {
        let flat: RawGame =
            serde_json::from_str(r#"{"id":5,"home_team_id":2,"visitor_team_id":14}"#).unwrap();
        assert_eq!(flat.home_id(), Some(2));
        assert_eq!(flat.visitor_id(), Some(14));

        let nested: RawGame = serde_json::from_str(
            r#"{"id":5,"status":"Final","home_team":{"id":2,"abbreviation":"BOS"},
                "visitor_team":{"id":14,"abbreviation":"LAL"},
                "home_team_score":110,"visitor_team_score":104}"#,
        )
        .unwrap();
        assert_eq!(nested.home_id(), Some(2));
        assert!(nested.involves(14));
        assert!(!nested.involves(3));
        assert!(nested.is_final());
    }

    #[test]
    fn scheduled_game_is_not_final() {
        let game: RawGame =
            serde_json::from_str(r#"{"id":7,"status":"7:30 pm ET","home_team_score":0}"#).unwrap();
        assert!(!game.is_final());
        let game = RawGame {
            status: Some("Final/OT".into()),
            ..Default::default()
        };
        assert!(game.is_final());
    }

    #[test]
    fn player_names() {
        let player: Player = serde_json::from_str(
            r#"{"id":237,"first_name":"LeBron","last_name":"James","team":{"id":14,"abbreviation":"LAL"}}"#,
        )
        .unwrap();
        assert_eq!(player.full_name(), "LeBron James");
        assert_eq!(player.team_abbreviation(), "LAL");
    }
}
