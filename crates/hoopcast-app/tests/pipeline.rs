// End-to-end tests for the analysis pipeline, the pending save and the
// outcome-resolution pass, driven by an in-memory stats source.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use hoopcast_analysis::{HitRate, Venue};
use hoopcast_api::types::{MinutesField, Player, PlayerRef, RawGame, RawStat, Team};
use hoopcast_api::{ApiError, ApiResult, StatsSource};
use hoopcast_app::session::validate_line;
use hoopcast_app::{
    analyze, find_players, resolve_outcomes, AnalysisRequest, AppError, ResolveSummary, Session,
    VenueSource,
};
use hoopcast_core::config::{AnalysisConfig, ApiConfig, Config, CredentialsConfig, ProjectionConfig};
use hoopcast_core::ledger::{Ledger, Outcome, SavedProp};
use hoopcast_core::stat::StatKind;

// ===========================================================================
// Fixtures
// ===========================================================================

const LAL: u64 = 14;
const BOS: u64 = 2;
const OTHER: u64 = 5;
const PLAYER_ID: u64 = 237;
const SEASON: i32 = 2024;
const UPCOMING_GAME: u64 = 999;

#[derive(Default)]
struct FakeSource {
    fail: bool,
    teams: Vec<Team>,
    stats: HashMap<u64, Vec<RawStat>>,
    games: HashMap<u64, Vec<RawGame>>,
    game_lines: HashMap<(u64, u64), Vec<RawStat>>,
}

impl FakeSource {
    fn check(&self) -> ApiResult<()> {
        if self.fail {
            Err(ApiError::Status {
                url: "fake".into(),
                status: 500,
                body: "boom".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StatsSource for FakeSource {
    async fn search_players(&self, _search: &str) -> ApiResult<Vec<Player>> {
        self.check()?;
        Ok(vec![lebron()])
    }

    async fn teams(&self) -> ApiResult<Vec<Team>> {
        self.check()?;
        Ok(self.teams.clone())
    }

    async fn season_stats(&self, player_id: u64, _season: i32) -> ApiResult<Vec<RawStat>> {
        self.check()?;
        Ok(self.stats.get(&player_id).cloned().unwrap_or_default())
    }

    async fn season_games(&self, _season: i32, team_id: u64) -> ApiResult<Vec<RawGame>> {
        self.check()?;
        Ok(self.games.get(&team_id).cloned().unwrap_or_default())
    }

    async fn game_stats(&self, player_id: u64, game_id: u64) -> ApiResult<Vec<RawStat>> {
        self.check()?;
        Ok(self
            .game_lines
            .get(&(player_id, game_id))
            .cloned()
            .unwrap_or_default())
    }
}

fn team(id: u64, abbreviation: &str) -> Team {
    Team {
        id,
        abbreviation: abbreviation.into(),
        full_name: String::new(),
    }
}

fn lebron() -> Player {
    Player {
        id: PLAYER_ID,
        first_name: "LeBron".into(),
        last_name: "James".into(),
        position: "F".into(),
        team: Some(team(LAL, "LAL")),
    }
}

fn final_game(id: u64, date: &str, home: u64, visitor: u64) -> RawGame {
    RawGame {
        id: Some(id),
        date: Some(date.into()),
        season: Some(SEASON),
        status: Some("Final".into()),
        home_team_id: Some(home),
        visitor_team_id: Some(visitor),
        ..Default::default()
    }
}

/// Day `d` of January: `d + 10` points, home on odd days, BOS on days 3 and 8.
fn january_line(d: u32) -> RawStat {
    let opponent = if d == 3 || d == 8 { BOS } else { OTHER };
    let (home, visitor) = if d % 2 == 1 { (LAL, opponent) } else { (opponent, LAL) };
    RawStat {
        id: Some(u64::from(d)),
        min: Some(MinutesField::Text("34:30".into())),
        pts: Some(f64::from(d + 10)),
        reb: Some(7.0),
        player: Some(PlayerRef { id: PLAYER_ID }),
        team: Some(team(LAL, "LAL")),
        game: Some(final_game(
            u64::from(d),
            &format!("2025-01-{d:02}T00:00:00.000Z"),
            home,
            visitor,
        )),
        ..Default::default()
    }
}

fn boston_schedule() -> Vec<RawGame> {
    let mut won = final_game(501, "2024-12-01", BOS, OTHER);
    won.home_team_score = Some(110);
    won.visitor_team_score = Some(100);
    let mut lost = final_game(502, "2024-12-03", OTHER, BOS);
    lost.home_team_score = Some(120);
    lost.visitor_team_score = Some(118);
    let upcoming = RawGame {
        id: Some(UPCOMING_GAME),
        date: Some("2025-03-01".into()),
        season: Some(SEASON),
        status: Some("7:30 pm ET".into()),
        home_team_id: Some(BOS),
        visitor_team_id: Some(LAL),
        ..Default::default()
    };
    vec![won, lost, upcoming]
}

fn populated_source() -> FakeSource {
    // Fetched out of date order on purpose.
    let order = [7, 1, 15, 3, 12, 9, 2, 14, 5, 11, 4, 13, 8, 6, 10];
    let mut source = FakeSource {
        teams: vec![team(BOS, "BOS"), team(LAL, "LAL"), team(OTHER, "CHA")],
        ..Default::default()
    };
    source
        .stats
        .insert(PLAYER_ID, order.iter().map(|d| january_line(*d)).collect());
    source.games.insert(BOS, boston_schedule());
    source
}

fn config() -> Config {
    Config {
        api: ApiConfig {
            base_url: "https://api.example.test/v1".into(),
            timeout_secs: 5,
            per_page: 100,
            max_pages: 10,
        },
        analysis: AnalysisConfig {
            season: SEASON,
            last_n: 10,
        },
        projection: ProjectionConfig::default(),
        ledger_path: PathBuf::from("unused.csv"),
        credentials: CredentialsConfig::default(),
    }
}

fn request(opponent: &str, line: f64) -> AnalysisRequest {
    AnalysisRequest {
        player: lebron(),
        stat: StatKind::Points,
        line,
        odds: "-115".into(),
        opponent: opponent.into(),
        season: SEASON,
        venue: None,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default()
}

fn temp_ledger(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("props.csv")
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ===========================================================================
// Analysis
// ===========================================================================

#[tokio::test]
async fn full_pipeline_matches_hand_computed_values() {
    let source = populated_source();
    let report = analyze(&source, &config(), request("bos", 20.0), today())
        .await
        .unwrap();

    assert_eq!(report.opponent, "BOS");
    assert_eq!(report.games, 15);

    // Points run 11..=25; the last ten by date are 16..=25.
    assert_eq!(report.splits.last_n.average, Some(20.5));
    assert_eq!(report.splits.last_n.hit_rate, HitRate { hits: 6, total: 10 });
    assert_eq!(report.splits.season.average, Some(18.0));
    assert_eq!(report.splits.season.hit_rate, HitRate { hits: 6, total: 15 });
    assert_eq!(report.splits.home.games, 8);
    assert_eq!(report.splits.away.games, 7);
    assert_eq!(report.splits.away.average, Some(18.0));
    assert_eq!(report.splits.vs_opponent.hit_rate, HitRate { hits: 0, total: 2 });
    assert_eq!(report.splits.vs_opponent.average, Some(15.5));

    // BOS allowed 100 and 120.
    assert_eq!(report.defense.games, 2);
    assert_eq!(report.defense.points_allowed, Some(110.0));

    // Next BOS-LAL game is in Boston.
    let upcoming = report.upcoming.expect("upcoming game resolved");
    assert_eq!(upcoming.game_id, UPCOMING_GAME);
    assert_eq!(report.venue, Venue::Away);
    assert_eq!(report.venue_source, VenueSource::Schedule);

    let base = 0.5 * 20.5 + 0.3 * 18.0 + 0.2 * 18.0;
    let adj = 1.0 + ((114.0 - 110.0) / 114.0) * 0.5;
    assert!(approx(report.projection.unwrap(), base * adj));
}

#[tokio::test]
async fn unknown_opponent_degrades_to_zero_state() {
    let source = populated_source();
    let report = analyze(&source, &config(), request("XYZ", 20.0), today())
        .await
        .unwrap();

    assert!(report.opponent_team.is_none());
    assert_eq!(report.defense.value(), 0.0);
    assert_eq!(report.splits.vs_opponent.hit_rate, HitRate::EMPTY);
    assert_eq!(report.splits.vs_opponent.average, None);
    assert!(report.upcoming.is_none());
    assert_eq!(report.venue, Venue::Home);
    assert_eq!(report.venue_source, VenueSource::Default);

    // No defensive adjustment: plain blend with the home average.
    let home = report.splits.home.average.unwrap();
    let expected = 0.5 * 20.5 + 0.3 * 18.0 + 0.2 * home;
    assert!(approx(report.projection.unwrap(), expected));
}

#[tokio::test]
async fn explicit_venue_overrides_schedule() {
    let source = populated_source();
    let mut req = request("BOS", 20.0);
    req.venue = Some(Venue::Home);
    let report = analyze(&source, &config(), req, today()).await.unwrap();

    assert_eq!(report.venue, Venue::Home);
    assert_eq!(report.venue_source, VenueSource::Explicit);
    assert!(report.upcoming.is_some());
}

#[tokio::test]
async fn player_without_games_has_no_projection() {
    let mut source = populated_source();
    source.stats.clear();
    let report = analyze(&source, &config(), request("BOS", 20.0), today())
        .await
        .unwrap();

    assert_eq!(report.games, 0);
    for summary in report.splits.all() {
        assert!(summary.hit_rate.is_empty());
        assert_eq!(summary.average, None);
    }
    assert_eq!(report.projection, None);
    // Opponent context is still computed.
    assert_eq!(report.defense.points_allowed, Some(110.0));
}

#[tokio::test]
async fn failing_source_degrades_to_empty() {
    let source = FakeSource {
        fail: true,
        ..populated_source()
    };
    let report = analyze(&source, &config(), request("BOS", 20.0), today())
        .await
        .unwrap();

    assert_eq!(report.games, 0);
    assert!(report.opponent_team.is_none());
    assert_eq!(report.defense.value(), 0.0);
    assert_eq!(report.projection, None);
}

#[tokio::test]
async fn failed_player_search_reads_as_no_matches() {
    let source = populated_source();
    let found = find_players(&source, "lebron").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, PLAYER_ID);

    let source = FakeSource {
        fail: true,
        ..populated_source()
    };
    assert!(find_players(&source, "lebron").await.is_empty());
}

#[tokio::test]
async fn invalid_line_is_rejected() {
    let source = populated_source();
    let err = analyze(&source, &config(), request("BOS", 20.3), today())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidLine { .. }));
    assert!(validate_line(20.5).is_ok());
}

// ===========================================================================
// Saving
// ===========================================================================

#[tokio::test]
async fn pending_save_round_trips_through_ledger() {
    let path = temp_ledger("hoopcast_it_pending_save");
    let source = populated_source();
    let report = analyze(&source, &config(), request("BOS", 20.0), today())
        .await
        .unwrap();

    let mut session = Session::new();
    session.record(report);
    assert!(session.pending().is_some());

    let mut ledger = Ledger::load(&path);
    let now = Utc.with_ymd_and_hms(2025, 2, 1, 18, 30, 0).unwrap();
    let saved = session.save_pending(&mut ledger, now).unwrap();
    assert!(session.pending().is_none());

    assert_eq!(saved.timestamp, "2025-02-01T18:30:00Z");
    assert_eq!(saved.player_name, "LeBron James");
    assert_eq!(saved.team_abbreviation, "LAL");
    assert_eq!(saved.stat, "Points");
    assert_eq!(saved.line, Some(20.0));
    assert_eq!(saved.odds, "-115");
    assert_eq!(saved.opponent_abbreviation, "BOS");
    assert_eq!(saved.outcome, Outcome::Pending);
    assert_eq!(saved.game_id, Some(UPCOMING_GAME));

    let reloaded = Ledger::load(&path);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.rows().last(), Some(&saved));

    // The slot is empty now.
    let mut ledger = reloaded;
    assert!(matches!(
        session.save_pending(&mut ledger, now),
        Err(AppError::NothingToSave)
    ));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

// ===========================================================================
// Outcome resolution
// ===========================================================================

fn pending_prop(stat: &str, line: f64, game_id: Option<u64>) -> SavedProp {
    SavedProp {
        timestamp: "2025-02-01T18:30:00Z".into(),
        player_id: Some(PLAYER_ID),
        player_name: "LeBron James".into(),
        team_abbreviation: "LAL".into(),
        stat: stat.into(),
        line: Some(line),
        odds: "-110".into(),
        projection: Some(21.0),
        opponent_abbreviation: "BOS".into(),
        outcome: Outcome::Pending,
        game_id,
    }
}

fn box_score(game_id: u64, status: &str, pts: f64, reb: f64) -> RawStat {
    let mut game = final_game(game_id, "2025-03-01", BOS, LAL);
    game.status = Some(status.into());
    RawStat {
        pts: Some(pts),
        reb: Some(reb),
        player: Some(PlayerRef { id: PLAYER_ID }),
        team: Some(team(LAL, "LAL")),
        game: Some(game),
        ..Default::default()
    }
}

#[tokio::test]
async fn resolution_pass_settles_final_games_only() {
    let path = temp_ledger("hoopcast_it_resolve");
    let mut ledger = Ledger::load(&path);
    ledger.append(pending_prop("Points", 24.5, Some(UPCOMING_GAME))).unwrap();
    ledger.append(pending_prop("Rebounds", 10.5, Some(UPCOMING_GAME))).unwrap();
    ledger.append(pending_prop("Assists", 7.5, None)).unwrap();
    ledger.append(pending_prop("Points", 20.5, Some(1000))).unwrap();
    let mut settled = pending_prop("Points", 30.5, Some(UPCOMING_GAME));
    settled.outcome = Outcome::LineNotAchieved;
    ledger.append(settled).unwrap();

    let mut source = FakeSource::default();
    source.game_lines.insert(
        (PLAYER_ID, UPCOMING_GAME),
        vec![box_score(UPCOMING_GAME, "Final", 31.0, 7.0)],
    );
    source.game_lines.insert(
        (PLAYER_ID, 1000),
        vec![box_score(1000, "3rd Qtr", 18.0, 4.0)],
    );

    let summary = resolve_outcomes(&source, &mut ledger).await.unwrap();
    assert_eq!(
        summary,
        ResolveSummary {
            checked: 4,
            resolved: 2,
            unresolvable: 1,
            awaiting: 1,
        }
    );

    let reloaded = Ledger::load(&path);
    let outcomes: Vec<Outcome> = reloaded.rows().iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            Outcome::LineAchieved,
            Outcome::LineNotAchieved,
            Outcome::Pending,
            Outcome::Pending,
            // Already settled rows are never revisited, even if the score says otherwise.
            Outcome::LineNotAchieved,
        ]
    );

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[tokio::test]
async fn resolution_with_failing_source_leaves_everything_pending() {
    let path = temp_ledger("hoopcast_it_resolve_fail");
    let mut ledger = Ledger::load(&path);
    ledger.append(pending_prop("Points", 24.5, Some(UPCOMING_GAME))).unwrap();

    let source = FakeSource {
        fail: true,
        ..Default::default()
    };
    let summary = resolve_outcomes(&source, &mut ledger).await.unwrap();
    assert_eq!(summary.resolved, 0);
    assert_eq!(summary.awaiting, 1);
    assert_eq!(ledger.rows()[0].outcome, Outcome::Pending);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
