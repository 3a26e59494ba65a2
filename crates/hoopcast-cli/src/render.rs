// Plain-text rendering for stdout.
//
// Absent values never print as numbers: an empty average reads
// "insufficient data" and an empty hit rate reads "no games".

use hoopcast_analysis::{HitRate, Split, SplitSummary};
use hoopcast_api::types::Player;
use hoopcast_app::{AnalysisReport, ResolveSummary, VenueSource};
use hoopcast_core::ledger::SavedProp;
use hoopcast_core::teams::TeamEntry;

pub const INSUFFICIENT: &str = "insufficient data";
pub const NO_GAMES: &str = "no games";

pub fn value(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.1}"),
        _ => INSUFFICIENT.to_string(),
    }
}

pub fn hit_rate(rate: HitRate) -> String {
    match rate.rate() {
        Some(r) => format!("{:.1}% ({}/{})", r * 100.0, rate.hits, rate.total),
        None => NO_GAMES.to_string(),
    }
}

fn split_label(summary: &SplitSummary, opponent: &str) -> String {
    match summary.split {
        Split::VsOpponent(_) => format!("Vs {opponent}"),
        other => other.to_string(),
    }
}

pub fn teams(entries: &[TeamEntry]) -> String {
    entries
        .iter()
        .map(|t| format!("{:<4} {}", t.abbreviation, t.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn players(found: &[Player]) -> String {
    if found.is_empty() {
        return "No active players matched.".to_string();
    }
    found
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let team = match p.team_abbreviation() {
                "" => "FA",
                abbr => abbr,
            };
            format!("{:>2}. {} ({}, {}) id {}", i + 1, p.full_name(), team, p.position, p.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analysis(report: &AnalysisReport) -> String {
    let mut lines = Vec::new();
    let odds = if report.odds.trim().is_empty() {
        String::new()
    } else {
        format!(" at {}", report.odds.trim())
    };
    lines.push(format!(
        "{} ({}): {} {:.1}{} vs {}, {} season",
        report.player.full_name(),
        report.player.team_abbreviation(),
        report.stat,
        report.line,
        odds,
        report.opponent,
        report.season,
    ));
    lines.push(format!("Games in log: {}", report.games));
    lines.push(String::new());
    lines.push(format!("{:<14} {:>5}  {:>17}  {}", "Split", "Games", "Average", "Hit rate"));
    for summary in report.splits.all() {
        lines.push(format!(
            "{:<14} {:>5}  {:>17}  {}",
            split_label(summary, &report.opponent),
            summary.games,
            value(summary.average),
            hit_rate(summary.hit_rate),
        ));
    }
    lines.push(String::new());

    let defense = match (&report.opponent_team, report.defense.points_allowed) {
        (None, _) => format!("{} not found; no defensive adjustment", report.opponent),
        (Some(_), None) => format!(
            "{} has no completed games; no defensive adjustment",
            report.opponent
        ),
        (Some(_), Some(allowed)) => format!(
            "{} allows {:.1} pts/game over {} games",
            report.opponent, allowed, report.defense.games
        ),
    };
    lines.push(format!("Defense: {defense}"));

    let venue = match (report.venue_source, report.upcoming) {
        (VenueSource::Explicit, _) => format!("{} (as requested)", report.venue),
        (VenueSource::Schedule, Some(game)) => format!(
            "{} (game {} on {})",
            report.venue, game.game_id, game.date
        ),
        _ => format!("{} (no upcoming game found)", report.venue),
    };
    lines.push(format!("Venue: {venue}"));

    let projection = match report.projection {
        Some(p) if p.is_finite() => {
            format!("{p:.1} ({:+.1} vs line)", p - report.line)
        }
        _ => INSUFFICIENT.to_string(),
    };
    lines.push(format!("Projection: {projection}"));
    lines.join("\n")
}

pub fn saved_prop(prop: &SavedProp) -> String {
    let line = prop
        .line
        .map(|l| format!("{l:.1}"))
        .unwrap_or_else(|| "?".to_string());
    let odds = if prop.odds.is_empty() { "-" } else { prop.odds.as_str() };
    format!(
        "{}  {} ({}) {} {} @ {} vs {}  proj {}  {}",
        prop.timestamp,
        prop.player_name,
        prop.team_abbreviation,
        prop.stat,
        line,
        odds,
        prop.opponent_abbreviation,
        value(prop.projection),
        prop.outcome,
    )
}

pub fn props(rows: &[&SavedProp]) -> String {
    if rows.is_empty() {
        return "No saved props.".to_string();
    }
    rows.iter()
        .map(|p| saved_prop(p))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn resolve_summary(summary: &ResolveSummary) -> String {
    format!(
        "Checked {} pending prop(s): {} resolved, {} awaiting a final score, {} missing game or line data",
        summary.checked, summary.resolved, summary.awaiting, summary.unresolvable
    )
}
