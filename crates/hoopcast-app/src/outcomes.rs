// Outcome resolution pass over the ledger.
//
// For each `Pending` prop with a player id, game id, stat and line, fetch the
// player's line for that game. Once the game is final the prop becomes
// `LineAchieved` (actual >= line) or `LineNotAchieved`. Anything that cannot
// be resolved yet stays `Pending`.

use tracing::{debug, info};

use hoopcast_analysis::normalize::normalize_stat;
use hoopcast_api::{soft, StatsSource};
use hoopcast_core::ledger::{Ledger, Outcome, SavedProp};
use hoopcast_core::stat::StatKind;

use crate::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Pending rows examined.
    pub checked: usize,
    /// Rows given a final outcome in this pass.
    pub resolved: usize,
    /// Rows missing the ids, stat or line needed to ever resolve.
    pub unresolvable: usize,
    /// Rows whose game is unfinished or has no stat line yet.
    pub awaiting: usize,
}

/// What a pending row needs to be looked up.
struct Lookup {
    player_id: u64,
    game_id: u64,
    stat: StatKind,
    line: f64,
}

fn lookup_for(prop: &SavedProp) -> Option<Lookup> {
    Some(Lookup {
        player_id: prop.player_id?,
        game_id: prop.game_id?,
        stat: prop.stat_kind()?,
        line: prop.line?,
    })
}

/// The final result for one lookup, or `None` while the game is unfinished.
async fn fetch_outcome(source: &dyn StatsSource, lookup: &Lookup) -> Option<Outcome> {
    let lines = soft(
        source.game_stats(lookup.player_id, lookup.game_id).await,
        "game stat line",
    );
    let raw = lines.iter().find(|s| {
        s.game.as_ref().and_then(|g| g.id) == Some(lookup.game_id)
            && s.player.as_ref().map(|p| p.id).unwrap_or(lookup.player_id) == lookup.player_id
    })?;
    if !raw.game.as_ref().is_some_and(|g| g.is_final()) {
        return None;
    }
    let actual = normalize_stat(raw).value(lookup.stat)?;
    Some(Outcome::from_actual(actual, lookup.line))
}

/// Resolve every pending row that can be resolved and persist the ledger if
/// anything changed.
pub async fn resolve_outcomes(
    source: &dyn StatsSource,
    ledger: &mut Ledger,
) -> Result<ResolveSummary, AppError> {
    let mut summary = ResolveSummary::default();

    for index in ledger.pending_indices() {
        summary.checked += 1;
        let Some(lookup) = ledger.get(index).and_then(lookup_for) else {
            summary.unresolvable += 1;
            continue;
        };
        match fetch_outcome(source, &lookup).await {
            Some(outcome) => {
                if ledger.resolve(index, outcome) {
                    summary.resolved += 1;
                    debug!(
                        index,
                        game_id = lookup.game_id,
                        outcome = %outcome,
                        "prop resolved"
                    );
                }
            }
            None => summary.awaiting += 1,
        }
    }

    if summary.resolved > 0 {
        ledger.save()?;
    }
    info!(
        checked = summary.checked,
        resolved = summary.resolved,
        awaiting = summary.awaiting,
        unresolvable = summary.unresolvable,
        "outcome resolution finished"
    );
    Ok(summary)
}
