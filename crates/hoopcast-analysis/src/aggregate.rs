// Averages and hit rates over splits of a player's game log.

use std::fmt;

use hoopcast_core::stat::StatKind;

use crate::normalize::GameStatRow;

// ---------------------------------------------------------------------------
// Splits
// ---------------------------------------------------------------------------

/// A named view over a player's game log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Every fetched game of the season.
    Season,
    /// The last N games by date.
    LastN(usize),
    /// Games where the player's team was the home side.
    Home,
    /// Every game that is not a home game.
    Away,
    /// Games against one opponent. `None` (unresolved opponent) selects nothing.
    VsOpponent(Option<u64>),
}

impl Split {
    /// Select the rows belonging to this split.
    ///
    /// `LastN` sorts by date ascending first (undated rows sort earliest), so
    /// fetch order never matters. Other splits keep input order.
    pub fn select<'a>(&self, rows: &'a [GameStatRow]) -> Vec<&'a GameStatRow> {
        match *self {
            Split::Season => rows.iter().collect(),
            Split::LastN(n) => {
                let mut sorted: Vec<&GameStatRow> = rows.iter().collect();
                sorted.sort_by_key(|r| r.date);
                let skip = sorted.len().saturating_sub(n);
                sorted.split_off(skip)
            }
            Split::Home => rows.iter().filter(|r| r.is_home()).collect(),
            Split::Away => rows.iter().filter(|r| !r.is_home()).collect(),
            Split::VsOpponent(None) => Vec::new(),
            Split::VsOpponent(Some(id)) => rows.iter().filter(|r| r.involves(id)).collect(),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Season => f.write_str("Season"),
            Split::LastN(n) => write!(f, "Last {n}"),
            Split::Home => f.write_str("Home"),
            Split::Away => f.write_str("Away"),
            Split::VsOpponent(_) => f.write_str("Vs Opponent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Hit rate
// ---------------------------------------------------------------------------

/// How many games in a split met the line. `total == 0` means "no data",
/// which is distinct from a measured 0% rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitRate {
    pub hits: usize,
    pub total: usize,
}

impl HitRate {
    pub const EMPTY: HitRate = HitRate { hits: 0, total: 0 };

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `hits / total`, or `None` for an empty split.
    pub fn rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.hits as f64 / self.total as f64)
        }
    }

    /// `hits / total`, with the empty split reported as 0.0.
    pub fn fraction(&self) -> f64 {
        self.rate().unwrap_or(0.0)
    }
}

/// Mean of the non-null values of `stat`; `None` when there are none.
pub fn average<'a, I>(rows: I, stat: StatKind) -> Option<f64>
where
    I: IntoIterator<Item = &'a GameStatRow>,
{
    let (sum, count) = rows
        .into_iter()
        .filter_map(|r| r.value(stat))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Count games where `stat >= line`, ignoring games with no value.
pub fn hit_rate<'a, I>(rows: I, stat: StatKind, line: f64) -> HitRate
where
    I: IntoIterator<Item = &'a GameStatRow>,
{
    rows.into_iter()
        .filter_map(|r| r.value(stat))
        .fold(HitRate::EMPTY, |acc, v| HitRate {
            hits: acc.hits + usize::from(v >= line),
            total: acc.total + 1,
        })
}

// ---------------------------------------------------------------------------
// Split summaries
// ---------------------------------------------------------------------------

/// Average and hit rate of one split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSummary {
    pub split: Split,
    /// Rows in the split, including rows with no value for the stat.
    pub games: usize,
    pub average: Option<f64>,
    pub hit_rate: HitRate,
}

pub fn summarize(rows: &[GameStatRow], split: Split, stat: StatKind, line: f64) -> SplitSummary {
    let selected = split.select(rows);
    SplitSummary {
        split,
        games: selected.len(),
        average: average(selected.iter().copied(), stat),
        hit_rate: hit_rate(selected.iter().copied(), stat, line),
    }
}

/// The five splits shown for every analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitReport {
    pub last_n: SplitSummary,
    pub season: SplitSummary,
    pub home: SplitSummary,
    pub away: SplitSummary,
    pub vs_opponent: SplitSummary,
}

impl SplitReport {
    pub fn build(
        rows: &[GameStatRow],
        stat: StatKind,
        line: f64,
        last_n: usize,
        opponent_id: Option<u64>,
    ) -> Self {
        Self {
            last_n: summarize(rows, Split::LastN(last_n), stat, line),
            season: summarize(rows, Split::Season, stat, line),
            home: summarize(rows, Split::Home, stat, line),
            away: summarize(rows, Split::Away, stat, line),
            vs_opponent: summarize(rows, Split::VsOpponent(opponent_id), stat, line),
        }
    }

    /// Summaries in display order.
    pub fn all(&self) -> [&SplitSummary; 5] {
        [
            &self.last_n,
            &self.season,
            &self.home,
            &self.away,
            &self.vs_opponent,
        ]
    }
}
