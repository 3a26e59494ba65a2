// Statistic kinds a prop can be evaluated against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of per-game statistics the tool knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Points,
    Rebounds,
    Assists,
    #[serde(rename = "Threes Made")]
    ThreesMade,
    Steals,
    Blocks,
    Turnovers,
    Minutes,
}

impl StatKind {
    pub const ALL: [StatKind; 8] = [
        StatKind::Points,
        StatKind::Rebounds,
        StatKind::Assists,
        StatKind::ThreesMade,
        StatKind::Steals,
        StatKind::Blocks,
        StatKind::Turnovers,
        StatKind::Minutes,
    ];

    /// Human-readable label, also the value stored in the ledger's `stat` column.
    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Points => "Points",
            StatKind::Rebounds => "Rebounds",
            StatKind::Assists => "Assists",
            StatKind::ThreesMade => "Threes Made",
            StatKind::Steals => "Steals",
            StatKind::Blocks => "Blocks",
            StatKind::Turnovers => "Turnovers",
            StatKind::Minutes => "Minutes",
        }
    }

    /// Parse a user-supplied stat name.
    ///
    /// Accepts the display label, the upstream field abbreviation
    /// (`pts`, `reb`, `fg3m`, ...) and a few common shorthands, ignoring case,
    /// spaces, dashes and underscores.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "points" | "pts" | "pt" => Some(StatKind::Points),
            "rebounds" | "reb" | "rebs" => Some(StatKind::Rebounds),
            "assists" | "ast" | "asts" => Some(StatKind::Assists),
            "threesmade" | "threes" | "fg3m" | "3pm" | "3s" => Some(StatKind::ThreesMade),
            "steals" | "stl" => Some(StatKind::Steals),
            "blocks" | "blk" => Some(StatKind::Blocks),
            "turnovers" | "turnover" | "tov" | "to" => Some(StatKind::Turnovers),
            "minutes" | "min" | "mins" => Some(StatKind::Minutes),
            _ => None,
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatKind::parse(s).ok_or_else(|| {
            let known: Vec<&str> = StatKind::ALL.iter().map(|k| k.label()).collect();
            format!("unknown stat '{s}' (expected one of: {})", known.join(", "))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_labels_and_abbreviations() {
        assert_eq!(StatKind::parse("Points"), Some(StatKind::Points));
        assert_eq!(StatKind::parse("pts"), Some(StatKind::Points));
        assert_eq!(StatKind::parse("Threes Made"), Some(StatKind::ThreesMade));
        assert_eq!(StatKind::parse("threes_made"), Some(StatKind::ThreesMade));
        assert_eq!(StatKind::parse("FG3M"), Some(StatKind::ThreesMade));
        assert_eq!(StatKind::parse("tov"), Some(StatKind::Turnovers));
        assert_eq!(StatKind::parse("min"), Some(StatKind::Minutes));
        assert_eq!(StatKind::parse("dunks"), None);
    }

    #[test]
    fn label_parses_back_for_every_kind() {
        for kind in StatKind::ALL {
            assert_eq!(StatKind::parse(kind.label()), Some(kind));
        }
    }

    #[test]
    fn from_str_error_lists_known_stats() {
        let err = "dunks".parse::<StatKind>().unwrap_err();
        assert!(err.contains("Threes Made"));
    }
}
