// Built-in directory of the 30 NBA franchises used to constrain opponent input.

/// A franchise as offered to the user when choosing an opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamEntry {
    pub name: &'static str,
    pub abbreviation: &'static str,
}

const fn team(name: &'static str, abbreviation: &'static str) -> TeamEntry {
    TeamEntry { name, abbreviation }
}

pub const NBA_TEAMS: [TeamEntry; 30] = [
    team("Atlanta Hawks", "ATL"),
    team("Boston Celtics", "BOS"),
    team("Brooklyn Nets", "BKN"),
    team("Charlotte Hornets", "CHA"),
    team("Chicago Bulls", "CHI"),
    team("Cleveland Cavaliers", "CLE"),
    team("Dallas Mavericks", "DAL"),
    team("Denver Nuggets", "DEN"),
    team("Detroit Pistons", "DET"),
    team("Golden State Warriors", "GSW"),
    team("Houston Rockets", "HOU"),
    team("Indiana Pacers", "IND"),
    team("LA Clippers", "LAC"),
    team("Los Angeles Lakers", "LAL"),
    team("Memphis Grizzlies", "MEM"),
    team("Miami Heat", "MIA"),
    team("Milwaukee Bucks", "MIL"),
    team("Minnesota Timberwolves", "MIN"),
    team("New Orleans Pelicans", "NOP"),
    team("New York Knicks", "NYK"),
    team("Oklahoma City Thunder", "OKC"),
    team("Orlando Magic", "ORL"),
    team("Philadelphia 76ers", "PHI"),
    team("Phoenix Suns", "PHX"),
    team("Portland Trail Blazers", "POR"),
    team("Sacramento Kings", "SAC"),
    team("San Antonio Spurs", "SAS"),
    team("Toronto Raptors", "TOR"),
    team("Utah Jazz", "UTA"),
    team("Washington Wizards", "WAS"),
];

/// Look up a franchise by abbreviation, ignoring case and surrounding space.
pub fn find_by_abbreviation(abbreviation: &str) -> Option<&'static TeamEntry> {
    let wanted = abbreviation.trim();
    NBA_TEAMS
        .iter()
        .find(|t| t.abbreviation.eq_ignore_ascii_case(wanted))
}
