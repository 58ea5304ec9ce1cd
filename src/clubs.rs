//! Static registry of supported clubs per league.
//!
//! Slugs and ids are stable Transfermarkt identifiers, so no dynamic league
//! table lookup is needed. The registry is the single source of truth for
//! both market-pool assembly and team-name resolution.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClubInfo {
    pub slug: &'static str,
    pub id: &'static str,
    pub name: &'static str,
}

const LALIGA: &[ClubInfo] = &[
    ClubInfo { slug: "real-madrid", id: "418", name: "Real Madrid" },
    ClubInfo { slug: "fc-barcelona", id: "131", name: "FC Barcelona" },
    ClubInfo { slug: "atletico-madrid", id: "13", name: "Atletico Madrid" },
    ClubInfo { slug: "real-sociedad", id: "681", name: "Real Sociedad" },
    ClubInfo { slug: "fc-villarreal", id: "1050", name: "Villarreal" },
];

const PREMIER_LEAGUE: &[ClubInfo] = &[
    ClubInfo { slug: "manchester-city", id: "281", name: "Manchester City" },
    ClubInfo { slug: "arsenal-fc", id: "11", name: "Arsenal" },
    ClubInfo { slug: "liverpool-fc", id: "31", name: "Liverpool" },
    ClubInfo { slug: "fc-chelsea", id: "631", name: "Chelsea" },
    ClubInfo { slug: "tottenham-hotspur", id: "148", name: "Tottenham" },
];

const BUNDESLIGA: &[ClubInfo] = &[
    ClubInfo { slug: "fc-bayern-munchen", id: "27", name: "Bayern Munich" },
    ClubInfo { slug: "borussia-dortmund", id: "16", name: "Borussia Dortmund" },
    ClubInfo { slug: "bayer-04-leverkusen", id: "15", name: "Bayer Leverkusen" },
    ClubInfo { slug: "rasenballsport-leipzig", id: "23826", name: "RB Leipzig" },
    ClubInfo { slug: "eintracht-frankfurt", id: "24", name: "Eintracht Frankfurt" },
];

const SERIE_A: &[ClubInfo] = &[
    ClubInfo { slug: "inter-mailand", id: "46", name: "Inter Milan" },
    ClubInfo { slug: "juventus-turin", id: "506", name: "Juventus" },
    ClubInfo { slug: "ac-mailand", id: "5", name: "AC Milan" },
    ClubInfo { slug: "as-rom", id: "12", name: "AS Roma" },
    ClubInfo { slug: "ssn-neapel", id: "6195", name: "Napoli" },
];

const LIGUE_1: &[ClubInfo] = &[
    ClubInfo { slug: "paris-saint-germain", id: "583", name: "PSG" },
    ClubInfo { slug: "olympique-marseille", id: "244", name: "Marseille" },
    ClubInfo { slug: "as-monaco", id: "162", name: "Monaco" },
    ClubInfo { slug: "olympique-lyon", id: "1041", name: "Lyon" },
    ClubInfo { slug: "ogc-nice", id: "417", name: "Nice" },
];

pub const LEAGUES: &[(&str, &[ClubInfo])] = &[
    ("laliga", LALIGA),
    ("premier-league", PREMIER_LEAGUE),
    ("bundesliga", BUNDESLIGA),
    ("serie-a", SERIE_A),
    ("ligue-1", LIGUE_1),
];

pub fn clubs_in_league(league: &str) -> &'static [ClubInfo] {
    LEAGUES
        .iter()
        .find(|(key, _)| *key == league)
        .map(|(_, clubs)| *clubs)
        .unwrap_or(&[])
}

/// Resolve a display name to (league key, club). Case-insensitive on the
/// club name so CLI input doesn't need exact casing.
pub fn find_club(team_name: &str) -> Option<(&'static str, &'static ClubInfo)> {
    for (league, clubs) in LEAGUES {
        for club in *clubs {
            if club.name.eq_ignore_ascii_case(team_name.trim()) {
                return Some((league, club));
            }
        }
    }
    None
}

pub fn league_label(key: &str) -> &'static str {
    match key {
        "laliga" => "LaLiga",
        "premier-league" => "Premier League",
        "bundesliga" => "Bundesliga",
        "serie-a" => "Serie A",
        "ligue-1" => "Ligue 1",
        _ => "Unknown",
    }
}

/// Season display label, e.g. 2024 → "2024-25".
pub fn season_label(season_start_year: i32) -> String {
    format!("{}-{:02}", season_start_year, (season_start_year + 1) % 100)
}
