//! Squad and market-pool fetching.
//!
//! Talks to a Transfermarkt JSON API (base URL overridable via
//! `TRANSFER_API_BASE_URL`). Parsing is split out into pure functions so it
//! can be exercised against fixtures without network access.

use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;

use crate::clubs::{self, ClubInfo};
use crate::http::fetch_json_cached;
use crate::model::Player;

const DEFAULT_BASE_URL: &str = "https://transfermarkt-api.fly.dev";

/// Randomized pause between consecutive club requests, in seconds.
const REQUEST_DELAY_RANGE: (f64, f64) = (2.0, 4.0);

/// Market pool assembled from several clubs. Individual club failures are
/// collected rather than failing the whole pool.
pub struct MarketFetch {
    pub players: Vec<Player>,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClubPlayersResponse {
    #[serde(default)]
    players: Vec<WirePlayer>,
}

#[derive(Debug, Deserialize)]
struct WirePlayer {
    id: String,
    name: String,
    #[serde(default)]
    age: Option<u8>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    nationality: Vec<String>,
    #[serde(default, rename = "dateOfBirth")]
    date_of_birth: Option<String>,
    #[serde(default)]
    foot: Option<String>,
    #[serde(default, rename = "marketValue")]
    market_value: Option<i64>,
}

/// Parse a club-players API payload into domain players.
///
/// `club_name` stamps `current_club` on every record; the API nests squads
/// under the club endpoint, so the payload itself doesn't repeat it.
pub fn parse_club_players_json(raw: &str, club_name: &str) -> Result<Vec<Player>> {
    let resp: ClubPlayersResponse =
        serde_json::from_str(raw).context("parse club players payload")?;
    Ok(resp
        .players
        .into_iter()
        .map(|w| Player {
            id: w.id,
            name: w.name,
            age: w.age,
            position: w.position.filter(|p| !p.trim().is_empty()),
            nationality: w.nationality.into_iter().next(),
            current_club: Some(club_name.to_string()),
            birth_date: w
                .date_of_birth
                .as_deref()
                .and_then(|d| d.get(..10))
                .and_then(|d| d.parse().ok()),
            preferred_foot: w.foot,
            market_value: w.market_value,
        })
        .collect())
}

/// Fetch one club's squad for a season.
pub fn fetch_squad(club: &ClubInfo, season_start_year: i32) -> Result<Vec<Player>> {
    let url = format!(
        "{}/clubs/{}/players?season_id={}",
        base_url(),
        club.id,
        season_start_year
    );
    let raw = fetch_json_cached(&url)
        .with_context(|| format!("fetch squad for {} ({season_start_year})", club.name))?;
    parse_club_players_json(&raw, club.name)
}

/// Fetch squads from every registered club in a league except the excluded
/// one, with a jittered delay between requests.
pub fn fetch_market_pool(league: &str, season_start_year: i32, exclude_club_id: &str) -> MarketFetch {
    let clubs = clubs::clubs_in_league(league);
    let mut players = Vec::new();
    let mut errors = Vec::new();
    let mut first = true;

    for club in clubs {
        if club.id == exclude_club_id {
            continue;
        }
        if !first {
            polite_delay();
        }
        first = false;
        match fetch_squad(club, season_start_year) {
            Ok(mut squad) => players.append(&mut squad),
            Err(err) => errors.push(format!("{}: {err:#}", club.name)),
        }
    }

    MarketFetch { players, errors }
}

fn base_url() -> String {
    std::env::var("TRANSFER_API_BASE_URL")
        .ok()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

fn polite_delay() {
    let (lo, hi) = REQUEST_DELAY_RANGE;
    let secs = rand::thread_rng().gen_range(lo..hi);
    std::thread::sleep(Duration::from_secs_f64(secs));
}
