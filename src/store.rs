//! Disk cache of fetched squads and market pools.
//!
//! Versioned JSON files under the per-user cache dir, written atomically
//! (tmp + rename). File naming mirrors what the files contain:
//! `squad_{slug}_{season}.json` and `market_{league}_{season}.json`.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::clubs::{self, season_label};
use crate::fetch;
use crate::http::app_cache_dir;
use crate::model::{Player, SimulationInput};

const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadFile {
    pub version: u32,
    pub team_name: String,
    pub season: String,
    pub fetched_at: u64,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketFile {
    pub version: u32,
    pub league: String,
    pub season: String,
    pub fetched_at: u64,
    pub players: Vec<Player>,
}

/// Load a club's squad from cache, fetching and caching on a miss.
pub fn load_or_fetch_squad(input: &SimulationInput) -> Result<Vec<Player>> {
    let season = season_label(input.season);
    let slug = slugify(&input.team_name);
    if let Some(file) = read_squad_file(&slug, &season) {
        return Ok(file.players);
    }

    let club = clubs::find_club(&input.team_name)
        .map(|(_, club)| club)
        .context("club not present in registry")?;
    let players = fetch::fetch_squad(club, input.season)?;
    save_squad(&input.team_name, input.season, &players)?;
    Ok(players)
}

/// Load the league market pool, assembling it from per-club squad caches or
/// the network when there is no pooled file yet.
///
/// The user's own club is always filtered out, even from a cached pool.
pub fn load_or_fetch_market_pool(input: &SimulationInput) -> Result<Vec<Player>> {
    let season = season_label(input.season);
    if let Some(file) = read_market_file(&input.league, &season) {
        return Ok(file
            .players
            .into_iter()
            .filter(|p| p.current_club.as_deref() != Some(input.team_name.as_str()))
            .collect());
    }

    let players = match pool_from_cached_squads(input) {
        Some(players) => players,
        None => {
            let fetched = fetch::fetch_market_pool(&input.league, input.season, &input.club_id);
            if !fetched.errors.is_empty() && fetched.players.is_empty() {
                anyhow::bail!(
                    "market pool fetch failed for {}: {}",
                    input.league,
                    fetched.errors.join("; ")
                );
            }
            fetched.players
        }
    };

    save_market_pool(&input.league, input.season, &players)?;
    Ok(players)
}

/// Build the pool from individually cached club squads. Returns `None` when
/// any club in the league lacks a cached file, so the caller falls back to
/// a live fetch.
fn pool_from_cached_squads(input: &SimulationInput) -> Option<Vec<Player>> {
    let season = season_label(input.season);
    let mut players = Vec::new();
    for club in clubs::clubs_in_league(&input.league) {
        if club.id == input.club_id {
            continue;
        }
        let file = read_squad_file(&slugify(club.name), &season)?;
        players.extend(file.players);
    }
    if players.is_empty() { None } else { Some(players) }
}

pub fn save_squad(team_name: &str, season_start_year: i32, players: &[Player]) -> Result<PathBuf> {
    let season = season_label(season_start_year);
    let path = data_path(&format!("squad_{}_{}.json", slugify(team_name), season))
        .context("no writable cache directory")?;
    let file = SquadFile {
        version: STORE_VERSION,
        team_name: team_name.to_string(),
        season,
        fetched_at: now_secs(),
        players: players.to_vec(),
    };
    write_json(&path, &file)?;
    Ok(path)
}

pub fn save_market_pool(league: &str, season_start_year: i32, players: &[Player]) -> Result<PathBuf> {
    let season = season_label(season_start_year);
    let path = data_path(&format!("market_{league}_{season}.json"))
        .context("no writable cache directory")?;
    let file = MarketFile {
        version: STORE_VERSION,
        league: league.to_string(),
        season,
        fetched_at: now_secs(),
        players: players.to_vec(),
    };
    write_json(&path, &file)?;
    Ok(path)
}

fn read_squad_file(slug: &str, season: &str) -> Option<SquadFile> {
    let path = data_path(&format!("squad_{slug}_{season}.json"))?;
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<SquadFile>(&raw).ok()?;
    (file.version == STORE_VERSION).then_some(file)
}

fn read_market_file(league: &str, season: &str) -> Option<MarketFile> {
    let path = data_path(&format!("market_{league}_{season}.json"))?;
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<MarketFile>(&raw).ok()?;
    (file.version == STORE_VERSION).then_some(file)
}

fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).context("serialize cache file")?;
    fs::write(&tmp, json).context("write cache file")?;
    fs::rename(&tmp, path).context("swap cache file")?;
    Ok(())
}

fn data_path(file_name: &str) -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("data").join(file_name))
}

/// Lowercase, with anything outside [a-z0-9-] collapsed to '-'.
pub fn slugify(team_name: &str) -> String {
    team_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
