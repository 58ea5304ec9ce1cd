use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kpi::Kpis;

/// A player's profile as fetched from the data source.
///
/// `id` comes from the source URL/API and survives name collisions; money is
/// whole euros (never fractional); optional fields stay `None` when the
/// source page was incomplete rather than failing the whole squad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub current_club: Option<String>,
    #[serde(default)]
    pub birth_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub preferred_foot: Option<String>,
    #[serde(default)]
    pub market_value: Option<i64>,
}

/// Transfer strategy controlling age thresholds and spend caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    Balanced,
    Conservative,
    WinNow,
}

impl StrategyMode {
    pub const ALL: [StrategyMode; 3] = [
        StrategyMode::Balanced,
        StrategyMode::Conservative,
        StrategyMode::WinNow,
    ];

    /// Parse a user-supplied mode string. Unknown strings fall back to
    /// `Balanced` rather than erroring; the CLI validates separately.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "conservative" => StrategyMode::Conservative,
            "win_now" | "win-now" => StrategyMode::WinNow,
            _ => StrategyMode::Balanced,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyMode::Balanced => "balanced",
            StrategyMode::Conservative => "conservative",
            StrategyMode::WinNow => "win_now",
        }
    }
}

/// User-provided parameters for one simulation run.
///
/// `club_slug`, `club_id` and `league` are resolved from the club registry
/// by the front end; the user only supplies the team name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub team_name: String,
    /// Season start year, e.g. 2024 for 2024/25.
    pub season: i32,
    /// Transfer spend available, whole euros.
    pub transfer_budget: i64,
    /// Total annual salary budget, whole euros.
    pub salary_budget: i64,
    pub strategy_mode: StrategyMode,
    #[serde(default)]
    pub club_slug: String,
    #[serde(default)]
    pub club_id: String,
    #[serde(default)]
    pub league: String,
}

/// Full output of a completed simulation. Handed unchanged to commentary
/// and display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub input: SimulationInput,
    pub squad_before: Vec<Player>,
    pub squad_after: Vec<Player>,
    pub players_sold: Vec<Player>,
    pub players_bought: Vec<Player>,
    pub kpis: Kpis,
}

/// Typed failures the simulation pipeline can surface to callers.
///
/// An empty market pool is deliberately absent here: it makes the buy phase
/// a no-op, not an error.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no squad data found for {club} ({season})")]
    MissingSquad { club: String, season: i32 },
    #[error("unknown club '{0}'; not present in the club registry")]
    UnknownClub(String),
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingApiKey,
}
