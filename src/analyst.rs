//! Gemini commentary over finished simulation results.
//!
//! The analyst consumes a `SimulationResult` and returns structured,
//! typed analysis objects, never free-form text and never anything that
//! feeds back into the simulation itself. Prompts are deterministic:
//! structured data in, structured JSON out.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::http_client;
use crate::kpi::avg_age;
use crate::model::{SimError, SimulationResult};
use crate::position::{PositionGroup, position_group};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const GENERATE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// AI reasoning for a single transfer decision (buy or sell).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferJustification {
    pub player_name: String,
    /// "bought" or "sold".
    pub decision: String,
    pub reasoning: String,
}

/// Structured analysis of a single simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub headline: String,
    pub key_observations: Vec<String>,
    pub financial_verdict: String,
    pub weakness: String,
    pub transfer_justifications: Vec<TransferJustification>,
}

/// Summary of one strategy mode inside a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyModeResult {
    pub mode: String,
    pub headline: String,
    pub net_spend_eur: i64,
    pub valuation_change_eur: i64,
    pub avg_age_after: f64,
    pub players_bought: usize,
    pub players_sold: usize,
}

/// Cross-mode comparison with a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub recommended_mode: String,
    pub recommendation_rationale: String,
    pub mode_summaries: Vec<StrategyModeResult>,
    pub tradeoff_analysis: String,
}

/// Per-group counts and average ages of the final squad; feeds both the
/// prompt and the report layer.
pub fn position_stats(result: &SimulationResult) -> (HashMap<PositionGroup, usize>, HashMap<PositionGroup, f64>) {
    let mut counts: HashMap<PositionGroup, usize> = HashMap::new();
    let mut avg_ages: HashMap<PositionGroup, f64> = HashMap::new();
    for group in PositionGroup::ALL {
        let members: Vec<_> = result
            .squad_after
            .iter()
            .filter(|p| position_group(p.position.as_deref()) == Some(group))
            .cloned()
            .collect();
        counts.insert(group, members.len());
        avg_ages.insert(group, avg_age(&members));
    }
    (counts, avg_ages)
}

/// Generate a structured season summary for one run.
pub fn analyse_season(result: &SimulationResult) -> Result<SeasonSummary> {
    let prompt = build_season_summary_prompt(result);
    let raw = generate_json(&prompt)?;
    serde_json::from_str(&raw).context("parse season summary response")
}

/// Compare several mode runs of the same club/season and recommend one.
pub fn compare_strategies(results: &[SimulationResult]) -> Result<StrategyComparison> {
    anyhow::ensure!(!results.is_empty(), "no results to compare");
    let mode_results: Vec<StrategyModeResult> = results.iter().map(mode_summary).collect();
    let prompt = build_comparison_prompt(results, &mode_results);
    let raw = generate_json(&prompt)?;

    #[derive(Deserialize)]
    struct Reply {
        recommended_mode: String,
        recommendation_rationale: String,
        tradeoff_analysis: String,
    }
    let reply: Reply = serde_json::from_str(&raw).context("parse comparison response")?;
    Ok(StrategyComparison {
        recommended_mode: reply.recommended_mode,
        recommendation_rationale: reply.recommendation_rationale,
        mode_summaries: mode_results,
        tradeoff_analysis: reply.tradeoff_analysis,
    })
}

fn mode_summary(result: &SimulationResult) -> StrategyModeResult {
    StrategyModeResult {
        mode: result.input.strategy_mode.as_str().to_string(),
        headline: String::new(),
        net_spend_eur: result.kpis.net_spend,
        valuation_change_eur: result.kpis.valuation_change,
        avg_age_after: result.kpis.avg_age_after,
        players_bought: result.players_bought.len(),
        players_sold: result.players_sold.len(),
    }
}

pub fn build_season_summary_prompt(result: &SimulationResult) -> String {
    let k = &result.kpis;
    let input = &result.input;

    let player_line = |p: &crate::model::Player| {
        format!(
            "  - {} (age {}, {}, MV EUR {})",
            p.name,
            p.age.map_or("?".to_string(), |a| a.to_string()),
            p.position.as_deref().unwrap_or("unknown"),
            p.market_value.unwrap_or(0),
        )
    };
    let list_block = |players: &[crate::model::Player]| {
        if players.is_empty() {
            "  (none)".to_string()
        } else {
            players.iter().map(player_line).collect::<Vec<_>>().join("\n")
        }
    };

    let (counts, avg_ages) = position_stats(result);
    let counts_line = PositionGroup::ALL
        .map(|g| format!("{}: {}", g.as_str(), counts.get(&g).copied().unwrap_or(0)))
        .join("  ");
    let ages_line = PositionGroup::ALL
        .map(|g| {
            let age = avg_ages.get(&g).copied().unwrap_or(0.0);
            if age == 0.0 {
                format!("{}: N/A", g.as_str())
            } else {
                format!("{}: {age:.1}", g.as_str())
            }
        })
        .join("  ");

    let transfers: Vec<String> = result
        .players_sold
        .iter()
        .map(|p| format!("  - {} (sold)", p.name))
        .chain(result.players_bought.iter().map(|p| format!("  - {} (bought)", p.name)))
        .collect();
    let transfers_block = if transfers.is_empty() {
        "  (none)".to_string()
    } else {
        transfers.join("\n")
    };

    format!(
        r#"You are a football transfer analyst. Analyze the following transfer window simulation for {team} ({season}/{next_season} season).

== SIMULATION DATA ==

Club: {team}
League: {league}
Strategy mode: {mode}

Transfer budget: EUR {transfer_budget}
Salary budget:   EUR {salary_budget}

Players sold ({sold_count}):
{sold_block}

Players bought ({bought_count}):
{bought_block}

KPIs:
  Squad valuation before: EUR {val_before}
  Squad valuation after:  EUR {val_after}
  Valuation change:       EUR {val_change}
  Net spend:              EUR {net_spend}
  Average age before:     {age_before:.1}
  Average age after:      {age_after:.1}
  Salary used:            EUR {salary_used} / EUR {salary_budget}
  Transfer budget remaining: EUR {budget_remaining}

Final squad position breakdown:
  Position counts: {counts_line}
  Average age by position: {ages_line}

Transfers requiring justification:
{transfers_block}

== TASK ==

Return ONLY a valid JSON object matching this exact schema. No markdown, no explanation outside the JSON (so we can parse it reliably):

{{
  "headline": "<1-3 sentence narrative summary of the entire transfer window>",
  "key_observations": ["<specific observation referencing actual players or numbers>", "<observation>", "<observation>"],
  "financial_verdict": "<2-3 sentences assessing net spend, value for money, and salary sustainability>",
  "weakness": "<1-2 sentences identifying the most significant remaining squad weakness based on the position counts and average ages above>",
  "transfer_justifications": [
    {{"player_name": "<exact player name>", "decision": "<bought | sold>", "reasoning": "<1-2 sentences>"}}
  ]
}}

Rules:
- Include one entry in transfer_justifications for EVERY player sold and EVERY player bought.
- Be specific: reference player names, ages, fees, and position data.
- Do not be generic. Every sentence should be grounded in the numbers above.
"#,
        team = input.team_name,
        season = input.season,
        next_season = (input.season + 1) % 100,
        league = input.league,
        mode = input.strategy_mode.as_str(),
        transfer_budget = input.transfer_budget,
        salary_budget = input.salary_budget,
        sold_count = result.players_sold.len(),
        sold_block = list_block(&result.players_sold),
        bought_count = result.players_bought.len(),
        bought_block = list_block(&result.players_bought),
        val_before = k.total_valuation_before,
        val_after = k.total_valuation_after,
        val_change = k.valuation_change,
        net_spend = k.net_spend,
        age_before = k.avg_age_before,
        age_after = k.avg_age_after,
        salary_used = k.salary_used,
        budget_remaining = k.transfer_budget_remaining,
    )
}

pub fn build_comparison_prompt(results: &[SimulationResult], summaries: &[StrategyModeResult]) -> String {
    let input = &results[0].input;
    let summaries_block = serde_json::to_string_pretty(summaries).unwrap_or_default();

    format!(
        r#"You are a football director advising {team} ({league}, {season}/{next_season}).

Three transfer strategies were simulated for the same club with the same budget. Here are the results:

{summaries_block}

== TASK ==

Return ONLY a valid JSON object matching this exact schema. No markdown, no explanation outside the JSON:

{{
  "recommended_mode": "<balanced | conservative | win_now>",
  "recommendation_rationale": "<2-3 sentences on why this mode best fits the club's situation>",
  "tradeoff_analysis": "<2-3 sentences comparing the key tradeoffs between all three modes>"
}}

Be direct. Reference the actual numbers (net spend, valuation change, average age) to justify your recommendation.
"#,
        team = input.team_name,
        league = input.league,
        season = input.season,
        next_season = (input.season + 1) % 100,
    )
}

/// One generateContent round trip, JSON response mode, low temperature.
fn generate_json(prompt: &str) -> Result<String> {
    let api_key = std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(SimError::MissingApiKey)?;
    let model = std::env::var("GEMINI_MODEL")
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let body = serde_json::json!({
        "contents": [{"parts": [{"text": prompt}]}],
        "generationConfig": {
            "responseMimeType": "application/json",
            "temperature": 0.3,
        }
    });

    let url = format!("{GENERATE_URL}/{model}:generateContent");
    let resp = http_client()?
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .context("gemini request failed")?;
    let status = resp.status();
    let raw = resp.text().context("read gemini response")?;
    if !status.is_success() {
        anyhow::bail!("gemini http {status}: {raw}");
    }

    #[derive(Deserialize)]
    struct GenerateResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }
    #[derive(Deserialize)]
    struct Candidate {
        content: Content,
    }
    #[derive(Deserialize)]
    struct Content {
        #[serde(default)]
        parts: Vec<Part>,
    }
    #[derive(Deserialize)]
    struct Part {
        #[serde(default)]
        text: String,
    }

    let parsed: GenerateResponse = serde_json::from_str(&raw).context("parse gemini envelope")?;
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .context("gemini returned no candidates")?;
    Ok(text.trim().to_string())
}
