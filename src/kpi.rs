//! Age progression and before/after KPI computation.
//!
//! Age progression runs once on the post-buy squad; KPIs are a pure diff of
//! the two squad snapshots plus the transfer lists and budget scalars the
//! phases carried through.

use serde::{Deserialize, Serialize};

use crate::model::Player;
use crate::rules::sale_fee;

/// Market value multiplier after one season, keyed on the player's
/// pre-increment age. Youth gains fastest; players past 30 depreciate
/// steeply.
fn age_multiplier(age: u8) -> f64 {
    match age {
        0..=20 => 1.15,
        21..=24 => 1.10,
        25..=28 => 1.03,
        29..=30 => 0.95,
        31..=32 => 0.90,
        _ => 0.80,
    }
}

/// Project the squad one season forward: age +1, value scaled by the
/// age-bucket multiplier. Returns a new list; the input is untouched.
///
/// A player with no recorded age progresses to age 1 (the missing age is
/// treated as 0 for both the increment and the bucket lookup). That is a
/// known quirk kept for compatibility with existing result data; a missing
/// market value simply stays missing.
pub fn apply_age_progression(squad: &[Player]) -> Vec<Player> {
    squad
        .iter()
        .map(|player| {
            let mut updated = player.clone();
            let current_age = player.age.unwrap_or(0);
            updated.age = Some(current_age + 1);
            if let Some(mv) = player.market_value {
                updated.market_value = Some((mv as f64 * age_multiplier(current_age)).round() as i64);
            }
            updated
        })
        .collect()
}

/// Before/after key performance indicators for a simulated window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_valuation_before: i64,
    pub total_valuation_after: i64,
    pub valuation_change: i64,
    /// Fees paid minus fees received; positive = net spend.
    pub net_spend: i64,
    pub avg_age_before: f64,
    pub avg_age_after: f64,
    pub salary_used: i64,
    pub salary_budget: i64,
    pub salary_budget_remaining: i64,
    pub transfer_budget_remaining: i64,
}

#[allow(clippy::too_many_arguments)]
pub fn compute_kpis(
    squad_before: &[Player],
    squad_after: &[Player],
    players_bought: &[Player],
    players_sold: &[Player],
    transfer_budget_remaining: i64,
    salary_budget: i64,
    salary_used: i64,
) -> Kpis {
    let val_before = total_valuation(squad_before);
    let val_after = total_valuation(squad_after);

    let fees_paid: i64 = players_bought.iter().map(|p| p.market_value.unwrap_or(0)).sum();
    // Same 0.85 discount the sell phase credited.
    let fees_received: i64 = players_sold.iter().map(|p| sale_fee(p.market_value)).sum();

    Kpis {
        total_valuation_before: val_before,
        total_valuation_after: val_after,
        valuation_change: val_after - val_before,
        net_spend: fees_paid - fees_received,
        avg_age_before: avg_age(squad_before),
        avg_age_after: avg_age(squad_after),
        salary_used,
        salary_budget,
        salary_budget_remaining: salary_budget - salary_used,
        transfer_budget_remaining,
    }
}

pub fn total_valuation(squad: &[Player]) -> i64 {
    squad.iter().map(|p| p.market_value.unwrap_or(0)).sum()
}

/// Average age over players with a recorded age, rounded to one decimal.
/// 0.0 when no player has an age.
pub fn avg_age(squad: &[Player]) -> f64 {
    let ages: Vec<u8> = squad.iter().filter_map(|p| p.age).collect();
    if ages.is_empty() {
        return 0.0;
    }
    let mean = ages.iter().map(|&a| a as f64).sum::<f64>() / ages.len() as f64;
    (mean * 10.0).round() / 10.0
}
