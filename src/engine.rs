//! Simulation orchestrator.
//!
//! `simulate` is the pure pipeline over in-memory data:
//! sell phase → buy phase → age progression → KPIs. `run_simulation` wraps
//! it with squad/market-pool resolution (disk cache first, network second).
//! Each run owns its market exclusively; callers wanting one run per
//! strategy mode build isolated pools from the same source list.

use anyhow::Result;

use crate::kpi::{apply_age_progression, compute_kpis};
use crate::market::TransferMarket;
use crate::model::{Player, SimError, SimulationInput, SimulationResult};
use crate::rules::{buy_phase, sell_phase};
use crate::store;

/// Run the full pipeline over already-resolved squad and market-pool data.
///
/// Deterministic: identical inputs produce identical results. An empty
/// market pool is fine (the buy phase is a no-op); an empty squad is the
/// one fatal condition.
pub fn simulate(
    input: &SimulationInput,
    squad: Vec<Player>,
    market_players: Vec<Player>,
) -> Result<SimulationResult, SimError> {
    if squad.is_empty() {
        return Err(SimError::MissingSquad {
            club: input.team_name.clone(),
            season: input.season,
        });
    }

    let squad_before = squad.clone();
    let mut market = TransferMarket::new(market_players);

    let sell = sell_phase(&squad, input.transfer_budget, input.strategy_mode);
    let buy = buy_phase(
        &sell.squad,
        &mut market,
        sell.transfer_budget,
        input.salary_budget,
        input.transfer_budget,
        input.strategy_mode,
    );
    let squad_after = apply_age_progression(&buy.squad);

    let kpis = compute_kpis(
        &squad_before,
        &squad_after,
        &buy.bought,
        &sell.sold,
        buy.transfer_budget,
        input.salary_budget,
        buy.salary_used,
    );

    Ok(SimulationResult {
        input: input.clone(),
        squad_before,
        squad_after,
        players_sold: sell.sold,
        players_bought: buy.bought,
        kpis,
    })
}

/// Resolve data (cache or network) and run one simulation.
pub fn run_simulation(input: &SimulationInput) -> Result<SimulationResult> {
    let squad = store::load_or_fetch_squad(input)?;
    if squad.is_empty() {
        return Err(SimError::MissingSquad {
            club: input.team_name.clone(),
            season: input.season,
        }
        .into());
    }
    let market_players = store::load_or_fetch_market_pool(input)?;
    Ok(simulate(input, squad, market_players)?)
}
