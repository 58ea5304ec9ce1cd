//! Sell and buy phases of the transfer window.
//!
//! Rules are deterministic and conflict-free: the sell phase always
//! completes before the buy phase starts, neither phase can drop a position
//! group below its minimum, and the buy phase has two hard budget gates
//! (transfer fees + salary) plus per-mode spend-ratio caps.

use crate::market::{TransferMarket, estimate_salary};
use crate::model::{Player, StrategyMode};
use crate::position::{PositionGroup, position_group};

/// Clubs receive 85% of market value when selling.
pub const SELL_FEE_FACTOR: f64 = 0.85;

/// Prospect protection: players under this age with value at or above the
/// threshold are never treated as surplus in the bloat pass.
const PROSPECT_AGE: u8 = 21;
const PROSPECT_VALUE_THRESHOLD: i64 = 3_000_000;

/// Global per-window caps, shared across groups, one counter each.
const MAX_DECLINE_SELLS: usize = 6;
const MAX_BLOAT_SELLS: usize = 6;

/// Per-mode tuning knobs for both phases.
#[derive(Debug, Clone, Copy)]
pub struct ModeParams {
    pub decline_age: u8,
    pub prime_age_min: u8,
    pub prime_age_max: u8,
    /// Max single signing as a fraction of the original transfer budget.
    pub single_signing_ratio: f64,
    /// Max total purchase fees as a fraction of the original budget.
    /// 1.0 = no cap, 0.5 = at most half the original budget on buys.
    pub total_spend_ratio: f64,
}

pub fn mode_params(mode: StrategyMode) -> ModeParams {
    match mode {
        StrategyMode::Balanced => ModeParams {
            decline_age: 32,
            prime_age_min: 22,
            prime_age_max: 27,
            single_signing_ratio: 0.40,
            total_spend_ratio: 1.00,
        },
        StrategyMode::Conservative => ModeParams {
            decline_age: 29,
            prime_age_min: 19,
            prime_age_max: 24,
            single_signing_ratio: 0.25,
            total_spend_ratio: 0.50,
        },
        StrategyMode::WinNow => ModeParams {
            decline_age: 35,
            prime_age_min: 22,
            prime_age_max: 30,
            single_signing_ratio: 0.60,
            total_spend_ratio: 1.00,
        },
    }
}

pub fn sale_fee(market_value: Option<i64>) -> i64 {
    (market_value.unwrap_or(0) as f64 * SELL_FEE_FACTOR).round() as i64
}

/// Outcome of the sell phase. The input squad is never mutated.
#[derive(Debug, Clone)]
pub struct SellOutcome {
    pub squad: Vec<Player>,
    pub sold: Vec<Player>,
    pub transfer_budget: i64,
}

/// Run the sell phase.
///
/// Rule 1 (decline): sell players at or above the mode's decline age, oldest
/// first, as long as their group stays above its minimum.
/// Rule 2 (bloat): trim groups still over `max - 2`, cheapest first, never
/// below the group minimum and never touching protected prospects.
pub fn sell_phase(squad: &[Player], transfer_budget: i64, mode: StrategyMode) -> SellOutcome {
    let params = mode_params(mode);
    let mut squad: Vec<Player> = squad.to_vec();
    let mut sold: Vec<Player> = Vec::new();
    let mut budget = transfer_budget;

    // Rule 1: decline sell. Visit an age-descending snapshot (stable, so
    // equal ages keep squad order); once a candidate is under the threshold
    // everyone after it is too.
    let mut by_age: Vec<(String, u8)> = squad
        .iter()
        .map(|p| (p.id.clone(), p.age.unwrap_or(0)))
        .collect();
    by_age.sort_by(|a, b| b.1.cmp(&a.1));

    let mut decline_sold = 0usize;
    for (id, age) in by_age {
        if decline_sold >= MAX_DECLINE_SELLS {
            break;
        }
        if age < params.decline_age {
            break;
        }
        let Some(idx) = squad.iter().position(|p| p.id == id) else {
            continue;
        };
        let Some(group) = position_group(squad[idx].position.as_deref()) else {
            continue;
        };
        let (min_count, _) = group.thresholds();
        if count_group(&squad, group) > min_count {
            let player = squad.remove(idx);
            budget += sale_fee(player.market_value);
            sold.push(player);
            decline_sold += 1;
        }
    }

    // Rule 2: bloat sell. Target is max-2 so the buy phase always has at
    // least two open slots per group.
    let mut bloat_sold = 0usize;
    for group in PositionGroup::ALL {
        if bloat_sold >= MAX_BLOAT_SELLS {
            break;
        }
        let (min_count, max_count) = group.thresholds();
        let bloat_target = min_count.max(max_count - 2);
        if count_group(&squad, group) <= bloat_target {
            continue;
        }
        // Cheapest first, stable on ties.
        let mut members: Vec<(String, i64)> = squad
            .iter()
            .filter(|p| position_group(p.position.as_deref()) == Some(group))
            .map(|p| (p.id.clone(), p.market_value.unwrap_or(0)))
            .collect();
        members.sort_by_key(|m| m.1);

        for (id, _) in members {
            if bloat_sold >= MAX_BLOAT_SELLS {
                break;
            }
            if count_group(&squad, group) <= bloat_target {
                break;
            }
            let Some(idx) = squad.iter().position(|p| p.id == id) else {
                continue;
            };
            let player = &squad[idx];
            // Unknown age counts as old here: only a recorded young age protects.
            if player.age.unwrap_or(99) < PROSPECT_AGE
                && player.market_value.unwrap_or(0) >= PROSPECT_VALUE_THRESHOLD
            {
                continue;
            }
            let player = squad.remove(idx);
            budget += sale_fee(player.market_value);
            sold.push(player);
            bloat_sold += 1;
        }
    }

    SellOutcome {
        squad,
        sold,
        transfer_budget: budget,
    }
}

/// Outcome of the buy phase.
#[derive(Debug, Clone)]
pub struct BuyOutcome {
    pub squad: Vec<Player>,
    pub bought: Vec<Player>,
    pub transfer_budget: i64,
    pub salary_used: i64,
}

/// Run the buy phase: two ordered passes over the market.
///
/// Pass 1 (gap fill) buys the best affordable player for any group below its
/// minimum, no age filter. Pass 2 (opportunistic) buys prime-age players for
/// groups below their maximum. Both passes restart the group scan after
/// every purchase and stop outright once total fees reach the mode's
/// spend-ratio cap, computed against the original (pre-sell) budget.
pub fn buy_phase(
    squad: &[Player],
    market: &mut TransferMarket,
    transfer_budget: i64,
    salary_budget: i64,
    original_transfer_budget: i64,
    mode: StrategyMode,
) -> BuyOutcome {
    let params = mode_params(mode);
    let mut squad: Vec<Player> = squad.to_vec();
    let mut bought: Vec<Player> = Vec::new();
    let mut budget = transfer_budget;
    let mut salary_used = total_salary(&squad);

    let max_single_fee = (original_transfer_budget as f64 * params.single_signing_ratio).floor() as i64;
    let max_total_fees = (original_transfer_budget as f64 * params.total_spend_ratio).floor() as i64;
    // Independent of money already spent elsewhere: only buy-phase fees count.
    let mut total_fees_paid = 0i64;

    // Pass 1: gap fill, highest priority, no age filter.
    'pass1: loop {
        let mut purchased = false;
        for group in PositionGroup::ALL {
            if total_fees_paid >= max_total_fees {
                break 'pass1;
            }
            let (min_count, _) = group.thresholds();
            if count_group(&squad, group) >= min_count {
                continue;
            }
            let cap = max_single_fee.min(max_total_fees - total_fees_paid);
            if let Some((player, fee)) = buy_best_candidate(
                market,
                group,
                &mut budget,
                salary_budget,
                &mut salary_used,
                None,
                None,
                cap,
            ) {
                total_fees_paid += fee;
                bought.push(player.clone());
                squad.push(player);
                purchased = true;
                break; // restart the group scan so gaps fill before surplus groups
            }
        }
        if !purchased {
            break;
        }
    }

    // Pass 2: opportunistic prime-age buys up to (not past) group maximums.
    'pass2: loop {
        let mut purchased = false;
        for group in PositionGroup::ALL {
            if total_fees_paid >= max_total_fees {
                break 'pass2;
            }
            let (_, max_count) = group.thresholds();
            if count_group(&squad, group) >= max_count {
                continue;
            }
            let cap = max_single_fee.min(max_total_fees - total_fees_paid);
            if let Some((player, fee)) = buy_best_candidate(
                market,
                group,
                &mut budget,
                salary_budget,
                &mut salary_used,
                Some(params.prime_age_min),
                Some(params.prime_age_max),
                cap,
            ) {
                total_fees_paid += fee;
                bought.push(player.clone());
                squad.push(player);
                purchased = true;
                break;
            }
        }
        if !purchased {
            break;
        }
    }

    BuyOutcome {
        squad,
        bought,
        transfer_budget: budget,
        salary_used,
    }
}

/// Find and purchase the best affordable candidate for one group.
///
/// Walks the market's value-descending candidates, skipping anything over
/// the effective fee cap, outside the (inclusive) age bounds, or whose
/// estimated salary doesn't fit the remaining salary budget. Returns the
/// purchased player and fee, or `None`; the caller must not retry the same
/// group within the same sweep.
#[allow(clippy::too_many_arguments)]
fn buy_best_candidate(
    market: &mut TransferMarket,
    group: PositionGroup,
    transfer_budget: &mut i64,
    salary_budget: i64,
    salary_used: &mut i64,
    age_min: Option<u8>,
    age_max: Option<u8>,
    max_single_fee: i64,
) -> Option<(Player, i64)> {
    let salary_remaining = salary_budget - *salary_used;
    for candidate in market.candidates(group, *transfer_budget) {
        let fee = candidate.market_value.unwrap_or(0);
        if fee > max_single_fee {
            continue;
        }
        let age = candidate.age.unwrap_or(0);
        if age_min.is_some_and(|min| age < min) {
            continue;
        }
        if age_max.is_some_and(|max| age > max) {
            continue;
        }
        let salary = estimate_salary(candidate.market_value);
        if salary > salary_remaining {
            continue;
        }

        market.remove(&candidate.id);
        *transfer_budget -= fee;
        *salary_used += salary;
        return Some((candidate, fee));
    }
    None
}

pub fn count_group(squad: &[Player], group: PositionGroup) -> usize {
    squad
        .iter()
        .filter(|p| position_group(p.position.as_deref()) == Some(group))
        .count()
}

pub fn total_salary(squad: &[Player]) -> i64 {
    squad.iter().map(|p| estimate_salary(p.market_value)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, age: u8, position: &str, value: i64) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {id}"),
            age: Some(age),
            position: Some(position.to_string()),
            nationality: None,
            current_club: None,
            birth_date: None,
            preferred_foot: None,
            market_value: Some(value),
        }
    }

    /// Smallest squad satisfying every group minimum: 2 GK, 5 DEF, 5 MID, 3 ATT.
    fn baseline_squad() -> Vec<Player> {
        let mut squad = Vec::new();
        for i in 0..2 {
            squad.push(player(&format!("gk{i}"), 26, "Goalkeeper", 4_000_000));
        }
        for i in 0..5 {
            squad.push(player(&format!("def{i}"), 26, "Centre-Back", 6_000_000));
        }
        for i in 0..5 {
            squad.push(player(&format!("mid{i}"), 26, "Central Midfield", 7_000_000));
        }
        for i in 0..3 {
            squad.push(player(&format!("att{i}"), 26, "Centre-Forward", 9_000_000));
        }
        squad
    }

    fn ids(players: &[Player]) -> Vec<&str> {
        players.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn decline_sell_oldest_first_and_credits_fee() {
        let mut squad = baseline_squad();
        squad.push(player("old_mid", 33, "Central Midfield", 2_000_000));
        squad.push(player("older_mid", 36, "Central Midfield", 1_000_000));

        let out = sell_phase(&squad, 10_000_000, StrategyMode::Balanced);
        assert_eq!(ids(&out.sold), ["older_mid", "old_mid"]);
        // 0.85 * (1M + 2M) on top of the starting budget.
        assert_eq!(out.transfer_budget, 10_000_000 + 850_000 + 1_700_000);
        assert_eq!(out.squad.len(), squad.len() - 2);
    }

    #[test]
    fn decline_sell_never_breaks_group_minimum() {
        // Exactly 2 GKs (the minimum), both ancient: neither may be sold.
        let mut squad = baseline_squad();
        for p in squad.iter_mut().filter(|p| p.id.starts_with("gk")) {
            p.age = Some(38);
        }
        let out = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert!(out.sold.is_empty());
        assert_eq!(count_group(&out.squad, PositionGroup::GK), 2);
    }

    #[test]
    fn decline_sell_capped_at_six() {
        // Eight declining defenders on top of the baseline five; the group
        // stays under the bloat target afterwards, so only decline sells run.
        let mut squad = baseline_squad();
        for i in 0..8 {
            squad.push(player(&format!("olddef{i}"), 34, "Centre-Back", 500_000));
        }
        let out = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert_eq!(out.sold.len(), 6);
        assert!(out.sold.iter().all(|p| p.age == Some(34)));
    }

    #[test]
    fn decline_sell_skips_unclassified_positions() {
        let mut squad = baseline_squad();
        squad.push(player("mystery", 39, "Libero", 1_000_000));
        let out = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert!(!ids(&out.sold).contains(&"mystery"));
    }

    #[test]
    fn decline_threshold_depends_on_mode() {
        let mut squad = baseline_squad();
        squad.push(player("mid30", 30, "Central Midfield", 3_000_000));

        let balanced = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert!(balanced.sold.is_empty()); // threshold 32

        let conservative = sell_phase(&squad, 0, StrategyMode::Conservative);
        assert_eq!(ids(&conservative.sold), ["mid30"]); // threshold 29

        let win_now = sell_phase(&squad, 0, StrategyMode::WinNow);
        assert!(win_now.sold.is_empty()); // threshold 35
    }

    #[test]
    fn bloat_sell_trims_cheapest_to_max_minus_two() {
        // 12 midfielders (max): target is max(5, 12-2) = 10, so the two
        // cheapest go.
        let mut squad = baseline_squad();
        for i in 0..7 {
            squad.push(player(
                &format!("xmid{i}"),
                26,
                "Central Midfield",
                1_000_000 + i as i64,
            ));
        }
        assert_eq!(count_group(&squad, PositionGroup::MID), 12);

        let out = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert_eq!(ids(&out.sold), ["xmid0", "xmid1"]);
        assert_eq!(count_group(&out.squad, PositionGroup::MID), 10);
    }

    #[test]
    fn bloat_sell_protects_young_valuable_prospects() {
        // GK group at max 3, target max(2, 3-2) = 2: one GK must go. The
        // cheapest on paper is a protected prospect, so the next cheapest
        // goes instead.
        let mut squad = baseline_squad();
        squad.retain(|p| p.id != "gk0");
        for p in squad.iter_mut().filter(|p| p.id == "gk1") {
            p.market_value = Some(8_000_000);
        }
        squad.push(player("gk_prospect", 19, "Goalkeeper", 5_000_000));
        squad.push(player("gk_vet", 29, "Goalkeeper", 6_000_000));

        assert_eq!(count_group(&squad, PositionGroup::GK), 3);
        let out = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert_eq!(ids(&out.sold), ["gk_vet"]);
        assert!(ids(&out.squad).contains(&"gk_prospect"));
        assert_eq!(count_group(&out.squad, PositionGroup::GK), 2);
    }

    #[test]
    fn bloat_sell_does_not_protect_unknown_age() {
        let mut squad = baseline_squad();
        // 4 GKs, over the target of 2. The cheapest has high value but no
        // recorded age, so it is fair game.
        let mut no_age = player("gk_noage", 0, "Goalkeeper", 3_000_000);
        no_age.age = None;
        squad.push(no_age);
        squad.push(player("gk_extra", 27, "Goalkeeper", 10_000_000));

        let out = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert!(ids(&out.sold).contains(&"gk_noage"));
    }

    #[test]
    fn bloat_sell_shares_a_cap_of_six_across_groups() {
        // DEF and MID each want to shed 2, ATT wants to shed 3. The shared
        // cap of 6 stops ATT one short of its target.
        let mut squad = baseline_squad();
        for i in 0..7 {
            squad.push(player(&format!("xdef{i}"), 26, "Centre-Back", 100 + i as i64));
            squad.push(player(&format!("xmid{i}"), 26, "Central Midfield", 100 + i as i64));
        }
        for i in 0..8 {
            squad.push(player(&format!("xatt{i}"), 26, "Centre-Forward", 100 + i as i64));
        }
        assert_eq!(count_group(&squad, PositionGroup::ATT), 11);

        let out = sell_phase(&squad, 0, StrategyMode::Balanced);
        assert_eq!(out.sold.len(), 6);
        // DEF and MID reach their targets first; ATT gets the leftovers.
        assert_eq!(count_group(&out.squad, PositionGroup::DEF), 10);
        assert_eq!(count_group(&out.squad, PositionGroup::MID), 10);
        assert_eq!(count_group(&out.squad, PositionGroup::ATT), 9);
    }

    #[test]
    fn sell_phase_keeps_all_groups_at_or_above_min_for_every_mode() {
        let mut squad = baseline_squad();
        for p in squad.iter_mut() {
            p.age = Some(36); // everyone is a decline candidate
        }
        for mode in StrategyMode::ALL {
            let out = sell_phase(&squad, 0, mode);
            for group in PositionGroup::ALL {
                let (min, _) = group.thresholds();
                assert!(
                    count_group(&out.squad, group) >= min,
                    "{mode:?} broke {group:?} minimum"
                );
            }
        }
    }

    fn market_entry(id: &str, age: u8, position: &str, value: i64) -> Player {
        let mut p = player(id, age, position, value);
        p.current_club = Some("Rival FC".to_string());
        p
    }

    #[test]
    fn gap_fill_buys_best_affordable_ignoring_age() {
        let mut squad = baseline_squad();
        squad.retain(|p| p.id != "gk0"); // 1 GK, below min 2
        let mut market = TransferMarket::new([
            market_entry("m_gk_cheap", 33, "Goalkeeper", 2_000_000),
            market_entry("m_gk_best", 34, "Goalkeeper", 8_000_000),
        ]);
        let out = buy_phase(&squad, &mut market, 50_000_000, 500_000_000, 50_000_000, StrategyMode::Balanced);
        assert_eq!(ids(&out.bought), ["m_gk_best"]);
        assert_eq!(out.transfer_budget, 42_000_000);
        assert_eq!(market.len(), 1);
    }

    #[test]
    fn gap_fill_with_no_candidates_terminates_quietly() {
        let mut squad = baseline_squad();
        squad.retain(|p| p.id != "gk0");
        let mut market = TransferMarket::new([market_entry("m_def", 25, "Centre-Back", 1_000_000)]);
        let out = buy_phase(&squad, &mut market, 50_000_000, 500_000_000, 50_000_000, StrategyMode::Balanced);
        assert!(!ids(&out.bought).contains(&"m_gk"));
        assert_eq!(count_group(&out.squad, PositionGroup::GK), 1);
    }

    #[test]
    fn empty_market_is_a_noop() {
        let squad = baseline_squad();
        let mut market = TransferMarket::new([]);
        let out = buy_phase(&squad, &mut market, 50_000_000, 500_000_000, 50_000_000, StrategyMode::Balanced);
        assert!(out.bought.is_empty());
        assert_eq!(out.transfer_budget, 50_000_000);
    }

    #[test]
    fn opportunistic_pass_respects_prime_age_bounds() {
        let squad = baseline_squad(); // every group at min, ATT below max
        let mut market = TransferMarket::new([
            market_entry("m_att_old", 31, "Centre-Forward", 9_000_000),
            market_entry("m_att_prime", 25, "Centre-Forward", 8_000_000),
            market_entry("m_att_kid", 18, "Centre-Forward", 7_000_000),
        ]);
        let out = buy_phase(&squad, &mut market, 100_000_000, 500_000_000, 100_000_000, StrategyMode::Balanced);
        assert_eq!(ids(&out.bought), ["m_att_prime"]);
    }

    #[test]
    fn single_signing_cap_skips_to_next_candidate() {
        let mut squad = baseline_squad();
        squad.retain(|p| p.id != "gk0");
        // Balanced cap: 40% of 10M = 4M. Best GK costs 5M, next 3M.
        let mut market = TransferMarket::new([
            market_entry("m_gk_pricey", 28, "Goalkeeper", 5_000_000),
            market_entry("m_gk_fit", 28, "Goalkeeper", 3_000_000),
        ]);
        let out = buy_phase(&squad, &mut market, 10_000_000, 500_000_000, 10_000_000, StrategyMode::Balanced);
        assert_eq!(ids(&out.bought), ["m_gk_fit"]);
    }

    #[test]
    fn salary_gate_skips_unaffordable_wages() {
        let mut squad = baseline_squad();
        squad.retain(|p| p.id != "gk0");
        // Squad salary: 10% of total value. Leave just enough headroom for
        // the cheaper keeper's wages.
        let squad_salary = total_salary(&squad);
        let mut market = TransferMarket::new([
            market_entry("m_gk_big", 28, "Goalkeeper", 9_000_000), // wants 900k
            market_entry("m_gk_small", 28, "Goalkeeper", 2_000_000), // wants 200k
        ]);
        let out = buy_phase(
            &squad,
            &mut market,
            50_000_000,
            squad_salary + 300_000,
            50_000_000,
            StrategyMode::Balanced,
        );
        assert_eq!(ids(&out.bought), ["m_gk_small"]);
        assert!(out.salary_used <= squad_salary + 300_000);
    }

    #[test]
    fn conservative_total_spend_cap_halts_both_passes() {
        let mut squad = baseline_squad();
        squad.retain(|p| p.id != "gk0"); // one gap to fill
        let original = 40_000_000i64;
        // Conservative: single cap 25% = 10M, total cap 50% = 20M.
        let mut market = TransferMarket::new([
            market_entry("m_gk", 22, "Goalkeeper", 10_000_000),
            market_entry("m_att1", 22, "Centre-Forward", 10_000_000),
            market_entry("m_att2", 22, "Centre-Forward", 9_000_000),
        ]);
        let out = buy_phase(&squad, &mut market, original, 500_000_000, original, StrategyMode::Conservative);
        let fees: i64 = out.bought.iter().map(|p| p.market_value.unwrap_or(0)).sum();
        assert!(fees <= original / 2);
        assert_eq!(out.bought.len(), 2);
        // Budget money remains but the ratio cap already closed the window.
        assert!(out.transfer_budget > 0);
    }

    #[test]
    fn effective_cap_shrinks_as_fees_accumulate() {
        // Conservative, original 30M: single cap 7.5M, total cap 15M. After
        // two 7M signings only 1M of headroom remains, so a 5M candidate is
        // skipped while a 500k one still fits.
        let squad = baseline_squad();
        let original = 30_000_000i64;
        let mut market = TransferMarket::new([
            market_entry("m_a", 22, "Centre-Forward", 7_000_000),
            market_entry("m_b", 22, "Centre-Forward", 7_000_000),
            market_entry("m_c", 22, "Centre-Forward", 5_000_000),
            market_entry("m_d", 22, "Centre-Forward", 500_000),
        ]);
        let out = buy_phase(&squad, &mut market, original, 500_000_000, original, StrategyMode::Conservative);
        assert_eq!(ids(&out.bought), ["m_a", "m_b", "m_d"]);
        let fees: i64 = out.bought.iter().map(|p| p.market_value.unwrap_or(0)).sum();
        assert!(fees <= original / 2);
    }

    #[test]
    fn bought_players_leave_the_market() {
        let mut squad = baseline_squad();
        squad.retain(|p| p.id != "gk0");
        let mut market = TransferMarket::new([market_entry("m_gk", 24, "Goalkeeper", 1_000_000)]);
        let out = buy_phase(&squad, &mut market, 50_000_000, 500_000_000, 50_000_000, StrategyMode::Balanced);
        assert_eq!(ids(&out.bought), ["m_gk"]);
        assert!(market.is_empty());
        assert!(market.candidates(PositionGroup::GK, i64::MAX).is_empty());
    }
}
