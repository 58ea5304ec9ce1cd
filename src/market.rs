use std::collections::HashMap;

use crate::model::Player;
use crate::position::{PositionGroup, position_group};

/// Estimate annual salary as 10% of market value, rounded.
///
/// Missing or non-positive values estimate to 0: free agents and unvalued
/// youth players don't block the salary gate.
pub fn estimate_salary(market_value: Option<i64>) -> i64 {
    match market_value {
        Some(mv) if mv > 0 => (mv as f64 * 0.10).round() as i64,
        _ => 0,
    }
}

/// Pool of players available to buy, aggregated from other clubs.
///
/// Purchased players are removed so the same player can never be bought
/// twice within a run. Slot order is first-occurrence insertion order;
/// duplicate ids overwrite in place (last write wins), which keeps candidate
/// tie-breaks deterministic across runs.
#[derive(Debug, Clone)]
pub struct TransferMarket {
    slots: Vec<Option<Player>>,
    by_id: HashMap<String, usize>,
}

impl TransferMarket {
    pub fn new(players: impl IntoIterator<Item = Player>) -> Self {
        let mut market = TransferMarket {
            slots: Vec::new(),
            by_id: HashMap::new(),
        };
        for player in players {
            if let Some(&slot) = market.by_id.get(&player.id) {
                market.slots[slot] = Some(player);
            } else {
                market.by_id.insert(player.id.clone(), market.slots.len());
                market.slots.push(Some(player));
            }
        }
        market
    }

    /// Affordable candidates for a position group, best value first.
    ///
    /// Sort is stable: price-tied players keep pool order. A missing market
    /// value counts as a fee of 0.
    pub fn candidates(&self, group: PositionGroup, max_fee: i64) -> Vec<Player> {
        let mut out: Vec<Player> = self
            .slots
            .iter()
            .flatten()
            .filter(|p| position_group(p.position.as_deref()) == Some(group))
            .filter(|p| p.market_value.unwrap_or(0) <= max_fee)
            .cloned()
            .collect();
        out.sort_by_key(|p| std::cmp::Reverse(p.market_value.unwrap_or(0)));
        out
    }

    /// Remove a purchased player. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: &str) {
        if let Some(slot) = self.by_id.remove(id) {
            self.slots[slot] = None;
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
