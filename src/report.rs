//! Chart-ready aggregates derived from a simulation result.
//!
//! Pure data shaping: each builder takes the result and returns aligned
//! label/value arrays a front end can plot directly. Players with no
//! recorded age are excluded from the age distribution.

use serde::{Deserialize, Serialize};

use crate::model::{Player, SimulationResult};

const AGE_BUCKET_LABELS: [&str; 6] = ["U21", "21-23", "24-26", "27-29", "30-32", "33+"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeDistribution {
    pub labels: Vec<String>,
    pub before: Vec<usize>,
    pub after: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationData {
    pub before: i64,
    pub after: i64,
    pub change: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetData {
    pub transfer_budget: i64,
    pub transfer_spent: i64,
    pub transfer_remaining: i64,
    pub salary_budget: i64,
    pub salary_used: i64,
    pub salary_remaining: i64,
}

/// Everything the report layer needs, in one serializable bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub age_distribution: AgeDistribution,
    pub valuation: ValuationData,
    pub budget: BudgetData,
}

pub fn build_chart_data(result: &SimulationResult) -> ChartData {
    ChartData {
        age_distribution: build_age_distribution(&result.squad_before, &result.squad_after),
        valuation: ValuationData {
            before: result.kpis.total_valuation_before,
            after: result.kpis.total_valuation_after,
            change: result.kpis.valuation_change,
        },
        budget: BudgetData {
            transfer_budget: result.input.transfer_budget,
            transfer_spent: result.input.transfer_budget - result.kpis.transfer_budget_remaining,
            transfer_remaining: result.kpis.transfer_budget_remaining,
            salary_budget: result.kpis.salary_budget,
            salary_used: result.kpis.salary_used,
            salary_remaining: result.kpis.salary_budget_remaining,
        },
    }
}

pub fn build_age_distribution(before: &[Player], after: &[Player]) -> AgeDistribution {
    AgeDistribution {
        labels: AGE_BUCKET_LABELS.iter().map(|s| s.to_string()).collect(),
        before: bucket_counts(before),
        after: bucket_counts(after),
    }
}

fn bucket_counts(squad: &[Player]) -> Vec<usize> {
    let mut counts = vec![0usize; AGE_BUCKET_LABELS.len()];
    for age in squad.iter().filter_map(|p| p.age) {
        counts[age_bucket(age)] += 1;
    }
    counts
}

fn age_bucket(age: u8) -> usize {
    match age {
        0..=20 => 0,
        21..=23 => 1,
        24..=26 => 2,
        27..=29 => 3,
        30..=32 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::Kpis;
    use crate::model::{SimulationInput, StrategyMode};

    fn player(id: &str, age: Option<u8>) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {id}"),
            age,
            position: None,
            nationality: None,
            current_club: None,
            birth_date: None,
            preferred_foot: None,
            market_value: Some(1_000_000),
        }
    }

    #[test]
    fn buckets_partition_all_known_ages() {
        let squad: Vec<Player> = (16..=40u8)
            .map(|a| player(&format!("p{a}"), Some(a)))
            .collect();
        let counts = bucket_counts(&squad);
        assert_eq!(counts.iter().sum::<usize>(), squad.len());
        assert_eq!(counts, vec![5, 3, 3, 3, 3, 8]);
    }

    #[test]
    fn unknown_ages_are_excluded() {
        let squad = vec![player("a", Some(22)), player("b", None)];
        let counts = bucket_counts(&squad);
        assert_eq!(counts.iter().sum::<usize>(), 1);
        assert_eq!(counts[1], 1);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(age_bucket(20), 0);
        assert_eq!(age_bucket(21), 1);
        assert_eq!(age_bucket(23), 1);
        assert_eq!(age_bucket(24), 2);
        assert_eq!(age_bucket(29), 3);
        assert_eq!(age_bucket(30), 4);
        assert_eq!(age_bucket(32), 4);
        assert_eq!(age_bucket(33), 5);
    }

    #[test]
    fn chart_data_reflects_kpis_and_budgets() {
        let result = SimulationResult {
            input: SimulationInput {
                team_name: "Test FC".to_string(),
                season: 2024,
                transfer_budget: 100_000_000,
                salary_budget: 200_000_000,
                strategy_mode: StrategyMode::Balanced,
                club_slug: String::new(),
                club_id: String::new(),
                league: String::new(),
            },
            squad_before: vec![player("a", Some(19)), player("b", Some(34))],
            squad_after: vec![player("a", Some(20)), player("b", Some(35))],
            players_sold: vec![],
            players_bought: vec![],
            kpis: Kpis {
                total_valuation_before: 2_000_000,
                total_valuation_after: 2_100_000,
                valuation_change: 100_000,
                net_spend: 0,
                avg_age_before: 26.5,
                avg_age_after: 27.5,
                salary_used: 40_000_000,
                salary_budget: 200_000_000,
                salary_budget_remaining: 160_000_000,
                transfer_budget_remaining: 70_000_000,
            },
        };
        let chart = build_chart_data(&result);
        assert_eq!(chart.budget.transfer_spent, 30_000_000);
        assert_eq!(chart.budget.salary_remaining, 160_000_000);
        assert_eq!(chart.valuation.change, 100_000);
        assert_eq!(chart.age_distribution.before, vec![1, 0, 0, 0, 0, 1]);
        assert_eq!(chart.age_distribution.after, vec![1, 0, 0, 0, 0, 1]);
    }
}
