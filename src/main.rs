use std::process::ExitCode;

use chrono::Datelike;
use rayon::prelude::*;

use transfersim::analyst;
use transfersim::clubs;
use transfersim::engine;
use transfersim::fetch;
use transfersim::model::{SimError, SimulationInput, SimulationResult, StrategyMode};
use transfersim::report;
use transfersim::store;

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return ExitCode::from(2);
    };

    let result = match command.as_str() {
        "fetch" => cmd_fetch(&args[1..]),
        "simulate" => cmd_simulate(&args[1..]),
        "compare" => cmd_compare(&args[1..]),
        "help" | "--help" | "-h" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        other => {
            eprintln!("unknown command: {other}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage:\n  \
         transfersim fetch <team-or-league> [season]\n  \
         transfersim simulate <team> <transfer-budget> <salary-budget> [mode] [season]\n  \
         transfersim compare <team> <transfer-budget> <salary-budget> [season]\n\n\
         Budgets are whole euros; 'm' and 'k' suffixes are accepted (e.g. 120m).\n\
         Modes: balanced (default), conservative, win_now.\n\
         Season is the start year (e.g. 2024 for 2024/25); defaults to the current year.\n\
         Leagues: laliga, premier-league, bundesliga, serie-a, ligue-1."
    );
}

/// Pre-warm the disk cache for one club or a whole league.
fn cmd_fetch(args: &[String]) -> anyhow::Result<()> {
    let Some(target) = args.first() else {
        print_usage();
        anyhow::bail!("fetch requires a team or league name");
    };
    let season = parse_season(args.get(1))?;

    if let Some((league, club)) = clubs::find_club(target) {
        println!(
            "Fetching {} ({}) squad for {}...",
            club.name,
            clubs::league_label(league),
            clubs::season_label(season)
        );
        let players = fetch::fetch_squad(club, season)?;
        let path = store::save_squad(club.name, season, &players)?;
        println!("Saved {} players to {}", players.len(), path.display());
        return Ok(());
    }

    let league_clubs = clubs::clubs_in_league(target);
    if league_clubs.is_empty() {
        return Err(SimError::UnknownClub(target.clone()).into());
    }

    println!(
        "Fetching all {} squads for {}...",
        clubs::league_label(target),
        clubs::season_label(season)
    );
    let fetched = fetch::fetch_market_pool(target, season, "");
    for err in &fetched.errors {
        eprintln!("warning: {err}");
    }
    let path = store::save_market_pool(target, season, &fetched.players)?;
    println!("Saved {} players to {}", fetched.players.len(), path.display());
    Ok(())
}

fn cmd_simulate(args: &[String]) -> anyhow::Result<()> {
    let input = parse_simulation_args(args, true)?;
    let result = engine::run_simulation(&input)?;
    print_result(&result);

    if std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.trim().is_empty()) {
        println!("\nGenerating AI season summary...");
        match analyst::analyse_season(&result) {
            Ok(summary) => print_season_summary(&summary),
            Err(err) => eprintln!("warning: AI summary failed: {err:#}"),
        }
    }
    Ok(())
}

fn cmd_compare(args: &[String]) -> anyhow::Result<()> {
    let base = parse_simulation_args(args, false)?;
    let squad = store::load_or_fetch_squad(&base)?;
    if squad.is_empty() {
        return Err(SimError::MissingSquad {
            club: base.team_name.clone(),
            season: base.season,
        }
        .into());
    }
    let market_players = store::load_or_fetch_market_pool(&base)?;

    // Each mode gets its own squad and market copies, so runs cannot see
    // each other's purchases.
    let results: Vec<SimulationResult> = StrategyMode::ALL
        .into_par_iter()
        .map(|mode| {
            let input = SimulationInput {
                strategy_mode: mode,
                ..base.clone()
            };
            engine::simulate(&input, squad.clone(), market_players.clone())
        })
        .collect::<Result<_, _>>()?;

    println!(
        "\n=== Strategy comparison: {} ({}) ===",
        base.team_name,
        clubs::season_label(base.season)
    );
    println!(
        "{:<14} {:>14} {:>16} {:>9} {:>7} {:>7}",
        "Mode", "Net spend", "Value change", "Avg age", "Bought", "Sold"
    );
    for result in &results {
        let k = &result.kpis;
        println!(
            "{:<14} {:>14} {:>16} {:>9.1} {:>7} {:>7}",
            result.input.strategy_mode.as_str(),
            format_eur(k.net_spend),
            format_eur(k.valuation_change),
            k.avg_age_after,
            result.players_bought.len(),
            result.players_sold.len()
        );
    }

    if std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.trim().is_empty()) {
        println!("\nGenerating AI recommendation...");
        match analyst::compare_strategies(&results) {
            Ok(comparison) => {
                println!("Recommended mode: {}", comparison.recommended_mode);
                println!("{}", comparison.recommendation_rationale);
                println!("\nTradeoffs: {}", comparison.tradeoff_analysis);
            }
            Err(err) => eprintln!("warning: AI comparison failed: {err:#}"),
        }
    }
    Ok(())
}

fn parse_simulation_args(args: &[String], with_mode: bool) -> anyhow::Result<SimulationInput> {
    let (Some(team_name), Some(transfer_raw), Some(salary_raw)) =
        (args.first(), args.get(1), args.get(2))
    else {
        print_usage();
        anyhow::bail!("expected <team> <transfer-budget> <salary-budget>");
    };

    let transfer_budget = parse_money(transfer_raw)?;
    let salary_budget = parse_money(salary_raw)?;

    let (mode, season_arg) = if with_mode {
        (
            args.get(3).map(|m| StrategyMode::parse(m)).unwrap_or(StrategyMode::Balanced),
            args.get(4),
        )
    } else {
        (StrategyMode::Balanced, args.get(3))
    };
    let season = parse_season(season_arg)?;

    let (league, club) =
        clubs::find_club(team_name).ok_or_else(|| SimError::UnknownClub(team_name.clone()))?;

    Ok(SimulationInput {
        team_name: club.name.to_string(),
        season,
        transfer_budget,
        salary_budget,
        strategy_mode: mode,
        club_slug: club.slug.to_string(),
        club_id: club.id.to_string(),
        league: league.to_string(),
    })
}

fn parse_season(arg: Option<&String>) -> anyhow::Result<i32> {
    match arg {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| anyhow::anyhow!("invalid season year: {raw}")),
        None => Ok(chrono::Utc::now().year()),
    }
}

/// Parse a euro amount; bare integers plus 'm' (millions) and 'k'
/// (thousands) suffixes.
fn parse_money(raw: &str) -> anyhow::Result<i64> {
    let cleaned = raw.trim().replace('_', "").replace(',', "");
    let lower = cleaned.to_ascii_lowercase();
    let (digits, scale) = if let Some(stripped) = lower.strip_suffix('m') {
        (stripped, 1_000_000.0)
    } else if let Some(stripped) = lower.strip_suffix('k') {
        (stripped, 1_000.0)
    } else {
        (lower.as_str(), 1.0)
    };
    let value: f64 = digits
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid amount: {raw}"))?;
    if value < 0.0 {
        anyhow::bail!("amount cannot be negative: {raw}");
    }
    Ok((value * scale).round() as i64)
}

fn print_result(result: &SimulationResult) {
    let input = &result.input;
    let k = &result.kpis;

    println!(
        "\n=== {} | {} | {} mode ===",
        input.team_name,
        clubs::season_label(input.season),
        input.strategy_mode.as_str()
    );

    println!("\nPlayers sold ({}):", result.players_sold.len());
    if result.players_sold.is_empty() {
        println!("  (none)");
    }
    for p in &result.players_sold {
        println!(
            "  - {:<28} age {:<3} {:<20} {}",
            p.name,
            p.age.map_or("?".to_string(), |a| a.to_string()),
            p.position.as_deref().unwrap_or("unknown"),
            format_eur(p.market_value.unwrap_or(0))
        );
    }

    println!("\nPlayers bought ({}):", result.players_bought.len());
    if result.players_bought.is_empty() {
        println!("  (none)");
    }
    for p in &result.players_bought {
        println!(
            "  - {:<28} age {:<3} {:<20} {}",
            p.name,
            p.age.map_or("?".to_string(), |a| a.to_string()),
            p.position.as_deref().unwrap_or("unknown"),
            format_eur(p.market_value.unwrap_or(0))
        );
    }

    println!("\nKPIs:");
    println!("  Squad valuation: {} -> {} ({})",
        format_eur(k.total_valuation_before),
        format_eur(k.total_valuation_after),
        format_eur_signed(k.valuation_change)
    );
    println!("  Net spend:       {}", format_eur_signed(k.net_spend));
    println!("  Average age:     {:.1} -> {:.1}", k.avg_age_before, k.avg_age_after);
    println!(
        "  Transfer budget: {} remaining of {}",
        format_eur(k.transfer_budget_remaining),
        format_eur(input.transfer_budget)
    );
    println!(
        "  Salary:          {} used of {}",
        format_eur(k.salary_used),
        format_eur(k.salary_budget)
    );

    let chart = report::build_chart_data(result);
    println!("\nSquad age profile (before / after):");
    let dist = &chart.age_distribution;
    for (i, label) in dist.labels.iter().enumerate() {
        println!(
            "  {:<6} {:>3} -> {:<3} {}",
            label,
            dist.before[i],
            dist.after[i],
            "#".repeat(dist.after[i])
        );
    }
}

fn print_season_summary(summary: &analyst::SeasonSummary) {
    println!("\n=== AI season summary ===");
    println!("{}", summary.headline);
    println!("\nKey observations:");
    for obs in &summary.key_observations {
        println!("  - {obs}");
    }
    println!("\nFinancial verdict: {}", summary.financial_verdict);
    println!("Remaining weakness: {}", summary.weakness);
    if !summary.transfer_justifications.is_empty() {
        println!("\nTransfer reasoning:");
        for j in &summary.transfer_justifications {
            println!("  - {} ({}): {}", j.player_name, j.decision, j.reasoning);
        }
    }
}

/// Thousands-separated euro amount, e.g. 1234567 → "€1,234,567".
fn format_eur(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

fn format_eur_signed(amount: i64) -> String {
    if amount > 0 {
        format!("+{}", format_eur(amount))
    } else {
        format_eur(amount)
    }
}
