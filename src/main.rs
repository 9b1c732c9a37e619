//! Pricing Engine CLI
//!
//! Runs the full pricing cycle for a demo game: triangle development,
//! trend regression, rate indication with a locked submission, and the
//! cross-participant valuation table.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;

use pricing_engine::game::demo_game;
use pricing_engine::indication::{compute_indication, submit_decision, SubmissionRequest};
use pricing_engine::lock::DecisionLockStore;
use pricing_engine::regression::{fit_trend, TrendSeries};
use pricing_engine::triangle::{age_to_age_factors, ultimates, Coverage, Metric};
use pricing_engine::valuation::{rank_participants, value_participant};

#[derive(Parser, Debug)]
#[command(name = "pricing_engine", about = "Insurance pricing simulation core engine")]
struct Args {
    /// Number of participants in the demo game
    #[arg(long, default_value_t = 8)]
    participants: u32,

    /// Years of simulated history
    #[arg(long, default_value_t = 10)]
    years: i32,

    /// Final simulated year
    #[arg(long, default_value_t = 2023)]
    final_year: i32,

    /// Required return rate for the valuation
    #[arg(long, default_value_t = 0.10)]
    required_return: f64,

    /// Optional path for a JSON dump of the ranked valuation table
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Pricing Engine v0.1.0");
    println!("=====================\n");

    let state = demo_game(1, args.participants, args.years, args.final_year)
        .map_err(|e| anyhow!("demo game construction failed: {e}"))?;

    // Triangle development for participant 1's liability book
    let tri = state
        .triangle(1, Coverage::Liability)
        .context("participant 1 liability triangle missing")?;
    let pattern = age_to_age_factors(tri, Metric::Paid);

    println!("Liability development factors (participant 1):");
    for t in &pattern.transitions {
        println!("  {:>3} -> {:>3} months: {:.4}", t.from_months, t.to_months, t.factor);
    }

    println!("\nUltimate losses by accident year:");
    println!("{:>6} {:>14} {:>10}", "AY", "Ultimate", "Complete");
    for ult in ultimates(tri) {
        println!(
            "{:>6} {:>14.0} {:>10}",
            ult.accident_year,
            ult.ultimate,
            if ult.fully_developed { "yes" } else { "no" }
        );
    }

    // Trend regression over the demo loss-cost history
    let record = &state.indications[&1];
    let loss_costs = &record.inputs.historical_loss_costs;
    let first_year = args.final_year - loss_costs.len() as i32 + 1;
    let points: Vec<(i32, f64)> = loss_costs
        .iter()
        .enumerate()
        .map(|(i, &cost)| (first_year + i as i32, cost))
        .collect();
    let series = TrendSeries::new(points, vec![false; loss_costs.len()])
        .map_err(|e| anyhow!("loss-cost series invalid: {e}"))?;

    let regression = fit_trend(&series);
    println!("\nLoss-cost trend: {:.2}% per year", regression.trend_rate * 100.0);
    println!(
        "Reform multiplier: {}",
        regression
            .reform_multiplier
            .map_or_else(|| "n/a".to_string(), |m| format!("{m:.3}"))
    );
    println!("Projected next loss cost: {:.2}", regression.projected_next_value);

    // Indication and locked submission for participant 1
    let indication = compute_indication(record, &series, &record.knobs);
    println!("\nIndication (participant 1):");
    println!("  Weighted trended loss cost: {:>10.2}", indication.weighted_trended_loss_cost);
    println!("  Indicated premium:          {:>10.2}", indication.indicated_premium);
    println!("  Rate change:                {:>9.2}%", indication.rate_change * 100.0);

    let mut locks = DecisionLockStore::new();
    let mut record = state.indications[&1].clone();
    let request = SubmissionRequest {
        user_id: 1,
        knobs: record.knobs,
        confirmed_premium: indication.indicated_premium,
    };
    submit_decision(&mut record, &series, &mut locks, &request, Utc::now())
        .map_err(|e| anyhow!("submission failed: {e}"))?;
    println!("  Decision locked at premium  {:>10.2}", record.indicated_premium);

    // Valuation table across all participants
    let valuations: Vec<_> = state
        .participants()
        .into_iter()
        .map(|pid| {
            (
                pid,
                value_participant(&state.financials[&pid], args.final_year, args.required_return),
            )
        })
        .collect();
    let ranked = rank_participants(valuations, args.final_year);

    println!("\nValuation table ({} participants):", ranked.len());
    println!(
        "{:>5} {:>6} {:>16} {:>14} {:>14} {:>9} {:>16}",
        "Rank", "Co.", "Dividend PV", "Excess Cap", "Future Value", "Growth", "Total"
    );
    println!("{}", "-".repeat(86));
    for row in &ranked {
        println!(
            "{:>5} {:>6} {:>16.0} {:>14.0} {:>14.0} {:>8.1}% {:>16.0}",
            row.rank,
            row.participant_id,
            row.components.total_dividend_pv,
            row.components.excess_capital,
            row.components.future_value,
            row.components.capped_growth_rate * 100.0,
            row.components.total_valuation,
        );
    }

    if let Some(path) = args.json {
        let file = File::create(&path)
            .with_context(|| format!("unable to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &ranked)?;
        println!("\nValuation table written to: {}", path.display());
    }

    Ok(())
}
