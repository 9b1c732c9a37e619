//! Cross-participant valuation sweep
//!
//! Values every participant of the demo game in parallel and prints the
//! ranked table with component breakdowns. Valuation is pure per
//! participant; ranking consumes the completed snapshot.

use anyhow::{anyhow, Result};
use rayon::prelude::*;
use std::time::Instant;

use pricing_engine::game::demo_game;
use pricing_engine::valuation::{display_window, rank_participants, value_participant};

fn main() -> Result<()> {
    env_logger::init();

    let participants = 64;
    let years = 20;
    let final_year = 2023;
    let required_return = 0.10;

    let start = Instant::now();
    let state = demo_game(1, participants, years, final_year)
        .map_err(|e| anyhow!("demo game construction failed: {e}"))?;
    println!("Built {participants}-participant demo game in {:?}", start.elapsed());

    let start = Instant::now();
    let valuations: Vec<_> = state
        .participants()
        .into_par_iter()
        .map(|pid| {
            (
                pid,
                value_participant(&state.financials[&pid], final_year, required_return),
            )
        })
        .collect();
    let ranked = rank_participants(valuations, final_year);
    println!("Valued and ranked {} participants in {:?}\n", ranked.len(), start.elapsed());

    println!(
        "{:>5} {:>6} {:>16} {:>14} {:>16} {:>16}",
        "Rank", "Co.", "Dividend PV", "Excess Cap", "Future Value", "Total"
    );
    println!("{}", "-".repeat(78));
    // First page of the ranked table
    for row in display_window(&ranked, 0, 16) {
        println!(
            "{:>5} {:>6} {:>16.0} {:>14.0} {:>16.0} {:>16.0}",
            row.rank,
            row.participant_id,
            row.components.total_dividend_pv,
            row.components.excess_capital,
            row.components.future_value,
            row.components.total_valuation,
        );
    }
    if ranked.len() > 16 {
        println!("... ({} more participants)", ranked.len() - 16);
    }

    Ok(())
}
