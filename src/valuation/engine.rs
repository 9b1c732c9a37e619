//! Present-value valuation over a trailing window, plus ranking
//!
//! total_valuation = discounted dividends over the window + excess capital
//! at the selected year + capitalized future earnings. Every division site
//! substitutes a policy default (0) instead of raising.

use super::data::{FinancialYear, ValuationComponents, ValuationRecord};

/// Trailing window length in years
pub const VALUATION_WINDOW_YEARS: usize = 20;

/// Annualized in-force growth is clamped to this magnitude
pub const GROWTH_RATE_CAP: f64 = 0.07;

/// Value one participant at `selected_year`.
///
/// `history` is the participant's financial statements, oldest first; rows
/// after the selected year are ignored and at most the trailing
/// [`VALUATION_WINDOW_YEARS`] rows are used.
pub fn value_participant(
    history: &[FinancialYear],
    selected_year: i32,
    required_return: f64,
) -> ValuationComponents {
    let in_window: Vec<&FinancialYear> = history
        .iter()
        .filter(|row| row.year <= selected_year)
        .collect();
    let start = in_window.len().saturating_sub(VALUATION_WINDOW_YEARS);
    let window = &in_window[start..];

    if window.is_empty() {
        return ValuationComponents::default();
    }

    // The PV index is stored oldest-first but discounts newest-first:
    // the most recent dividend carries the least discounting.
    let total_dividend_pv: f64 = window
        .iter()
        .zip(window.iter().rev())
        .map(|(row, mirror)| mirror.pv_index * row.dividend_paid)
        .sum();

    // Snapshot values exist only at the selected year
    let at_selected = window.iter().find(|row| row.year == selected_year);
    let excess_capital = at_selected.map_or(0.0, |row| row.excess_capital);
    let in_force_at_selected = at_selected.map_or(0.0, |row| row.in_force);

    let capped_growth_rate = capped_growth(window);

    let total_beginning_in_force: f64 = window.iter().map(|row| row.beginning_in_force).sum();
    let total_profit: f64 = window.iter().map(|row| row.profit).sum();
    let average_profit_per_unit = if total_beginning_in_force == 0.0 {
        0.0
    } else {
        total_profit / total_beginning_in_force
    };

    let spread = required_return - capped_growth_rate;
    let future_value = if spread == 0.0 {
        0.0
    } else {
        in_force_at_selected * average_profit_per_unit / spread
    };

    ValuationComponents {
        total_dividend_pv,
        excess_capital,
        future_value,
        capped_growth_rate,
        average_profit_per_unit,
        total_valuation: total_dividend_pv + excess_capital + future_value,
    }
}

/// Annualized in-force growth over the window, clamped to +/-7%
fn capped_growth(window: &[&FinancialYear]) -> f64 {
    let first = window[0];
    let last = window[window.len() - 1];
    let span = (last.year - first.year) as f64;
    if span <= 0.0 || first.in_force == 0.0 {
        return 0.0;
    }
    let annualized = (last.in_force / first.in_force).powf(1.0 / span) - 1.0;
    annualized.clamp(-GROWTH_RATE_CAP, GROWTH_RATE_CAP)
}

/// Rank participants by total valuation, descending. Tied values share the
/// best rank of their group and the next distinct value is displaced by the
/// tie width: totals {300, 100, 300} rank {1, 3, 1}.
pub fn rank_participants(
    valuations: Vec<(u32, ValuationComponents)>,
    year: i32,
) -> Vec<ValuationRecord> {
    let mut records: Vec<ValuationRecord> = valuations
        .into_iter()
        .map(|(participant_id, components)| ValuationRecord {
            participant_id,
            year,
            components,
            rank: 0,
        })
        .collect();

    records.sort_by(|a, b| {
        b.components
            .total_valuation
            .partial_cmp(&a.components.total_valuation)
            .expect("valuations are finite")
            .then(a.participant_id.cmp(&b.participant_id))
    });

    let totals: Vec<f64> = records.iter().map(|r| r.components.total_valuation).collect();
    for (i, record) in records.iter_mut().enumerate() {
        record.rank = 1 + totals[..i].iter().filter(|&&t| t > totals[i]).count() as u32;
    }
    records
}

/// Presentation slice over the full ranked list: `len` rows starting at
/// `offset`, clamped to the table bounds.
pub fn display_window(records: &[ValuationRecord], offset: usize, len: usize) -> &[ValuationRecord] {
    let start = offset.min(records.len());
    let end = (start + len).min(records.len());
    &records[start..end]
}
