//! Valuation data structures

use serde::{Deserialize, Serialize};

/// One year of a participant's financial statement, as supplied by the
/// yearly simulation advance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialYear {
    pub year: i32,
    /// Policies in force at year end
    pub in_force: f64,
    /// Policies in force at the start of the year
    pub beginning_in_force: f64,
    pub profit: f64,
    pub dividend_paid: f64,
    /// Present-value index for the year, stored oldest-first in the
    /// history and consumed newest-first by the valuation
    pub pv_index: f64,
    pub excess_capital: f64,
}

/// Valuation component breakdown for one participant
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ValuationComponents {
    /// Discounted dividends over the trailing window
    pub total_dividend_pv: f64,
    /// Excess capital at the selected year
    pub excess_capital: f64,
    /// Capitalized future earnings
    pub future_value: f64,
    /// Annualized in-force growth, clamped to +/-7%
    pub capped_growth_rate: f64,
    pub average_profit_per_unit: f64,
    pub total_valuation: f64,
}

/// A ranked valuation row for the cross-participant table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationRecord {
    pub participant_id: u32,
    pub year: i32,
    pub components: ValuationComponents,
    /// Descending rank; ties share a rank and displace the next distinct
    /// value by the tie width
    pub rank: u32,
}
