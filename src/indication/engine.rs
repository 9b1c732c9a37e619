//! Indicated premium calculation
//!
//! Historical loss costs are trended and reform-adjusted onto the
//! projection year, credibility-weighted into a single loss cost, loaded
//! for expenses and divided through by the variable-rate complement.

use serde::{Deserialize, Serialize};

use crate::regression::{adjustment_factors, AdjustmentFactors, TrendSeries};

use super::data::{tenths_pct_to_decimal, DecisionKnobs, IndicationRecord};

/// Derived indication values for display and submission re-validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicationComputation {
    pub weighted_trended_loss_cost: f64,
    pub indicated_premium: f64,
    pub rate_change: f64,
}

/// Credibility-weighted sum of trended, reform-adjusted loss costs
pub fn weighted_trended_loss_cost(
    loss_costs: &[f64],
    adjustments: &AdjustmentFactors,
    weights: &[f64],
) -> f64 {
    debug_assert_eq!(loss_costs.len(), adjustments.trend.len());
    debug_assert_eq!(loss_costs.len(), weights.len());

    loss_costs
        .iter()
        .zip(&adjustments.trend)
        .zip(&adjustments.reform)
        .zip(weights)
        .map(|(((&cost, &trend), &reform), &weight)| cost * trend * reform * weight)
        .sum()
}

/// indicated = (loss cost + fixed + variable expense) / (1 - variable rate
/// - marketing - profit). A complement at or below zero cannot fund the
/// premium; the policy default is 0, not a panic.
pub fn indicated_premium(
    loss_cost: f64,
    fixed_expense: f64,
    variable_expense: f64,
    premium_variable_rate: f64,
    marketing_ratio: f64,
    profit_margin: f64,
) -> f64 {
    let complement = 1.0 - premium_variable_rate - marketing_ratio - profit_margin;
    if complement <= 0.0 {
        return 0.0;
    }
    (loss_cost + fixed_expense + variable_expense) / complement
}

/// indicated / current - 1, or 0 for a participant with no current premium
pub fn rate_change(indicated: f64, current: f64) -> f64 {
    if current == 0.0 {
        0.0
    } else {
        indicated / current - 1.0
    }
}

/// Full indication for a record under a given knob setting.
///
/// The trend-margin knob is threaded into the regression as an additive
/// override on the fitted trend before the per-year adjustment factors are
/// produced.
pub fn compute_indication(
    record: &IndicationRecord,
    series: &TrendSeries,
    knobs: &DecisionKnobs,
) -> IndicationComputation {
    let margin = tenths_pct_to_decimal(knobs.trend_margin);
    let adjustments = adjustment_factors(series, margin);

    let loss_cost = weighted_trended_loss_cost(
        &record.inputs.historical_loss_costs,
        &adjustments,
        &record.inputs.credibility_weights,
    );
    let indicated = indicated_premium(
        loss_cost,
        record.inputs.fixed_expense_per_unit,
        record.inputs.variable_expense_per_unit,
        record.inputs.premium_variable_rate,
        tenths_pct_to_decimal(knobs.marketing_ratio),
        tenths_pct_to_decimal(knobs.profit_margin),
    );

    IndicationComputation {
        weighted_trended_loss_cost: loss_cost,
        indicated_premium: indicated,
        rate_change: rate_change(indicated, record.inputs.current_premium),
    }
}
