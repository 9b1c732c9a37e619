//! Indication record and decision-knob data structures
//!
//! Decision knobs are stored as integers in tenths of a percent (50 = 5.0%)
//! and constrained to server-supplied ranges looked up by difficulty tier.

use serde::{Deserialize, Serialize};

/// Convert a knob stored in tenths of a percent to a decimal rate
pub fn tenths_pct_to_decimal(tenths: i32) -> f64 {
    tenths as f64 / 1000.0
}

/// Solvency capital-adequacy outcome for the year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapitalTest {
    Pass,
    /// Below the required capital ratio: decisions are forced to
    /// regulatory defaults and the record is non-editable
    Fail,
}

/// Game difficulty tier; selects the decision-knob ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Novice,
    Standard,
    Expert,
}

/// Inclusive knob bounds in tenths of a percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRange {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl DecisionRange {
    /// Whether `value` lies in the range on a step boundary
    pub fn accepts(&self, value: i32) -> bool {
        value >= self.min && value <= self.max && (value - self.min) % self.step == 0
    }

    /// Clamp `value` into the range (step alignment is the caller's concern)
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// Mid-range default, rounded down to a step boundary
    pub fn midpoint(&self) -> i32 {
        self.min + ((self.max - self.min) / 2 / self.step) * self.step
    }
}

/// Ranges for all three decision knobs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionRanges {
    pub profit_margin: DecisionRange,
    pub marketing_ratio: DecisionRange,
    pub trend_margin: DecisionRange,
}

impl DecisionRanges {
    /// Knob ranges per difficulty tier. A single table lookup - harder
    /// tiers widen the ranges rather than changing any formula.
    pub fn for_tier(tier: Difficulty) -> Self {
        match tier {
            Difficulty::Novice => Self {
                profit_margin: DecisionRange { min: 20, max: 80, step: 5 },
                marketing_ratio: DecisionRange { min: 0, max: 40, step: 5 },
                trend_margin: DecisionRange { min: -20, max: 20, step: 5 },
            },
            Difficulty::Standard => Self {
                profit_margin: DecisionRange { min: 0, max: 100, step: 5 },
                marketing_ratio: DecisionRange { min: 0, max: 60, step: 5 },
                trend_margin: DecisionRange { min: -30, max: 30, step: 5 },
            },
            Difficulty::Expert => Self {
                profit_margin: DecisionRange { min: -50, max: 150, step: 5 },
                marketing_ratio: DecisionRange { min: 0, max: 100, step: 5 },
                trend_margin: DecisionRange { min: -50, max: 50, step: 5 },
            },
        }
    }
}

/// The three participant decision knobs, in tenths of a percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionKnobs {
    pub profit_margin: i32,
    pub marketing_ratio: i32,
    pub trend_margin: i32,
}

impl DecisionKnobs {
    /// Regulatory defaults forced on a failed capital test
    pub fn regulatory() -> Self {
        Self {
            profit_margin: 50,
            marketing_ratio: 10,
            trend_margin: 0,
        }
    }

    /// Mid-range defaults for a fresh record with no prior-year carry
    pub fn midpoint(ranges: &DecisionRanges) -> Self {
        Self {
            profit_margin: ranges.profit_margin.midpoint(),
            marketing_ratio: ranges.marketing_ratio.midpoint(),
            trend_margin: ranges.trend_margin.midpoint(),
        }
    }
}

/// Server-supplied indication inputs for one (game, participant, year)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicationInputs {
    pub fixed_expense_per_unit: f64,
    pub variable_expense_per_unit: f64,
    /// Premium-proportional expense rate (commissions, premium tax)
    pub premium_variable_rate: f64,
    pub capital_ratio: f64,
    pub capital_required_ratio: f64,
    pub current_premium: f64,
    /// Per-accident-year blending weights, summing to 1, heavier on
    /// recent years
    pub credibility_weights: Vec<f64>,
    /// Historical loss cost per accident year, aligned with the trend
    /// series years
    pub historical_loss_costs: Vec<f64>,
}

/// One participant's pricing decision state for one year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicationRecord {
    pub game_id: u32,
    pub participant_id: u32,
    pub year: i32,
    pub inputs: IndicationInputs,
    pub ranges: DecisionRanges,
    pub knobs: DecisionKnobs,
    pub indicated_premium: f64,
    pub rate_change: f64,
    pub capital_test: CapitalTest,
    /// Set by a successful submission; cleared only by the yearly advance
    pub locked: bool,
}

impl IndicationRecord {
    /// Seed the record for a new year. The capital gate is applied here:
    /// a ratio below the requirement forces the regulatory knobs and marks
    /// the record non-editable. On a pass, the knob resolution order is
    /// chosen value, then prior-year carry-forward, then mid-range default.
    pub fn seed(
        game_id: u32,
        participant_id: u32,
        year: i32,
        inputs: IndicationInputs,
        ranges: DecisionRanges,
        chosen: Option<DecisionKnobs>,
        prior: Option<DecisionKnobs>,
    ) -> Self {
        let capital_test = if inputs.capital_ratio < inputs.capital_required_ratio {
            CapitalTest::Fail
        } else {
            CapitalTest::Pass
        };

        let knobs = match capital_test {
            CapitalTest::Fail => {
                log::info!(
                    "regulatory intervention for participant {} in game {} year {}",
                    participant_id,
                    game_id,
                    year
                );
                DecisionKnobs::regulatory()
            }
            CapitalTest::Pass => {
                let fallback = chosen.or(prior).unwrap_or_else(|| DecisionKnobs::midpoint(&ranges));
                DecisionKnobs {
                    profit_margin: ranges.profit_margin.clamp(fallback.profit_margin),
                    marketing_ratio: ranges.marketing_ratio.clamp(fallback.marketing_ratio),
                    trend_margin: ranges.trend_margin.clamp(fallback.trend_margin),
                }
            }
        };

        Self {
            game_id,
            participant_id,
            year,
            inputs,
            ranges,
            knobs,
            indicated_premium: 0.0,
            rate_change: 0.0,
            capital_test,
            locked: false,
        }
    }

    /// Whether the participant may still change the decision
    pub fn is_editable(&self) -> bool {
        !self.locked && self.capital_test == CapitalTest::Pass
    }
}
