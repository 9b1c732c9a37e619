//! Present-value enterprise valuation and ranking

pub mod data;
pub mod engine;

pub use data::{FinancialYear, ValuationComponents, ValuationRecord};
pub use engine::{display_window, rank_participants, value_participant, GROWTH_RATE_CAP, VALUATION_WINDOW_YEARS};
