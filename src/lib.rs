//! Pricing Engine - Actuarial core for a multi-year insurance pricing simulation
//!
//! This library provides:
//! - Chain-ladder development of partial claim triangles into ultimate losses
//! - Log-linear trend regression with structural-break ("reform") handling
//! - Rate indications combining trended loss costs, expense loads and a
//!   capital-adequacy gate into a recommended premium
//! - Present-value enterprise valuation and cross-participant ranking
//! - A keyed decision lock guarding the pricing-decision submission path

pub mod game;
pub mod indication;
pub mod inputs;
pub mod lock;
pub mod regression;
pub mod triangle;
pub mod valuation;

// Re-export commonly used types
pub use indication::{CapitalTest, DecisionKnobs, IndicationRecord, SubmitError};
pub use lock::{AcquireOutcome, DecisionLockStore, LockKey};
pub use regression::{AdjustmentFactors, RegressionResult, TrendSeries};
pub use triangle::{Coverage, DevelopmentPattern, LossTriangle};
pub use valuation::{FinancialYear, ValuationRecord};
