//! Rate indication: trended loss costs, expense loads, capital gate and
//! the locked submission path

pub mod data;
pub mod engine;
pub mod submit;

pub use data::{
    CapitalTest, DecisionKnobs, DecisionRange, DecisionRanges, Difficulty, IndicationInputs,
    IndicationRecord,
};
pub use engine::{compute_indication, IndicationComputation};
pub use submit::{submit_decision, SubmissionRequest, SubmitError};
