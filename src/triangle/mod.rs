//! Claim development triangles and chain-ladder completion

pub mod data;
pub mod develop;

pub use data::{Coverage, LossTriangle, TriangleError, TriangleKey};
pub use develop::{
    age_to_age_factors, complete, ultimates, CompletedTriangle, DevelopmentFactor,
    DevelopmentPattern, Metric, UltimateLoss,
};
