//! Log-linear trend regression with structural-break handling

pub mod ols;
pub mod trend;

pub use ols::OlsFit;
pub use trend::{
    adjustment_factors, fit_trend, AdjustmentFactors, RegressionResult, SeriesError, TrendSeries,
};
