//! Trend/reform regression over historical ratio series
//!
//! Fits log(ratio) = a + b*year, optionally with a cumulative reform
//! covariate, and projects one year past the last observation. Two output
//! shapes are produced: scalar trend/reform estimates for display, and
//! per-accident-year multiplicative adjustment factors for the rate
//! indication.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ols::{fit_simple, fit_with_reform, OlsFit};

/// Validation failures for series construction
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("series needs at least 2 observations, got {0}")]
    TooShort(usize),

    #[error("reform flags length {flags} does not match series length {points}")]
    FlagLengthMismatch { flags: usize, points: usize },

    #[error("series years must be strictly ascending")]
    UnorderedYears,

    #[error("non-positive ratio {ratio} at year {year}; exclude it before fitting")]
    NonPositiveRatio { year: i32, ratio: f64 },
}

/// An ordered historical ratio series with per-year reform flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSeries {
    years: Vec<i32>,
    ratios: Vec<f64>,
    reform_flags: Vec<bool>,
}

impl TrendSeries {
    /// Build a series. Ratios must be strictly positive - a severity ratio
    /// over zero claims has no information and the caller drops that year.
    pub fn new(points: Vec<(i32, f64)>, reform_flags: Vec<bool>) -> Result<Self, SeriesError> {
        if points.len() < 2 {
            return Err(SeriesError::TooShort(points.len()));
        }
        if reform_flags.len() != points.len() {
            return Err(SeriesError::FlagLengthMismatch {
                flags: reform_flags.len(),
                points: points.len(),
            });
        }
        if points.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(SeriesError::UnorderedYears);
        }
        if let Some(&(year, ratio)) = points.iter().find(|&&(_, r)| r <= 0.0) {
            return Err(SeriesError::NonPositiveRatio { year, ratio });
        }

        let (years, ratios) = points.into_iter().unzip();
        Ok(Self {
            years,
            ratios,
            reform_flags,
        })
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Year the fitted model projects into
    pub fn projection_year(&self) -> i32 {
        self.years[self.years.len() - 1] + 1
    }

    /// Cumulative reform covariate: 0 before the first flagged year, 1 from
    /// it onward. Once reformed, stays reformed, regardless of later flags.
    ///
    /// Returns None when the flags are uniform (all or none set) - a reform
    /// in effect for the whole history is indistinguishable from the
    /// intercept, and no reform at all needs no covariate.
    pub fn cumulative_reform(&self) -> Option<Vec<f64>> {
        let first = self.reform_flags.iter().position(|&f| f)?;
        if first == 0 {
            return None;
        }
        Some(
            (0..self.len())
                .map(|i| if i >= first { 1.0 } else { 0.0 })
                .collect(),
        )
    }
}

/// Scalar regression output for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Annual trend on the applicable reform track
    pub trend_rate: f64,
    /// forecast(reform=1) / forecast(reform=0); None when no reform
    /// covariate was fit
    pub reform_multiplier: Option<f64>,
    /// One-year-ahead forecast of the ratio
    pub projected_next_value: f64,
    /// Fitted ratio per historical year, on each year's actual reform basis
    pub fitted: Vec<f64>,
}

/// Per-accident-year multiplicative adjustments for the indication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentFactors {
    pub years: Vec<i32>,
    /// Compounds each year's fitted ratio forward to the projection year
    pub trend: Vec<f64>,
    /// Renormalizes pre-reform years onto the post-reform basis; 1 for
    /// post-reform years
    pub reform: Vec<f64>,
}

fn fit_model(series: &TrendSeries) -> (OlsFit, Option<Vec<f64>>) {
    let x: Vec<f64> = series.years().iter().map(|&y| y as f64).collect();
    let y: Vec<f64> = series.ratios().iter().map(|&r| r.ln()).collect();

    match series.cumulative_reform() {
        Some(covariate) => (fit_with_reform(&x, &covariate, &y), Some(covariate)),
        None => (fit_simple(&x, &y), None),
    }
}

fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Fit the series and report scalar trend and reform estimates.
pub fn fit_trend(series: &TrendSeries) -> RegressionResult {
    let (fit, covariate) = fit_model(series);
    let last_year = series.years()[series.len() - 1] as f64;
    let proj_year = series.projection_year() as f64;

    // The forecast track carries reform=1 whenever a covariate was fit:
    // the break is in effect by the end of the history and stays in effect.
    let on_reform = covariate.is_some() as u8 as f64;
    let forecast_next = fit.predict(proj_year, on_reform).exp();
    let forecast_last = fit.predict(last_year, on_reform).exp();

    let trend_rate = if forecast_last == 0.0 {
        0.0
    } else {
        forecast_next / forecast_last - 1.0
    };

    let reform_multiplier = covariate.as_ref().map(|_| {
        guarded_ratio(
            fit.predict(last_year, 1.0).exp(),
            fit.predict(last_year, 0.0).exp(),
        )
    });

    let fitted = series
        .years()
        .iter()
        .enumerate()
        .map(|(i, &year)| {
            let r = covariate.as_ref().map_or(0.0, |c| c[i]);
            fit.predict(year as f64, r).exp()
        })
        .collect();

    RegressionResult {
        trend_rate,
        reform_multiplier,
        projected_next_value: forecast_next,
        fitted,
    }
}

/// Produce per-accident-year trend and reform adjustment factors.
///
/// Every trend adjustment shares the projection year as its fixed base:
/// factor(ay) = (1 + trend)^(projection_year - ay) on the post-reform
/// track. `trend_margin` is an additive override on the fitted annual
/// trend, chosen by the participant as a conservatism knob.
pub fn adjustment_factors(series: &TrendSeries, trend_margin: f64) -> AdjustmentFactors {
    let (fit, covariate) = fit_model(series);
    let proj_year = series.projection_year();

    let fitted_trend = fit.slope_year.exp() - 1.0;
    let effective = 1.0 + fitted_trend + trend_margin;

    let mut trend = Vec::with_capacity(series.len());
    let mut reform = Vec::with_capacity(series.len());

    for (i, &year) in series.years().iter().enumerate() {
        let span = proj_year - year;
        // A non-positive compounding base cannot be projected; the policy
        // default for a dead denominator is 0, never a panic.
        trend.push(if effective > 0.0 {
            effective.powi(span)
        } else {
            0.0
        });

        match covariate.as_ref() {
            Some(c) if c[i] == 0.0 => {
                let numerator = fit.predict(year as f64, 1.0).exp();
                let denominator = fit.predict(year as f64, 0.0).exp();
                reform.push(guarded_ratio(numerator, denominator));
            }
            // Post-reform years are already on the projection basis
            _ => reform.push(1.0),
        }
    }

    AdjustmentFactors {
        years: series.years().to_vec(),
        trend,
        reform,
    }
}
