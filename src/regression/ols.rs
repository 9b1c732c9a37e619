//! Ordinary least squares fits for the trend models
//!
//! Two model shapes are needed: y = a + b*x, and y = a + b*x + c*r where r
//! is a 0/1 structural-break covariate. Both are solved in closed form
//! from centered sums, which stays well conditioned for year values in the
//! thousands.

/// Coefficients of a fitted trend model
#[derive(Debug, Clone, Copy)]
pub struct OlsFit {
    pub intercept: f64,
    pub slope_year: f64,
    /// Present only when the structural-break covariate was fit
    pub slope_reform: Option<f64>,
}

impl OlsFit {
    /// Model prediction at year `x` with break covariate `r`
    pub fn predict(&self, x: f64, r: f64) -> f64 {
        self.intercept + self.slope_year * x + self.slope_reform.unwrap_or(0.0) * r
    }
}

/// Fit y = a + b*x. A degenerate x column yields slope 0.
pub fn fit_simple(x: &[f64], y: &[f64]) -> OlsFit {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len() as f64;
    let x_bar = x.iter().sum::<f64>() / n;
    let y_bar = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sxx += (xi - x_bar) * (xi - x_bar);
        sxy += (xi - x_bar) * (yi - y_bar);
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    OlsFit {
        intercept: y_bar - slope * x_bar,
        slope_year: slope,
        slope_reform: None,
    }
}

/// Fit y = a + b*x + c*r via the centered 2x2 normal equations.
///
/// Falls back to the simple model with a zero break coefficient when the
/// system is singular (e.g. r collinear with x).
pub fn fit_with_reform(x: &[f64], r: &[f64], y: &[f64]) -> OlsFit {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(r.len(), y.len());
    let n = x.len() as f64;
    let x_bar = x.iter().sum::<f64>() / n;
    let r_bar = r.iter().sum::<f64>() / n;
    let y_bar = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut srr = 0.0;
    let mut sxr = 0.0;
    let mut sxy = 0.0;
    let mut sry = 0.0;
    for ((&xi, &ri), &yi) in x.iter().zip(r).zip(y) {
        let dx = xi - x_bar;
        let dr = ri - r_bar;
        let dy = yi - y_bar;
        sxx += dx * dx;
        srr += dr * dr;
        sxr += dx * dr;
        sxy += dx * dy;
        sry += dr * dy;
    }

    let det = sxx * srr - sxr * sxr;
    if det.abs() < 1e-9 * sxx.max(srr).max(1.0) {
        let mut fit = fit_simple(x, y);
        fit.slope_reform = Some(0.0);
        return fit;
    }

    let slope_year = (srr * sxy - sxr * sry) / det;
    let slope_reform = (sxx * sry - sxr * sxy) / det;
    OlsFit {
        intercept: y_bar - slope_year * x_bar - slope_reform * r_bar,
        slope_year,
        slope_reform: Some(slope_reform),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simple_fit_recovers_line() {
        let x: Vec<f64> = (0..8).map(|i| 2016.0 + i as f64).collect();
        let y: Vec<f64> = x.iter().map(|xi| 3.0 + 0.25 * xi).collect();
        let fit = fit_simple(&x, &y);
        assert_relative_eq!(fit.slope_year, 0.25, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept, 3.0, epsilon = 1e-6);
        assert!(fit.slope_reform.is_none());
    }

    #[test]
    fn test_simple_fit_degenerate_x() {
        let fit = fit_simple(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]);
        assert_eq!(fit.slope_year, 0.0);
        assert_relative_eq!(fit.intercept, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reform_fit_recovers_plane() {
        let x: Vec<f64> = (0..10).map(|i| 2014.0 + i as f64).collect();
        let r: Vec<f64> = x.iter().map(|&xi| if xi >= 2019.0 { 1.0 } else { 0.0 }).collect();
        let y: Vec<f64> = x
            .iter()
            .zip(&r)
            .map(|(&xi, &ri)| -1.5 + 0.05 * xi + 0.3 * ri)
            .collect();

        let fit = fit_with_reform(&x, &r, &y);
        assert_relative_eq!(fit.slope_year, 0.05, epsilon = 1e-9);
        assert_relative_eq!(fit.slope_reform.unwrap(), 0.3, epsilon = 1e-9);
        assert_relative_eq!(fit.predict(2024.0, 1.0), -1.5 + 0.05 * 2024.0 + 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_reform_fit_singular_falls_back() {
        // r identical to x makes the covariates collinear
        let x = [1.0, 2.0, 3.0];
        let r = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        let fit = fit_with_reform(&x, &r, &y);
        assert_eq!(fit.slope_reform, Some(0.0));
        assert_relative_eq!(fit.predict(4.0, 0.0), 8.0, epsilon = 1e-9);
    }
}
