//! Volume-weighted chain-ladder development
//!
//! Age-to-age factors are column sums across accident years where both the
//! earlier and later cell are observed. A transition with no data develops
//! at 1.0 - a brand-new game has no development history and every factor
//! defaults to 1.

use serde::{Deserialize, Serialize};

use super::data::LossTriangle;

/// Which metric a development pattern was fit to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Paid,
    Incurred,
}

/// A single age-to-age transition
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DevelopmentFactor {
    /// Development age developed from, in months
    pub from_months: u32,
    /// Development age developed to, in months
    pub to_months: u32,
    /// Volume-weighted factor, 1.0 when the denominator column is empty or zero
    pub factor: f64,
}

/// Age-to-age factors for every transition of a triangle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentPattern {
    pub metric: Metric,
    pub transitions: Vec<DevelopmentFactor>,
}

impl DevelopmentPattern {
    /// Product of the factors needed to carry an accident year observed
    /// through period index `observed` to full development.
    pub fn remaining_product(&self, observed: usize) -> f64 {
        self.transitions
            .iter()
            .skip(observed.saturating_sub(1))
            .map(|t| t.factor)
            .product()
    }
}

/// Ultimate loss estimate for one accident year
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UltimateLoss {
    pub accident_year: i32,
    pub ultimate: f64,
    /// True when the year was already fully observed and the incurred value
    /// was taken as-is
    pub fully_developed: bool,
}

/// A triangle with projected future cells filled in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTriangle {
    pub accident_years: Vec<i32>,
    pub dev_months: Vec<u32>,
    /// Full rectangle, one row per accident year
    pub cells: Vec<Vec<f64>>,
}

/// Volume-weighted age-to-age factors for one metric of a triangle.
///
/// factor(p -> p+1) = sum(cell[ay, p+1]) / sum(cell[ay, p]) over accident
/// years with both cells observed; 1.0 on a zero denominator.
pub fn age_to_age_factors(triangle: &LossTriangle, metric: Metric) -> DevelopmentPattern {
    let n = triangle.n_periods();
    let mut transitions = Vec::with_capacity(n.saturating_sub(1));

    for p in 0..n.saturating_sub(1) {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in 0..triangle.n_accident_years() {
            let row = match metric {
                Metric::Paid => triangle.paid_row(i),
                Metric::Incurred => triangle.incurred_row(i),
            };
            if row.len() > p + 1 {
                numerator += row[p + 1];
                denominator += row[p];
            }
        }
        let factor = if denominator == 0.0 {
            1.0
        } else {
            numerator / denominator
        };
        transitions.push(DevelopmentFactor {
            from_months: triangle.dev_months()[p],
            to_months: triangle.dev_months()[p + 1],
            factor,
        });
    }

    DevelopmentPattern { metric, transitions }
}

/// Fill each accident year's missing cells by carrying the latest known
/// cell forward through the remaining factors.
pub fn complete(triangle: &LossTriangle, pattern: &DevelopmentPattern) -> CompletedTriangle {
    let n = triangle.n_periods();
    let mut cells = Vec::with_capacity(triangle.n_accident_years());

    for i in 0..triangle.n_accident_years() {
        let row = match pattern.metric {
            Metric::Paid => triangle.paid_row(i),
            Metric::Incurred => triangle.incurred_row(i),
        };
        let mut full: Vec<f64> = row.to_vec();
        let mut carried = *full.last().expect("validated non-empty row");
        for p in full.len()..n {
            carried *= pattern.transitions[p - 1].factor;
            full.push(carried);
        }
        cells.push(full);
    }

    CompletedTriangle {
        accident_years: triangle.accident_years().to_vec(),
        dev_months: triangle.dev_months().to_vec(),
        cells,
    }
}

/// Ultimate incurred losses per accident year.
///
/// A year observed through the final period reports its incurred value
/// unchanged. An open year develops its latest paid observation through the
/// remaining paid factors - a single-observation year projects purely off
/// factors.
pub fn ultimates(triangle: &LossTriangle) -> Vec<UltimateLoss> {
    let pattern = age_to_age_factors(triangle, Metric::Paid);
    (0..triangle.n_accident_years())
        .map(|i| {
            if triangle.is_fully_developed(i) {
                UltimateLoss {
                    accident_year: triangle.accident_years()[i],
                    ultimate: triangle.latest_incurred(i),
                    fully_developed: true,
                }
            } else {
                let observed = triangle.observed(i);
                UltimateLoss {
                    accident_year: triangle.accident_years()[i],
                    ultimate: triangle.latest_paid(i) * pattern.remaining_product(observed),
                    fully_developed: false,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle::data::{Coverage, TriangleKey};
    use approx::assert_relative_eq;

    fn key() -> TriangleKey {
        TriangleKey {
            game_id: 1,
            participant_id: 1,
            coverage: Coverage::Liability,
            evaluation_year: 2023,
        }
    }

    fn triangle(paid: Vec<Vec<f64>>, incurred: Vec<Vec<f64>>, years: Vec<i32>) -> LossTriangle {
        let dev: Vec<u32> = (1..=paid[0].len().max(incurred[0].len()))
            .map(|p| p as u32 * 12)
            .collect();
        LossTriangle::new(key(), years, dev, paid, incurred).unwrap()
    }

    #[test]
    fn test_factors_non_negative_and_default_on_zero_denominator() {
        // Second transition has a zero denominator column
        let tri = triangle(
            vec![vec![0.0, 0.0, 0.0], vec![100.0, 120.0], vec![80.0]],
            vec![vec![0.0, 0.0, 0.0], vec![110.0, 125.0], vec![95.0]],
            vec![2021, 2022, 2023],
        );
        let pattern = age_to_age_factors(&tri, Metric::Paid);

        assert!(pattern.transitions.iter().all(|t| t.factor >= 0.0));
        // 24 -> 36 only has the zero row on both sides
        assert_eq!(pattern.transitions[1].factor, 1.0);
        // 12 -> 24 mixes the zero row and the 100 -> 120 row
        assert_relative_eq!(pattern.transitions[0].factor, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_first_year_single_accident_year_all_factors_one() {
        let tri = triangle(vec![vec![500.0]], vec![vec![650.0]], vec![2023]);
        let pattern = age_to_age_factors(&tri, Metric::Paid);
        assert!(pattern.transitions.is_empty() || pattern.transitions.iter().all(|t| t.factor == 1.0));

        let tri = LossTriangle::new(
            key(),
            vec![2023],
            vec![12, 24, 36],
            vec![vec![500.0]],
            vec![vec![650.0]],
        )
        .unwrap();
        let pattern = age_to_age_factors(&tri, Metric::Paid);
        assert_eq!(pattern.transitions.len(), 2);
        assert!(pattern.transitions.iter().all(|t| t.factor == 1.0));
    }

    #[test]
    fn test_fully_developed_year_reports_incurred_unchanged() {
        let tri = triangle(
            vec![vec![900.0, 1150.0, 1150.0], vec![975.0, 1100.0], vec![1000.0]],
            vec![vec![1100.0, 1160.0, 1160.0], vec![1150.0, 1210.0], vec![1250.0]],
            vec![2021, 2022, 2023],
        );
        let ult = ultimates(&tri);
        assert!(ult[0].fully_developed);
        assert_eq!(ult[0].ultimate, 1160.0);
    }

    #[test]
    fn test_least_developed_year_develops_through_remaining_factors() {
        // Paid factors: 12->24 = (1150+1100)/(900+975) = 1.2, 24->36 = 1150/1150 = 1.0.
        // Latest paid diagonal is 1150 / 1100 / 1000 by accident year.
        let tri = triangle(
            vec![vec![900.0, 1150.0, 1150.0], vec![975.0, 1100.0], vec![1000.0]],
            vec![vec![1100.0, 1160.0, 1160.0], vec![1150.0, 1210.0], vec![1250.0]],
            vec![2021, 2022, 2023],
        );
        let pattern = age_to_age_factors(&tri, Metric::Paid);
        assert_relative_eq!(pattern.transitions[0].factor, 1.2, epsilon = 1e-12);
        assert_relative_eq!(pattern.transitions[1].factor, 1.0, epsilon = 1e-12);

        let ult = ultimates(&tri);
        // 2023 has one observation and projects purely off factors
        assert_relative_eq!(ult[2].ultimate, 1000.0 * 1.2 * 1.0, epsilon = 1e-9);
        // 2022 develops through the last remaining factor only
        assert_relative_eq!(ult[1].ultimate, 1100.0 * 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_complete_fills_future_cells() {
        let tri = triangle(
            vec![vec![900.0, 1150.0, 1150.0], vec![975.0, 1100.0], vec![1000.0]],
            vec![vec![1100.0, 1160.0, 1160.0], vec![1150.0, 1210.0], vec![1250.0]],
            vec![2021, 2022, 2023],
        );
        let pattern = age_to_age_factors(&tri, Metric::Paid);
        let completed = complete(&tri, &pattern);

        assert_eq!(completed.cells.len(), 3);
        assert!(completed.cells.iter().all(|row| row.len() == 3));
        // Observed cells are untouched
        assert_eq!(completed.cells[0], vec![900.0, 1150.0, 1150.0]);
        // 2023: 1000 * 1.2 at 24 months, * 1.0 at 36 months
        assert_relative_eq!(completed.cells[2][1], 1200.0, epsilon = 1e-9);
        assert_relative_eq!(completed.cells[2][2], 1200.0, epsilon = 1e-9);
    }
}
