//! Loss triangle data structures
//!
//! A triangle holds cumulative claim amounts indexed by accident year and
//! development period. Rows are ragged: each newer accident year has one
//! fewer observed period. Triangles are append-only - the yearly simulation
//! advance adds a diagonal, past cells are never rewritten.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coverage line for a triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coverage {
    /// Third-party liability
    Liability,
    /// Accident benefits (subject to product reform)
    AccidentBenefits,
    /// Collision
    Collision,
    /// Comprehensive
    Comprehensive,
}

impl Coverage {
    /// All coverages in reporting order
    pub fn all() -> [Coverage; 4] {
        [
            Coverage::Liability,
            Coverage::AccidentBenefits,
            Coverage::Collision,
            Coverage::Comprehensive,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Coverage::Liability => "Liability",
            Coverage::AccidentBenefits => "Accident Benefits",
            Coverage::Collision => "Collision",
            Coverage::Comprehensive => "Comprehensive",
        }
    }
}

/// Identity of one triangle within a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriangleKey {
    pub game_id: u32,
    pub participant_id: u32,
    pub coverage: Coverage,
    /// Year of the latest diagonal
    pub evaluation_year: i32,
}

/// Validation failures for triangle construction
///
/// Malformed triangles are an upstream data defect, so construction fails
/// fast rather than patching cells.
#[derive(Debug, Error)]
pub enum TriangleError {
    #[error("triangle has no accident years")]
    Empty,

    #[error("accident years must be strictly ascending")]
    UnorderedAccidentYears,

    #[error("accident year {accident_year} has {cells} cells, expected 1..={max}")]
    RowLength {
        accident_year: i32,
        cells: usize,
        max: usize,
    },

    #[error("accident year {accident_year} has more observed periods than the prior year")]
    RaggedShape { accident_year: i32 },

    #[error("negative {metric} cell at accident year {accident_year}, period index {period}")]
    NegativeCell {
        metric: &'static str,
        accident_year: i32,
        period: usize,
    },

    #[error("{metric} not cumulative at accident year {accident_year}, period index {period}")]
    NotCumulative {
        metric: &'static str,
        accident_year: i32,
        period: usize,
    },

    #[error("paid and incurred shapes differ at accident year {accident_year}")]
    MetricShapeMismatch { accident_year: i32 },

    #[error("diagonal has {cells} cells, expected {expected}")]
    DiagonalLength { cells: usize, expected: usize },
}

/// A partial claim-development triangle for one coverage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossTriangle {
    pub key: TriangleKey,

    /// Accident years, ascending
    accident_years: Vec<i32>,

    /// Development ages in months (e.g. 12/24/36)
    dev_months: Vec<u32>,

    /// Cumulative paid amounts, one ragged row per accident year
    paid: Vec<Vec<f64>>,

    /// Cumulative incurred amounts, same shape as `paid`
    incurred: Vec<Vec<f64>>,
}

impl LossTriangle {
    /// Build a triangle, validating shape, sign and cumulativity
    pub fn new(
        key: TriangleKey,
        accident_years: Vec<i32>,
        dev_months: Vec<u32>,
        paid: Vec<Vec<f64>>,
        incurred: Vec<Vec<f64>>,
    ) -> Result<Self, TriangleError> {
        if accident_years.is_empty() || dev_months.is_empty() {
            return Err(TriangleError::Empty);
        }
        if accident_years.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TriangleError::UnorderedAccidentYears);
        }
        if paid.len() != accident_years.len() || incurred.len() != accident_years.len() {
            return Err(TriangleError::RowLength {
                accident_year: accident_years[0],
                cells: paid.len(),
                max: accident_years.len(),
            });
        }

        let mut prior_len = dev_months.len();
        for (i, &ay) in accident_years.iter().enumerate() {
            let row = &paid[i];
            if row.is_empty() || row.len() > dev_months.len() {
                return Err(TriangleError::RowLength {
                    accident_year: ay,
                    cells: row.len(),
                    max: dev_months.len(),
                });
            }
            if row.len() > prior_len {
                return Err(TriangleError::RaggedShape { accident_year: ay });
            }
            prior_len = row.len();

            if incurred[i].len() != row.len() {
                return Err(TriangleError::MetricShapeMismatch { accident_year: ay });
            }
            Self::check_row("paid", ay, row)?;
            Self::check_row("incurred", ay, &incurred[i])?;
        }

        Ok(Self {
            key,
            accident_years,
            dev_months,
            paid,
            incurred,
        })
    }

    fn check_row(metric: &'static str, accident_year: i32, row: &[f64]) -> Result<(), TriangleError> {
        for (p, &cell) in row.iter().enumerate() {
            if cell < 0.0 {
                return Err(TriangleError::NegativeCell {
                    metric,
                    accident_year,
                    period: p,
                });
            }
            if p > 0 && cell < row[p - 1] {
                return Err(TriangleError::NotCumulative {
                    metric,
                    accident_year,
                    period: p,
                });
            }
        }
        Ok(())
    }

    /// Append one evaluation year: a new cell on every open accident year
    /// plus a first observation for the new accident year.
    ///
    /// `paid_diagonal` / `incurred_diagonal` run oldest accident year first
    /// and cover only rows that are still open, then the new accident year.
    pub fn append_diagonal(
        &mut self,
        new_accident_year: i32,
        paid_diagonal: &[f64],
        incurred_diagonal: &[f64],
    ) -> Result<(), TriangleError> {
        let open: Vec<usize> = (0..self.accident_years.len())
            .filter(|&i| self.paid[i].len() < self.dev_months.len())
            .collect();
        let expected = open.len() + 1;
        if paid_diagonal.len() != expected || incurred_diagonal.len() != expected {
            return Err(TriangleError::DiagonalLength {
                cells: paid_diagonal.len(),
                expected,
            });
        }
        if *self.accident_years.last().expect("validated non-empty") >= new_accident_year {
            return Err(TriangleError::UnorderedAccidentYears);
        }

        for (d, &i) in open.iter().enumerate() {
            let ay = self.accident_years[i];
            let last_paid = *self.paid[i].last().expect("validated non-empty row");
            let last_inc = *self.incurred[i].last().expect("validated non-empty row");
            if paid_diagonal[d] < last_paid {
                return Err(TriangleError::NotCumulative {
                    metric: "paid",
                    accident_year: ay,
                    period: self.paid[i].len(),
                });
            }
            if incurred_diagonal[d] < last_inc {
                return Err(TriangleError::NotCumulative {
                    metric: "incurred",
                    accident_year: ay,
                    period: self.incurred[i].len(),
                });
            }
            self.paid[i].push(paid_diagonal[d]);
            self.incurred[i].push(incurred_diagonal[d]);
        }

        let new_paid = paid_diagonal[expected - 1];
        let new_inc = incurred_diagonal[expected - 1];
        if new_paid < 0.0 || new_inc < 0.0 {
            return Err(TriangleError::NegativeCell {
                metric: if new_paid < 0.0 { "paid" } else { "incurred" },
                accident_year: new_accident_year,
                period: 0,
            });
        }
        self.accident_years.push(new_accident_year);
        self.paid.push(vec![new_paid]);
        self.incurred.push(vec![new_inc]);
        self.key.evaluation_year += 1;
        Ok(())
    }

    pub fn accident_years(&self) -> &[i32] {
        &self.accident_years
    }

    pub fn dev_months(&self) -> &[u32] {
        &self.dev_months
    }

    pub fn n_periods(&self) -> usize {
        self.dev_months.len()
    }

    pub fn n_accident_years(&self) -> usize {
        self.accident_years.len()
    }

    /// Observed period count for accident year `i`
    pub fn observed(&self, i: usize) -> usize {
        self.paid[i].len()
    }

    /// Whether accident year `i` is observed through the final period
    pub fn is_fully_developed(&self, i: usize) -> bool {
        self.observed(i) == self.n_periods()
    }

    pub fn paid_row(&self, i: usize) -> &[f64] {
        &self.paid[i]
    }

    pub fn incurred_row(&self, i: usize) -> &[f64] {
        &self.incurred[i]
    }

    pub fn latest_paid(&self, i: usize) -> f64 {
        *self.paid[i].last().expect("validated non-empty row")
    }

    pub fn latest_incurred(&self, i: usize) -> f64 {
        *self.incurred[i].last().expect("validated non-empty row")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> TriangleKey {
        TriangleKey {
            game_id: 1,
            participant_id: 1,
            coverage: Coverage::Liability,
            evaluation_year: 2023,
        }
    }

    fn small_triangle() -> LossTriangle {
        LossTriangle::new(
            key(),
            vec![2021, 2022, 2023],
            vec![12, 24, 36],
            vec![
                vec![900.0, 1150.0, 1150.0],
                vec![975.0, 1100.0],
                vec![1000.0],
            ],
            vec![
                vec![1100.0, 1160.0, 1160.0],
                vec![1150.0, 1210.0],
                vec![1250.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_triangle_shape() {
        let tri = small_triangle();
        assert_eq!(tri.n_accident_years(), 3);
        assert_eq!(tri.observed(0), 3);
        assert_eq!(tri.observed(2), 1);
        assert!(tri.is_fully_developed(0));
        assert!(!tri.is_fully_developed(2));
        assert_eq!(tri.latest_paid(2), 1000.0);
    }

    #[test]
    fn test_rejects_non_cumulative_row() {
        let result = LossTriangle::new(
            key(),
            vec![2022, 2023],
            vec![12, 24],
            vec![vec![500.0, 400.0], vec![300.0]],
            vec![vec![500.0, 500.0], vec![300.0]],
        );
        assert!(matches!(
            result,
            Err(TriangleError::NotCumulative { metric: "paid", .. })
        ));
    }

    #[test]
    fn test_rejects_negative_cell() {
        let result = LossTriangle::new(
            key(),
            vec![2023],
            vec![12, 24],
            vec![vec![-1.0]],
            vec![vec![0.0]],
        );
        assert!(matches!(result, Err(TriangleError::NegativeCell { .. })));
    }

    #[test]
    fn test_rejects_widening_rows() {
        let result = LossTriangle::new(
            key(),
            vec![2022, 2023],
            vec![12, 24],
            vec![vec![500.0], vec![300.0, 350.0]],
            vec![vec![500.0], vec![300.0, 350.0]],
        );
        assert!(matches!(result, Err(TriangleError::RaggedShape { .. })));
    }

    #[test]
    fn test_append_diagonal_extends_open_rows() {
        let mut tri = small_triangle();
        // 2021 is closed; 2022/2023 each gain a cell, 2024 opens
        tri.append_diagonal(2024, &[1190.0, 1180.0, 1050.0], &[1260.0, 1300.0, 1290.0])
            .unwrap();

        assert_eq!(tri.n_accident_years(), 4);
        assert_eq!(tri.observed(0), 3);
        assert_eq!(tri.observed(1), 3);
        assert_eq!(tri.observed(2), 2);
        assert_eq!(tri.observed(3), 1);
        assert_eq!(tri.key.evaluation_year, 2024);
        assert_eq!(tri.latest_paid(1), 1190.0);
    }

    #[test]
    fn test_append_diagonal_rejects_regression_of_cells() {
        let mut tri = small_triangle();
        // 2022 already has paid 1100; a smaller cumulative cell is invalid
        let result = tri.append_diagonal(2024, &[900.0, 1180.0, 1050.0], &[1260.0, 1300.0, 1290.0]);
        assert!(matches!(result, Err(TriangleError::NotCumulative { .. })));
    }
}
