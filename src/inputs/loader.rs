//! CSV loaders for engine inputs
//!
//! The simulation/data layer hands per-year triangle cells and financial
//! statement rows over as CSV. Readers are generic over `io::Read` so tests
//! run against in-memory data; file wrappers sit on top.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::triangle::{LossTriangle, TriangleKey};
use crate::valuation::FinancialYear;

/// Read triangle cells with columns: accident_year, dev_months, paid, incurred.
/// Rows may arrive in any order; cells are grouped per accident year and
/// ordered by development age.
pub fn read_triangle<R: Read>(reader: R, key: TriangleKey) -> Result<LossTriangle, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut cells: BTreeMap<i32, BTreeMap<u32, (f64, f64)>> = BTreeMap::new();
    let mut dev_ages: Vec<u32> = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let accident_year: i32 = record[0].parse()?;
        let dev_months: u32 = record[1].parse()?;
        let paid: f64 = record[2].parse()?;
        let incurred: f64 = record[3].parse()?;

        if !dev_ages.contains(&dev_months) {
            dev_ages.push(dev_months);
        }
        cells
            .entry(accident_year)
            .or_default()
            .insert(dev_months, (paid, incurred));
    }

    dev_ages.sort_unstable();

    let accident_years: Vec<i32> = cells.keys().copied().collect();
    let mut paid = Vec::with_capacity(accident_years.len());
    let mut incurred = Vec::with_capacity(accident_years.len());
    for row in cells.values() {
        let mut paid_row = Vec::with_capacity(row.len());
        let mut incurred_row = Vec::with_capacity(row.len());
        for &(p, i) in row.values() {
            paid_row.push(p);
            incurred_row.push(i);
        }
        paid.push(paid_row);
        incurred.push(incurred_row);
    }

    Ok(LossTriangle::new(key, accident_years, dev_ages, paid, incurred)?)
}

/// Read financial statement rows with columns: year, in_force,
/// beginning_in_force, profit, dividend_paid, pv_index, excess_capital.
pub fn read_financial_history<R: Read>(reader: R) -> Result<Vec<FinancialYear>, Box<dyn Error>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(FinancialYear {
            year: record[0].parse()?,
            in_force: record[1].parse()?,
            beginning_in_force: record[2].parse()?,
            profit: record[3].parse()?,
            dividend_paid: record[4].parse()?,
            pv_index: record[5].parse()?,
            excess_capital: record[6].parse()?,
        });
    }
    rows.sort_by_key(|row| row.year);
    Ok(rows)
}

/// Load one coverage's triangle from a CSV file
pub fn load_triangle_file(path: &Path, key: TriangleKey) -> Result<LossTriangle, Box<dyn Error>> {
    let file = File::open(path)?;
    read_triangle(file, key)
}

/// Load one participant's financial history from a CSV file
pub fn load_financials_file(path: &Path) -> Result<Vec<FinancialYear>, Box<dyn Error>> {
    let file = File::open(path)?;
    read_financial_history(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle::Coverage;

    fn key() -> TriangleKey {
        TriangleKey {
            game_id: 1,
            participant_id: 1,
            coverage: Coverage::Collision,
            evaluation_year: 2023,
        }
    }

    #[test]
    fn test_read_triangle_groups_and_orders_cells() {
        // Rows deliberately shuffled
        let data = "\
accident_year,dev_months,paid,incurred
2022,24,1100,1210
2021,12,900,1100
2023,12,1000,1250
2021,36,1150,1160
2021,24,1150,1160
2022,12,975,1150
";
        let tri = read_triangle(data.as_bytes(), key()).unwrap();

        assert_eq!(tri.accident_years(), &[2021, 2022, 2023]);
        assert_eq!(tri.dev_months(), &[12, 24, 36]);
        assert_eq!(tri.paid_row(0), &[900.0, 1150.0, 1150.0]);
        assert_eq!(tri.paid_row(2), &[1000.0]);
        assert_eq!(tri.incurred_row(1), &[1150.0, 1210.0]);
    }

    #[test]
    fn test_read_triangle_rejects_malformed_cells() {
        let data = "\
accident_year,dev_months,paid,incurred
2023,12,not_a_number,1250
";
        assert!(read_triangle(data.as_bytes(), key()).is_err());
    }

    #[test]
    fn test_read_triangle_propagates_shape_validation() {
        // Paid regresses between development ages: not cumulative
        let data = "\
accident_year,dev_months,paid,incurred
2022,12,900,1100
2022,24,800,1100
2023,12,500,600
";
        assert!(read_triangle(data.as_bytes(), key()).is_err());
    }

    #[test]
    fn test_read_financials_sorted_by_year() {
        let data = "\
year,in_force,beginning_in_force,profit,dividend_paid,pv_index,excess_capital
2023,10500,10200,450000,120000,1.0,800000
2021,10000,9800,400000,100000,0.89,700000
2022,10200,10000,430000,110000,0.943,750000
";
        let rows = read_financial_history(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].year, 2021);
        assert_eq!(rows[2].year, 2023);
        assert_eq!(rows[1].pv_index, 0.943);
    }
}
