//! CSV-based input loaders for triangles and financial statements

pub mod loader;

pub use loader::{
    load_financials_file, load_triangle_file, read_financial_history, read_triangle,
};
