//! Listing Error Types

use thiserror::Error;

/// Errors while loading, cleaning or joining listing data
#[derive(Debug, Error)]
pub enum ListingError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// No inflation rate is known for the manufacture year
    #[error("No inflation rate for manufacture year {year}")]
    MissingInflation { year: i32 },

    /// Manufacture year lies after the reference year
    #[error("Manufacture year {year} is after current year {current_year}")]
    NegativeCarAge { year: i32, current_year: i32 },

    /// A stage left no rows to work with
    #[error("No rows left after {0}")]
    EmptyDataset(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
