//! Feature Error Types

use thiserror::Error;

/// Errors during feature derivation, encoding or reconstruction
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A numeric input violates its precondition
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A required selection is unset or still the placeholder
    #[error("Missing selection: {0}")]
    MissingSelection(&'static str),

    /// Manufacture year lies after the reference year
    #[error("Manufacture year {year} is after current year {current_year}")]
    NegativeCarAge { year: i32, current_year: i32 },

    /// Feature schema is malformed
    #[error("Invalid feature schema: {0}")]
    InvalidSchema(String),

    /// Matrix width does not match the schema
    #[error("Feature width mismatch: expected {expected} columns, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    /// Nothing to fit or encode
    #[error("No rows to {0}")]
    EmptyInput(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
