//! Feature Column Naming
//!
//! The training encoder and the inference reconstructor both build one-hot
//! column names through [`CategoricalDimension::column_name`]. A level that
//! is spelled differently at the two ends never activates its column, so no
//! other code path may format these names.

use serde::{Deserialize, Serialize};

/// Manufacture year column
pub const YEAR_COLUMN: &str = "Tahun";
/// Car age column (current year minus manufacture year)
pub const AGE_COLUMN: &str = "UsiaMobil";
/// Mileage column
pub const MILEAGE_COLUMN: &str = "Kilometer";

/// Numeric model inputs, in schema order
pub const NUMERIC_COLUMNS: [&str; 3] = [YEAR_COLUMN, MILEAGE_COLUMN, AGE_COLUMN];

/// A one-hot encoded categorical dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalDimension {
    Brand,
    ModelDetail,
    Location,
    Owner,
}

impl CategoricalDimension {
    /// Dimensions in schema order
    pub const ALL: [CategoricalDimension; 4] = [
        CategoricalDimension::Brand,
        CategoricalDimension::ModelDetail,
        CategoricalDimension::Location,
        CategoricalDimension::Owner,
    ];

    /// Column-name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            CategoricalDimension::Brand => "Merek",
            CategoricalDimension::ModelDetail => "Model_Detail",
            CategoricalDimension::Location => "Lokasi",
            CategoricalDimension::Owner => "owner",
        }
    }

    /// Level text used inside the column name, or `None` for blank input.
    ///
    /// Brand and location keep the trimmed value as-is. Model detail is free
    /// text and goes through [`sanitize_model_detail`]. Owner brackets keep
    /// only their first word ("Fourth & Above" becomes "Fourth").
    pub fn level(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        let level = match self {
            CategoricalDimension::Brand | CategoricalDimension::Location => trimmed.to_string(),
            CategoricalDimension::ModelDetail => sanitize_model_detail(trimmed),
            CategoricalDimension::Owner => trimmed
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        if level.is_empty() {
            None
        } else {
            Some(level)
        }
    }

    /// Column name for an already-derived level
    pub fn column_for_level(&self, level: &str) -> String {
        format!("{}_{}", self.prefix(), level)
    }

    /// One-hot column name for a raw value
    pub fn column_name(&self, raw: &str) -> Option<String> {
        self.level(raw).map(|level| self.column_for_level(&level))
    }
}

/// Normalize free-text model details: lowercase, spaces to underscores,
/// drop anything outside `[-a-zA-Z0-9_]`, trim underscores at both ends
pub fn sanitize_model_detail(raw: &str) -> String {
    let kept: String = raw
        .to_lowercase()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    kept.trim_matches('_').to_string()
}
