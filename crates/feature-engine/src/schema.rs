//! Feature Schema Registry

use crate::error::FeatureError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered feature-column names a trained model expects.
///
/// Frozen once built: there is no way to add, remove or reorder columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema; columns must be non-empty, non-blank and unique
    pub fn new(columns: Vec<String>) -> Result<Self, FeatureError> {
        if columns.is_empty() {
            return Err(FeatureError::InvalidSchema("no columns".to_string()));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(FeatureError::InvalidSchema(format!(
                    "blank column name at position {}",
                    position
                )));
            }
            if index.insert(name.clone(), position).is_some() {
                return Err(FeatureError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    name
                )));
            }
        }

        Ok(Self { columns, index })
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a valid schema
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether a column exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(columns: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.columns
    }
}
