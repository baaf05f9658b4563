//! Schema-Aligned Feature Rows and Matrices

use crate::error::FeatureError;
use crate::naming::{CategoricalDimension, AGE_COLUMN, MILEAGE_COLUMN, YEAR_COLUMN};
use crate::schema::FeatureSchema;
use ndarray::{Array2, Axis};
use std::sync::Arc;

/// Values that populate one model input row
#[derive(Debug, Clone)]
pub struct RowInputs<'a> {
    pub year: i32,
    pub car_age: u32,
    pub mileage: u64,
    /// Raw categorical values; absent dimensions are left out
    pub categories: Vec<(CategoricalDimension, &'a str)>,
}

/// One feature row, aligned with its schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureRow {
    /// All-zero row
    pub fn zeros(schema: Arc<FeatureSchema>) -> Self {
        let values = vec![0.0; schema.len()];
        Self { schema, values }
    }

    /// Set a column by name; returns false when the schema lacks it
    pub fn set(&mut self, column: &str, value: f64) -> bool {
        match self.schema.position(column) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Populate numeric columns and one-hot flags. Columns the schema does
    /// not carry are skipped, which leaves unknown levels at the implicit
    /// reference level.
    pub fn fill(&mut self, inputs: &RowInputs<'_>) {
        self.set(YEAR_COLUMN, f64::from(inputs.year));
        self.set(AGE_COLUMN, f64::from(inputs.car_age));
        self.set(MILEAGE_COLUMN, inputs.mileage as f64);

        for (dimension, raw) in &inputs.categories {
            if let Some(column) = dimension.column_name(raw) {
                self.set(&column, 1.0);
            }
        }
    }

    /// Value of a column
    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|idx| self.values[idx])
    }

    /// Values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Schema this row is aligned with
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Names of non-zero columns, in schema order
    pub fn active_columns(&self) -> Vec<&str> {
        self.schema
            .columns()
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| **v != 0.0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Re-align onto another schema by column name; columns missing here
    /// are zero in the result
    pub fn project(&self, target: &Arc<FeatureSchema>) -> FeatureRow {
        let values = target
            .columns()
            .iter()
            .map(|name| self.get(name).unwrap_or(0.0))
            .collect();
        FeatureRow {
            schema: Arc::clone(target),
            values,
        }
    }
}

/// Feature rows stacked into a dense matrix
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    schema: Arc<FeatureSchema>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap a matrix; its width must match the schema
    pub fn new(schema: Arc<FeatureSchema>, values: Array2<f64>) -> Result<Self, FeatureError> {
        if values.ncols() != schema.len() {
            return Err(FeatureError::WidthMismatch {
                expected: schema.len(),
                actual: values.ncols(),
            });
        }
        Ok(Self { schema, values })
    }

    /// Stack rows that share this schema
    pub fn from_rows(schema: Arc<FeatureSchema>, rows: &[FeatureRow]) -> Result<Self, FeatureError> {
        let width = schema.len();
        let mut flat = Vec::with_capacity(rows.len() * width);
        for row in rows {
            if row.schema.columns() != schema.columns() {
                return Err(FeatureError::InvalidSchema(
                    "row schema differs from matrix schema".to_string(),
                ));
            }
            flat.extend_from_slice(&row.values);
        }
        let values = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| FeatureError::InvalidSchema(e.to_string()))?;
        Ok(Self { schema, values })
    }

    /// Schema of the columns
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Dense values, one row per listing
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Subset of rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            schema: Arc::clone(&self.schema),
            values: self.values.select(Axis(0), indices),
        }
    }
}

impl From<FeatureRow> for FeatureMatrix {
    fn from(row: FeatureRow) -> Self {
        let width = row.values.len();
        let values = Array2::from_shape_vec((1, width), row.values)
            .unwrap_or_else(|_| Array2::zeros((1, width)));
        Self {
            schema: row.schema,
            values,
        }
    }
}
