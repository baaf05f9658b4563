//! Training-Time One-Hot Encoder
//!
//! Each categorical dimension's distinct levels are sorted and the first one
//! is dropped, so it becomes the implicit reference level (an all-zero block).

use crate::error::FeatureError;
use crate::frame::{FeatureMatrix, FeatureRow, RowInputs};
use crate::naming::{CategoricalDimension, NUMERIC_COLUMNS};
use crate::schema::FeatureSchema;
use listing_data::ListingRecord;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Raw categorical values of a record, in dimension order
fn record_categories(record: &ListingRecord) -> Vec<(CategoricalDimension, &str)> {
    let mut categories = vec![
        (CategoricalDimension::Brand, record.brand.as_str()),
        (CategoricalDimension::ModelDetail, record.model_detail.as_str()),
        (CategoricalDimension::Location, record.location.as_str()),
    ];
    if let Some(owner) = record.owner.as_deref() {
        categories.push((CategoricalDimension::Owner, owner));
    }
    categories
}

/// One-hot encoder fitted on a training table
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    schema: Arc<FeatureSchema>,
    current_year: i32,
}

impl OneHotEncoder {
    /// Learn the feature schema from the training records
    pub fn fit(records: &[ListingRecord], current_year: i32) -> Result<Self, FeatureError> {
        if records.is_empty() {
            return Err(FeatureError::EmptyInput("encode"));
        }

        let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();

        for dimension in CategoricalDimension::ALL {
            let levels: BTreeSet<String> = records
                .iter()
                .flat_map(record_categories)
                .filter(|(d, _)| *d == dimension)
                .filter_map(|(d, raw)| d.level(raw))
                .collect();

            // First sorted level is the reference
            let kept = levels.len().saturating_sub(1);
            debug!(
                "{}: {} levels, {} one-hot columns",
                dimension.prefix(),
                levels.len(),
                kept
            );
            columns.extend(
                levels
                    .iter()
                    .skip(1)
                    .map(|level| dimension.column_for_level(level)),
            );
        }

        let schema = FeatureSchema::new(columns)?;
        info!(
            "Fitted one-hot encoder on {} records: {} feature columns",
            records.len(),
            schema.len()
        );

        Ok(Self {
            schema: Arc::new(schema),
            current_year,
        })
    }

    /// Encoder over an existing schema, e.g. one loaded from a model bundle
    pub fn from_schema(schema: Arc<FeatureSchema>, current_year: i32) -> Self {
        Self {
            schema,
            current_year,
        }
    }

    /// Fitted schema
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Encode one record
    pub fn encode_record(&self, record: &ListingRecord) -> Result<FeatureRow, FeatureError> {
        let car_age = record
            .car_age(self.current_year)
            .ok_or(FeatureError::NegativeCarAge {
                year: record.year,
                current_year: self.current_year,
            })?;

        let mut row = FeatureRow::zeros(Arc::clone(&self.schema));
        row.fill(&RowInputs {
            year: record.year,
            car_age,
            mileage: record.mileage,
            categories: record_categories(record),
        });
        Ok(row)
    }

    /// Encode records into a dense matrix
    pub fn encode(&self, records: &[ListingRecord]) -> Result<FeatureMatrix, FeatureError> {
        let rows = records
            .iter()
            .map(|record| self.encode_record(record))
            .collect::<Result<Vec<_>, _>>()?;
        FeatureMatrix::from_rows(Arc::clone(&self.schema), &rows)
    }
}
