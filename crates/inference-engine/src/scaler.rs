//! Scaling Adapter
//!
//! A fitted scaler is read-only: `transform` never mutates it, so one
//! instance serves concurrent requests without locking.

use crate::InferenceError;
use feature_engine::{quantile, FeatureMatrix, FeatureRow};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Capability interface of a fitted feature scaler
pub trait FeatureScaler: Send + Sync {
    /// Columns the scaler was fit on, in order
    fn columns(&self) -> &[String];

    /// Scale a raw matrix whose columns are already known to line up
    fn transform_values(&self, values: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError>;

    /// Scale a matrix; its columns must equal [`columns`](Self::columns)
    /// exactly, in the same order
    fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix, InferenceError> {
        check_columns(self.columns(), matrix.schema().columns())?;
        let scaled = self.transform_values(matrix.values().view())?;
        Ok(FeatureMatrix::new(Arc::clone(matrix.schema()), scaled)?)
    }

    /// Scale a single row
    fn transform_row(&self, row: &FeatureRow) -> Result<FeatureMatrix, InferenceError> {
        self.transform(&FeatureMatrix::from(row.clone()))
    }
}

/// Fail unless `actual` equals `expected` name-for-name
pub(crate) fn check_columns(expected: &[String], actual: &[String]) -> Result<(), InferenceError> {
    if expected.len() != actual.len() {
        return Err(InferenceError::SchemaMismatch {
            component: "scaler",
            detail: format!("expected {} columns, got {}", expected.len(), actual.len()),
        });
    }
    if let Some((position, (want, got))) = expected
        .iter()
        .zip(actual)
        .enumerate()
        .find(|(_, (want, got))| want != got)
    {
        return Err(InferenceError::SchemaMismatch {
            component: "scaler",
            detail: format!("column {} is '{}', expected '{}'", position, got, want),
        });
    }
    Ok(())
}

#[derive(Deserialize)]
struct RobustScalerParts {
    columns: Vec<String>,
    center: Vec<f64>,
    scale: Vec<f64>,
}

/// Median / interquartile-range scaler: `(x - median) / IQR`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RobustScalerParts")]
pub struct RobustScaler {
    columns: Vec<String>,
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl RobustScaler {
    /// Build from fitted parameters
    pub fn new(columns: Vec<String>, center: Vec<f64>, scale: Vec<f64>) -> Result<Self, InferenceError> {
        if columns.len() != center.len() || columns.len() != scale.len() {
            return Err(InferenceError::InvalidModel(format!(
                "scaler has {} columns but {} centers and {} scales",
                columns.len(),
                center.len(),
                scale.len()
            )));
        }
        if center.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::InvalidModel(
                "scaler center is not finite".to_string(),
            ));
        }
        if scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(InferenceError::InvalidModel(
                "scaler scale must be finite and non-zero".to_string(),
            ));
        }
        Ok(Self {
            columns,
            center,
            scale,
        })
    }

    /// Fit on a training matrix. Columns with zero IQR get scale 1.
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self, InferenceError> {
        if matrix.nrows() == 0 {
            return Err(InferenceError::InvalidInput {
                field: "matrix",
                reason: "cannot fit a scaler on zero rows".to_string(),
            });
        }

        let mut center = Vec::with_capacity(matrix.schema().len());
        let mut scale = Vec::with_capacity(matrix.schema().len());
        for column in matrix.values().axis_iter(Axis(1)) {
            let values: Vec<f64> = column.iter().copied().collect();
            let median = quantile(&values, 0.5).unwrap_or(0.0);
            let q1 = quantile(&values, 0.25).unwrap_or(0.0);
            let q3 = quantile(&values, 0.75).unwrap_or(0.0);
            let iqr = q3 - q1;
            center.push(median);
            scale.push(if iqr == 0.0 { 1.0 } else { iqr });
        }

        info!(
            "Fitted robust scaler on {} rows x {} columns",
            matrix.nrows(),
            center.len()
        );
        Self::new(matrix.schema().columns().to_vec(), center, scale)
    }

    /// Per-column medians
    pub fn center(&self) -> &[f64] {
        &self.center
    }

    /// Per-column IQRs
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

impl TryFrom<RobustScalerParts> for RobustScaler {
    type Error = InferenceError;

    fn try_from(parts: RobustScalerParts) -> Result<Self, Self::Error> {
        Self::new(parts.columns, parts.center, parts.scale)
    }
}

impl FeatureScaler for RobustScaler {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn transform_values(&self, values: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        if values.ncols() != self.columns.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.columns.len(),
                actual: values.ncols(),
            });
        }

        let mut scaled = values.to_owned();
        for (j, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let (c, s) = (self.center[j], self.scale[j]);
            column.mapv_inplace(|x| (x - c) / s);
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FeatureSchema;
    use ndarray::array;

    fn schema(cols: &[&str]) -> Arc<FeatureSchema> {
        Arc::new(FeatureSchema::new(cols.iter().map(|c| c.to_string()).collect()).unwrap())
    }

    fn training() -> FeatureMatrix {
        let values = array![
            [2015.0, 10_000.0, 1.0],
            [2017.0, 20_000.0, 1.0],
            [2019.0, 30_000.0, 0.0],
            [2021.0, 40_000.0, 0.0],
            [2023.0, 50_000.0, 0.0],
        ];
        FeatureMatrix::new(schema(&["Tahun", "Kilometer", "Merek_Toyota"]), values).unwrap()
    }

    #[test]
    fn test_fit_median_iqr() {
        let scaler = RobustScaler::fit(&training()).unwrap();
        assert_eq!(scaler.center(), &[2019.0, 30_000.0, 0.0]);
        // IQR of the flag column is 1 - 0 = 1; the others are 4 years and 20000 km
        assert_eq!(scaler.scale(), &[4.0, 20_000.0, 1.0]);
    }

    #[test]
    fn test_zero_iqr_gets_unit_scale() {
        let values = array![[1.0], [1.0], [1.0]];
        let matrix = FeatureMatrix::new(schema(&["owner_First"]), values).unwrap();
        let scaler = RobustScaler::fit(&matrix).unwrap();
        assert_eq!(scaler.scale(), &[1.0]);
    }

    #[test]
    fn test_transform() {
        let training = training();
        let scaler = RobustScaler::fit(&training).unwrap();
        let scaled = scaler.transform(&training).unwrap();
        assert_eq!(scaled.values()[[2, 0]], 0.0);
        assert_eq!(scaled.values()[[4, 1]], 1.0);
        assert_eq!(scaled.values()[[0, 2]], 1.0);
        // The fitted scaler is unchanged
        assert_eq!(scaler, RobustScaler::fit(&training).unwrap());
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let scaler = RobustScaler::fit(&training()).unwrap();
        let swapped = FeatureMatrix::new(
            schema(&["Kilometer", "Tahun", "Merek_Toyota"]),
            array![[10_000.0, 2015.0, 1.0]],
        )
        .unwrap();
        assert!(matches!(
            scaler.transform(&swapped),
            Err(InferenceError::SchemaMismatch { component: "scaler", .. })
        ));

        let narrow = FeatureMatrix::new(schema(&["Tahun"]), array![[2015.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&narrow),
            Err(InferenceError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            scaler.transform_values(array![[1.0, 2.0]].view()),
            Err(InferenceError::InvalidInputShape { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_transform_row() {
        let scaler = RobustScaler::fit(&training()).unwrap();
        let mut row = FeatureRow::zeros(Arc::clone(training().schema()));
        row.set("Tahun", 2023.0);
        row.set("Kilometer", 30_000.0);
        let scaled = scaler.transform_row(&row).unwrap();
        assert_eq!(scaled.nrows(), 1);
        assert_eq!(scaled.values()[[0, 0]], 1.0);
        assert_eq!(scaled.values()[[0, 1]], 0.0);
    }

    #[test]
    fn test_invalid_parameters_rejected_on_deserialize() {
        let json = r#"{"columns":["a"],"center":[0.0],"scale":[0.0]}"#;
        assert!(serde_json::from_str::<RobustScaler>(json).is_err());

        let json = r#"{"columns":["a","b"],"center":[0.0],"scale":[1.0]}"#;
        assert!(serde_json::from_str::<RobustScaler>(json).is_err());

        let json = r#"{"columns":["a"],"center":[3.0],"scale":[2.0]}"#;
        assert!(serde_json::from_str::<RobustScaler>(json).is_ok());
    }
}
