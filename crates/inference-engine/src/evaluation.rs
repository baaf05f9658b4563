//! Regression Metrics

use crate::InferenceError;
use serde::Serialize;

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<(), InferenceError> {
    if actual.is_empty() {
        return Err(InferenceError::InvalidInput {
            field: "actual",
            reason: "no values to evaluate".to_string(),
        });
    }
    if actual.len() != predicted.len() {
        return Err(InferenceError::InvalidInputShape {
            expected: actual.len(),
            actual: predicted.len(),
        });
    }
    Ok(())
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64, InferenceError> {
    check_lengths(actual, predicted)?;
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(total / actual.len() as f64)
}

/// Mean absolute percentage error, in percent. Near-zero actuals are
/// guarded with machine epsilon.
pub fn mean_absolute_percentage_error(
    actual: &[f64],
    predicted: &[f64],
) -> Result<f64, InferenceError> {
    check_lengths(actual, predicted)?;
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs() / a.abs().max(f64::EPSILON))
        .sum();
    Ok(100.0 * total / actual.len() as f64)
}

/// Evaluation summary
#[derive(Debug, Clone, Serialize)]
pub struct RegressionReport {
    pub samples: usize,
    pub mae: f64,
    pub mape_percent: f64,
}

impl RegressionReport {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self, InferenceError> {
        Ok(Self {
            samples: actual.len(),
            mae: mean_absolute_error(actual, predicted)?,
            mape_percent: mean_absolute_percentage_error(actual, predicted)?,
        })
    }
}
