//! Nominal Depreciation Breakdown
//!
//! Display-only comparison of a user-supplied original purchase price with
//! the predicted resale price. Unrelated to the inflation-adjusted training
//! features.

use crate::InferenceError;
use serde::{Deserialize, Serialize};

/// How the breakdown should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepreciationNote {
    /// Brand-new car that already lost value
    FirstYearLoss,
    /// Brand-new car predicted at or above its purchase price
    NoLossForNewCar,
    /// Used car predicted at or above its purchase price
    PredictedAtOrAboveOriginal,
    /// Regular depreciation over the car's age
    OverYears,
}

/// Nominal depreciation between purchase and predicted price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalDepreciation {
    pub original_price: f64,
    pub predicted_price: f64,
    pub car_age: u32,
    /// Original minus predicted; negative when the car gained value
    pub total: f64,
    pub total_percent: f64,
    pub average_per_year: f64,
    pub average_percent_per_year: f64,
    pub note: DepreciationNote,
    pub message: String,
}

impl NominalDepreciation {
    /// Compute the breakdown; `original_price` must be positive
    pub fn compute(
        original_price: f64,
        predicted_price: f64,
        car_age: u32,
    ) -> Result<Self, InferenceError> {
        if !original_price.is_finite() || original_price <= 0.0 {
            return Err(InferenceError::InvalidInput {
                field: "original_price",
                reason: format!("{} is not a positive amount", original_price),
            });
        }

        let (total, average_per_year, note, message) = if car_age == 0 {
            // A new car cannot show a negative loss
            let total = (original_price - predicted_price).max(0.0);
            if total > 0.0 {
                (
                    total,
                    total,
                    DepreciationNote::FirstYearLoss,
                    "Initial first-year depreciation.".to_string(),
                )
            } else {
                (
                    total,
                    total,
                    DepreciationNote::NoLossForNewCar,
                    "Predicted price is at or above the purchase price (new car).".to_string(),
                )
            }
        } else {
            let total = original_price - predicted_price;
            let years = f64::from(car_age);
            if predicted_price >= original_price {
                (
                    total,
                    total / years,
                    DepreciationNote::PredictedAtOrAboveOriginal,
                    format!(
                        "Predicted price ({:.0}) is at or above the purchase price ({:.0}).",
                        predicted_price, original_price
                    ),
                )
            } else {
                (
                    total,
                    total / years,
                    DepreciationNote::OverYears,
                    format!("Nominal depreciation over {} years.", car_age),
                )
            }
        };

        let total_percent = 100.0 * total / original_price;
        let average_percent_per_year = if car_age == 0 {
            total_percent
        } else {
            total_percent / f64::from(car_age)
        };

        Ok(Self {
            original_price,
            predicted_price,
            car_age,
            total,
            total_percent,
            average_per_year,
            average_percent_per_year,
            note,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_depreciation() {
        let d = NominalDepreciation::compute(250_000_000.0, 150_000_000.0, 5).unwrap();
        assert_eq!(d.total, 100_000_000.0);
        assert_eq!(d.average_per_year, 20_000_000.0);
        assert!((d.total_percent - 40.0).abs() < 1e-12);
        assert!((d.average_percent_per_year - 8.0).abs() < 1e-12);
        assert_eq!(d.note, DepreciationNote::OverYears);
        assert!(d.message.contains("5 years"));
    }

    #[test]
    fn test_new_car() {
        let d = NominalDepreciation::compute(300_000_000.0, 270_000_000.0, 0).unwrap();
        assert_eq!(d.total, 30_000_000.0);
        assert_eq!(d.average_per_year, 30_000_000.0);
        assert!((d.total_percent - 10.0).abs() < 1e-12);
        assert_eq!(d.average_percent_per_year, d.total_percent);
        assert_eq!(d.note, DepreciationNote::FirstYearLoss);

        let d = NominalDepreciation::compute(300_000_000.0, 310_000_000.0, 0).unwrap();
        assert_eq!(d.total, 0.0);
        assert_eq!(d.note, DepreciationNote::NoLossForNewCar);
    }

    #[test]
    fn test_appreciation_is_negative() {
        let d = NominalDepreciation::compute(100_000_000.0, 120_000_000.0, 4).unwrap();
        assert_eq!(d.total, -20_000_000.0);
        assert_eq!(d.average_per_year, -5_000_000.0);
        assert_eq!(d.note, DepreciationNote::PredictedAtOrAboveOriginal);
    }

    #[test]
    fn test_original_price_must_be_positive() {
        assert!(matches!(
            NominalDepreciation::compute(0.0, 1.0, 3),
            Err(InferenceError::InvalidInput { field: "original_price", .. })
        ));
    }
}
