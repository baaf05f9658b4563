//! Prediction Route

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use feature_engine::VehicleQuery;
use inference_engine::NominalDepreciation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Prediction request body
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub year: i32,
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model_detail: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    /// Original purchase price; only used for the depreciation breakdown
    #[serde(default)]
    pub original_price: Option<f64>,
}

/// Prediction response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_price: f64,
    pub car_age: u32,
    pub active_features: Vec<String>,
    pub depreciation: Option<NominalDepreciation>,
}

/// Predict the resale price for one vehicle
pub async fn post_predict(
    State(state): State<Arc<AppState>>,
    request: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = request?;
    let min_year = state.min_year();
    if request.year < min_year {
        return Err(ApiError::Validation(format!(
            "year {} is before the oldest supported year {}",
            request.year, min_year
        )));
    }

    let query = VehicleQuery {
        year: request.year,
        mileage: request.mileage,
        brand: request.brand,
        model_detail: request.model_detail,
        location: request.location,
        owner: request.owner,
    };
    let estimate = state.predictor.predict(&query)?;

    // A zero original price means "not provided"
    let depreciation = match request.original_price {
        Some(original) if original != 0.0 => Some(NominalDepreciation::compute(
            original,
            estimate.price,
            estimate.car_age,
        )?),
        _ => None,
    };

    metrics::counter!("carprice_predictions_total").increment(1);
    metrics::histogram!("carprice_prediction_latency_seconds")
        .record(estimate.latency_us as f64 / 1_000_000.0);
    info!(
        "Predicted {:.0} for {} {} ({})",
        estimate.price,
        query.brand.as_deref().unwrap_or_default(),
        query.model_detail.as_deref().unwrap_or_default(),
        query.year
    );

    Ok(Json(PredictResponse {
        predicted_price: estimate.price,
        car_age: estimate.car_age,
        active_features: estimate.active_features,
        depreciation,
    }))
}
