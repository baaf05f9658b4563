//! Health Route

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Number of model input columns
    pub feature_count: usize,
    pub current_year: i32,
    /// Whether picker options come from the fixed fallback catalog
    pub fallback_catalog: bool,
}

/// Health check
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        feature_count: state.predictor.schema().len(),
        current_year: state.predictor.current_year(),
        fallback_catalog: state.catalog.is_fallback(),
    })
}
