//! Picker Option Routes

use axum::extract::{Query, State};
use axum::Json;
use listing_data::OWNER_BRACKETS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Options for the query form
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub brands: Vec<String>,
    pub locations: Vec<String>,
    pub owners: Vec<String>,
    pub min_year: i32,
    pub max_year: i32,
}

/// Query parameters for the models endpoint
#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    pub brand: String,
}

/// Model details known for a brand
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub brand: String,
    /// Empty when the brand is unknown; the form then takes free text
    pub models: Vec<String>,
}

/// Brands, locations, owner brackets and the accepted year range
pub async fn get_options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        brands: state.catalog.brands(),
        locations: state.catalog.locations(),
        owners: OWNER_BRACKETS.iter().map(|s| s.to_string()).collect(),
        min_year: state.min_year(),
        max_year: state.predictor.current_year(),
    })
}

/// Model details for one brand
pub async fn get_models(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ModelsQuery>,
) -> Json<ModelsResponse> {
    let brand = params.brand.trim().to_string();
    let models = state.catalog.models_for(&brand);
    Json(ModelsResponse { brand, models })
}
