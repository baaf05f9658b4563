//! HTTP surface tests against an in-memory bundle.

use api::{create_router, AppState, ServerConfig};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use feature_engine::{FeatureSchema, ReconstructorConfig};
use inference_engine::{log_price, ModelBundle, PricePredictor, RobustScaler, TreeEnsemble, TreeNode};
use listing_data::{RawListing, ReferenceCatalog};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const CURRENT_YEAR: i32 = 2025;

fn columns() -> Vec<String> {
    [
        "Tahun",
        "Kilometer",
        "UsiaMobil",
        "Merek_Toyota",
        "Model_Detail_avanza_g_13_at",
        "Lokasi_Jakarta",
        "owner_Second",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

/// Low-mileage cars sell for 150M, the rest for 100M
fn bundle() -> ModelBundle {
    let columns = columns();
    let n = columns.len();
    let scaler = RobustScaler::new(columns.clone(), vec![0.0; n], vec![1.0; n]).unwrap();
    let regressor = TreeEnsemble::new(
        n,
        0.0,
        vec![vec![
            TreeNode::Split {
                feature: 1,
                threshold: 50_000.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf {
                value: log_price(150_000_000.0),
            },
            TreeNode::Leaf {
                value: log_price(100_000_000.0),
            },
        ]],
    )
    .unwrap();
    ModelBundle::new(regressor, scaler, FeatureSchema::new(columns).unwrap()).unwrap()
}

fn raw(brand: &str, model: &str, location: &str) -> RawListing {
    RawListing {
        brand: Some(brand.to_string()),
        model_detail: Some(model.to_string()),
        location: Some(location.to_string()),
        ..RawListing::default()
    }
}

fn app() -> Router {
    let config = ServerConfig {
        current_year: Some(CURRENT_YEAR),
        ..ServerConfig::default()
    };
    let predictor =
        PricePredictor::from_bundle(&bundle(), ReconstructorConfig::for_year(CURRENT_YEAR));
    let catalog = ReferenceCatalog::from_rows(&[
        raw("Toyota", "Avanza G 1.3 AT", "Jakarta"),
        raw("Toyota", "Rush S", "Bandung"),
        raw("Honda", "Jazz RS", "Surabaya"),
    ]);
    create_router(Arc::new(AppState::new(predictor, catalog, config)))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post_predict(body: Value) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["feature_count"], 7);
    assert_eq!(body["current_year"], CURRENT_YEAR);
    assert_eq!(body["fallback_catalog"], false);
}

#[tokio::test]
async fn test_options() {
    let (status, body) = get("/api/v1/options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brands"], json!(["Honda", "Toyota"]));
    assert_eq!(body["locations"], json!(["Bandung", "Jakarta", "Surabaya"]));
    assert_eq!(body["owners"].as_array().unwrap().len(), 4);
    assert_eq!(body["min_year"], CURRENT_YEAR - 40);
    assert_eq!(body["max_year"], CURRENT_YEAR);
}

#[tokio::test]
async fn test_models_for_brand() {
    let (status, body) = get("/api/v1/options/models?brand=Toyota").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"], json!(["Avanza G 1.3 AT", "Rush S"]));

    let (status, body) = get("/api/v1/options/models?brand=Tesla").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"], json!([]));
}

#[tokio::test]
async fn test_predict() {
    let (status, body) = post_predict(json!({
        "year": 2018,
        "mileage": 30000,
        "brand": "Toyota",
        "model_detail": "Avanza G 1.3 AT",
        "location": "Jakarta",
        "owner": "First"
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    let price = body["predicted_price"].as_f64().unwrap();
    assert!((price - 150_000_000.0).abs() < 1.0);
    assert_eq!(body["car_age"], 7);
    assert_eq!(
        body["active_features"],
        json!([
            "Tahun",
            "Kilometer",
            "UsiaMobil",
            "Merek_Toyota",
            "Model_Detail_avanza_g_13_at",
            "Lokasi_Jakarta"
        ])
    );
    assert!(body["depreciation"].is_null());
}

#[tokio::test]
async fn test_predict_unknown_categories() {
    let (status, body) = post_predict(json!({
        "year": 2020,
        "mileage": 80000,
        "brand": "Wuling",
        "model_detail": "Almaz",
        "location": "Medan"
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    let price = body["predicted_price"].as_f64().unwrap();
    assert!((price - 100_000_000.0).abs() < 1.0);
    assert_eq!(
        body["active_features"],
        json!(["Tahun", "Kilometer", "UsiaMobil"])
    );
}

#[tokio::test]
async fn test_predict_with_depreciation() {
    let (status, body) = post_predict(json!({
        "year": 2018,
        "mileage": 30000,
        "brand": "Toyota",
        "model_detail": "Avanza G 1.3 AT",
        "location": "Jakarta",
        "original_price": 250000000.0
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    let depreciation = &body["depreciation"];
    let total = depreciation["total"].as_f64().unwrap();
    assert!((total - 100_000_000.0).abs() < 1.0);
    assert_eq!(depreciation["note"], "over_years");
}

#[tokio::test]
async fn test_placeholder_brand_rejected() {
    let (status, body) = post_predict(json!({
        "year": 2018,
        "brand": "Pilih Merek",
        "model_detail": "Avanza G 1.3 AT",
        "location": "Jakarta"
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn test_missing_year_is_json_validation_error() {
    let (status, body) = post_predict(json!({
        "brand": "Toyota",
        "model_detail": "Avanza G 1.3 AT",
        "location": "Jakarta"
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().unwrap().contains("year"));
}

#[tokio::test]
async fn test_malformed_body_is_json_validation_error() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/predict")
                .header("content-type", "application/json")
                .body(Body::from("{\"year\": \"twenty\""))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read(response).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn test_future_year_rejected() {
    let (status, body) = post_predict(json!({
        "year": CURRENT_YEAR + 1,
        "brand": "Toyota",
        "model_detail": "Avanza G 1.3 AT",
        "location": "Jakarta"
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn test_too_old_year_rejected() {
    let (status, _) = post_predict(json!({
        "year": CURRENT_YEAR - 41,
        "brand": "Toyota",
        "model_detail": "Avanza G 1.3 AT",
        "location": "Jakarta"
    }))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
