//! API Error Types

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Startup and configuration failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Model bundle unavailable: {0}")]
    Bundle(#[from] InferenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request-scoped failures, mapped to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unset / placeholder selections, impossible years, bad prices
    #[error("{0}")]
    Validation(String),

    /// Reconstructed row does not line up with the loaded model
    #[error("{0}")]
    SchemaMismatch(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::SchemaMismatch(_) => "schema_mismatch",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::SchemaMismatch(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Feature(
                FeatureError::WidthMismatch { .. } | FeatureError::InvalidSchema(_),
            ) => ApiError::SchemaMismatch(err.to_string()),
            InferenceError::Feature(_) | InferenceError::InvalidInput { .. } => {
                ApiError::Validation(err.to_string())
            }
            InferenceError::SchemaMismatch { .. } | InferenceError::InvalidInputShape { .. } => {
                ApiError::SchemaMismatch(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        warn!("Rejected request ({}): {}", kind, self);
        metrics::counter!("carprice_rejected_requests_total", "kind" => kind).increment(1);

        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
