//! Price Inference Engine
//!
//! Loads a trained model bundle (regressor, fitted scaler, feature schema),
//! scales reconstructed query rows and turns the regressor's log-price back
//! into a currency amount.

mod bundle;
mod depreciation_report;
mod engine;
mod evaluation;
mod regressor;
mod scaler;
mod target;

pub use bundle::ModelBundle;
pub use depreciation_report::{DepreciationNote, NominalDepreciation};
pub use engine::{PriceEstimate, PricePredictor};
pub use evaluation::{mean_absolute_error, mean_absolute_percentage_error, RegressionReport};
pub use regressor::{Regressor, TreeEnsemble, TreeNode};
pub use scaler::{FeatureScaler, RobustScaler};
pub use target::{log_price, price_from_log};

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during loading, scaling or prediction
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Bundle file missing, unreadable or malformed
    #[error("Model bundle load failed: {0}")]
    ArtifactLoad(String),

    /// Bundle lacks one of its three components
    #[error("Model bundle is missing its {0}")]
    MissingComponent(&'static str),

    /// Columns handed to a component differ from the ones it was fit on
    #[error("Schema mismatch in {component}: {detail}")]
    SchemaMismatch {
        component: &'static str,
        detail: String,
    },

    #[error("Invalid input shape: expected {expected} columns, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },

    /// Regressor or scaler parameters are structurally invalid
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
