//! Price Prediction Orchestration

use crate::bundle::ModelBundle;
use crate::regressor::Regressor;
use crate::scaler::{check_columns, FeatureScaler};
use crate::target::price_from_log;
use crate::InferenceError;
use feature_engine::{
    FeatureMatrix, FeatureReconstructor, FeatureSchema, ReconstructorConfig, VehicleQuery,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Result of one prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Predicted resale price
    pub price: f64,
    /// Raw regressor output (log1p of the price)
    pub log_price: f64,
    /// Car age used for the prediction
    pub car_age: u32,
    /// One-hot and numeric columns that were non-zero before scaling
    pub active_features: Vec<String>,
    /// Time spent reconstructing, scaling and predicting
    pub latency_us: u64,
}

/// Serving-side predictor over immutable, shared model components
pub struct PricePredictor {
    reconstructor: FeatureReconstructor,
    scaler: Arc<dyn FeatureScaler>,
    regressor: Arc<dyn Regressor>,
}

impl PricePredictor {
    /// Predictor over a loaded bundle
    pub fn from_bundle(bundle: &ModelBundle, config: ReconstructorConfig) -> Self {
        info!(
            "Creating price predictor over {} features (current year {})",
            bundle.schema().len(),
            config.current_year
        );
        Self {
            reconstructor: FeatureReconstructor::new(Arc::clone(bundle.schema()), config),
            scaler: bundle.scaler().clone(),
            regressor: bundle.regressor().clone(),
        }
    }

    /// Predictor over arbitrary components; they must agree with the schema
    pub fn with_components(
        schema: Arc<FeatureSchema>,
        scaler: Arc<dyn FeatureScaler>,
        regressor: Arc<dyn Regressor>,
        config: ReconstructorConfig,
    ) -> Result<Self, InferenceError> {
        check_columns(scaler.columns(), schema.columns())?;
        if regressor.n_features() != schema.len() {
            return Err(InferenceError::SchemaMismatch {
                component: "regressor",
                detail: format!(
                    "expects {} features, schema has {}",
                    regressor.n_features(),
                    schema.len()
                ),
            });
        }
        Ok(Self {
            reconstructor: FeatureReconstructor::new(schema, config),
            scaler,
            regressor,
        })
    }

    /// Feature schema the model was trained on
    pub fn schema(&self) -> &Arc<FeatureSchema> {
        self.reconstructor.schema()
    }

    /// Reference year for car age
    pub fn current_year(&self) -> i32 {
        self.reconstructor.config().current_year
    }

    /// Predict the resale price for one query
    pub fn predict(&self, query: &VehicleQuery) -> Result<PriceEstimate, InferenceError> {
        let start = Instant::now();

        let row = self.reconstructor.reconstruct(query)?;
        let row = row.project(self.schema());
        let car_age = self.reconstructor.car_age(query.year)?;
        let active_features = row
            .active_columns()
            .into_iter()
            .map(str::to_string)
            .collect();

        let scaled = self.scaler.transform_row(&row)?;
        let log_price = self
            .regressor
            .predict(scaled.values().view())?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InvalidModel("regressor returned no prediction".to_string()))?;

        let price = Self::to_price(log_price)?;
        let latency_us = start.elapsed().as_micros() as u64;
        debug!("Predicted {:.0} (log {:.4}) in {}us", price, log_price, latency_us);

        Ok(PriceEstimate {
            price,
            log_price,
            car_age,
            active_features,
            latency_us,
        })
    }

    /// Predict prices for an encoded (unscaled) matrix
    pub fn predict_matrix(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, InferenceError> {
        let scaled = self.scaler.transform(matrix)?;
        self.regressor
            .predict(scaled.values().view())?
            .into_iter()
            .map(Self::to_price)
            .collect()
    }

    fn to_price(log_price: f64) -> Result<f64, InferenceError> {
        if !log_price.is_finite() {
            return Err(InferenceError::InvalidModel(format!(
                "regressor produced non-finite output {}",
                log_price
            )));
        }
        Ok(price_from_log(log_price).max(0.0))
    }
}
