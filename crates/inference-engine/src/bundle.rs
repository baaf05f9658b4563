//! Trained Model Bundle
//!
//! Regressor, fitted scaler and feature schema travel as one JSON document
//! with exactly the keys `regressor`, `scaler` and `feature_columns`. A
//! bundle that cannot be read, lacks a component or whose components
//! disagree about the columns is rejected as a whole.

use crate::regressor::{Regressor, TreeEnsemble};
use crate::scaler::{FeatureScaler, RobustScaler};
use crate::InferenceError;
use feature_engine::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleFile {
    regressor: Option<TreeEnsemble>,
    scaler: Option<RobustScaler>,
    feature_columns: Option<FeatureSchema>,
}

#[derive(Serialize)]
struct BundleFileRef<'a> {
    regressor: &'a TreeEnsemble,
    scaler: &'a RobustScaler,
    feature_columns: &'a FeatureSchema,
}

/// A validated, mutually consistent model bundle
#[derive(Debug, Clone)]
pub struct ModelBundle {
    regressor: Arc<TreeEnsemble>,
    scaler: Arc<RobustScaler>,
    schema: Arc<FeatureSchema>,
}

impl ModelBundle {
    /// Assemble a bundle; scaler columns must equal the schema and the
    /// regressor must take exactly that many features
    pub fn new(
        regressor: TreeEnsemble,
        scaler: RobustScaler,
        schema: FeatureSchema,
    ) -> Result<Self, InferenceError> {
        if scaler.columns() != schema.columns() {
            return Err(InferenceError::SchemaMismatch {
                component: "scaler",
                detail: format!(
                    "fit on {} columns that differ from the {} feature columns",
                    scaler.columns().len(),
                    schema.len()
                ),
            });
        }
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
            regressor: Arc::new(regressor),
            scaler: Arc::new(scaler),
            schema: Arc::new(schema),
        })
    }

    /// Parse a bundle document
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let file: BundleFile = serde_json::from_str(json)
            .map_err(|e| InferenceError::ArtifactLoad(e.to_string()))?;

        let regressor = file
            .regressor
            .ok_or(InferenceError::MissingComponent("regressor"))?;
        let scaler = file.scaler.ok_or(InferenceError::MissingComponent("scaler"))?;
        let schema = file
            .feature_columns
            .ok_or(InferenceError::MissingComponent("feature_columns"))?;

        Self::new(regressor, scaler, schema)
    }

    /// Load and validate a bundle file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ArtifactLoad(format!("{}: {}", path.display(), e)))?;
        let bundle = Self::from_json(&json)?;
        info!(
            "Loaded model bundle from {}: {} features, {} trees",
            path.display(),
            bundle.schema.len(),
            bundle.regressor.n_trees()
        );
        Ok(bundle)
    }

    /// Serialize to the bundle document
    pub fn to_json(&self) -> Result<String, InferenceError> {
        let file = BundleFileRef {
            regressor: self.regressor.as_ref(),
            scaler: self.scaler.as_ref(),
            feature_columns: self.schema.as_ref(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the bundle document
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), InferenceError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        info!("Saved model bundle to {}", path.as_ref().display());
        Ok(())
    }

    pub fn regressor(&self) -> &Arc<TreeEnsemble> {
        &self.regressor
    }

    pub fn scaler(&self) -> &Arc<RobustScaler> {
        &self.scaler
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }
}
