//! Server Configuration
//!
//! Loaded from an optional TOML file, then overridden by `CARPRICE__*`
//! environment variables (`CARPRICE__RATE_LIMIT__BURST_SIZE=20`).

use crate::error::ServerError;
use crate::rate_limit::RateLimitConfig;
use chrono::Datelike;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prediction server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_address: String,
    /// Trained model bundle (JSON)
    pub model_path: PathBuf,
    /// Reference listings used for picker options
    pub reference_path: PathBuf,
    /// Oldest car offered by the year picker, in years
    pub max_car_age: u32,
    /// Pin the reference year; defaults to the current UTC year
    pub current_year: Option<i32>,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            model_path: PathBuf::from("models/car_price_bundle.json"),
            reference_path: PathBuf::from("data/data_mobil_fitur_depresiasi_inflasi.csv"),
            max_car_age: 40,
            current_year: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from `path` (if it exists) and the environment
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("CARPRICE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.rate_limit.per_second == 0 || self.rate_limit.burst_size == 0 {
            return Err(ServerError::InvalidConfig(
                "rate limit period and burst size must be positive".to_string(),
            ));
        }
        if i32::try_from(self.max_car_age).is_err() {
            return Err(ServerError::InvalidConfig(format!(
                "max_car_age {} is out of range",
                self.max_car_age
            )));
        }
        Ok(())
    }

    /// Reference year for car age
    pub fn current_year(&self) -> i32 {
        self.current_year
            .unwrap_or_else(|| chrono::Utc::now().year())
    }
}
