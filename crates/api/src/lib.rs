//! Used-Car Price API Server
//!
//! Serves resale-price predictions from a trained model bundle, plus the
//! picker options the query form needs.

use axum::{
    routing::{get, post},
    Router,
};
use feature_engine::ReconstructorConfig;
use inference_engine::{ModelBundle, PricePredictor};
use listing_data::ReferenceCatalog;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError};
pub use rate_limit::{create_governor_config, RateLimitConfig};

/// Application state shared across handlers; read-only after startup
pub struct AppState {
    pub predictor: PricePredictor,
    pub catalog: ReferenceCatalog,
    pub config: ServerConfig,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(predictor: PricePredictor, catalog: ReferenceCatalog, config: ServerConfig) -> Self {
        Self {
            predictor,
            catalog,
            config,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Oldest manufacture year accepted
    pub fn min_year(&self) -> i32 {
        let max_age = i32::try_from(self.config.max_car_age).unwrap_or(i32::MAX);
        self.predictor.current_year().saturating_sub(max_age)
    }

    /// Load the model bundle and reference catalog named in `config`.
    ///
    /// Fails when the bundle cannot be loaded; a missing reference dataset
    /// only degrades the picker options.
    pub fn load(config: ServerConfig) -> Result<Self, ServerError> {
        let bundle = ModelBundle::load(&config.model_path)?;
        let predictor = PricePredictor::from_bundle(
            &bundle,
            ReconstructorConfig::for_year(config.current_year()),
        );
        let catalog = ReferenceCatalog::load_or_fallback(&config.reference_path);
        Ok(Self::new(predictor, catalog, config))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::get_health))
        .route("/api/v1/options", get(routes::options::get_options))
        .route("/api/v1/options/models", get(routes::options::get_models))
        .route("/api/v1/predict", post(routes::predict::post_predict))
        .route("/metrics", get(routes::metrics::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging; `RUST_LOG` overrides the default `info` filter
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Load everything and serve until the listener fails
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let governor = create_governor_config(&config.rate_limit)?;
    let handle = PrometheusBuilder::new().install_recorder()?;
    let addr = config.bind_address.clone();

    let state = Arc::new(AppState::load(config)?.with_metrics(handle));
    info!(
        "Model ready: {} features, current year {}",
        state.predictor.schema().len(),
        state.predictor.current_year()
    );

    let app = create_router(state).layer(GovernorLayer { config: governor });

    info!("Starting API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
