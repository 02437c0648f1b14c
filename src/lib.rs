//! Reporting backend for a services marketplace.
//!
//! Turns a report window and time frame into labeled buckets, reduces
//! payments, bookings, users and providers into per-bucket series, and serves
//! the result as chart-ready JSON or CSV.

pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod openapi;
pub mod reports;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    config::{AppConfig, ConfigError},
    db::{DbError, MemoryStore, ReportRepo},
    services::Services,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Services,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl AppState {
    /// Build state over an existing record source.
    pub fn new(config: AppConfig, repo: Arc<dyn ReportRepo>) -> Result<Self, ConfigError> {
        let generator = config.reports.generator()?;
        Ok(Self {
            config: Arc::new(config),
            services: Services::new(repo, generator),
        })
    }

    /// Build state from configuration, loading the dataset if one is configured.
    pub async fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let store = match &config.storage.dataset {
            Some(path) => MemoryStore::load(path).await?,
            None => {
                tracing::warn!("No storage.dataset configured, serving an empty record set");
                MemoryStore::empty()
            }
        };

        Ok(Self::new(config, Arc::new(store))?)
    }
}

pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .nest("/api/reports", routes::report_routes());

    #[cfg(feature = "utoipa")]
    {
        app = app.route("/openapi.json", get(openapi_json));
    }

    if let Some(cors) = config.server.cors.clone().into_layer() {
        app = app.layer(cors);
    }

    let timeout =
        TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.server.timeout());

    app.layer(timeout)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

/// Returns the OpenAPI document as JSON
#[cfg(feature = "utoipa")]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;

    axum::Json(openapi::ApiDoc::openapi())
}
