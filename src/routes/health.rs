//! Health check endpoints for probes and monitoring.

use axum::{Json, extract::State, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;

use crate::AppState;

/// Health status response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct HealthStatus {
    /// "healthy" or "unhealthy"
    #[cfg_attr(feature = "utoipa", schema(example = "healthy"))]
    pub status: String,
    #[cfg_attr(feature = "utoipa", schema(example = "0.1.0"))]
    pub version: String,
    /// Whether the record source answered
    pub records: bool,
    /// Latency of the record source check in milliseconds
    #[cfg_attr(feature = "utoipa", schema(example = 1))]
    pub latency_ms: u64,
}

/// Health check including the record source.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/health",
    tag = "health",
    operation_id = "health_check",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 503, description = "Record source unavailable", body = HealthStatus),
    )
))]
#[tracing::instrument(name = "health.check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = std::time::Instant::now();
    let result = state.services.reports.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    if let Err(err) = &result {
        tracing::warn!(error = %err, "Record source health check failed");
    }

    let healthy = result.is_ok();
    let health = HealthStatus {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: healthy,
        latency_ms,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health))
}

/// Liveness probe. Succeeds whenever the process is serving.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    operation_id = "health_liveness",
    responses(
        (status = 200, description = "Service is alive"),
    )
))]
#[tracing::instrument(name = "health.liveness")]
pub async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}
