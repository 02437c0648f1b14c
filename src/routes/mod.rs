#[cfg(feature = "csv-export")]
pub mod csv_export;
mod error;
pub mod health;
pub mod reports;

use axum::{Router, routing::get};
pub use error::{ApiError, SERVER_ERROR_MESSAGE};

use crate::AppState;

/// Report endpoints, mounted under `/api/reports`.
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/revenue", get(reports::revenue_report))
        .route("/bookings", get(reports::bookings_report))
        .route("/users", get(reports::users_report))
        .route("/providers", get(reports::providers_report))
        .route("/categories", get(reports::categories_report))
        .route("/services", get(reports::services_report))
}
