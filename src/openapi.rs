use serde::{Deserialize, Serialize};
#[cfg(feature = "utoipa")]
use utoipa::OpenApi;

#[cfg(feature = "utoipa")]
use crate::{
    reports,
    routes::{health, reports as report_routes},
};

#[cfg(feature = "utoipa")]
/// OpenAPI documentation for the report service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace Reports API",
        version = "0.1.0",
        description = r#"Admin reporting endpoints for a services marketplace.

Bucketed reports (`revenue`, `bookings`, `users`, `providers`) take `timeFrame`
(`daily`, `weekly`, `monthly`, `yearly`; anything else is a single `Total` bucket),
`startDate` and `endDate` (`YYYY-MM-DD` or RFC 3339). Distribution reports
(`categories`, `services`) take no window.

Every report can be downloaded as CSV with `format=csv`."#
    ),
    tags(
        (name = "reports", description = "Chart-ready reports with summary and table data."),
        (name = "health", description = "Liveness and record-source health checks."),
    ),
    paths(
        report_routes::revenue_report,
        report_routes::bookings_report,
        report_routes::users_report,
        report_routes::providers_report,
        report_routes::categories_report,
        report_routes::services_report,
        health::health_check,
        health::liveness,
    ),
    components(schemas(
        report_routes::ReportResponse,
        reports::ReportData,
        reports::Dataset,
        reports::MetricValue,
        reports::ReportSummary,
        reports::RevenueSummary,
        reports::BookingSummary,
        reports::UserGrowthSummary,
        reports::ProviderGrowthSummary,
        reports::CategorySummary,
        reports::ServiceSummary,
        ErrorResponse,
        health::HealthStatus,
    ))
)]
pub struct ApiDoc;

/// Failure envelope returned by every report endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always `false`
    #[cfg_attr(feature = "utoipa", schema(example = false))]
    pub success: bool,
    #[cfg_attr(
        feature = "utoipa",
        schema(example = "Please provide timeFrame, startDate, and endDate parameters")
    )]
    pub message: String,
    /// Filled in by the request id middleware
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            request_id: None,
        }
    }
}
