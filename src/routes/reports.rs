use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
#[cfg(feature = "csv-export")]
use super::csv_export::{CsvResponse, report_to_csv};
use crate::{
    AppState,
    reports::ReportData,
    services::{ReportKind, ReportRequest},
};

/// Query parameters accepted by every report endpoint.
///
/// Distribution reports ignore the window parameters.
#[derive(Debug, Default, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::IntoParams))]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// `daily`, `weekly`, `monthly` or `yearly`; any other value is a single total bucket
    #[cfg_attr(feature = "utoipa", param(example = "monthly"))]
    pub time_frame: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339 timestamp
    #[cfg_attr(feature = "utoipa", param(example = "2024-01-01"))]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD` (inclusive through the end of that day) or RFC 3339 timestamp
    #[cfg_attr(feature = "utoipa", param(example = "2024-03-31"))]
    pub end_date: Option<String>,
    /// `json` (default) or `csv`
    pub format: Option<String>,
}

impl ReportQuery {
    fn request(&self) -> ReportRequest {
        ReportRequest {
            time_frame: self.time_frame.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

/// Success envelope.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ReportResponse {
    /// Always `true`
    pub success: bool,
    pub data: ReportData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    fn parse(format: Option<&str>) -> Result<Self, ApiError> {
        match format.map(str::trim) {
            None | Some("") | Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            Some(other) => Err(ApiError::BadRequest(format!(
                "Unsupported format '{other}'; use json or csv"
            ))),
        }
    }
}

/// Report query string; extraction failures map to `ApiError::BadRequest`.
type ReportQueryParam = Result<Query<ReportQuery>, QueryRejection>;

async fn render(
    state: &AppState,
    kind: ReportKind,
    query: ReportQueryParam,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let format = ExportFormat::parse(query.format.as_deref())?;
    let data = state.services.reports.report(kind, &query.request()).await?;

    match format {
        ExportFormat::Json => Ok(Json(ReportResponse {
            success: true,
            data,
        })
        .into_response()),
        ExportFormat::Csv => csv_response(kind, &data),
    }
}

#[cfg(feature = "csv-export")]
fn csv_response(kind: ReportKind, data: &ReportData) -> Result<Response, ApiError> {
    let csv = report_to_csv(data).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(CsvResponse {
        data: csv,
        filename: format!("{kind}-report.csv"),
    }
    .into_response())
}

#[cfg(not(feature = "csv-export"))]
fn csv_response(_kind: ReportKind, _data: &ReportData) -> Result<Response, ApiError> {
    Err(ApiError::BadRequest(
        "CSV export is not enabled in this build".to_string(),
    ))
}

/// Revenue and commission from completed payments.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/reports/revenue",
    tag = "reports",
    operation_id = "report_revenue",
    params(ReportQuery),
    responses(
        (status = 200, description = "Revenue report", body = ReportResponse),
        (status = 400, description = "Missing or invalid parameters", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Record source failure", body = crate::openapi::ErrorResponse),
    )
))]
#[tracing::instrument(name = "reports.revenue", skip(state))]
pub async fn revenue_report(
    State(state): State<AppState>,
    query: ReportQueryParam,
) -> Result<Response, ApiError> {
    render(&state, ReportKind::Revenue, query).await
}

/// Total, completed and cancelled bookings.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/reports/bookings",
    tag = "reports",
    operation_id = "report_bookings",
    params(ReportQuery),
    responses(
        (status = 200, description = "Bookings report", body = ReportResponse),
        (status = 400, description = "Missing or invalid parameters", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Record source failure", body = crate::openapi::ErrorResponse),
    )
))]
#[tracing::instrument(name = "reports.bookings", skip(state))]
pub async fn bookings_report(
    State(state): State<AppState>,
    query: ReportQueryParam,
) -> Result<Response, ApiError> {
    render(&state, ReportKind::Bookings, query).await
}

/// New user registrations.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/reports/users",
    tag = "reports",
    operation_id = "report_users",
    params(ReportQuery),
    responses(
        (status = 200, description = "User growth report", body = ReportResponse),
        (status = 400, description = "Missing or invalid parameters", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Record source failure", body = crate::openapi::ErrorResponse),
    )
))]
#[tracing::instrument(name = "reports.users", skip(state))]
pub async fn users_report(
    State(state): State<AppState>,
    query: ReportQueryParam,
) -> Result<Response, ApiError> {
    render(&state, ReportKind::Users, query).await
}

/// New provider sign-ups.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/reports/providers",
    tag = "reports",
    operation_id = "report_providers",
    params(ReportQuery),
    responses(
        (status = 200, description = "Provider growth report", body = ReportResponse),
        (status = 400, description = "Missing or invalid parameters", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Record source failure", body = crate::openapi::ErrorResponse),
    )
))]
#[tracing::instrument(name = "reports.providers", skip(state))]
pub async fn providers_report(
    State(state): State<AppState>,
    query: ReportQueryParam,
) -> Result<Response, ApiError> {
    render(&state, ReportKind::Providers, query).await
}

/// Listing count per category.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/reports/categories",
    tag = "reports",
    operation_id = "report_categories",
    params(ReportQuery),
    responses(
        (status = 200, description = "Category distribution", body = ReportResponse),
        (status = 500, description = "Record source failure", body = crate::openapi::ErrorResponse),
    )
))]
#[tracing::instrument(name = "reports.categories", skip(state))]
pub async fn categories_report(
    State(state): State<AppState>,
    query: ReportQueryParam,
) -> Result<Response, ApiError> {
    render(&state, ReportKind::Categories, query).await
}

/// Listings grouped by category name.
#[cfg_attr(feature = "utoipa", utoipa::path(
    get,
    path = "/api/reports/services",
    tag = "reports",
    operation_id = "report_services",
    params(ReportQuery),
    responses(
        (status = 200, description = "Service distribution", body = ReportResponse),
        (status = 500, description = "Record source failure", body = crate::openapi::ErrorResponse),
    )
))]
#[tracing::instrument(name = "reports.services", skip(state))]
pub async fn services_report(
    State(state): State<AppState>,
    query: ReportQueryParam,
) -> Result<Response, ApiError> {
    render(&state, ReportKind::Services, query).await
}
