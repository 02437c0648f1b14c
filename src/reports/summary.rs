//! Report-wide summary statistics.
//!
//! Summaries are computed once over the whole fetched record set, not per
//! bucket. Rates and averages are zero (never NaN) when their denominator is.

use serde::Serialize;

use super::{DateRange, safe_ratio};

/// Inputs a summary may need besides the records themselves.
#[derive(Debug, Clone, Copy)]
pub struct SummaryContext<'a> {
    pub ranges: &'a [DateRange],
    /// `startDate` exactly as the caller sent it
    pub start_date: &'a str,
    /// `endDate` exactly as the caller sent it
    pub end_date: &'a str,
}

impl SummaryContext<'_> {
    pub fn period_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn date_range_label(&self) -> String {
        format!("{} to {}", self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub total_commission: f64,
    pub total_payments: u64,
    /// Mean payment amount, 0 when there are no payments
    pub average_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub total_bookings: u64,
    pub completed_bookings: u64,
    pub cancelled_bookings: u64,
    /// Completed share of all bookings, e.g. `"62.50%"`
    #[cfg_attr(feature = "utoipa", schema(example = "62.50%"))]
    pub completion_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserGrowthSummary {
    pub total_new_users: u64,
    #[cfg_attr(feature = "utoipa", schema(example = "3.50"))]
    pub average_growth_per_period: String,
    #[cfg_attr(feature = "utoipa", schema(example = "2024-01-01 to 2024-01-31"))]
    pub date_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProviderGrowthSummary {
    pub total_new_providers: u64,
    pub average_growth_per_period: String,
    pub date_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    /// All categories, including those without listings
    pub total_categories: u64,
    pub total_listings: u64,
    pub average_listings_per_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub total_services: u64,
    pub total_categories: u64,
    /// `"None"` when there are no listings
    pub most_popular_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum ReportSummary {
    Revenue(RevenueSummary),
    Bookings(BookingSummary),
    Users(UserGrowthSummary),
    Providers(ProviderGrowthSummary),
    Categories(CategorySummary),
    Services(ServiceSummary),
}

/// Two-decimal string, as shown on the dashboard.
///
/// Halves round away from zero (`0.125` is `"0.13"`), unlike `{:.2}` which
/// rounds exact ties to even.
pub fn fixed2(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

/// `part / whole` as a percentage string with two decimals and a trailing `%`.
pub fn percentage(part: u64, whole: u64) -> String {
    format!("{}%", fixed2(safe_ratio(part as f64, whole as f64) * 100.0))
}

/// Average count per period as a two-decimal string.
pub fn per_period(total: u64, periods: usize) -> String {
    fixed2(safe_ratio(total as f64, periods as f64))
}
