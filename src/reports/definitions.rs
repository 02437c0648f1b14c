//! Bucketed report definitions and the generic report builder.
//!
//! Each report is a [`BucketedReport`]: a record type, the metrics reduced per
//! bucket, and a summary calculator. [`build_bucketed_report`] runs the shared
//! pipeline: generate ranges, aggregate, shape chart and table.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    BookingSummary, Dataset, DateRangeGenerator, Metric, ProviderGrowthSummary, Reducer, ReportResult,
    ReportSummary, ReportWindow, RevenueSummary, SummaryContext, TimeFrame, Timestamped,
    UserGrowthSummary, aggregate, datasets_from_series, per_period, percentage,
    safe_ratio, total,
};
use crate::models::{Booking, Payment, ServiceProvider, User};

/// Validated parameters of a bucketed report request.
#[derive(Debug, Clone)]
pub struct ReportParams {
    pub time_frame: TimeFrame,
    pub window: ReportWindow,
    /// Raw `startDate`, echoed in growth summaries
    pub start_date: String,
    /// Raw `endDate`, echoed in growth summaries
    pub end_date: String,
}

/// Chart, summary and table for one report.
///
/// Every dataset's `data` has exactly one value per label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub summary: ReportSummary,
    pub table_headers: Vec<String>,
    #[cfg_attr(feature = "utoipa", schema(value_type = Vec<Object>))]
    pub table_data: Vec<Value>,
    /// Row keys in column order, matching `table_headers`
    #[serde(skip)]
    pub table_keys: Vec<&'static str>,
}

pub trait BucketedReport {
    type Record: Timestamped;

    /// Short name used in logs and export filenames.
    const NAME: &'static str;

    fn metrics() -> Vec<Metric<Self::Record>>;

    fn summarize(records: &[Self::Record], ctx: &SummaryContext<'_>) -> ReportSummary;
}

/// Build a bucketed report from an already-fetched record set.
#[tracing::instrument(
    name = "reports.build",
    skip_all,
    fields(report = K::NAME, time_frame = %params.time_frame, records = records.len())
)]
pub fn build_bucketed_report<K: BucketedReport>(
    records: &[K::Record],
    params: &ReportParams,
    generator: &DateRangeGenerator,
) -> ReportResult<ReportData> {
    let ranges = generator.generate(params.time_frame, &params.window)?;
    let series = aggregate(records, &ranges, &K::metrics())?;

    let labels: Vec<String> = ranges.iter().map(|r| r.label.clone()).collect();
    let datasets = datasets_from_series(&series);

    let mut table_keys = vec!["period"];
    table_keys.extend(series.iter().map(|s| s.key));
    let mut table_headers = vec!["Period".to_string()];
    table_headers.extend(series.iter().map(|s| s.header.to_string()));

    let table_data = ranges
        .iter()
        .enumerate()
        .map(|(i, range)| {
            let mut row = Map::new();
            row.insert("period".into(), Value::String(range.label.clone()));
            for s in &series {
                row.insert(s.key.into(), s.data[i].into());
            }
            Value::Object(row)
        })
        .collect();

    let ctx = SummaryContext {
        ranges: &ranges,
        start_date: &params.start_date,
        end_date: &params.end_date,
    };
    let summary = K::summarize(records, &ctx);

    tracing::debug!(buckets = ranges.len(), datasets = datasets.len(), "Report built");

    Ok(ReportData {
        labels,
        datasets,
        summary,
        table_headers,
        table_data,
        table_keys,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Revenue
// ─────────────────────────────────────────────────────────────────────────────

/// Revenue and commission from completed payments.
pub struct RevenueReport;

impl BucketedReport for RevenueReport {
    type Record = Payment;
    const NAME: &'static str = "revenue";

    fn metrics() -> Vec<Metric<Payment>> {
        vec![
            Metric::charted(
                "revenue",
                "Revenue",
                "Revenue",
                Reducer::Sum(|p: &Payment| Some(p.payment_amount)),
            ),
            Metric::charted(
                "commission",
                "Commission",
                "Commission",
                Reducer::Sum(|p: &Payment| p.commission_amount),
            ),
            Metric::table_only("payments", "Payments", Reducer::Count),
        ]
    }

    fn summarize(records: &[Payment], _ctx: &SummaryContext<'_>) -> ReportSummary {
        let total_revenue = total(records, |p| Some(p.payment_amount));
        let total_commission = total(records, |p| p.commission_amount);
        let total_payments = records.len() as u64;

        ReportSummary::Revenue(RevenueSummary {
            total_revenue,
            total_commission,
            total_payments,
            average_revenue: safe_ratio(total_revenue, total_payments as f64),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bookings
// ─────────────────────────────────────────────────────────────────────────────

/// Booking volume with completed and cancelled breakdown.
pub struct BookingsReport;

impl BucketedReport for BookingsReport {
    type Record = Booking;
    const NAME: &'static str = "bookings";

    fn metrics() -> Vec<Metric<Booking>> {
        vec![
            Metric::charted(
                "totalBookings",
                "Total Bookings",
                "Total Bookings",
                Reducer::Count,
            ),
            Metric::charted(
                "completed",
                "Completed",
                "Completed",
                Reducer::CountWhere(Booking::is_completed),
            ),
            Metric::charted(
                "cancelled",
                "Cancelled",
                "Cancelled",
                Reducer::CountWhere(Booking::is_cancelled),
            ),
        ]
    }

    fn summarize(records: &[Booking], _ctx: &SummaryContext<'_>) -> ReportSummary {
        let total_bookings = records.len() as u64;
        let completed_bookings = records.iter().filter(|b| b.is_completed()).count() as u64;
        let cancelled_bookings = records.iter().filter(|b| b.is_cancelled()).count() as u64;

        ReportSummary::Bookings(BookingSummary {
            total_bookings,
            completed_bookings,
            cancelled_bookings,
            completion_rate: percentage(completed_bookings, total_bookings),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth
// ─────────────────────────────────────────────────────────────────────────────

/// New user registrations.
pub struct UsersReport;

impl BucketedReport for UsersReport {
    type Record = User;
    const NAME: &'static str = "users";

    fn metrics() -> Vec<Metric<User>> {
        vec![Metric::charted(
            "newUsers",
            "New Users",
            "New Users",
            Reducer::Count,
        )]
    }

    fn summarize(records: &[User], ctx: &SummaryContext<'_>) -> ReportSummary {
        let total = records.len() as u64;
        ReportSummary::Users(UserGrowthSummary {
            total_new_users: total,
            average_growth_per_period: per_period(total, ctx.period_count()),
            date_range: ctx.date_range_label(),
        })
    }
}

/// New provider sign-ups.
pub struct ProvidersReport;

impl BucketedReport for ProvidersReport {
    type Record = ServiceProvider;
    const NAME: &'static str = "providers";

    fn metrics() -> Vec<Metric<ServiceProvider>> {
        vec![Metric::charted(
            "newProviders",
            "New Providers",
            "New Providers",
            Reducer::Count,
        )]
    }

    fn summarize(records: &[ServiceProvider], ctx: &SummaryContext<'_>) -> ReportSummary {
        let total = records.len() as u64;
        ReportSummary::Providers(ProviderGrowthSummary {
            total_new_providers: total,
            average_growth_per_period: per_period(total, ctx.period_count()),
            date_range: ctx.date_range_label(),
        })
    }
}
