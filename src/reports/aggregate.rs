//! Bucketed aggregation of time-stamped records.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DateRange, ReportError, ReportResult};

/// A record with a single timestamp used for bucketing.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// A per-bucket value. Counts serialize as integers, sums as floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Amount(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Count(n) => n as f64,
            MetricValue::Amount(v) => v,
        }
    }
}

impl From<MetricValue> for serde_json::Value {
    fn from(value: MetricValue) -> Self {
        match value {
            MetricValue::Count(n) => n.into(),
            MetricValue::Amount(v) => v.into(),
        }
    }
}

/// How a metric turns the records of one bucket into a value.
pub enum Reducer<R> {
    /// Number of records in the bucket.
    Count,
    /// Number of records matching the predicate.
    CountWhere(fn(&R) -> bool),
    /// Sum of a numeric field; `None` contributes nothing.
    Sum(fn(&R) -> Option<f64>),
}

impl<R> Reducer<R> {
    fn reduce<'a>(&self, records: impl Iterator<Item = &'a R>) -> MetricValue
    where
        R: 'a,
    {
        match self {
            Reducer::Count => MetricValue::Count(records.count() as u64),
            Reducer::CountWhere(predicate) => {
                MetricValue::Count(records.filter(|r| predicate(*r)).count() as u64)
            }
            Reducer::Sum(field) => {
                MetricValue::Amount(records.filter_map(|r| field(r)).sum::<f64>())
            }
        }
    }
}

/// One named series computed for every bucket of a report.
pub struct Metric<R> {
    /// Key of the column in table rows (e.g. `revenue`).
    pub key: &'static str,
    /// Dataset label shown in charts.
    pub label: &'static str,
    /// Table column header.
    pub header: &'static str,
    /// Whether the series is emitted as a chart dataset or only in the table.
    pub charted: bool,
    pub reducer: Reducer<R>,
}

impl<R> Metric<R> {
    pub fn charted(
        key: &'static str,
        label: &'static str,
        header: &'static str,
        reducer: Reducer<R>,
    ) -> Self {
        Self {
            key,
            label,
            header,
            charted: true,
            reducer,
        }
    }

    pub fn table_only(key: &'static str, header: &'static str, reducer: Reducer<R>) -> Self {
        Self {
            key,
            label: header,
            header,
            charted: false,
            reducer,
        }
    }
}

/// Output of one metric: a value per bucket, aligned with the range list.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: &'static str,
    pub label: &'static str,
    pub header: &'static str,
    pub charted: bool,
    pub data: Vec<MetricValue>,
}

/// Reduce `records` into one series per metric over `ranges`.
///
/// A record is counted in a bucket when its timestamp falls within the bucket
/// bounds, inclusive on both ends. Records outside every bucket are ignored.
pub fn aggregate<R: Timestamped>(
    records: &[R],
    ranges: &[DateRange],
    metrics: &[Metric<R>],
) -> ReportResult<Vec<Series>> {
    validate_metrics(metrics)?;

    let mut series: Vec<Series> = metrics
        .iter()
        .map(|m| Series {
            key: m.key,
            label: m.label,
            header: m.header,
            charted: m.charted,
            data: Vec::with_capacity(ranges.len()),
        })
        .collect();

    for range in ranges {
        let in_range: Vec<&R> = records
            .iter()
            .filter(|r| range.contains(r.timestamp()))
            .collect();

        for (metric, out) in metrics.iter().zip(series.iter_mut()) {
            out.data.push(metric.reducer.reduce(in_range.iter().copied()));
        }
    }

    Ok(series)
}

fn validate_metrics<R>(metrics: &[Metric<R>]) -> ReportResult<()> {
    if metrics.is_empty() {
        return Err(ReportError::InvalidMetrics(
            "at least one metric is required".into(),
        ));
    }

    let mut keys = HashSet::new();
    for metric in metrics {
        if metric.key == "period" {
            return Err(ReportError::InvalidMetrics(
                "'period' is reserved for the bucket label column".into(),
            ));
        }
        if !keys.insert(metric.key) {
            return Err(ReportError::InvalidMetrics(format!(
                "duplicate metric key '{}'",
                metric.key
            )));
        }
    }

    Ok(())
}

/// Sum of `field` over all records, treating `None` as zero.
pub fn total<R>(records: &[R], field: impl Fn(&R) -> Option<f64>) -> f64 {
    records.iter().filter_map(field).sum()
}

/// `numerator / denominator`, or 0 when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
