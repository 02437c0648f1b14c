//! Date-range generation for bucketed reports.
//!
//! A report window is split into labeled, non-overlapping buckets whose width
//! depends on the [`TimeFrame`]. Calendar arithmetic happens in an explicit
//! UTC offset so labels and boundaries do not depend on the host timezone.
//!
//! Every bucket end is the next period start minus one millisecond, so
//! timestamps are compared at millisecond precision (see [`DateRange::contains`]).

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Offset,
    SubsecRound, Utc,
};
use serde::Serialize;

use super::{ReportError, ReportResult, TimeFrame};

/// Default upper bound on the number of buckets a single report may produce.
pub const DEFAULT_MAX_BUCKETS: usize = 3660;

/// A labeled, inclusive sub-interval of a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DateRange {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Inclusive on both ends, at millisecond precision.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let ts = ts.trunc_subsecs(3);
        self.start <= ts && ts <= self.end
    }
}

/// The overall `[start, end]` interval a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Parse the raw `startDate`/`endDate` query values.
    ///
    /// Accepts `YYYY-MM-DD` (interpreted in `offset`) or RFC 3339 timestamps.
    /// A date-only end is inclusive through the last millisecond of that day.
    pub fn parse(start: &str, end: &str, offset: FixedOffset) -> ReportResult<Self> {
        let start = parse_bound(start, "startDate", offset, Bound::Start)?;
        let end = parse_bound(end, "endDate", offset, Bound::End)?;

        if end < start {
            return Err(ReportError::ReversedWindow);
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let ts = ts.trunc_subsecs(3);
        self.start <= ts && ts <= self.end
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(
    value: &str,
    param: &'static str,
    offset: FixedOffset,
    bound: Bound,
) -> ReportResult<DateTime<Utc>> {
    let invalid = || ReportError::InvalidDate {
        param,
        value: value.to_string(),
    };
    let trimmed = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid())?;
    let instant = match bound {
        Bound::Start => local_midnight(date, offset),
        Bound::End => date
            .succ_opt()
            .and_then(|next| local_midnight(next, offset))
            .map(last_instant_before),
    };

    instant.ok_or_else(invalid)
}

/// Midnight of `date` in `offset`, as a UTC instant.
fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    date.and_time(NaiveTime::MIN)
        .checked_sub_signed(Duration::seconds(offset.local_minus_utc().into()))
        .map(|naive| naive.and_utc())
}

fn last_instant_before(boundary: DateTime<Utc>) -> DateTime<Utc> {
    boundary - Duration::milliseconds(1)
}

/// Splits report windows into buckets.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeGenerator {
    offset: FixedOffset,
    max_buckets: usize,
}

impl Default for DateRangeGenerator {
    fn default() -> Self {
        Self::new(Utc.fix(), DEFAULT_MAX_BUCKETS)
    }
}

impl DateRangeGenerator {
    pub fn new(offset: FixedOffset, max_buckets: usize) -> Self {
        Self {
            offset,
            max_buckets,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Generate the ordered bucket list for `window`.
    ///
    /// The first bucket starts at `window.start` and the last one ends at
    /// `window.end`; interior boundaries follow the calendar for monthly and
    /// yearly frames and a fixed 7-day stride (from the start day) for weekly.
    /// A reversed window yields an empty list.
    pub fn generate(
        &self,
        time_frame: TimeFrame,
        window: &ReportWindow,
    ) -> ReportResult<Vec<DateRange>> {
        if window.start > window.end {
            return Ok(Vec::new());
        }

        if time_frame == TimeFrame::Total {
            return Ok(vec![DateRange {
                label: "Total".to_string(),
                start: window.start,
                end: window.end,
            }]);
        }

        let first_day = window.start.with_timezone(&self.offset).date_naive();
        let last_day = window.end.with_timezone(&self.offset).date_naive();

        let mut ranges = Vec::new();
        let mut cursor = period_start(time_frame, first_day);
        let mut index = 1usize;

        while cursor <= last_day {
            if ranges.len() >= self.max_buckets {
                return Err(ReportError::TooManyBuckets {
                    limit: self.max_buckets,
                });
            }

            let next = next_period(time_frame, cursor);
            let start = local_midnight(cursor, self.offset)
                .map_or(window.start, |s| s.max(window.start));
            let end = next
                .and_then(|n| local_midnight(n, self.offset))
                .map_or(window.end, |n| last_instant_before(n).min(window.end));

            ranges.push(DateRange {
                label: label_for(time_frame, cursor, index),
                start,
                end,
            });

            match next {
                Some(n) => cursor = n,
                None => break,
            }
            index += 1;
        }

        Ok(ranges)
    }
}

fn period_start(time_frame: TimeFrame, day: NaiveDate) -> NaiveDate {
    match time_frame {
        TimeFrame::Monthly => day.with_day(1).unwrap_or(day),
        TimeFrame::Yearly => NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap_or(day),
        TimeFrame::Daily | TimeFrame::Weekly | TimeFrame::Total => day,
    }
}

fn next_period(time_frame: TimeFrame, cursor: NaiveDate) -> Option<NaiveDate> {
    match time_frame {
        TimeFrame::Daily => cursor.succ_opt(),
        TimeFrame::Weekly => cursor.checked_add_days(Days::new(7)),
        TimeFrame::Monthly => cursor.checked_add_months(Months::new(1)),
        TimeFrame::Yearly => NaiveDate::from_ymd_opt(cursor.year() + 1, 1, 1),
        TimeFrame::Total => None,
    }
}

fn label_for(time_frame: TimeFrame, cursor: NaiveDate, index: usize) -> String {
    match time_frame {
        TimeFrame::Daily => cursor.format("%Y-%m-%d").to_string(),
        TimeFrame::Weekly => format!("Week {index}"),
        TimeFrame::Monthly => cursor.format("%b %Y").to_string(),
        TimeFrame::Yearly => cursor.year().to_string(),
        TimeFrame::Total => "Total".to_string(),
    }
}
