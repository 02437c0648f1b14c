use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{
    db::{DbError, ReportRepo},
    reports::{
        BookingsReport, DateRangeGenerator, ProvidersReport, ReportData, ReportError,
        ReportParams, ReportWindow, RevenueReport, TimeFrame, UsersReport, build_bucketed_report,
        category_distribution, service_distribution,
    },
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The six reports the service can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ReportKind {
    Revenue,
    Bookings,
    Users,
    Providers,
    Categories,
    Services,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Revenue => "revenue",
            ReportKind::Bookings => "bookings",
            ReportKind::Users => "users",
            ReportKind::Providers => "providers",
            ReportKind::Categories => "categories",
            ReportKind::Services => "services",
        }
    }

    /// Whether the report is a time series that needs a window and time frame.
    pub fn is_bucketed(&self) -> bool {
        !matches!(self, ReportKind::Categories | ReportKind::Services)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, unvalidated report parameters as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub time_frame: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Service layer that fetches records and runs the report engine over them.
#[derive(Clone)]
pub struct ReportService {
    repo: Arc<dyn ReportRepo>,
    generator: DateRangeGenerator,
}

impl ReportService {
    pub fn new(repo: Arc<dyn ReportRepo>, generator: DateRangeGenerator) -> Self {
        Self { repo, generator }
    }

    pub fn generator(&self) -> &DateRangeGenerator {
        &self.generator
    }

    /// Validate raw parameters into a window in the configured offset.
    ///
    /// Empty strings count as missing.
    pub fn params(&self, request: &ReportRequest) -> Result<ReportParams, ReportError> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.trim().is_empty())
        }

        let (Some(time_frame), Some(start_date), Some(end_date)) = (
            present(&request.time_frame),
            present(&request.start_date),
            present(&request.end_date),
        ) else {
            return Err(ReportError::MissingParams);
        };

        let window = ReportWindow::parse(start_date, end_date, self.generator.offset())?;

        Ok(ReportParams {
            time_frame: TimeFrame::parse(time_frame),
            window,
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        })
    }

    /// Build any report. Parameters are ignored for distribution reports.
    #[tracing::instrument(name = "reports.service", skip(self, request), fields(report = %kind))]
    pub async fn report(&self, kind: ReportKind, request: &ReportRequest) -> ServiceResult<ReportData> {
        match kind {
            ReportKind::Revenue => self.revenue(&self.params(request)?).await,
            ReportKind::Bookings => self.bookings(&self.params(request)?).await,
            ReportKind::Users => self.users(&self.params(request)?).await,
            ReportKind::Providers => self.providers(&self.params(request)?).await,
            ReportKind::Categories => self.categories().await,
            ReportKind::Services => self.services().await,
        }
    }

    pub async fn revenue(&self, params: &ReportParams) -> ServiceResult<ReportData> {
        let payments = self.repo.completed_payments(&params.window).await?;
        Ok(build_bucketed_report::<RevenueReport>(
            &payments,
            params,
            &self.generator,
        )?)
    }

    pub async fn bookings(&self, params: &ReportParams) -> ServiceResult<ReportData> {
        let bookings = self.repo.bookings(&params.window).await?;
        Ok(build_bucketed_report::<BookingsReport>(
            &bookings,
            params,
            &self.generator,
        )?)
    }

    pub async fn users(&self, params: &ReportParams) -> ServiceResult<ReportData> {
        let users = self.repo.users(&params.window).await?;
        Ok(build_bucketed_report::<UsersReport>(
            &users,
            params,
            &self.generator,
        )?)
    }

    pub async fn providers(&self, params: &ReportParams) -> ServiceResult<ReportData> {
        let providers = self.repo.providers(&params.window).await?;
        Ok(build_bucketed_report::<ProvidersReport>(
            &providers,
            params,
            &self.generator,
        )?)
    }

    pub async fn categories(&self) -> ServiceResult<ReportData> {
        let categories = self.repo.categories().await?;
        let listings = self.repo.listings().await?;
        Ok(category_distribution(&categories, &listings))
    }

    pub async fn services(&self) -> ServiceResult<ReportData> {
        let categories = self.repo.categories().await?;
        let listings = self.repo.listings().await?;
        Ok(service_distribution(&categories, &listings))
    }

    /// Check that the record source is reachable.
    pub async fn ping(&self) -> ServiceResult<()> {
        Ok(self.repo.ping().await?)
    }
}
