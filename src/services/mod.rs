mod reports;

use std::sync::Arc;

pub use reports::{ReportKind, ReportRequest, ReportService, ServiceError, ServiceResult};

use crate::{db::ReportRepo, reports::DateRangeGenerator};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub reports: ReportService,
}

impl Services {
    pub fn new(repo: Arc<dyn ReportRepo>, generator: DateRangeGenerator) -> Self {
        Self {
            reports: ReportService::new(repo, generator),
        }
    }
}
