use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Please provide timeFrame, startDate, and endDate parameters")]
    MissingParams,

    #[error("Invalid {param}: '{value}' is not a YYYY-MM-DD date or RFC 3339 timestamp")]
    InvalidDate { param: &'static str, value: String },

    #[error("endDate must be on or after startDate")]
    ReversedWindow,

    #[error("Requested range produces more than {limit} periods; use a coarser timeFrame")]
    TooManyBuckets { limit: usize },

    /// The metric list handed to the aggregator is unusable.
    #[error("Invalid metric definition: {0}")]
    InvalidMetrics(String),
}

impl ReportError {
    /// Whether the error was caused by the caller's input rather than by this service.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ReportError::InvalidMetrics(_))
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
