//! CSV export of report tables.
//!
//! The header row is the report's `tableHeaders`; each data row takes the
//! values of `tableData` in the same column order.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use csv::Writer;
use serde_json::Value;

use crate::reports::ReportData;

#[derive(Debug, thiserror::Error)]
#[error("CSV export error: {0}")]
pub struct CsvExportError(String);

impl From<csv::Error> for CsvExportError {
    fn from(err: csv::Error) -> Self {
        Self(err.to_string())
    }
}

/// CSV response wrapper that sets download headers
pub struct CsvResponse {
    pub data: Vec<u8>,
    pub filename: String,
}

impl IntoResponse for CsvResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.filename),
                ),
            ],
            self.data,
        )
            .into_response()
    }
}

/// Render a report table as CSV.
pub fn report_to_csv(report: &ReportData) -> Result<Vec<u8>, CsvExportError> {
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record(&report.table_headers)?;
    for row in &report.table_data {
        wtr.write_record(report.table_keys.iter().map(|key| cell(row.get(*key))))?;
    }

    wtr.into_inner()
        .map_err(|e| CsvExportError(e.error().to_string()))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
