//! Chart-ready shaping of report series.

use serde::Serialize;

use super::{MetricValue, Series};

/// Dataset colors, assigned by dataset index modulo the palette length:
/// blue, red, green, purple, orange, yellow.
pub const PALETTE: [&str; 6] = [
    "rgba(54, 162, 235, 1)",
    "rgba(255, 99, 132, 1)",
    "rgba(75, 192, 192, 1)",
    "rgba(153, 102, 255, 1)",
    "rgba(255, 159, 64, 1)",
    "rgba(255, 205, 86, 1)",
];

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// One chart series aligned to the report labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<MetricValue>,
    #[cfg_attr(
        feature = "utoipa",
        schema(value_type = String, example = "rgba(54, 162, 235, 1)")
    )]
    pub background_color: &'static str,
    #[cfg_attr(feature = "utoipa", schema(value_type = String))]
    pub border_color: &'static str,
    pub border_width: u32,
}

impl Dataset {
    pub fn new(index: usize, label: impl Into<String>, data: Vec<MetricValue>) -> Self {
        let color = color_for(index);
        Self {
            label: label.into(),
            data,
            background_color: color,
            border_color: color,
            border_width: 1,
        }
    }
}

/// Build chart datasets from the charted series, in metric order.
pub fn datasets_from_series(series: &[Series]) -> Vec<Dataset> {
    series
        .iter()
        .filter(|s| s.charted)
        .enumerate()
        .map(|(index, s)| Dataset::new(index, s.label, s.data.clone()))
        .collect()
}
