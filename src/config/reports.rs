use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::reports::{DEFAULT_MAX_BUCKETS, DateRangeGenerator};

/// Report engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportsConfig {
    /// UTC offset used for calendar arithmetic and date-only parameters,
    /// e.g. `"+00:00"` or `"-05:00"`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// Upper bound on the number of buckets a single report may produce.
    #[serde(default = "default_max_buckets")]
    pub max_buckets: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
            max_buckets: default_max_buckets(),
        }
    }
}

impl ReportsConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "reports.utc_offset '{}' is not an offset like \"+02:00\"",
                self.utc_offset
            ))
        })
    }

    pub fn generator(&self) -> Result<DateRangeGenerator, ConfigError> {
        Ok(DateRangeGenerator::new(self.offset()?, self.max_buckets))
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buckets == 0 {
            return Err(ConfigError::Validation(
                "reports.max_buckets must be greater than 0".into(),
            ));
        }
        self.offset()?;
        Ok(())
    }
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_max_buckets() -> usize {
    DEFAULT_MAX_BUCKETS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_parsing() {
        let config = ReportsConfig {
            utc_offset: "-05:00".into(),
            ..Default::default()
        };
        assert_eq!(config.offset().unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_invalid_offset() {
        let config = ReportsConfig {
            utc_offset: "Europe/Paris".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_buckets_rejected() {
        let config = ReportsConfig {
            max_buckets: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
