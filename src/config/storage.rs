use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where marketplace records are loaded from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// JSON dataset file. Without one the service starts with an empty store
    /// and every report is all zero.
    #[serde(default)]
    pub dataset: Option<PathBuf>,
}
