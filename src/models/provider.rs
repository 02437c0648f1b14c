use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reports::Timestamped;

/// A service provider profile, linked to the user account that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub business_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Timestamped for ServiceProvider {
    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}
