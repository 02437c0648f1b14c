use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reports::Timestamped;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A customer's booking of a service listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Listing that was booked. Absent when the listing was removed.
    #[serde(default)]
    pub service_listing_id: Option<Uuid>,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub booking_date_time: DateTime<Utc>,
    #[serde(default)]
    pub booking_status: BookingStatus,
}

impl Booking {
    pub fn is_completed(&self) -> bool {
        self.booking_status == BookingStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.booking_status == BookingStatus::Cancelled
    }
}

impl Timestamped for Booking {
    fn timestamp(&self) -> DateTime<Utc> {
        self.booking_date_time
    }
}
