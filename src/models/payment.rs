use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reports::Timestamped;

/// Settlement state of a payment.
///
/// Only `Completed` payments count toward revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    /// Any status this service does not know about
    #[serde(other)]
    Unknown,
}

/// A payment made by a customer for a booking.
///
/// `commission_amount` is the marketplace's cut of `payment_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    pub payment_date_time: DateTime<Utc>,
    #[serde(default)]
    pub payment_amount: f64,
    #[serde(default)]
    pub commission_amount: Option<f64>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

impl Timestamped for Payment {
    fn timestamp(&self) -> DateTime<Utc> {
        self.payment_date_time
    }
}
