use async_trait::async_trait;

use crate::{
    db::error::DbResult,
    models::{Booking, Payment, ServiceCategory, ServiceListing, ServiceProvider, User},
    reports::ReportWindow,
};

/// Read access to the records behind each report.
///
/// Window-scoped methods return only records whose bucketing timestamp falls
/// inside the window, bounds inclusive.
#[async_trait]
pub trait ReportRepo: Send + Sync {
    /// Payments with status `Completed`, by `paymentDateTime`.
    async fn completed_payments(&self, window: &ReportWindow) -> DbResult<Vec<Payment>>;

    /// Bookings of any status, by `bookingDateTime`.
    async fn bookings(&self, window: &ReportWindow) -> DbResult<Vec<Booking>>;

    /// Users by `createdAt`.
    async fn users(&self, window: &ReportWindow) -> DbResult<Vec<User>>;

    /// Service providers by `createdAt`.
    async fn providers(&self, window: &ReportWindow) -> DbResult<Vec<ServiceProvider>>;

    async fn categories(&self) -> DbResult<Vec<ServiceCategory>>;

    async fn listings(&self) -> DbResult<Vec<ServiceListing>>;

    /// Cheap reachability check for the health endpoint.
    async fn ping(&self) -> DbResult<()>;
}
