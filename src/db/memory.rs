use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DbError, DbResult, ReportRepo};
use crate::{
    models::{
        Booking, Payment, PaymentStatus, ServiceCategory, ServiceListing, ServiceProvider, User,
    },
    reports::{ReportWindow, Timestamped},
};

/// The JSON document a [`MemoryStore`] is loaded from.
///
/// Every collection is optional; a missing key is an empty collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Dataset {
    pub users: Vec<User>,
    pub providers: Vec<ServiceProvider>,
    pub payments: Vec<Payment>,
    pub bookings: Vec<Booking>,
    pub categories: Vec<ServiceCategory>,
    pub listings: Vec<ServiceListing>,
}

impl Dataset {
    pub fn from_json(json: &str) -> DbResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Immutable in-memory record source.
///
/// Cloning is cheap; clones share the same dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Dataset>,
}

impl MemoryStore {
    pub fn new(data: Dataset) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// A store with no records. Every report over it is all zero.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a dataset file.
    pub async fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DbError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let data = Dataset::from_json(&json)?;

        tracing::info!(
            path = %path.display(),
            users = data.users.len(),
            providers = data.providers.len(),
            payments = data.payments.len(),
            bookings = data.bookings.len(),
            categories = data.categories.len(),
            listings = data.listings.len(),
            "Loaded dataset"
        );

        Ok(Self::new(data))
    }
}

fn in_window<R: Timestamped + Clone>(records: &[R], window: &ReportWindow) -> Vec<R> {
    records
        .iter()
        .filter(|r| window.contains(r.timestamp()))
        .cloned()
        .collect()
}

#[async_trait]
impl ReportRepo for MemoryStore {
    async fn completed_payments(&self, window: &ReportWindow) -> DbResult<Vec<Payment>> {
        Ok(self
            .data
            .payments
            .iter()
            .filter(|p| p.payment_status == PaymentStatus::Completed)
            .filter(|p| window.contains(p.timestamp()))
            .cloned()
            .collect())
    }

    async fn bookings(&self, window: &ReportWindow) -> DbResult<Vec<Booking>> {
        Ok(in_window(&self.data.bookings, window))
    }

    async fn users(&self, window: &ReportWindow) -> DbResult<Vec<User>> {
        Ok(in_window(&self.data.users, window))
    }

    async fn providers(&self, window: &ReportWindow) -> DbResult<Vec<ServiceProvider>> {
        Ok(in_window(&self.data.providers, window))
    }

    async fn categories(&self) -> DbResult<Vec<ServiceCategory>> {
        Ok(self.data.categories.clone())
    }

    async fn listings(&self) -> DbResult<Vec<ServiceListing>> {
        Ok(self.data.listings.clone())
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}
