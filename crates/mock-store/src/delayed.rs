//! Delayed store implementation - wraps another store with artificial latency.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use outbreak_core::{GeoPoint, RecipientId, Report, ReportId, ReportStore, StoreError};
use tokio::time::sleep;

/// A store that wraps another store and delays every call.
///
/// Useful for checking that slow store round-trips do not hold up
/// unrelated work such as live-feed delivery.
pub struct DelayedStore<S: ReportStore> {
    inner: S,
    delay: Duration,
}

impl<S: ReportStore> DelayedStore<S> {
    /// Create a new DelayedStore wrapping the given store with the specified delay.
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a store with a delay in milliseconds.
    pub fn with_millis(inner: S, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Get a reference to the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ReportStore> ReportStore for DelayedStore<S> {
    async fn insert_report(
        &self,
        reporter_id: &RecipientId,
        location: GeoPoint,
        symptom: &str,
    ) -> Result<Report, StoreError> {
        sleep(self.delay).await;
        self.inner.insert_report(reporter_id, location, symptom).await
    }

    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError> {
        sleep(self.delay).await;
        self.inner.get_report(id).await
    }

    async fn query_recipients_within_radius(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        exclude: &RecipientId,
    ) -> Result<BTreeSet<RecipientId>, StoreError> {
        sleep(self.delay).await;
        self.inner
            .query_recipients_within_radius(center, radius_meters, exclude)
            .await
    }

    async fn list_reports_descending(&self, limit: Option<u32>) -> Result<Vec<Report>, StoreError> {
        sleep(self.delay).await;
        self.inner.list_reports_descending(limit).await
    }
}
