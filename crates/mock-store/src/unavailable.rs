//! A store that is never reachable.

use std::collections::BTreeSet;

use async_trait::async_trait;
use outbreak_core::{GeoPoint, RecipientId, Report, ReportId, ReportStore, StoreError};

/// A store whose every call fails with [`StoreError::Unavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new() -> Self {
        Self::with_reason("connection refused")
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

impl Default for UnavailableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for UnavailableStore {
    async fn insert_report(
        &self,
        _reporter_id: &RecipientId,
        _location: GeoPoint,
        _symptom: &str,
    ) -> Result<Report, StoreError> {
        self.fail()
    }

    async fn get_report(&self, _id: ReportId) -> Result<Report, StoreError> {
        self.fail()
    }

    async fn query_recipients_within_radius(
        &self,
        _center: GeoPoint,
        _radius_meters: f64,
        _exclude: &RecipientId,
    ) -> Result<BTreeSet<RecipientId>, StoreError> {
        self.fail()
    }

    async fn list_reports_descending(&self, _limit: Option<u32>) -> Result<Vec<Report>, StoreError> {
        self.fail()
    }
}
