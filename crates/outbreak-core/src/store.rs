//! The external store interface.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::geo::GeoPoint;
use crate::model::{RecipientId, Report, ReportId};

/// Durable storage for reports and recipient locations.
///
/// Every call is assumed atomic on its own; nothing spans calls. This trait
/// is object-safe and is used as `Arc<dyn ReportStore>`.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Append a report. The store assigns `id` and `created_at`.
    async fn insert_report(
        &self,
        reporter_id: &RecipientId,
        location: GeoPoint,
        symptom: &str,
    ) -> Result<Report, StoreError>;

    /// Fetch a report by id.
    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError>;

    /// Recipients whose last-known location lies within `radius_meters` of
    /// `center`, never including `exclude`.
    async fn query_recipients_within_radius(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        exclude: &RecipientId,
    ) -> Result<BTreeSet<RecipientId>, StoreError>;

    /// Reports newest first, optionally capped at `limit`.
    async fn list_reports_descending(&self, limit: Option<u32>) -> Result<Vec<Report>, StoreError>;
}
