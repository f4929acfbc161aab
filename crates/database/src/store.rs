//! [`ReportStore`] implementation backed by SQLite.

use std::collections::BTreeSet;

use async_trait::async_trait;
use outbreak_core::{GeoPoint, RecipientId, Report, ReportId, ReportStore, StoreError};
use tracing::debug;

use crate::{profile, report, Database};

#[async_trait]
impl ReportStore for Database {
    async fn insert_report(
        &self,
        reporter_id: &RecipientId,
        location: GeoPoint,
        symptom: &str,
    ) -> Result<Report, StoreError> {
        let report = report::insert_report(self.pool(), reporter_id.as_str(), location, symptom).await?;
        debug!(report_id = %report.id, reporter = %reporter_id, "Report row inserted");
        Ok(report)
    }

    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError> {
        Ok(report::get_report(self.pool(), id).await?)
    }

    async fn query_recipients_within_radius(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        exclude: &RecipientId,
    ) -> Result<BTreeSet<RecipientId>, StoreError> {
        let (south, north) = center.latitude_band(radius_meters);
        let candidates = profile::located_profiles_in_band(self.pool(), south, north).await?;
        let candidate_count = candidates.len();

        let within: BTreeSet<RecipientId> = candidates
            .into_iter()
            .filter(|p| &p.id != exclude)
            .filter(|p| p.location.is_some_and(|loc| center.is_within(&loc, radius_meters)))
            .map(|p| p.id)
            .collect();

        debug!(
            candidates = candidate_count,
            within = within.len(),
            radius_meters,
            "Radius query complete"
        );
        Ok(within)
    }

    async fn list_reports_descending(&self, limit: Option<u32>) -> Result<Vec<Report>, StoreError> {
        Ok(report::list_reports(self.pool(), limit).await?)
    }
}
