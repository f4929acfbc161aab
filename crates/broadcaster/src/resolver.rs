//! Geospatial recipient resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use outbreak_core::{validate_radius, RecipientId, Report, ReportId, ReportStore, Result};
use tracing::debug;

/// Finds the recipients within a radius of a report's location.
///
/// Stateless: every call reads current recipient locations from the store,
/// so a recipient who moved between two calls is resolved by position at
/// the time of the second call.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ReportStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    /// Recipients within `radius_meters` of the report, never including
    /// the reporter.
    ///
    /// Fails with `InvalidArgument` on a non-positive radius before touching
    /// the store, and with `NotFound` for an unknown report.
    pub async fn resolve(
        &self,
        report_id: ReportId,
        radius_meters: f64,
    ) -> Result<BTreeSet<RecipientId>> {
        validate_radius(radius_meters)?;
        let report = self.store.get_report(report_id).await?;
        self.resolve_for(&report, radius_meters).await
    }

    /// Resolve against an already-loaded report.
    pub async fn resolve_for(
        &self,
        report: &Report,
        radius_meters: f64,
    ) -> Result<BTreeSet<RecipientId>> {
        validate_radius(radius_meters)?;

        let mut recipients = self
            .store
            .query_recipients_within_radius(report.location, radius_meters, &report.reporter_id)
            .await?;
        // The store is asked to exclude the reporter; enforce it regardless.
        recipients.remove(&report.reporter_id);

        debug!(
            report_id = %report.id,
            radius_meters,
            resolved = recipients.len(),
            "Resolved recipients"
        );
        Ok(recipients)
    }
}
