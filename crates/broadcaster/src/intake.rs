//! Report intake.

use std::sync::Arc;
use std::time::Duration;

use outbreak_core::{
    validate_text, AlertError, FeedEvent, LocationInput, RecipientId, Report, ReportStore, Result,
    Role,
};
use tracing::{debug, info, warn};

use crate::delivery::deliver_all;
use crate::registry::ChannelRegistry;

/// Validates and persists reports, then pushes them to operators.
#[derive(Clone)]
pub struct Intake {
    store: Arc<dyn ReportStore>,
    registry: ChannelRegistry,
    delivery_timeout: Duration,
    max_symptom_len: usize,
}

impl Intake {
    pub fn new(
        store: Arc<dyn ReportStore>,
        registry: ChannelRegistry,
        delivery_timeout: Duration,
        max_symptom_len: usize,
    ) -> Self {
        Self {
            store,
            registry,
            delivery_timeout,
            max_symptom_len,
        }
    }

    /// Persist a report and notify operator endpoints.
    ///
    /// The location is validated here and nowhere downstream. Once the
    /// store accepts the report it is returned; the operator push runs on
    /// a detached task and its failures are only logged.
    pub async fn submit(
        &self,
        reporter_id: &RecipientId,
        location: LocationInput,
        symptom: &str,
    ) -> Result<Report> {
        let location = location.into_point()?;
        validate_text("symptom", symptom, self.max_symptom_len)?;

        let report = self
            .store
            .insert_report(reporter_id, location, symptom.trim())
            .await
            .map_err(|e| AlertError::StoreUnavailable(e.to_string()))?;

        info!(
            report_id = %report.id,
            reporter = %report.reporter_id,
            location = %report.location,
            "Report persisted"
        );

        self.notify_operators(report.clone());
        Ok(report)
    }

    fn notify_operators(&self, report: Report) {
        let operators = self.registry.lookup_role(Role::Operator);
        if operators.is_empty() {
            debug!(report_id = %report.id, "No operator endpoints to notify");
            return;
        }

        let registry = self.registry.clone();
        let timeout = self.delivery_timeout;
        tokio::spawn(async move {
            let report_id = report.id;
            let event = FeedEvent::NewReport { report };
            let outcomes = deliver_all(&registry, operators, &event, timeout).await;
            let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
            if failed > 0 {
                warn!(
                    report_id = %report_id,
                    failed,
                    total = outcomes.len(),
                    "Some operator endpoints missed the new report"
                );
            } else {
                debug!(report_id = %report_id, total = outcomes.len(), "Operators notified");
            }
        });
    }
}
