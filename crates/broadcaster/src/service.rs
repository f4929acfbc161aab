//! The subscription and operator command interfaces.

use std::collections::BTreeSet;
use std::sync::Arc;

use outbreak_core::{
    validate_radius, validate_text, AlertBroadcast, DispatchResult, LocationInput, RecipientId,
    Report, ReportId, ReportStore, Result, Role, DEFAULT_SYMPTOM,
};
use serde::Serialize;
use tracing::info;

use crate::config::BroadcastConfig;
use crate::dispatcher::Dispatcher;
use crate::intake::Intake;
use crate::registry::{ChannelRegistry, EndpointHandle, Subscription};
use crate::resolver::Resolver;

/// Who a broadcast would reach, computed without delivering anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPreview {
    pub recipient_count: usize,
    pub recipients: Vec<RecipientId>,
    /// Resolved recipients with at least one live endpoint right now.
    pub online: usize,
}

/// Entry point for recipients and operators.
///
/// Owns the channel registry and wires the resolver, dispatcher and intake
/// to one store. Cloning shares all state.
#[derive(Clone)]
pub struct AlertService {
    store: Arc<dyn ReportStore>,
    registry: ChannelRegistry,
    resolver: Resolver,
    dispatcher: Dispatcher,
    intake: Intake,
    config: Arc<BroadcastConfig>,
}

impl AlertService {
    pub fn new(store: Arc<dyn ReportStore>, config: BroadcastConfig) -> Self {
        let registry = ChannelRegistry::new();
        let resolver = Resolver::new(Arc::clone(&store));
        let dispatcher = Dispatcher::new(
            resolver.clone(),
            registry.clone(),
            config.delivery_timeout,
        );
        let intake = Intake::new(
            Arc::clone(&store),
            registry.clone(),
            config.delivery_timeout,
            config.max_symptom_len,
        );

        Self {
            store,
            registry,
            resolver,
            dispatcher,
            intake,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Register a live endpoint for a recipient.
    ///
    /// Operators receive every new report; all roles receive alerts they
    /// are resolved for. Dropping the subscription unregisters it.
    pub fn subscribe(&self, recipient_id: RecipientId, role: Role) -> Subscription {
        info!(recipient = %recipient_id, role = %role, "Recipient subscribed");
        self.registry
            .subscribe(recipient_id, role, self.config.subscription_capacity)
    }

    /// Remove an endpoint. Returns false if it was already gone.
    pub fn unsubscribe(&self, handle: &EndpointHandle) -> bool {
        let removed = self.registry.unregister(handle);
        if removed {
            info!(endpoint = %handle, "Recipient unsubscribed");
        }
        removed
    }

    /// Record a report. A missing symptom is stored as the default
    /// initial-report label.
    pub async fn submit_report(
        &self,
        reporter_id: &str,
        location: LocationInput,
        symptom: Option<&str>,
    ) -> Result<Report> {
        let reporter_id = RecipientId::new(reporter_id)?;
        self.intake
            .submit(&reporter_id, location, symptom.unwrap_or(DEFAULT_SYMPTOM))
            .await
    }

    /// Alert everyone within `radius_meters` of the report.
    pub async fn broadcast_alert(
        &self,
        report_id: ReportId,
        radius_meters: f64,
        message: &str,
    ) -> Result<DispatchResult> {
        validate_radius(radius_meters)?;
        validate_text("message", message, self.config.max_message_len)?;

        let broadcast = AlertBroadcast {
            report_id,
            radius_meters,
            message: message.trim().to_string(),
        };
        self.dispatcher.dispatch(&broadcast).await
    }

    /// Resolve a broadcast's audience and count who is online.
    pub async fn preview_alert(&self, report_id: ReportId, radius_meters: f64) -> Result<AlertPreview> {
        let recipients = self.resolver.resolve(report_id, radius_meters).await?;
        let online = recipients
            .iter()
            .filter(|id| self.registry.is_online(id))
            .count();

        Ok(AlertPreview {
            recipient_count: recipients.len(),
            recipients: recipients.into_iter().collect(),
            online,
        })
    }

    /// Recipients within a radius of a report.
    pub async fn resolve(&self, report_id: ReportId, radius_meters: f64) -> Result<BTreeSet<RecipientId>> {
        self.resolver.resolve(report_id, radius_meters).await
    }

    /// Newest reports first, for a feed's initial load.
    pub async fn recent_reports(&self, limit: Option<u32>) -> Result<Vec<Report>> {
        let limit = limit.unwrap_or(self.config.default_feed_limit);
        Ok(self.store.list_reports_descending(Some(limit)).await?)
    }
}
