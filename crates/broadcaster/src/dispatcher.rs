//! Alert fan-out.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use outbreak_core::{
    AlertBroadcast, DispatchResult, FailureReason, FeedEvent, RecipientId, Result,
};
use tracing::{info, warn};

use crate::delivery::deliver_all;
use crate::registry::ChannelRegistry;
use crate::resolver::Resolver;

/// Runs one broadcast: resolve, look up endpoints, deliver, aggregate.
#[derive(Clone)]
pub struct Dispatcher {
    resolver: Resolver,
    registry: ChannelRegistry,
    delivery_timeout: Duration,
}

impl Dispatcher {
    pub fn new(resolver: Resolver, registry: ChannelRegistry, delivery_timeout: Duration) -> Self {
        Self {
            resolver,
            registry,
            delivery_timeout,
        }
    }

    /// Deliver the alert to every resolved, online recipient.
    ///
    /// Resolution errors are returned unchanged. Once resolution succeeds
    /// this always returns a result, even if no delivery succeeded.
    /// Each call resolves afresh; repeated calls are not deduplicated.
    pub async fn dispatch(&self, broadcast: &AlertBroadcast) -> Result<DispatchResult> {
        info!(
            report_id = %broadcast.report_id,
            radius_meters = broadcast.radius_meters,
            "Dispatching alert"
        );

        let recipients = self
            .resolver
            .resolve(broadcast.report_id, broadcast.radius_meters)
            .await?;

        let mut result = DispatchResult {
            attempted: recipients.len(),
            ..Default::default()
        };

        let mut endpoints = Vec::new();
        let mut online = BTreeSet::new();
        for recipient in recipients {
            let found = self.registry.lookup(&recipient);
            if found.is_empty() {
                warn!(recipient = %recipient, "Recipient offline");
                result.failed.insert(recipient, FailureReason::Offline);
            } else {
                endpoints.extend(found);
                online.insert(recipient);
            }
        }

        let event = FeedEvent::Alert {
            message: broadcast.message.clone(),
            report_id: broadcast.report_id,
        };
        let outcomes = deliver_all(&self.registry, endpoints, &event, self.delivery_timeout).await;

        let mut reached = BTreeSet::new();
        let mut errors: BTreeMap<RecipientId, Vec<String>> = BTreeMap::new();
        for outcome in outcomes {
            let recipient = outcome.handle.recipient_id().clone();
            match outcome.result {
                Ok(()) => {
                    reached.insert(recipient);
                }
                Err(e) => errors.entry(recipient).or_default().push(e.to_string()),
            }
        }

        for recipient in online {
            if reached.contains(&recipient) {
                result.delivered += 1;
                continue;
            }
            let detail = errors
                .remove(&recipient)
                .map(|errs| errs.join("; "))
                .unwrap_or_else(|| "no endpoint accepted the alert".to_string());
            warn!(recipient = %recipient, error = %detail, "Alert not delivered");
            result
                .failed
                .insert(recipient, FailureReason::DeliveryError(detail));
        }

        info!(
            report_id = %broadcast.report_id,
            attempted = result.attempted,
            delivered = result.delivered,
            failed = result.failed.len(),
            "Alert dispatch complete"
        );

        Ok(result)
    }
}
