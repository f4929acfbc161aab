//! Concurrent, time-bounded delivery to a batch of endpoints.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use outbreak_core::FeedEvent;
use tracing::{debug, warn};

use crate::error::SinkError;
use crate::registry::{ChannelRegistry, Endpoint, EndpointHandle};
use crate::sink::EndpointSink;

/// Result of one endpoint delivery.
#[derive(Debug, Clone)]
pub(crate) struct DeliveryOutcome {
    pub handle: EndpointHandle,
    pub result: Result<(), SinkError>,
}

/// Deliver `event` to every endpoint at once.
///
/// Each delivery runs on its own task and is bounded by `timeout`, so a
/// slow or stuck endpoint never delays the others beyond that bound.
/// Endpoints found closed are removed from `registry`. Outcomes are returned
/// in the order of `endpoints`.
pub(crate) async fn deliver_all(
    registry: &ChannelRegistry,
    endpoints: Vec<Endpoint>,
    event: &FeedEvent,
    timeout: Duration,
) -> Vec<DeliveryOutcome> {
    let (handles, tasks): (Vec<_>, Vec<_>) = endpoints
        .into_iter()
        .map(|endpoint| {
            let sink = Arc::clone(endpoint.sink());
            let event = event.clone();
            let task = tokio::spawn(deliver_one(sink, event, timeout));
            (endpoint.handle().clone(), task)
        })
        .unzip();

    let results = join_all(tasks).await;

    handles
        .into_iter()
        .zip(results)
        .map(|(handle, joined)| {
            let result = joined.unwrap_or_else(|e| {
                Err(SinkError::Rejected(format!("delivery task failed: {e}")))
            });

            match &result {
                Ok(()) => debug!(endpoint = %handle, "Delivered"),
                Err(SinkError::Closed) => {
                    registry.unregister(&handle);
                    warn!(endpoint = %handle, "Endpoint closed, unregistered");
                }
                Err(e) => warn!(endpoint = %handle, error = %e, "Delivery failed"),
            }

            DeliveryOutcome { handle, result }
        })
        .collect()
}

async fn deliver_one(
    sink: Arc<dyn EndpointSink>,
    event: FeedEvent,
    timeout: Duration,
) -> Result<(), SinkError> {
    match tokio::time::timeout(timeout, sink.deliver(event)).await {
        Ok(result) => result,
        Err(_) => Err(SinkError::TimedOut(timeout.as_millis() as u64)),
    }
}
