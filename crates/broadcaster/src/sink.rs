//! Endpoint sink trait and the channel-backed implementation.

use async_trait::async_trait;
use outbreak_core::FeedEvent;
use tokio::sync::mpsc;

use crate::error::SinkError;

/// Trait for delivering feed events to one live endpoint.
///
/// Abstracted to support different transports (in-process channels,
/// SSE sessions, tests). Implementations should not apply their own
/// timeout; the caller bounds every delivery.
#[async_trait]
pub trait EndpointSink: Send + Sync {
    /// Hand one event to the endpoint.
    async fn deliver(&self, event: FeedEvent) -> Result<(), SinkError>;

    /// Whether the receiving side is known to be gone.
    ///
    /// Default implementation always returns false.
    fn is_closed(&self) -> bool {
        false
    }
}

/// A sink that forwards events into a bounded tokio channel.
///
/// When the channel is full, `deliver` waits for room, so a stalled reader
/// surfaces as a delivery timeout rather than unbounded buffering.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<FeedEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<FeedEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EndpointSink for ChannelSink {
    async fn deliver(&self, event: FeedEvent) -> Result<(), SinkError> {
        self.tx.send(event).await.map_err(|_| SinkError::Closed)
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A logging sink for debugging that logs every event and never fails.
#[derive(Debug, Clone, Default)]
pub struct LoggingSink;

#[async_trait]
impl EndpointSink for LoggingSink {
    async fn deliver(&self, event: FeedEvent) -> Result<(), SinkError> {
        tracing::info!(
            event = event.event_name(),
            report_id = %event.report_id(),
            "Delivering feed event"
        );
        Ok(())
    }
}
