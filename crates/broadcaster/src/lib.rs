//! Geofenced alert broadcast pipeline.
//!
//! Reporters submit geotagged sightings through [`AlertService::submit_report`];
//! operators watching the live feed get every new report, and can then alert
//! everyone within a radius with [`AlertService::broadcast_alert`].
//!
//! The pieces:
//!
//! - [`ChannelRegistry`]: in-memory map of recipients to live endpoints.
//! - [`Resolver`]: who is within a radius of a report, right now.
//! - [`Dispatcher`]: concurrent, time-bounded fan-out with per-recipient
//!   outcomes.
//! - [`Intake`]: validates and persists reports, then pushes them to
//!   operators.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use broadcaster::{AlertService, BroadcastConfig};
//! use outbreak_core::{LocationInput, RecipientId, ReportStore, Role};
//!
//! # async fn example(store: Arc<dyn ReportStore>) -> outbreak_core::Result<()> {
//! let service = AlertService::new(store, BroadcastConfig::default());
//!
//! let mut feed = service.subscribe(RecipientId::new("field-7")?, Role::Fielder);
//!
//! let report = service
//!     .submit_report("field-3", LocationInput::Wkt("POINT(88.36 22.57)".into()), None)
//!     .await?;
//!
//! let result = service.broadcast_alert(report.id, 10_000.0, "Evacuate").await?;
//! println!("{}", result.summary());
//!
//! while let Some(event) = feed.recv().await {
//!     println!("{}: {:?}", event.event_name(), event);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod delivery;
mod dispatcher;
mod error;
mod intake;
mod registry;
mod resolver;
mod service;
mod sink;

pub use config::{
    BroadcastConfig, DEFAULT_DELIVERY_TIMEOUT, DEFAULT_FEED_LIMIT, DEFAULT_SUBSCRIPTION_CAPACITY,
};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, SinkError};
pub use intake::Intake;
pub use registry::{ChannelRegistry, Endpoint, EndpointHandle, Subscription};
pub use resolver::Resolver;
pub use service::{AlertPreview, AlertService};
pub use sink::{ChannelSink, EndpointSink, LoggingSink};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
