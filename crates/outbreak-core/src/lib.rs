//! Core types for the outbreak alert pipeline.
//!
//! This crate holds what every other crate in the workspace agrees on:
//!
//! - [`GeoPoint`] / [`LocationInput`] - validated coordinates and the boundary form they arrive in
//! - [`Report`], [`RecipientProfile`], [`AlertBroadcast`], [`DispatchResult`] - the data model
//! - [`FeedEvent`] - what a live endpoint receives
//! - [`ReportStore`] - the external store interface
//! - [`AlertError`] / [`StoreError`] - error taxonomy
//!
//! # Example
//!
//! ```rust
//! use outbreak_core::{GeoPoint, LocationInput};
//!
//! let report_site = LocationInput::Wkt("POINT(88.36 22.57)".to_string())
//!     .into_point()
//!     .unwrap();
//! let farm = GeoPoint::new(88.40, 22.60).unwrap();
//!
//! assert!(report_site.is_within(&farm, 10_000.0));
//! ```

mod error;
mod event;
mod geo;
mod model;
mod store;

pub use error::{AlertError, Result, StoreError};
pub use event::FeedEvent;
pub use geo::{GeoError, GeoPoint, LocationInput, DISTANCE_TOLERANCE_METERS, EARTH_RADIUS_METERS};
pub use model::{
    validate_radius, validate_text, AlertBroadcast, DispatchResult, FailureReason,
    RecipientId, RecipientProfile, Report, ReportId, Role, DEFAULT_ALERT_MESSAGE,
    DEFAULT_SYMPTOM, MAX_MESSAGE_LENGTH, MAX_SYMPTOM_LENGTH,
};
pub use store::ReportStore;

// Re-export async_trait for store implementors
pub use async_trait::async_trait;
