//! Error types for the alert pipeline.

use thiserror::Error;

use crate::geo::GeoError;

/// Errors that fail an intake, resolve or dispatch call.
///
/// Per-recipient delivery problems are not errors; they are reported as
/// [`FailureReason`](crate::FailureReason)s inside a
/// [`DispatchResult`](crate::DispatchResult).
#[derive(Debug, Error)]
pub enum AlertError {
    /// Malformed coordinates, non-positive radius or a missing field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown report or recipient reference.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The external store could not be reached or failed the call.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<GeoError> for AlertError {
    fn from(err: GeoError) -> Self {
        AlertError::InvalidArgument(err.to_string())
    }
}

/// Errors returned by [`ReportStore`](crate::ReportStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Any other store failure.
    #[error("{0}")]
    Unavailable(String),
}

impl From<StoreError> for AlertError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AlertError::NotFound { entity, id },
            StoreError::Unavailable(msg) => AlertError::StoreUnavailable(msg),
        }
    }
}

/// Result type for alert pipeline operations.
pub type Result<T> = std::result::Result<T, AlertError>;
