//! Error types for the broadcaster crate.

use thiserror::Error;

/// Invalid broadcast configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Why a single endpoint delivery failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The receiving side is gone.
    #[error("endpoint closed")]
    Closed,

    /// The endpoint did not accept the event within the delivery timeout.
    #[error("delivery timed out after {0} ms")]
    TimedOut(u64),

    /// The endpoint refused the event.
    #[error("delivery rejected: {0}")]
    Rejected(String),
}
