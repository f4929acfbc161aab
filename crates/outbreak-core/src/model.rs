//! Reports, recipients and broadcast results.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AlertError;
use crate::geo::GeoPoint;

/// Maximum allowed length for free-text symptoms.
pub const MAX_SYMPTOM_LENGTH: usize = 1_000;

/// Maximum allowed length for operator alert messages.
pub const MAX_MESSAGE_LENGTH: usize = 2_000;

/// Symptom recorded when a reporter submits without describing one.
pub const DEFAULT_SYMPTOM: &str = "Initial Report";

/// Message proposed to operators when composing an alert.
pub const DEFAULT_ALERT_MESSAGE: &str = "CRITICAL ALERT: A potential disease outbreak has been reported in your area. Please secure your flock/herd and await further instructions.";

/// Store-assigned report identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub i64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a registered party, issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipientId(String);

impl RecipientId {
    /// Wrap an identifier, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, AlertError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AlertError::InvalidArgument(
                "recipient id cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecipientId {
    type Error = AlertError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecipientId> for String {
    fn from(id: RecipientId) -> Self {
        id.0
    }
}

impl FromStr for RecipientId {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Which live feed a party receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Receives every new report.
    Operator,
    /// Receives only geofenced alerts.
    Fielder,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::Fielder => "fielder",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "operator" | "admin" => Ok(Role::Operator),
            "fielder" | "farmer" => Ok(Role::Fielder),
            other => Err(AlertError::InvalidArgument(format!("unknown role: {other}"))),
        }
    }
}

/// A single disease-sighting submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub reporter_id: RecipientId,
    pub location: GeoPoint,
    pub symptom: String,
    pub created_at: DateTime<Utc>,
}

/// A registered party as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientProfile {
    pub id: RecipientId,
    pub role: Role,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Last-known location; profiles without one are never resolved.
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// An operator's request to alert everyone near a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBroadcast {
    pub report_id: ReportId,
    pub radius_meters: f64,
    pub message: String,
}

impl AlertBroadcast {
    /// Build a broadcast, checking the radius and message.
    pub fn new(
        report_id: ReportId,
        radius_meters: f64,
        message: impl Into<String>,
    ) -> Result<Self, AlertError> {
        validate_radius(radius_meters)?;
        let message = message.into();
        validate_text("message", &message, MAX_MESSAGE_LENGTH)?;
        Ok(Self {
            report_id,
            radius_meters,
            message,
        })
    }
}

/// Reject zero, negative and non-finite radii.
pub fn validate_radius(radius_meters: f64) -> Result<(), AlertError> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(AlertError::InvalidArgument(format!(
            "radius must be a positive number of meters, got {radius_meters}"
        )));
    }
    Ok(())
}

/// Reject blank or oversized free text.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), AlertError> {
    if value.trim().is_empty() {
        return Err(AlertError::InvalidArgument(format!("{field} cannot be empty")));
    }
    let len = value.chars().count();
    if len > max {
        return Err(AlertError::InvalidArgument(format!(
            "{field} is too long ({len} chars, max {max})"
        )));
    }
    Ok(())
}

/// Why a resolved recipient did not receive an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail")]
pub enum FailureReason {
    /// No live endpoint was registered at dispatch time.
    Offline,
    /// Every endpoint failed or timed out.
    DeliveryError(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Offline => f.write_str("offline"),
            FailureReason::DeliveryError(detail) => write!(f, "delivery error: {detail}"),
        }
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    /// Number of recipients resolved.
    pub attempted: usize,
    /// Recipients reached on at least one endpoint.
    pub delivered: usize,
    /// Recipients reached on no endpoint.
    pub failed: BTreeMap<RecipientId, FailureReason>,
}

impl DispatchResult {
    /// Operator-facing one-liner.
    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            format!("Alert successfully sent to {} recipients.", self.delivered)
        } else {
            format!(
                "Alert sent to {} of {} recipients; {} not reached.",
                self.delivered,
                self.attempted,
                self.failed.len()
            )
        }
    }
}
