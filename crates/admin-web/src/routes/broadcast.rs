//! Broadcast routes.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use broadcaster::AlertPreview;
use outbreak_core::{DispatchResult, ReportId, DEFAULT_ALERT_MESSAGE};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AdminError, Result};
use crate::state::AppState;

/// Broadcast radius, in exactly one unit.
///
/// Broadcast bodies are snake_case; the camelCase spelling used by the
/// report and profile bodies is accepted too.
#[derive(Deserialize)]
pub struct Radius {
    #[serde(alias = "radiusMeters")]
    pub radius_meters: Option<f64>,
    #[serde(alias = "radiusKm")]
    pub radius_km: Option<f64>,
}

impl Radius {
    fn to_meters(&self) -> Result<f64> {
        match (self.radius_meters, self.radius_km) {
            (Some(meters), None) => Ok(meters),
            (None, Some(km)) => Ok(km * 1_000.0),
            _ => Err(AdminError::BadRequest(
                "exactly one of radius_meters or radius_km is required".to_string(),
            )),
        }
    }
}

/// Request to preview broadcast recipients.
#[derive(Deserialize)]
pub struct PreviewRequest {
    #[serde(alias = "reportId")]
    pub report_id: ReportId,
    #[serde(flatten)]
    pub radius: Radius,
}

/// Request to send a broadcast.
#[derive(Deserialize)]
pub struct BroadcastRequest {
    #[serde(alias = "reportId")]
    pub report_id: ReportId,
    #[serde(flatten)]
    pub radius: Radius,
    /// Omitted means the standard outbreak warning.
    #[serde(default)]
    pub message: Option<String>,
}

/// Broadcast send result.
#[derive(Serialize)]
pub struct BroadcastResponse {
    #[serde(flatten)]
    pub result: DispatchResult,
    pub summary: String,
}

/// Preview recipients for a report and radius.
pub async fn preview_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<AlertPreview>> {
    state.authorize(&headers)?;
    let radius_meters = req.radius.to_meters()?;
    let preview = state
        .service
        .preview_alert(req.report_id, radius_meters)
        .await?;
    Ok(Json(preview))
}

/// Send an alert to everyone near a report.
pub async fn send_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>> {
    state.authorize(&headers)?;
    let radius_meters = req.radius.to_meters()?;
    let message = req.message.as_deref().unwrap_or(DEFAULT_ALERT_MESSAGE);

    info!(
        report_id = %req.report_id,
        radius_meters,
        "Sending broadcast"
    );

    let result = state
        .service
        .broadcast_alert(req.report_id, radius_meters, message)
        .await?;

    Ok(Json(BroadcastResponse {
        summary: result.summary(),
        result,
    }))
}
