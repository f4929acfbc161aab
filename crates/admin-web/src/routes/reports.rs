//! Report submission and the operator feed's initial load.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use outbreak_core::{LocationInput, Report};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

/// A new sighting from a reporter.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub reporter_id: String,
    /// `{"longitude": .., "latitude": ..}` or `"POINT(lon lat)"`.
    pub location: LocationInput,
    /// Omitted means an initial report.
    #[serde(default)]
    pub symptom: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// Submit a report.
pub async fn submit_api(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<Report>)> {
    let report = state
        .service
        .submit_report(&req.reporter_id, req.location, req.symptom.as_deref())
        .await?;

    info!(report_id = %report.id, "Report accepted");
    Ok((StatusCode::CREATED, Json(report)))
}

/// List reports, newest first.
pub async fn list_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Report>>> {
    state.authorize(&headers)?;
    let reports = state.service.recent_reports(query.limit).await?;
    Ok(Json(reports))
}
