//! Counters for the operator surface.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub report_count: i64,
    pub profiles_by_role: BTreeMap<&'static str, i64>,
    /// Recipients with at least one open feed.
    pub live_recipients: usize,
    pub live_endpoints: usize,
}

/// Get statistics as JSON.
pub async fn stats_api(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Stats>> {
    state.authorize(&headers)?;

    let pool = state.db.pool();
    let report_count = database::report::count_reports(pool).await?;
    let profiles_by_role = database::profile::count_profiles_by_role(pool)
        .await?
        .into_iter()
        .map(|(role, count)| (role.as_str(), count))
        .collect();

    let registry = state.service.registry();
    Ok(Json(Stats {
        report_count,
        profiles_by_role,
        live_recipients: registry.recipient_count(),
        live_endpoints: registry.endpoint_count(),
    }))
}
