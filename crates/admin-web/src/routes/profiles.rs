//! Out-of-band profile maintenance.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use outbreak_core::{AlertError, LocationInput, RecipientId, RecipientProfile, Role};
use serde::Deserialize;
use database::DatabaseError;
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

/// Profile fields set by an operator or the registration flow.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    /// `operator` or `fielder` (`admin` and `farmer` also accepted).
    pub role: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Last-known location; omitted clears it.
    #[serde(default)]
    pub location: Option<LocationInput>,
}

/// Create or replace a profile.
///
/// Live endpoints registered under a different role are dropped so the
/// recipient reconnects with the stored one.
pub async fn put_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<RecipientProfile>> {
    state.authorize(&headers)?;

    let profile = RecipientProfile {
        id: RecipientId::new(id)?,
        role: req.role.parse::<Role>()?,
        full_name: req.full_name,
        location: req
            .location
            .map(LocationInput::into_point)
            .transpose()
            .map_err(AlertError::from)?,
    };

    let previous = match database::profile::get_profile(state.db.pool(), profile.id.as_str()).await {
        Ok(previous) => Some(previous.role),
        Err(DatabaseError::NotFound { .. }) => None,
        Err(e) => return Err(e.into()),
    };

    database::profile::upsert_profile(state.db.pool(), &profile).await?;
    info!(recipient = %profile.id, role = %profile.role, "Profile saved");

    if previous.is_some_and(|role| role != profile.role) {
        let removed = state.service.registry().unregister_recipient(&profile.id);
        info!(recipient = %profile.id, removed, "Role changed, live endpoints dropped");
    }

    Ok(Json(profile))
}

/// Fetch a profile.
pub async fn get_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<RecipientProfile>> {
    state.authorize(&headers)?;
    let profile = database::profile::get_profile(state.db.pool(), &id).await?;
    Ok(Json(profile))
}
