//! Live feed over Server-Sent Events.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use outbreak_core::Role;

use crate::error::Result;
use crate::state::AppState;

/// Subscribe a stored recipient to their live feed.
///
/// The role comes from the stored profile. Operator feeds carry every new
/// report, so they need the operator token. The endpoint stays registered
/// while the connection is open and is removed when the client goes away.
pub async fn feed_sse(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(recipient_id): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let profile = database::profile::get_profile(state.db.pool(), &recipient_id).await?;
    if profile.role == Role::Operator {
        state.authorize(&headers)?;
    }
    let subscription = state.service.subscribe(profile.id, profile.role);

    let stream = subscription.map(|event| {
        Event::default()
            .event(event.event_name())
            .json_data(&event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
