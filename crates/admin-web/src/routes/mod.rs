//! Route handlers for the admin web interface.

pub mod broadcast;
pub mod feed;
pub mod health;
pub mod profiles;
pub mod reports;
pub mod stats;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Reporter and recipient endpoints
        .route("/api/reports", post(reports::submit_api).get(reports::list_api))
        .route("/api/feed/:recipient_id", get(feed::feed_sse))
        // Operator endpoints
        .route("/api/broadcast/preview", post(broadcast::preview_api))
        .route("/api/broadcast", post(broadcast::send_api))
        .route("/api/profiles/:id", put(profiles::put_api).get(profiles::get_api))
        .route("/api/stats", get(stats::stats_api))
}
