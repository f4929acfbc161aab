//! Error types for the admin web interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use outbreak_core::AlertError;
use thiserror::Error;

/// Errors that can occur in the admin web interface.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Pipeline error (validation, lookup, store).
    #[error(transparent)]
    Alert(#[from] AlertError),

    /// Database error from profile or stats queries.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Missing or wrong operator token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed request the pipeline never saw.
    #[error("{0}")]
    BadRequest(String),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            AdminError::Alert(AlertError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            AdminError::Alert(AlertError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AdminError::Alert(AlertError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AdminError::Database(DatabaseError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AdminError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
