//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use broadcaster::{AlertService, BroadcastConfig};
use database::Database;
use outbreak_core::ReportStore;
use subtle::ConstantTimeEq;

use crate::error::{AdminError, Result};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection, for profile and stats queries.
    pub db: Database,
    /// Alert pipeline backed by the same database.
    pub service: AlertService,
    operator_token: Option<Arc<str>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, config: BroadcastConfig, operator_token: Option<String>) -> Self {
        let store: Arc<dyn ReportStore> = Arc::new(db.clone());
        Self {
            service: AlertService::new(store, config),
            db,
            operator_token: operator_token.map(Arc::from),
        }
    }

    /// Check the bearer token on an operator request.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = self.operator_token.as_deref() else {
            return Ok(());
        };

        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Err(AdminError::Unauthorized);
        };

        let Ok(value) = value.to_str() else {
            return Err(AdminError::Unauthorized);
        };

        let Some(token) = value.strip_prefix("Bearer ") else {
            return Err(AdminError::Unauthorized);
        };

        if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
            return Err(AdminError::Unauthorized);
        }

        Ok(())
    }
}
