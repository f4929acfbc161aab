//! Database models.

use chrono::{DateTime, Utc};
use outbreak_core::{AlertError, GeoPoint, RecipientId, RecipientProfile, Report, ReportId, Role};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::DatabaseError;

/// A row of the `reports` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReportRow {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Submitting party.
    pub reporter_id: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Free-text symptom classification.
    pub symptom: String,
    /// Insertion timestamp, set by SQLite.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = DatabaseError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| DatabaseError::Corrupt {
            entity: "Report",
            id: row.id.to_string(),
            reason,
        };
        let location =
            GeoPoint::new(row.longitude, row.latitude).map_err(|e| corrupt(e.to_string()))?;
        let reporter_id =
            RecipientId::new(row.reporter_id.clone()).map_err(|e| corrupt(e.to_string()))?;

        Ok(Report {
            id: ReportId(row.id),
            reporter_id,
            location,
            symptom: row.symptom,
            created_at: row.created_at,
        })
    }
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    /// Identifier issued by the auth provider.
    pub id: String,
    /// `operator` or `fielder`.
    pub role: String,
    /// Display name, if known.
    pub full_name: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for RecipientProfile {
    type Error = DatabaseError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| DatabaseError::Corrupt {
            entity: "Profile",
            id: row.id.clone(),
            reason,
        };
        let role: Role = row
            .role
            .parse()
            .map_err(|e: AlertError| corrupt(e.to_string()))?;
        let location = match (row.longitude, row.latitude) {
            (Some(lon), Some(lat)) => {
                Some(GeoPoint::new(lon, lat).map_err(|e| corrupt(e.to_string()))?)
            }
            _ => None,
        };
        let id = RecipientId::new(row.id.clone()).map_err(|e| corrupt(e.to_string()))?;

        Ok(RecipientProfile {
            id,
            role,
            full_name: row.full_name,
            location,
        })
    }
}
