//! In-memory store implementation.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use outbreak_core::{
    GeoPoint, RecipientId, RecipientProfile, Report, ReportId, ReportStore, Role, StoreError,
};
use tokio::sync::RwLock;

/// A store that keeps everything in process memory.
///
/// Reports get sequential ids starting at 1. Profiles can be added and
/// moved at any time, so tests can change a recipient's location between
/// two resolutions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reports: RwLock<Vec<Report>>,
    profiles: RwLock<HashMap<RecipientId, RecipientProfile>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub async fn upsert_profile(&self, profile: RecipientProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile);
    }

    /// Convenience for registering a fielder at a point.
    pub async fn add_fielder(&self, id: &str, location: GeoPoint) -> RecipientId {
        self.add_profile(id, Role::Fielder, Some(location)).await
    }

    /// Convenience for registering an operator, optionally located.
    pub async fn add_operator(&self, id: &str, location: Option<GeoPoint>) -> RecipientId {
        self.add_profile(id, Role::Operator, location).await
    }

    async fn add_profile(&self, id: &str, role: Role, location: Option<GeoPoint>) -> RecipientId {
        let recipient_id = RecipientId::new(id).expect("mock profile ids must not be blank");
        self.upsert_profile(RecipientProfile {
            id: recipient_id.clone(),
            role,
            full_name: None,
            location,
        })
        .await;
        recipient_id
    }

    /// Move a recipient. Returns false if the profile does not exist.
    pub async fn set_location(&self, id: &RecipientId, location: Option<GeoPoint>) -> bool {
        match self.profiles.write().await.get_mut(id) {
            Some(profile) => {
                profile.location = location;
                true
            }
            None => false,
        }
    }

    /// Number of stored reports.
    pub async fn report_count(&self) -> usize {
        self.reports.read().await.len()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert_report(
        &self,
        reporter_id: &RecipientId,
        location: GeoPoint,
        symptom: &str,
    ) -> Result<Report, StoreError> {
        let mut reports = self.reports.write().await;
        let report = Report {
            id: ReportId(reports.len() as i64 + 1),
            reporter_id: reporter_id.clone(),
            location,
            symptom: symptom.to_string(),
            created_at: Utc::now(),
        };
        reports.push(report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError> {
        self.reports
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "Report",
                id: id.to_string(),
            })
    }

    async fn query_recipients_within_radius(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        exclude: &RecipientId,
    ) -> Result<BTreeSet<RecipientId>, StoreError> {
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .filter(|p| &p.id != exclude)
            .filter(|p| p.location.is_some_and(|loc| center.is_within(&loc, radius_meters)))
            .map(|p| p.id.clone())
            .collect())
    }

    async fn list_reports_descending(&self, limit: Option<u32>) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().await;
        let limit = limit.map(|l| l as usize).unwrap_or(reports.len());
        Ok(reports.iter().rev().take(limit).cloned().collect())
    }
}
