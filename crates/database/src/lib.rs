//! SQLite store for the outbreak alert pipeline.
//!
//! This crate provides async database operations for reports and recipient
//! profiles using SQLx with SQLite, and implements
//! [`outbreak_core::ReportStore`] on [`Database`].
//!
//! # Example
//!
//! ```no_run
//! use database::{profile, Database};
//! use outbreak_core::{GeoPoint, RecipientId, RecipientProfile, ReportStore, Role};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:outbreak.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Register a fielder with a last-known location
//!     let profile = RecipientProfile {
//!         id: RecipientId::new("c27fb365-0c84-4cf2-8555-814bb065e448")?,
//!         role: Role::Fielder,
//!         full_name: Some("Bob".to_string()),
//!         location: Some(GeoPoint::new(88.36, 22.57)?),
//!     };
//!     profile::upsert_profile(db.pool(), &profile).await?;
//!
//!     // File a report through the store interface
//!     let report = db
//!         .insert_report(&profile.id, GeoPoint::new(88.37, 22.58)?, "Initial Report")
//!         .await?;
//!     println!("report #{}", report.id);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod profile;
pub mod report;
mod store;

pub use error::{DatabaseError, Result};
pub use models::{ProfileRow, ReportRow};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough for concurrent intake writes alongside resolver reads.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/outbreak.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outbreak_core::{GeoPoint, RecipientId, RecipientProfile, Role};

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_profile_crud() {
        let db = test_db().await;

        // Create
        let profile = RecipientProfile {
            id: RecipientId::new("test-uuid-123").unwrap(),
            role: Role::Fielder,
            full_name: Some("Alice".to_string()),
            location: None,
        };
        profile::upsert_profile(db.pool(), &profile).await.unwrap();

        // Read
        let fetched = profile::get_profile(db.pool(), "test-uuid-123").await.unwrap();
        assert_eq!(fetched, profile);

        // Update location
        let point = GeoPoint::new(88.36, 22.57).unwrap();
        profile::update_location(db.pool(), "test-uuid-123", Some(point))
            .await
            .unwrap();
        let fetched = profile::get_profile(db.pool(), "test-uuid-123").await.unwrap();
        assert_eq!(fetched.location, Some(point));

        // Upsert replaces role
        let promoted = RecipientProfile {
            role: Role::Operator,
            ..fetched.clone()
        };
        profile::upsert_profile(db.pool(), &promoted).await.unwrap();
        let counts = profile::count_profiles_by_role(db.pool()).await.unwrap();
        assert_eq!(counts, vec![(Role::Operator, 1)]);

        // List
        let profiles = profile::list_profiles(db.pool()).await.unwrap();
        assert_eq!(profiles.len(), 1);

        // Delete
        profile::delete_profile(db.pool(), "test-uuid-123").await.unwrap();
        let result = profile::get_profile(db.pool(), "test-uuid-123").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        let result = profile::update_location(db.pool(), "test-uuid-123", None).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_report_listing() {
        let db = test_db().await;
        let point = GeoPoint::new(88.36, 22.57).unwrap();

        for (reporter, symptom) in [("a", "fever"), ("b", "coughing"), ("a", "lesions")] {
            report::insert_report(db.pool(), reporter, point, symptom)
                .await
                .unwrap();
        }

        assert_eq!(report::count_reports(db.pool()).await.unwrap(), 3);

        let latest = report::list_reports(db.pool(), Some(2)).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].symptom, "lesions");
        assert_eq!(latest[1].symptom, "coughing");
        assert_eq!(latest[1].reporter_id.as_str(), "b");
    }
}
