//! Recipient profile storage.
//!
//! Profiles are maintained out-of-band (registration, location updates);
//! the alert pipeline only reads them.

use outbreak_core::{GeoPoint, RecipientProfile, Role};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::ProfileRow;

/// Create or replace a profile.
pub async fn upsert_profile(pool: &SqlitePool, profile: &RecipientProfile) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, role, full_name, longitude, latitude)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            role = excluded.role,
            full_name = excluded.full_name,
            longitude = excluded.longitude,
            latitude = excluded.latitude,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(profile.id.as_str())
    .bind(profile.role.as_str())
    .bind(profile.full_name.as_deref())
    .bind(profile.location.map(|p| p.longitude()))
    .bind(profile.location.map(|p| p.latitude()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a profile by ID.
pub async fn get_profile(pool: &SqlitePool, id: &str) -> Result<RecipientProfile> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT id, role, full_name, longitude, latitude, updated_at
        FROM profiles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Profile",
        id: id.to_string(),
    })?;

    RecipientProfile::try_from(row)
}

/// Set or clear a profile's last-known location.
pub async fn update_location(
    pool: &SqlitePool,
    id: &str,
    location: Option<GeoPoint>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE profiles
        SET longitude = ?, latitude = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(location.map(|p| p.longitude()))
    .bind(location.map(|p| p.latitude()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Profile",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a profile by ID.
pub async fn delete_profile(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM profiles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Profile",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all profiles.
pub async fn list_profiles(pool: &SqlitePool) -> Result<Vec<RecipientProfile>> {
    let rows = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT id, role, full_name, longitude, latitude, updated_at
        FROM profiles
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(RecipientProfile::try_from).collect()
}

/// Profiles with a location inside the latitude band `[south, north]`.
///
/// This is the coarse SQL prefilter for radius queries; callers apply the
/// exact distance check.
pub async fn located_profiles_in_band(
    pool: &SqlitePool,
    south: f64,
    north: f64,
) -> Result<Vec<RecipientProfile>> {
    let rows = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT id, role, full_name, longitude, latitude, updated_at
        FROM profiles
        WHERE latitude IS NOT NULL
          AND longitude IS NOT NULL
          AND latitude BETWEEN ? AND ?
        "#,
    )
    .bind(south)
    .bind(north)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(RecipientProfile::try_from).collect()
}

/// Count profiles grouped by role.
pub async fn count_profiles_by_role(pool: &SqlitePool) -> Result<Vec<(Role, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT role, COUNT(*) as count
        FROM profiles
        GROUP BY role
        ORDER BY role
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(role, count)| {
            role.parse::<Role>()
                .map(|role| (role, count))
                .map_err(|e| DatabaseError::Corrupt {
                    entity: "Profile",
                    id: format!("role={role}"),
                    reason: e.to_string(),
                })
        })
        .collect()
}
