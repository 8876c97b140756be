//! User profiles repository

use jobagent_core::model::UserProfile;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, time_at, to_millis, uuid_at};
use crate::errors::{from_rusqlite, not_found, Result};

const PROFILE_COLUMNS: &str = "profile_uuid, user_uuid, experience, created_at, updated_at";

fn map_profile(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        profile_uuid: uuid_at(row, 0)?,
        user_uuid: uuid_at(row, 1)?,
        experience: row.get(2)?,
        created_at: time_at(row, 3)?,
        updated_at: time_at(row, 4)?,
    })
}

/// SQLite repository for user profiles
pub struct ProfileRepo;

impl ProfileRepo {
    /// Create or update the profile of a user
    ///
    /// # Errors
    /// `ForeignKeyViolation` when the user does not exist.
    pub fn upsert(
        conn: &Connection,
        user_uuid: Uuid,
        experience: Option<&str>,
    ) -> Result<UserProfile> {
        conn.execute(
            "INSERT INTO user_profiles (profile_uuid, user_uuid, experience, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(user_uuid) DO UPDATE SET
                experience = excluded.experience,
                updated_at = excluded.updated_at",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                user_uuid.to_string(),
                experience,
                to_millis(now()),
            ],
        )
        .map_err(from_rusqlite)?;

        Self::get_by_user(conn, user_uuid)?
            .ok_or_else(|| not_found("upsert_profile", &user_uuid.to_string()))
    }

    pub fn get_by_user(conn: &Connection, user_uuid: Uuid) -> Result<Option<UserProfile>> {
        let sql = format!(
            "SELECT {} FROM user_profiles WHERE user_uuid = ?1",
            PROFILE_COLUMNS
        );
        conn.query_row(&sql, [user_uuid.to_string()], map_profile)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Remove a user's profile; returns false if there was none
    pub fn delete_for_user(conn: &Connection, user_uuid: Uuid) -> Result<bool> {
        let deleted = conn
            .execute(
                "DELETE FROM user_profiles WHERE user_uuid = ?1",
                [user_uuid.to_string()],
            )
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }
}
