//! Users repository

use jobagent_core::model::{Email, NewUser, PasswordHash, User};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, text_conversion, time_at, to_millis, uuid_at};
use crate::errors::{from_rusqlite, not_found, Result};

const USER_COLUMNS: &str = "user_uuid, username, email, password_hash, created_at, updated_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let email: String = row.get(2)?;
    let password_hash: String = row.get(3)?;
    Ok(User {
        user_uuid: uuid_at(row, 0)?,
        username: row.get(1)?,
        email: Email::parse(&email).map_err(|e| text_conversion(2, e))?,
        password_hash: PasswordHash::from_hash(password_hash).map_err(|e| text_conversion(3, e))?,
        created_at: time_at(row, 4)?,
        updated_at: time_at(row, 5)?,
    })
}

/// SQLite repository for users
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user
    ///
    /// # Errors
    /// `AlreadyExists` when the email is taken.
    pub fn insert(conn: &Connection, new_user: &NewUser) -> Result<User> {
        let at = now();
        let user = User {
            user_uuid: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: at,
            updated_at: at,
        };

        conn.execute(
            "INSERT INTO users (user_uuid, username, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                user.user_uuid.to_string(),
                user.username,
                user.email.as_str(),
                user.password_hash.expose(),
                to_millis(user.created_at),
                to_millis(user.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(user_uuid = %user.user_uuid, "user inserted");
        Ok(user)
    }

    /// Insert or refresh a user keyed by email
    ///
    /// An existing row keeps its uuid and `created_at`; username, password
    /// hash and `updated_at` are replaced.
    pub fn save(conn: &Connection, new_user: &NewUser) -> Result<User> {
        conn.execute(
            "INSERT INTO users (user_uuid, username, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(email) DO UPDATE SET
                username = excluded.username,
                password_hash = excluded.password_hash,
                updated_at = excluded.updated_at",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                new_user.username,
                new_user.email.as_str(),
                new_user.password_hash.expose(),
                to_millis(now()),
            ],
        )
        .map_err(from_rusqlite)?;

        Self::get_by_email(conn, &new_user.email)?
            .ok_or_else(|| not_found("save_user", new_user.email.as_str()))
    }

    pub fn get(conn: &Connection, user_uuid: Uuid) -> Result<Option<User>> {
        Self::find_one(conn, "user_uuid", &user_uuid.to_string())
    }

    /// Oldest user with the given username
    pub fn get_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
        Self::find_one(conn, "username", username)
    }

    pub fn get_by_email(conn: &Connection, email: &Email) -> Result<Option<User>> {
        Self::find_one(conn, "email", email.as_str())
    }

    /// Delete a user; returns false if no such user
    ///
    /// Tokens are removed with the user. A remaining profile, response or
    /// score makes this fail with `ForeignKeyViolation`.
    pub fn delete(conn: &Connection, user_uuid: Uuid) -> Result<bool> {
        let deleted = conn
            .execute(
                "DELETE FROM users WHERE user_uuid = ?1",
                [user_uuid.to_string()],
            )
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }

    fn find_one(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} = ?1 ORDER BY created_at, user_uuid LIMIT 1",
            USER_COLUMNS, column
        );
        conn.query_row(&sql, [value], map_user)
            .optional()
            .map_err(from_rusqlite)
    }
}
