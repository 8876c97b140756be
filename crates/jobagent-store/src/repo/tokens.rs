//! External (hh.ru) access tokens repository
//!
//! Token values are sealed before they reach the database and only leave
//! this module wrapped in `Sensitive`. A user may hold several token rows;
//! the newest one is current. Tokens are deleted together with their user.

use chrono::{DateTime, Utc};
use jobagent_core::model::ExternalToken;
use jobagent_core_types::Sensitive;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use super::{now, time_at, to_millis, uuid_at};
use crate::errors::{from_rusqlite, Result};
use crate::secrets::TokenCipher;

/// Row as stored, token still sealed
struct SealedToken {
    token_uuid: Uuid,
    user_uuid: Uuid,
    sealed: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// SQLite repository for external access tokens
#[derive(Debug)]
pub struct TokenRepo<'a> {
    cipher: &'a TokenCipher,
}

impl<'a> TokenRepo<'a> {
    pub fn new(cipher: &'a TokenCipher) -> Self {
        Self { cipher }
    }

    /// Store a new token for a user
    ///
    /// # Errors
    /// `ForeignKeyViolation` when the user does not exist, `Crypto` when
    /// sealing fails.
    pub fn store(
        &self,
        conn: &Connection,
        user_uuid: Uuid,
        access_token: Sensitive<String>,
        expires_at: DateTime<Utc>,
    ) -> Result<ExternalToken> {
        let sealed = self.cipher.seal(&access_token)?;
        let at = now();
        let token = ExternalToken {
            token_uuid: Uuid::new_v4(),
            user_uuid,
            access_token,
            expires_at,
            created_at: at,
            updated_at: at,
        };

        conn.execute(
            "INSERT INTO hh_tokens (token_uuid, user_uuid, hh_access_token, expires_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                token.token_uuid.to_string(),
                token.user_uuid.to_string(),
                sealed,
                to_millis(token.expires_at),
                to_millis(token.created_at),
                to_millis(token.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(
            user_uuid = %token.user_uuid,
            expires_at = %token.expires_at,
            "external token stored"
        );
        Ok(token)
    }

    /// Newest token of a user, expired or not
    pub fn latest_for_user(
        &self,
        conn: &Connection,
        user_uuid: Uuid,
    ) -> Result<Option<ExternalToken>> {
        let row = conn
            .query_row(
                "SELECT token_uuid, user_uuid, hh_access_token, expires_at, created_at, updated_at
                 FROM hh_tokens
                 WHERE user_uuid = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 1",
                [user_uuid.to_string()],
                |row| {
                    Ok(SealedToken {
                        token_uuid: uuid_at(row, 0)?,
                        user_uuid: uuid_at(row, 1)?,
                        sealed: row.get(2)?,
                        expires_at: time_at(row, 3)?,
                        created_at: time_at(row, 4)?,
                        updated_at: time_at(row, 5)?,
                    })
                },
            )
            .optional()
            .map_err(from_rusqlite)?;

        row.map(|sealed| self.open(sealed)).transpose()
    }

    /// Newest token of a user if it has not expired at `now`
    pub fn valid_for_user(
        &self,
        conn: &Connection,
        user_uuid: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ExternalToken>> {
        Ok(self
            .latest_for_user(conn, user_uuid)?
            .filter(|token| !token.is_expired(now)))
    }

    /// Remove all tokens of a user; returns how many were removed
    pub fn delete_for_user(&self, conn: &Connection, user_uuid: Uuid) -> Result<usize> {
        conn.execute(
            "DELETE FROM hh_tokens WHERE user_uuid = ?1",
            [user_uuid.to_string()],
        )
        .map_err(from_rusqlite)
    }

    fn open(&self, row: SealedToken) -> Result<ExternalToken> {
        let access_token = self.cipher.open(&row.sealed).map_err(|e| {
            e.with_entity_id(row.token_uuid.to_string())
        })?;
        Ok(ExternalToken {
            token_uuid: row.token_uuid,
            user_uuid: row.user_uuid,
            access_token,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
