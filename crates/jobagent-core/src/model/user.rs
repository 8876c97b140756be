//! User accounts

use chrono::{DateTime, Utc};
use jobagent_core_types::Sensitive;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::require_text;
use crate::errors::ModelError;

/// Normalized email address (trimmed, ASCII-lowercased)
///
/// The `users.email` CHECK applies the same rule, so uniqueness holds on
/// this normalized form for every writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let normalized = raw
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .to_ascii_lowercase();
        let valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !normalized.bytes().any(|b| b.is_ascii_whitespace())
            }
            None => false,
        };
        if !valid {
            return Err(ModelError::InvalidEmail {
                email: raw.to_string(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A password hash in PHC (`$argon2id$...`) or modular crypt (`$2b$...`) form
///
/// The store never accepts anything that does not look like a hash, so a
/// plaintext password cannot be written by mistake. Hashing itself belongs
/// to the auth service.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(Sensitive<String>);

impl PasswordHash {
    /// Accept `$<id>$<rest>` with a non-empty id and rest and no whitespace;
    /// mirrors the `users.password_hash` CHECK
    pub fn from_hash(hash: impl Into<String>) -> Result<Self, ModelError> {
        let hash = hash.into();
        let shaped = match hash.strip_prefix('$').and_then(|rest| rest.split_once('$')) {
            Some((id, tail)) => !id.is_empty() && !tail.is_empty(),
            None => false,
        };
        if !shaped || hash.bytes().any(|b| b.is_ascii_whitespace()) {
            return Err(ModelError::PlaintextPassword);
        }
        Ok(Self(Sensitive::new(hash)))
    }

    /// Hash string as stored in the `password_hash` column
    pub fn expose(&self) -> &str {
        self.0.expose()
    }
}

/// Registration data for a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password_hash: PasswordHash,
}

impl NewUser {
    pub fn new(username: &str, email: &str, password_hash: &str) -> Result<Self, ModelError> {
        Ok(Self {
            username: require_text("username", username)?,
            email: Email::parse(email)?,
            password_hash: PasswordHash::from_hash(password_hash)?,
        })
    }
}

/// A stored user row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub user_uuid: Uuid,
    pub username: String,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
