//! Repository layer for the job-search schema
//!
//! One repository per record type. Each takes a `&Connection`, so callers
//! choose whether a call runs alone or inside their own transaction.
//! Constraint failures come back classified (`AlreadyExists`,
//! `ForeignKeyViolation`, `ConstraintViolation`) and are never swallowed.

pub mod profiles;
pub mod responses;
pub mod scores;
pub mod tokens;
pub mod users;
pub mod vacancies;

pub use profiles::ProfileRepo;
pub use responses::ResponseRepo;
pub use scores::ScoreRepo;
pub use tokens::TokenRepo;
pub use users::UserRepo;
pub use vacancies::VacancyRepo;

use chrono::{DateTime, TimeZone, Utc};
use jobagent_core::errors::{ExError, ExErrorKind};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use crate::errors::Result;

/// Timestamps are stored as Unix milliseconds
pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn from_millis(field: &str, millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("decode_timestamp")
            .with_message(format!("{} is out of range: {}", field, millis))
    })
}

/// Current time truncated to the stored precision
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(to_millis(now)).single().unwrap_or(now)
}

pub(crate) fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

/// Wrap a parse failure on a stored text column
pub(crate) fn text_conversion<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
