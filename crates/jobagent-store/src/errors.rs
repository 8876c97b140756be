//! Error handling for jobagent-store
//!
//! Maps SQLite failures and store-specific conditions onto the canonical
//! `ExError` facility.

use jobagent_core::errors::{ExError, ExErrorKind};
use rusqlite::ffi;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Wrap the cause of a failed migration unit
pub fn migration_error(migration_id: &str, cause: ExError) -> ExError {
    ExError::new(ExErrorKind::MigrationFailed)
        .with_op("migration")
        .with_migration_id(migration_id)
        .with_message(format!("Migration {} failed and was rolled back", migration_id))
        .with_source(cause)
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ChecksumMismatch)
        .with_op("migration_checksum")
        .with_migration_id(migration_id)
        .with_message(format!(
            "Checksum mismatch for migration {}: ledger has {}, embedded SQL is {}",
            migration_id, expected, actual
        ))
}

/// Create a migration ordering error (duplicate, out of order, gap, unknown)
pub fn ordering_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::MigrationOrder)
        .with_op("migration_order")
        .with_migration_id(migration_id)
        .with_message(reason.to_string())
}

/// Create a not-found error for a row addressed by id
pub fn not_found(op: &str, entity_id: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op.to_string())
        .with_entity_id(entity_id)
        .with_message("Row not found")
}

/// Create a token sealing error
pub fn crypto_error(op: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Crypto)
        .with_op(op.to_string())
        .with_message(reason.to_string())
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures are classified by SQLite's extended result code so
/// callers can tell a duplicate email from a dangling reference.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    ExErrorKind::AlreadyExists
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ExErrorKind::ForeignKeyViolation,
                _ => ExErrorKind::ConstraintViolation,
            }
        }
        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            ExErrorKind::Serialization
        }
        _ => ExErrorKind::Persistence,
    };

    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}
