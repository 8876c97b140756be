//! The applied-version ledger
//!
//! `schema_version` records every applied unit with its checksum. It is
//! created on first use and never dropped.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use super::set::Migration;
use crate::errors::{from_rusqlite, Result};
use crate::repo::{from_millis, to_millis};

pub const LEDGER_TABLE: &str = "schema_version";

/// A ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub migration_id: String,
    pub applied_at: DateTime<Utc>,
    pub checksum: String,
}

/// Create the schema_version table if it doesn't exist
pub(crate) fn ensure_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

pub(crate) fn table_exists(conn: &Connection) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [LEDGER_TABLE],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .map_err(from_rusqlite)
}

/// All ledger rows in application order
pub(crate) fn load(conn: &Connection) -> Result<Vec<AppliedMigration>> {
    let mut stmt = conn
        .prepare("SELECT migration_id, applied_at, checksum FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|(migration_id, applied_at, checksum)| {
            Ok(AppliedMigration {
                migration_id,
                applied_at: from_millis("applied_at", applied_at)?,
                checksum,
            })
        })
        .collect()
}

pub(crate) fn is_applied(conn: &Connection, migration_id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM schema_version WHERE migration_id = ?1",
        [migration_id],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .map_err(from_rusqlite)
}

/// Record a unit as applied; must run inside the unit's transaction
pub(crate) fn record(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![migration.id(), to_millis(Utc::now()), migration.checksum()],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}
