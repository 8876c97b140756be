//! Database connection management
//!
//! Every connection handed out here enforces foreign keys; the schema's
//! RESTRICT and CASCADE policies depend on it.

use crate::errors::{from_rusqlite, Result};
use jobagent_core::{ExError, ExErrorKind, StoreConfig};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open and configure a SQLite database at the given path
///
/// The parent directory is created if missing.
pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("open_db")
                .with_message(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }
    let conn = Connection::open(path).map_err(from_rusqlite)?;
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;
    configure(&conn)?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")
        .map_err(from_rusqlite)?;
    Ok(conn)
}

/// Open the database named by the configuration
pub fn open_configured(config: &StoreConfig) -> Result<Connection> {
    open(&config.database_path, config.busy_timeout())
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Per-connection settings
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(from_rusqlite)
}
