//! Migration runner
//!
//! Applies units in version order, each inside its own IMMEDIATE
//! transaction. The write lock taken by that transaction is the claim on
//! the unit: the ledger is re-checked under the lock, so two processes
//! racing on one database apply every unit exactly once.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use jobagent_core::errors::{ExError, ExErrorKind};
use jobagent_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::{Connection, TransactionBehavior};

use super::ledger::{self, AppliedMigration};
use super::set::{Migration, MigrationSet};
use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, ordering_error, Result};

/// Outcome of one `apply` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Units applied by this run, in order
    pub applied: Vec<String>,
    /// Units found already recorded in the ledger
    pub skipped: Vec<String>,
}

impl ApplyReport {
    /// True when the run changed nothing
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applied and pending units, both in version order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied: Vec<AppliedMigration>,
    pub pending: Vec<String>,
}

impl MigrationStatus {
    /// True when nothing is pending
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Sequencer for a validated migration set
#[derive(Debug, Clone)]
pub struct MigrationRunner {
    set: MigrationSet,
}

impl MigrationRunner {
    pub fn new(set: MigrationSet) -> Self {
        Self { set }
    }

    /// Runner over the embedded units
    pub fn embedded() -> Result<Self> {
        Ok(Self::new(MigrationSet::embedded()?))
    }

    pub fn set(&self) -> &MigrationSet {
        &self.set
    }

    /// Apply all pending units
    ///
    /// Stops at the first failing unit; that unit is rolled back and not
    /// recorded, later units are not attempted.
    ///
    /// # Errors
    /// `MigrationOrder` / `ChecksumMismatch` when the ledger disagrees with
    /// the set (nothing is applied), `MigrationFailed` naming the unit that
    /// failed.
    pub fn apply(&self, conn: &mut Connection) -> Result<ApplyReport> {
        let started = Instant::now();
        log_op_start!("apply_migrations", unit_count = self.set.len());

        let result = self.apply_pending(conn);

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(report) => {
                log_op_end!(
                    "apply_migrations",
                    duration_ms = duration_ms,
                    applied_count = report.applied.len(),
                    skipped_count = report.skipped.len()
                );
            }
            Err(err) => {
                log_op_error!(
                    "apply_migrations",
                    err.clone(),
                    duration_ms = duration_ms,
                    migration_id = err.migration_id().unwrap_or("")
                );
            }
        }
        result
    }

    /// Report applied and pending units without changing anything
    pub fn status(&self, conn: &Connection) -> Result<MigrationStatus> {
        let applied = if ledger::table_exists(conn)? {
            ledger::load(conn)?
        } else {
            Vec::new()
        };

        let applied_ids: HashSet<&str> = applied.iter().map(|a| a.migration_id.as_str()).collect();
        let pending = self
            .set
            .iter()
            .filter(|(_, m)| !applied_ids.contains(m.id()))
            .map(|(_, m)| m.id().to_string())
            .collect();

        Ok(MigrationStatus { applied, pending })
    }

    /// Check the ledger against the set without applying anything
    ///
    /// # Errors
    /// Same ledger errors `apply` refuses to run with.
    pub fn verify(&self, conn: &Connection) -> Result<()> {
        if !ledger::table_exists(conn)? {
            return Ok(());
        }
        self.check_ledger(&ledger::load(conn)?)
    }

    fn apply_pending(&self, conn: &mut Connection) -> Result<ApplyReport> {
        ledger::ensure_table(conn)?;
        let applied = ledger::load(conn)?;
        self.check_ledger(&applied)?;

        let applied_ids: HashSet<&str> = applied.iter().map(|a| a.migration_id.as_str()).collect();
        let mut report = ApplyReport::default();

        for (_, unit) in self.set.iter() {
            if applied_ids.contains(unit.id()) {
                report.skipped.push(unit.id().to_string());
                continue;
            }
            if apply_unit(conn, unit)? {
                report.applied.push(unit.id().to_string());
            } else {
                report.skipped.push(unit.id().to_string());
            }
        }

        Ok(report)
    }

    /// Every ledger row must name a known unit with an unchanged checksum,
    /// and no pending unit may sit below an applied one.
    fn check_ledger(&self, applied: &[AppliedMigration]) -> Result<()> {
        let mut highest_applied: Option<(u32, &str)> = None;

        for row in applied {
            let (version, unit) = self.set.get(&row.migration_id).ok_or_else(|| {
                ordering_error(
                    &row.migration_id,
                    "Ledger records a migration unknown to this build",
                )
            })?;

            let checksum = unit.checksum();
            if checksum != row.checksum {
                return Err(checksum_mismatch(&row.migration_id, &row.checksum, &checksum));
            }

            if highest_applied.map_or(true, |(v, _)| version > v) {
                highest_applied = Some((version, unit.id()));
            }
        }

        if let Some((highest, highest_id)) = highest_applied {
            let applied_ids: HashSet<&str> =
                applied.iter().map(|a| a.migration_id.as_str()).collect();
            let gap = self
                .set
                .iter()
                .find(|(v, m)| *v < highest && !applied_ids.contains(m.id()));
            if let Some((_, missing)) = gap {
                return Err(ordering_error(
                    missing.id(),
                    &format!("Migration is pending but later unit {} is applied", highest_id),
                ));
            }
        }

        Ok(())
    }
}

/// Apply one unit; returns false when another process claimed it first
fn apply_unit(conn: &mut Connection, unit: &Migration) -> Result<bool> {
    let started = Instant::now();
    log_op_start!("apply_migration", migration_id = unit.id());

    let result = run_unit_transaction(conn, unit);

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(applied) => {
            log_op_end!(
                "apply_migration",
                duration_ms = duration_ms,
                migration_id = unit.id(),
                applied = *applied
            );
        }
        Err(err) => {
            log_op_error!(
                "apply_migration",
                err.clone(),
                duration_ms = duration_ms,
                migration_id = unit.id()
            );
        }
    }
    result
}

fn run_unit_transaction(conn: &mut Connection, unit: &Migration) -> Result<bool> {
    let fail = |cause: ExError| migration_error(unit.id(), cause);

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| fail(from_rusqlite(e)))?;

    if ledger::is_applied(&tx, unit.id()).map_err(fail)? {
        tracing::debug!(migration_id = unit.id(), "unit already claimed by another writer");
        return Ok(false);
    }

    let before = table_schemas(&tx).map_err(fail)?;
    tx.execute_batch(unit.sql())
        .map_err(|e| fail(from_rusqlite(e)))?;
    let after = table_schemas(&tx).map_err(fail)?;
    let mut touched: Vec<&str> = after
        .iter()
        .filter(|(name, sql)| before.get(*name) != Some(*sql))
        .map(|(name, _)| name.as_str())
        .collect();
    touched.sort_unstable();
    check_schema_references(&tx, &touched).map_err(fail)?;
    ledger::record(&tx, unit).map_err(fail)?;

    // Dropping an uncommitted transaction rolls it back on every error path
    tx.commit().map_err(|e| fail(from_rusqlite(e)))?;
    Ok(true)
}

/// Table name to `CREATE` statement for every user table
fn table_schemas(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name, COALESCE(sql, '') FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .map_err(from_rusqlite)?;
    let schemas = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<_, _>>()
        .map_err(from_rusqlite)?;
    Ok(schemas)
}

/// SQLite accepts foreign keys to tables that do not exist yet; a unit
/// that leaves such a reference behind was applied out of order.
///
/// Only `tables` are checked, so tables the unit did not create or alter
/// never fail it.
fn check_schema_references(conn: &Connection, tables: &[&str]) -> Result<()> {
    let existing = table_schemas(conn)?;
    let mut fk_stmt = conn
        .prepare("SELECT DISTINCT \"table\" FROM pragma_foreign_key_list(?1)")
        .map_err(from_rusqlite)?;

    for table in tables {
        let parents: Vec<String> = fk_stmt
            .query_map([table], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<_, _>>()
            .map_err(from_rusqlite)?;

        if let Some(missing) = parents.iter().find(|p| !existing.contains_key(p.as_str())) {
            return Err(ExError::new(ExErrorKind::ForeignKeyViolation)
                .with_op("check_schema_references")
                .with_entity_id(*table)
                .with_message(format!(
                    "Table {} references missing table {}",
                    table, missing
                )));
        }
    }

    Ok(())
}

/// Apply all pending embedded migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<ApplyReport> {
    MigrationRunner::embedded()?.apply(conn)
}

/// Applied and pending embedded migrations
pub fn migration_status(conn: &Connection) -> Result<MigrationStatus> {
    MigrationRunner::embedded()?.status(conn)
}
