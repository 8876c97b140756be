//! Migration framework
//!
//! Provides:
//! - Embedded SQL units identified by a `NNN_name` id
//! - Declared-order validation (duplicates, out-of-order units, gaps)
//! - The `schema_version` ledger with per-unit SHA-256 checksums
//! - A sequencer applying each pending unit in its own locked transaction

mod checksums;
mod embedded;
mod ledger;
mod runner;
mod set;

pub use checksums::compute_checksum;
pub use embedded::get_migrations;
pub use ledger::{AppliedMigration, LEDGER_TABLE};
pub use runner::{apply_migrations, migration_status, ApplyReport, MigrationRunner, MigrationStatus};
pub use set::{Migration, MigrationSet};
