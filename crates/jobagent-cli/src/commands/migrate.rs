//! Migration commands

use clap::{Args, Subcommand};
use jobagent_core::StoreConfig;
use jobagent_store::{db, MigrationRunner};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations in order
    Apply,
    /// List applied and pending migrations
    Status,
    /// Check the ledger against the embedded migrations
    Verify,
}

pub fn execute(args: MigrateArgs, config: &StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runner = MigrationRunner::embedded()?;
    let mut conn = db::open_configured(config)?;

    match args.command {
        MigrateCommand::Apply => {
            let report = runner.apply(&mut conn)?;
            for id in &report.applied {
                println!("applied {}", id);
            }
            if report.is_noop() {
                println!("Schema is up to date ({} migrations)", report.skipped.len());
            }
        }
        MigrateCommand::Status => {
            let status = runner.status(&conn)?;
            for applied in &status.applied {
                println!(
                    "applied  {}  {}  {}",
                    applied.migration_id,
                    applied.applied_at.to_rfc3339(),
                    applied.checksum
                );
            }
            for pending in &status.pending {
                println!("pending  {}", pending);
            }
        }
        MigrateCommand::Verify => {
            runner.verify(&conn)?;
            println!("Ledger matches {} embedded migrations", runner.set().len());
        }
    }

    Ok(())
}
