//! Job agent CLI
//!
//! Operator commands for the job agent schema store

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobagent_core::logging_facility;
use jobagent_core::StoreConfig;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "jobagent")]
#[command(about = "Job agent - schema store operations", long_about = None)]
struct Cli {
    /// Env file loaded before JOBAGENT_* variables are read
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Database file, overrides JOBAGENT_DATABASE_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Schema migrations (apply, status, verify)
    Migrate(commands::migrate::MigrateArgs),
    /// Print a fresh base64 key for JOBAGENT_TOKEN_KEY
    TokenKey,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StoreConfig::load(cli.env_file.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    logging_facility::init(config.log_profile);

    match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args, &config),
        Commands::TokenKey => commands::token_key::execute(),
    }
}
