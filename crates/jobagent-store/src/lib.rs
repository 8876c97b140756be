//! Job agent store - SQLite persistence for the job-search schema
//!
//! Provides:
//! - Embedded, versioned SQL migrations and the sequencer that applies them
//! - Connection management with foreign keys enforced
//! - Repositories for users, profiles, vacancies, responses, scores and
//!   external tokens
//! - Field-level sealing of external access tokens

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod secrets;

// Re-export key types
pub use errors::Result;
pub use migrations::{apply_migrations, migration_status, MigrationRunner};
pub use repo::{ProfileRepo, ResponseRepo, ScoreRepo, TokenRepo, UserRepo, VacancyRepo};
pub use secrets::TokenCipher;
