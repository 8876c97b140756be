//! Job agent core - domain model and shared facilities
//!
//! This crate provides the pieces every other crate in the workspace builds on:
//! - Record types for users, profiles, vacancies, responses, scores and
//!   external tokens, with their write-boundary validation
//! - The canonical error facility (`ExError`, `ExErrorKind`, `ModelError`)
//! - The structured logging facility and its test capture layer
//! - Environment-driven configuration

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use config::StoreConfig;
pub use errors::{ExError, ExErrorKind, ModelError, Result};
pub use model::{
    Email, ExternalToken, NewResponse, NewScore, NewUser, NewVacancy, PasswordHash, Response,
    ResponseStatus, User, UserProfile, UserVacancyScore, Vacancy,
};
