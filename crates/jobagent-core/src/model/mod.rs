//! Record types persisted by the schema store
//!
//! `New*` types are what collaborators hand to the repositories; they are
//! validated on construction so invalid rows never reach SQL. The plain
//! types mirror stored rows.

pub mod profile;
pub mod response;
pub mod score;
pub mod token;
pub mod user;
pub mod vacancy;

pub use profile::UserProfile;
pub use response::{NewResponse, Response, ResponseStatus};
pub use score::{NewScore, UserVacancyScore};
pub use token::ExternalToken;
pub use user::{Email, NewUser, PasswordHash, User};
pub use vacancy::{NewVacancy, Vacancy};

use crate::errors::ModelError;

/// Reject empty or whitespace-only text, returning the trimmed value
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}
