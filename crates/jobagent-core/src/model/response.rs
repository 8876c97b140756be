//! Applications ("responses") of users to vacancies

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ModelError;

/// Closed set of response states
///
/// The same set is enforced by a CHECK constraint on `responses.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ResponseStatus {
    pub const ALL: [ResponseStatus; 4] = [
        ResponseStatus::Pending,
        ResponseStatus::Accepted,
        ResponseStatus::Rejected,
        ResponseStatus::Withdrawn,
    ];

    /// Column value
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Pending => "pending",
            ResponseStatus::Accepted => "accepted",
            ResponseStatus::Rejected => "rejected",
            ResponseStatus::Withdrawn => "withdrawn",
        }
    }
}

impl FromStr for ResponseStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResponseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::UnknownStatus {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response about to be submitted
#[derive(Debug, Clone, PartialEq)]
pub struct NewResponse {
    pub user_uuid: Uuid,
    pub vacancy_uuid: Uuid,
    pub cover_letter: Option<String>,
    pub status: ResponseStatus,
}

impl NewResponse {
    /// A pending response with an optional cover letter
    pub fn new(user_uuid: Uuid, vacancy_uuid: Uuid, cover_letter: Option<&str>) -> Self {
        Self {
            user_uuid,
            vacancy_uuid,
            cover_letter: cover_letter.map(str::to_string),
            status: ResponseStatus::default(),
        }
    }

    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub response_uuid: Uuid,
    pub user_uuid: Uuid,
    pub vacancy_uuid: Uuid,
    pub cover_letter: Option<String>,
    pub status: ResponseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
