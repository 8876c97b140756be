//! Externally sourced job postings

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::require_text;
use crate::errors::ModelError;

/// A vacancy as supplied by the ingestion service
#[derive(Debug, Clone, PartialEq)]
pub struct NewVacancy {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
}

impl NewVacancy {
    /// Build a vacancy; title and URL must be non-empty
    pub fn new(title: &str, url: &str, description: Option<&str>) -> Result<Self, ModelError> {
        Ok(Self {
            title: require_text("title", title)?,
            url: require_text("url", url)?,
            description: description.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vacancy {
    pub vacancy_uuid: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
