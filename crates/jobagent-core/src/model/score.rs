//! Relevance scores between users and vacancies
//!
//! Scores are append-only history: several rows may exist for the same
//! (user, vacancy) pair and the newest `calculated_at` is the current one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub user_uuid: Uuid,
    pub vacancy_uuid: Uuid,
    pub score: f64,
}

impl NewScore {
    pub fn new(user_uuid: Uuid, vacancy_uuid: Uuid, score: f64) -> Result<Self, ModelError> {
        if !score.is_finite() {
            return Err(ModelError::NonFiniteScore { value: score });
        }
        Ok(Self {
            user_uuid,
            vacancy_uuid,
            score,
        })
    }
}

/// One historical score row; higher means more relevant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserVacancyScore {
    pub score_uuid: Uuid,
    pub user_uuid: Uuid,
    pub vacancy_uuid: Uuid,
    pub score: f64,
    pub calculated_at: DateTime<Utc>,
}
