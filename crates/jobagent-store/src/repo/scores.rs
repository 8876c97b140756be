//! Match scores repository
//!
//! Scores are append-only: every scoring run adds a row, and the current
//! score for a (user, vacancy) pair is the one with the newest
//! `calculated_at` (insertion order breaks ties).

use chrono::{DateTime, Utc};
use jobagent_core::model::{NewScore, UserVacancyScore};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, time_at, to_millis, uuid_at};
use crate::errors::{from_rusqlite, Result};

const SCORE_COLUMNS: &str = "score_uuid, user_uuid, vacancy_uuid, score, calculated_at";

fn map_score(row: &Row<'_>) -> rusqlite::Result<UserVacancyScore> {
    Ok(UserVacancyScore {
        score_uuid: uuid_at(row, 0)?,
        user_uuid: uuid_at(row, 1)?,
        vacancy_uuid: uuid_at(row, 2)?,
        score: row.get(3)?,
        calculated_at: time_at(row, 4)?,
    })
}

/// SQLite repository for user/vacancy match scores
pub struct ScoreRepo;

impl ScoreRepo {
    /// Append a score calculated now
    pub fn record(conn: &Connection, new_score: &NewScore) -> Result<UserVacancyScore> {
        Self::record_at(conn, new_score, now())
    }

    /// Append a score with an explicit calculation time
    ///
    /// # Errors
    /// `ForeignKeyViolation` when the user or vacancy does not exist.
    pub fn record_at(
        conn: &Connection,
        new_score: &NewScore,
        calculated_at: DateTime<Utc>,
    ) -> Result<UserVacancyScore> {
        let score = UserVacancyScore {
            score_uuid: Uuid::new_v4(),
            user_uuid: new_score.user_uuid,
            vacancy_uuid: new_score.vacancy_uuid,
            score: new_score.score,
            calculated_at,
        };

        conn.execute(
            "INSERT INTO user_vacancy_scores (score_uuid, user_uuid, vacancy_uuid, score, calculated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                score.score_uuid.to_string(),
                score.user_uuid.to_string(),
                score.vacancy_uuid.to_string(),
                score.score,
                to_millis(score.calculated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(score)
    }

    /// Every score of a pair, newest first
    pub fn history(
        conn: &Connection,
        user_uuid: Uuid,
        vacancy_uuid: Uuid,
    ) -> Result<Vec<UserVacancyScore>> {
        let sql = format!(
            "SELECT {} FROM user_vacancy_scores
             WHERE user_uuid = ?1 AND vacancy_uuid = ?2
             ORDER BY calculated_at DESC, rowid DESC",
            SCORE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let scores = stmt
            .query_map(
                [user_uuid.to_string(), vacancy_uuid.to_string()],
                map_score,
            )
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(scores)
    }

    /// Current score of a pair
    pub fn latest(
        conn: &Connection,
        user_uuid: Uuid,
        vacancy_uuid: Uuid,
    ) -> Result<Option<UserVacancyScore>> {
        let sql = format!(
            "SELECT {} FROM user_vacancy_scores
             WHERE user_uuid = ?1 AND vacancy_uuid = ?2
             ORDER BY calculated_at DESC, rowid DESC
             LIMIT 1",
            SCORE_COLUMNS
        );
        conn.query_row(
            &sql,
            [user_uuid.to_string(), vacancy_uuid.to_string()],
            map_score,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// A user's best-matching vacancies by current score
    pub fn top_for_user(
        conn: &Connection,
        user_uuid: Uuid,
        limit: usize,
    ) -> Result<Vec<UserVacancyScore>> {
        let sql = format!(
            "SELECT {} FROM user_vacancy_scores s
             WHERE s.user_uuid = ?1
               AND s.rowid = (
                   SELECT c.rowid FROM user_vacancy_scores c
                   WHERE c.user_uuid = s.user_uuid AND c.vacancy_uuid = s.vacancy_uuid
                   ORDER BY c.calculated_at DESC, c.rowid DESC
                   LIMIT 1)
             ORDER BY s.score DESC, s.vacancy_uuid
             LIMIT ?2",
            SCORE_COLUMNS
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let scores = stmt
            .query_map(rusqlite::params![user_uuid.to_string(), limit], map_score)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(scores)
    }
}
