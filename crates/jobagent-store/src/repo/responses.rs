//! Responses repository

use std::str::FromStr;

use jobagent_core::model::{NewResponse, Response, ResponseStatus};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, text_conversion, time_at, to_millis, uuid_at};
use crate::errors::{from_rusqlite, not_found, Result};

const RESPONSE_COLUMNS: &str =
    "response_uuid, user_uuid, vacancy_uuid, cover_letter, status, created_at, updated_at";

fn map_response(row: &Row<'_>) -> rusqlite::Result<Response> {
    let status: String = row.get(4)?;
    Ok(Response {
        response_uuid: uuid_at(row, 0)?,
        user_uuid: uuid_at(row, 1)?,
        vacancy_uuid: uuid_at(row, 2)?,
        cover_letter: row.get(3)?,
        status: ResponseStatus::from_str(&status).map_err(|e| text_conversion(4, e))?,
        created_at: time_at(row, 5)?,
        updated_at: time_at(row, 6)?,
    })
}

/// SQLite repository for vacancy responses
pub struct ResponseRepo;

impl ResponseRepo {
    /// Record a response of a user to a vacancy
    ///
    /// # Errors
    /// `ForeignKeyViolation` when the user or vacancy does not exist.
    pub fn insert(conn: &Connection, new_response: &NewResponse) -> Result<Response> {
        let at = now();
        let response = Response {
            response_uuid: Uuid::new_v4(),
            user_uuid: new_response.user_uuid,
            vacancy_uuid: new_response.vacancy_uuid,
            cover_letter: new_response.cover_letter.clone(),
            status: new_response.status,
            created_at: at,
            updated_at: at,
        };

        conn.execute(
            "INSERT INTO responses (response_uuid, user_uuid, vacancy_uuid, cover_letter, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                response.response_uuid.to_string(),
                response.user_uuid.to_string(),
                response.vacancy_uuid.to_string(),
                response.cover_letter,
                response.status.as_str(),
                to_millis(response.created_at),
                to_millis(response.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(
            user_uuid = %response.user_uuid,
            vacancy_uuid = %response.vacancy_uuid,
            "response recorded"
        );
        Ok(response)
    }

    pub fn get(conn: &Connection, response_uuid: Uuid) -> Result<Option<Response>> {
        let sql = format!(
            "SELECT {} FROM responses WHERE response_uuid = ?1",
            RESPONSE_COLUMNS
        );
        conn.query_row(&sql, [response_uuid.to_string()], map_response)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Move a response to a new status and bump `updated_at`
    ///
    /// # Errors
    /// `NotFound` when no such response exists.
    pub fn update_status(
        conn: &Connection,
        response_uuid: Uuid,
        status: ResponseStatus,
    ) -> Result<Response> {
        let updated = conn
            .execute(
                "UPDATE responses SET status = ?1, updated_at = ?2 WHERE response_uuid = ?3",
                rusqlite::params![
                    status.as_str(),
                    to_millis(now()),
                    response_uuid.to_string()
                ],
            )
            .map_err(from_rusqlite)?;
        if updated == 0 {
            return Err(not_found(
                "update_response_status",
                &response_uuid.to_string(),
            ));
        }

        Self::get(conn, response_uuid)?
            .ok_or_else(|| not_found("update_response_status", &response_uuid.to_string()))
    }

    /// A user's responses, newest first
    pub fn list_for_user(conn: &Connection, user_uuid: Uuid) -> Result<Vec<Response>> {
        let sql = format!(
            "SELECT {} FROM responses WHERE user_uuid = ?1 ORDER BY created_at DESC, rowid DESC",
            RESPONSE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let responses = stmt
            .query_map([user_uuid.to_string()], map_response)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(responses)
    }
}
