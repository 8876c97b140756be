//! Vacancies repository

use jobagent_core::model::{NewVacancy, Vacancy};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, time_at, to_millis, uuid_at};
use crate::errors::{from_rusqlite, Result};

const VACANCY_COLUMNS: &str = "vacancy_uuid, title, description, url, created_at, updated_at";

fn map_vacancy(row: &Row<'_>) -> rusqlite::Result<Vacancy> {
    Ok(Vacancy {
        vacancy_uuid: uuid_at(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        url: row.get(3)?,
        created_at: time_at(row, 4)?,
        updated_at: time_at(row, 5)?,
    })
}

/// SQLite repository for vacancies
pub struct VacancyRepo;

impl VacancyRepo {
    pub fn insert(conn: &Connection, new_vacancy: &NewVacancy) -> Result<Vacancy> {
        let at = now();
        let vacancy = Vacancy {
            vacancy_uuid: Uuid::new_v4(),
            title: new_vacancy.title.clone(),
            description: new_vacancy.description.clone(),
            url: new_vacancy.url.clone(),
            created_at: at,
            updated_at: at,
        };

        conn.execute(
            "INSERT INTO vacancies (vacancy_uuid, title, description, url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                vacancy.vacancy_uuid.to_string(),
                vacancy.title,
                vacancy.description,
                vacancy.url,
                to_millis(vacancy.created_at),
                to_millis(vacancy.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(vacancy)
    }

    pub fn get(conn: &Connection, vacancy_uuid: Uuid) -> Result<Option<Vacancy>> {
        let sql = format!(
            "SELECT {} FROM vacancies WHERE vacancy_uuid = ?1",
            VACANCY_COLUMNS
        );
        conn.query_row(&sql, [vacancy_uuid.to_string()], map_vacancy)
            .optional()
            .map_err(from_rusqlite)
    }

    /// All vacancies, oldest first
    pub fn list(conn: &Connection) -> Result<Vec<Vacancy>> {
        let sql = format!(
            "SELECT {} FROM vacancies ORDER BY created_at, vacancy_uuid",
            VACANCY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let vacancies = stmt
            .query_map([], map_vacancy)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(vacancies)
    }

    /// Delete a vacancy; fails with `ForeignKeyViolation` while responses
    /// or scores still reference it
    pub fn delete(conn: &Connection, vacancy_uuid: Uuid) -> Result<bool> {
        let deleted = conn
            .execute(
                "DELETE FROM vacancies WHERE vacancy_uuid = ?1",
                [vacancy_uuid.to_string()],
            )
            .map_err(from_rusqlite)?;
        Ok(deleted > 0)
    }
}
