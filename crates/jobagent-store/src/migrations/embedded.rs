//! Embedded SQL migrations
//!
//! Units are embedded at compile time using include_str! and listed in
//! creation order: a table may only reference tables created by an
//! earlier unit.

use super::set::Migration;

/// Get all embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            "001_create_users",
            include_str!("../../migrations/001_create_users.sql"),
        ),
        Migration::new(
            "002_create_user_profiles_and_tokens",
            include_str!("../../migrations/002_create_user_profiles_and_tokens.sql"),
        ),
        Migration::new(
            "003_create_vacancies",
            include_str!("../../migrations/003_create_vacancies.sql"),
        ),
        Migration::new(
            "004_create_responses",
            include_str!("../../migrations/004_create_responses.sql"),
        ),
        Migration::new(
            "005_create_user_vacancy_scores",
            include_str!("../../migrations/005_create_user_vacancy_scores.sql"),
        ),
    ]
}
