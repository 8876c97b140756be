//! Integration tests for the repositories

use chrono::{Duration, TimeZone, Utc};
use jobagent_core::model::{Email, NewResponse, NewScore, NewUser, NewVacancy, ResponseStatus};
use jobagent_core::ExErrorKind;
use jobagent_core_types::Sensitive;
use jobagent_store::repo::{ProfileRepo, ResponseRepo, ScoreRepo, TokenRepo, UserRepo, VacancyRepo};
use jobagent_store::{db, TokenCipher};
use rusqlite::Connection;
use uuid::Uuid;

fn setup_test_db() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    jobagent_store::apply_migrations(&mut conn).unwrap();
    conn
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser::new(username, email, "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA").unwrap()
}

fn vacancy(conn: &Connection, title: &str) -> Uuid {
    VacancyRepo::insert(
        conn,
        &NewVacancy::new(title, "https://hh.ru/vacancy/42", None).unwrap(),
    )
    .unwrap()
    .vacancy_uuid
}

#[test]
fn test_user_insert_and_lookup() {
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "Alice@Example.com")).unwrap();

    let by_id = UserRepo::get(&conn, user.user_uuid).unwrap().unwrap();
    assert_eq!(by_id, user);
    assert_eq!(by_id.email.as_str(), "alice@example.com");

    let by_email = UserRepo::get_by_email(&conn, &Email::parse("ALICE@example.com").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(by_email.user_uuid, user.user_uuid);

    let by_name = UserRepo::get_by_username(&conn, "alice").unwrap().unwrap();
    assert_eq!(by_name.user_uuid, user.user_uuid);

    assert!(UserRepo::get(&conn, Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_user_insert_duplicate_email() {
    let conn = setup_test_db();
    UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();

    let err = UserRepo::insert(&conn, &new_user("alice2", "a@example.com")).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
}

#[test]
fn test_user_written_by_raw_sql_reads_back() {
    // Given: A row inserted by another writer that the schema accepts
    let conn = setup_test_db();
    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES ('ivan', 'ivan@example.com', '$2b$hash')",
        [],
    )
    .unwrap();

    // Then: The repository can read it
    let user = UserRepo::get_by_email(&conn, &Email::parse("ivan@example.com").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(user.username, "ivan");
    assert_eq!(user.password_hash.expose(), "$2b$hash");
}

#[test]
fn test_mixed_case_email_is_a_duplicate() {
    let conn = setup_test_db();
    conn.execute(
        "INSERT INTO users (username, email, password_hash) VALUES ('ivan', 'ivan@example.com', '$2b$hash')",
        [],
    )
    .unwrap();

    let err = UserRepo::insert(&conn, &new_user("ivan2", "Ivan@Example.COM")).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_user_save_upserts_on_email() {
    let conn = setup_test_db();
    let first = UserRepo::save(&conn, &new_user("alice", "a@example.com")).unwrap();

    let renamed = NewUser::new("alice_k", "a@example.com", "$argon2id$new$hash").unwrap();
    let second = UserRepo::save(&conn, &renamed).unwrap();

    assert_eq!(second.user_uuid, first.user_uuid);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.username, "alice_k");
    assert_eq!(second.password_hash.expose(), "$argon2id$new$hash");
    assert!(second.updated_at >= first.updated_at);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_user_delete_restricted_by_profile() {
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    ProfileRepo::upsert(&conn, user.user_uuid, Some("5 years of Rust")).unwrap();

    let err = UserRepo::delete(&conn, user.user_uuid).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ForeignKeyViolation);

    assert!(ProfileRepo::delete_for_user(&conn, user.user_uuid).unwrap());
    assert!(UserRepo::delete(&conn, user.user_uuid).unwrap());
    assert!(!UserRepo::delete(&conn, user.user_uuid).unwrap());
}

#[test]
fn test_profile_upsert_keeps_identity() {
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();

    let first = ProfileRepo::upsert(&conn, user.user_uuid, None).unwrap();
    let second = ProfileRepo::upsert(&conn, user.user_uuid, Some("Backend")).unwrap();

    assert_eq!(first.profile_uuid, second.profile_uuid);
    assert_eq!(second.experience.as_deref(), Some("Backend"));
    assert_eq!(
        ProfileRepo::get_by_user(&conn, user.user_uuid).unwrap(),
        Some(second)
    );
}

#[test]
fn test_profile_for_missing_user() {
    let conn = setup_test_db();
    let err = ProfileRepo::upsert(&conn, Uuid::new_v4(), None).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ForeignKeyViolation);
}

#[test]
fn test_vacancy_list_and_delete() {
    let conn = setup_test_db();
    let first = vacancy(&conn, "Rust engineer");
    let second = vacancy(&conn, "Platform engineer");

    let listed: Vec<Uuid> = VacancyRepo::list(&conn)
        .unwrap()
        .into_iter()
        .map(|v| v.vacancy_uuid)
        .collect();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&first) && listed.contains(&second));

    assert!(VacancyRepo::delete(&conn, first).unwrap());
    assert!(VacancyRepo::get(&conn, first).unwrap().is_none());
    assert_eq!(
        VacancyRepo::get(&conn, second).unwrap().unwrap().title,
        "Platform engineer"
    );
}

#[test]
fn test_response_lifecycle() {
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let vacancy_uuid = vacancy(&conn, "Rust engineer");

    let response = ResponseRepo::insert(
        &conn,
        &NewResponse::new(user.user_uuid, vacancy_uuid, Some("Hello")),
    )
    .unwrap();
    assert_eq!(response.status, ResponseStatus::Pending);

    let updated =
        ResponseRepo::update_status(&conn, response.response_uuid, ResponseStatus::Accepted)
            .unwrap();
    assert_eq!(updated.status, ResponseStatus::Accepted);
    assert_eq!(updated.created_at, response.created_at);

    let listed = ResponseRepo::list_for_user(&conn, user.user_uuid).unwrap();
    assert_eq!(listed, vec![updated]);

    // The vacancy is now pinned by the response
    let err = VacancyRepo::delete(&conn, vacancy_uuid).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ForeignKeyViolation);
}

#[test]
fn test_response_for_missing_vacancy() {
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();

    let err = ResponseRepo::insert(&conn, &NewResponse::new(user.user_uuid, Uuid::new_v4(), None))
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ForeignKeyViolation);
    assert!(ResponseRepo::list_for_user(&conn, user.user_uuid)
        .unwrap()
        .is_empty());
}

#[test]
fn test_update_status_of_missing_response() {
    let conn = setup_test_db();
    let missing = Uuid::new_v4();

    let err = ResponseRepo::update_status(&conn, missing, ResponseStatus::Withdrawn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.entity_id(), Some(missing.to_string().as_str()));
}

#[test]
fn test_scores_history_and_latest() {
    // Given: Two scoring runs for the same pair
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let vacancy_uuid = vacancy(&conn, "Rust engineer");
    let t1 = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let t2 = t1 + Duration::hours(1);

    ScoreRepo::record_at(&conn, &NewScore::new(user.user_uuid, vacancy_uuid, 0.9).unwrap(), t1)
        .unwrap();
    ScoreRepo::record_at(&conn, &NewScore::new(user.user_uuid, vacancy_uuid, 0.95).unwrap(), t2)
        .unwrap();

    // Then: Both are kept, newest first
    let history = ScoreRepo::history(&conn, user.user_uuid, vacancy_uuid).unwrap();
    let scores: Vec<f64> = history.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![0.95, 0.9]);

    // And: The newest is current
    let latest = ScoreRepo::latest(&conn, user.user_uuid, vacancy_uuid)
        .unwrap()
        .unwrap();
    assert_eq!(latest.score, 0.95);
    assert_eq!(latest.calculated_at, t2);
}

#[test]
fn test_latest_score_tie_breaks_by_insertion() {
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let vacancy_uuid = vacancy(&conn, "Rust engineer");
    let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

    for score in [0.4, 0.7] {
        ScoreRepo::record_at(&conn, &NewScore::new(user.user_uuid, vacancy_uuid, score).unwrap(), at)
            .unwrap();
    }

    let latest = ScoreRepo::latest(&conn, user.user_uuid, vacancy_uuid)
        .unwrap()
        .unwrap();
    assert_eq!(latest.score, 0.7);
}

#[test]
fn test_top_for_user_uses_current_scores() {
    let conn = setup_test_db();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let rust = vacancy(&conn, "Rust engineer");
    let go = vacancy(&conn, "Go engineer");
    let php = vacancy(&conn, "PHP engineer");
    let t1 = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let t2 = t1 + Duration::minutes(5);

    let record = |v: Uuid, score: f64, at| {
        ScoreRepo::record_at(&conn, &NewScore::new(user.user_uuid, v, score).unwrap(), at)
            .unwrap();
    };
    record(rust, 0.5, t1);
    record(rust, 0.99, t2);
    record(go, 0.8, t1);
    record(go, 0.1, t2);
    record(php, 0.6, t1);

    let top: Vec<(Uuid, f64)> = ScoreRepo::top_for_user(&conn, user.user_uuid, 2)
        .unwrap()
        .into_iter()
        .map(|s| (s.vacancy_uuid, s.score))
        .collect();

    assert_eq!(top, vec![(rust, 0.99), (php, 0.6)]);
}

#[test]
fn test_tokens_sealed_at_rest() {
    // Given: A stored token
    let conn = setup_test_db();
    let cipher = TokenCipher::from_base64(&TokenCipher::generate_key().unwrap()).unwrap();
    let tokens = TokenRepo::new(&cipher);
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let expires_at = Utc::now() + Duration::hours(1);
    tokens
        .store(
            &conn,
            user.user_uuid,
            Sensitive::new("hh-plain-token".to_string()),
            expires_at,
        )
        .unwrap();

    // Then: The column never holds the plaintext
    let stored: String = conn
        .query_row("SELECT hh_access_token FROM hh_tokens", [], |row| row.get(0))
        .unwrap();
    assert!(stored.starts_with("v1:"));
    assert!(!stored.contains("hh-plain-token"));

    // And: Reading it back opens it
    let token = tokens.latest_for_user(&conn, user.user_uuid).unwrap().unwrap();
    assert_eq!(token.access_token.expose(), "hh-plain-token");
}

#[test]
fn test_valid_token_respects_expiry() {
    let conn = setup_test_db();
    let cipher = TokenCipher::from_base64(&TokenCipher::generate_key().unwrap()).unwrap();
    let tokens = TokenRepo::new(&cipher);
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

    tokens
        .store(&conn, user.user_uuid, Sensitive::new("t".to_string()), now)
        .unwrap();

    assert!(tokens.valid_for_user(&conn, user.user_uuid, now).unwrap().is_none());
    assert!(tokens
        .valid_for_user(&conn, user.user_uuid, now - Duration::seconds(1))
        .unwrap()
        .is_some());
}

#[test]
fn test_tokens_removed_with_user() {
    let conn = setup_test_db();
    let cipher = TokenCipher::from_base64(&TokenCipher::generate_key().unwrap()).unwrap();
    let tokens = TokenRepo::new(&cipher);
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let expires_at = Utc::now() + Duration::days(14);
    tokens
        .store(&conn, user.user_uuid, Sensitive::new("t".to_string()), expires_at)
        .unwrap();

    assert!(UserRepo::delete(&conn, user.user_uuid).unwrap());

    assert!(tokens.latest_for_user(&conn, user.user_uuid).unwrap().is_none());
    assert_eq!(tokens.delete_for_user(&conn, user.user_uuid).unwrap(), 0);
}

#[test]
fn test_token_sealed_under_other_key_is_crypto_error() {
    let conn = setup_test_db();
    let writer = TokenCipher::from_base64(&TokenCipher::generate_key().unwrap()).unwrap();
    let reader = TokenCipher::from_base64(&TokenCipher::generate_key().unwrap()).unwrap();
    let user = UserRepo::insert(&conn, &new_user("alice", "a@example.com")).unwrap();
    let stored = TokenRepo::new(&writer)
        .store(&conn, user.user_uuid, Sensitive::new("t".to_string()), Utc::now())
        .unwrap();

    let err = TokenRepo::new(&reader)
        .latest_for_user(&conn, user.user_uuid)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Crypto);
    assert_eq!(err.entity_id(), Some(stored.token_uuid.to_string().as_str()));
}
