// Integration tests for the migration sequencer
// Covers ordered application, idempotence, rollback of a failing unit and
// ledger drift detection.

use jobagent_core::ExErrorKind;
use jobagent_store::db;
use jobagent_store::migrations::{get_migrations, Migration, MigrationRunner, MigrationSet};
use rusqlite::Connection;

fn setup_test_db() -> Connection {
    db::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

fn ledger_ids(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let report = jobagent_store::apply_migrations(&mut conn).unwrap();

    // Then: Every unit is applied in order
    assert_eq!(
        report.applied,
        vec![
            "001_create_users",
            "002_create_user_profiles_and_tokens",
            "003_create_vacancies",
            "004_create_responses",
            "005_create_user_vacancy_scores",
        ]
    );

    // And: The six schema tables plus the ledger exist
    let tables = get_table_names(&conn);
    for expected in [
        "hh_tokens",
        "responses",
        "schema_version",
        "user_profiles",
        "user_vacancy_scores",
        "users",
        "vacancies",
    ] {
        assert!(tables.contains(&expected.to_string()), "Missing table: {}", expected);
    }
    assert_eq!(tables.len(), 7);

    // And: All data tables are empty
    for table in ["users", "user_profiles", "hh_tokens", "vacancies", "responses", "user_vacancy_scores"] {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "{} should be empty", table);
    }
}

#[test]
fn test_status_reports_all_applied() {
    let mut conn = setup_test_db();
    jobagent_store::apply_migrations(&mut conn).unwrap();

    let status = jobagent_store::migration_status(&conn).unwrap();

    assert!(status.is_current());
    assert_eq!(status.applied.len(), 5);
    assert_eq!(status.applied[0].migration_id, "001_create_users");
    assert_eq!(status.applied[4].migration_id, "005_create_user_vacancy_scores");
    assert!(status.applied.iter().all(|a| a.checksum.len() == 64));
}

#[test]
fn test_migration_idempotency() {
    // Given: A database with migrations already applied
    let mut conn = setup_test_db();
    jobagent_store::apply_migrations(&mut conn).unwrap();

    // When: Migrations are applied again
    let report = jobagent_store::apply_migrations(&mut conn).unwrap();

    // Then: Nothing changes
    assert!(report.is_noop());
    assert_eq!(report.skipped.len(), 5);
    assert_eq!(ledger_ids(&conn).len(), 5);
}

#[test]
fn test_failing_unit_rolls_back_and_halts() {
    // Given: A set whose sixth unit fails halfway through
    let mut units = get_migrations();
    units.push(Migration::new(
        "006_half_applied",
        "CREATE TABLE half_applied (id TEXT); INSERT INTO no_such_table VALUES (1);",
    ));
    units.push(Migration::new("007_never_reached", "CREATE TABLE never_reached (id TEXT);"));
    let runner = MigrationRunner::new(MigrationSet::new(units).unwrap());
    let mut conn = setup_test_db();

    // When: The set is applied
    let err = runner.apply(&mut conn).unwrap_err();

    // Then: The failure names the unit
    assert_eq!(err.kind(), ExErrorKind::MigrationFailed);
    assert_eq!(err.migration_id(), Some("006_half_applied"));
    assert_eq!(err.source_error().unwrap().kind(), ExErrorKind::Persistence);

    // And: Earlier units stay applied, the failing one left nothing behind
    assert_eq!(ledger_ids(&conn).len(), 5);
    let tables = get_table_names(&conn);
    assert!(!tables.contains(&"half_applied".to_string()));
    assert!(!tables.contains(&"never_reached".to_string()));

    // And: Status reports both as pending
    let status = runner.status(&conn).unwrap();
    assert_eq!(status.pending, vec!["006_half_applied", "007_never_reached"]);
}

#[test]
fn test_tampered_checksum_blocks_apply_and_verify() {
    // Given: A ledger whose checksum for 003 no longer matches
    let mut conn = setup_test_db();
    jobagent_store::apply_migrations(&mut conn).unwrap();
    conn.execute(
        "UPDATE schema_version SET checksum = 'deadbeef' WHERE migration_id = '003_create_vacancies'",
        [],
    )
    .unwrap();
    let runner = MigrationRunner::embedded().unwrap();

    // When / Then: Both verify and apply refuse
    let err = runner.verify(&conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ChecksumMismatch);
    assert_eq!(err.migration_id(), Some("003_create_vacancies"));

    let err = runner.apply(&mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::ChecksumMismatch);
}

#[test]
fn test_gap_in_ledger_is_rejected() {
    // Given: A ledger with 002 missing below applied units
    let mut conn = setup_test_db();
    jobagent_store::apply_migrations(&mut conn).unwrap();
    conn.execute(
        "DELETE FROM schema_version WHERE migration_id = '002_create_user_profiles_and_tokens'",
        [],
    )
    .unwrap();

    // When: Migrations are applied
    let err = jobagent_store::apply_migrations(&mut conn).unwrap_err();

    // Then: The missing predecessor is reported and nothing runs
    assert_eq!(err.kind(), ExErrorKind::MigrationOrder);
    assert_eq!(err.migration_id(), Some("002_create_user_profiles_and_tokens"));
    assert_eq!(ledger_ids(&conn).len(), 4);
}

#[test]
fn test_unknown_ledger_entry_is_rejected() {
    // Given: A database migrated by a newer build
    let mut conn = setup_test_db();
    jobagent_store::apply_migrations(&mut conn).unwrap();

    // When: An older set of three units checks it
    let older = MigrationSet::new(get_migrations().into_iter().take(3).collect()).unwrap();
    let err = MigrationRunner::new(older).verify(&conn).unwrap_err();

    // Then: The unknown unit is reported
    assert_eq!(err.kind(), ExErrorKind::MigrationOrder);
    assert_eq!(err.migration_id(), Some("004_create_responses"));
}

#[test]
fn test_unit_referencing_missing_table_fails() {
    // Given: Responses declared before the tables it references
    let responses = get_migrations().remove(3);
    let set = MigrationSet::new(vec![Migration::new(
        "001_responses_first",
        responses.sql().to_string(),
    )])
    .unwrap();
    let mut conn = setup_test_db();

    // When: It is applied
    let err = MigrationRunner::new(set).apply(&mut conn).unwrap_err();

    // Then: The dangling reference fails the unit and it is rolled back
    assert_eq!(err.kind(), ExErrorKind::MigrationFailed);
    assert_eq!(
        err.source_error().unwrap().kind(),
        ExErrorKind::ForeignKeyViolation
    );
    assert!(!get_table_names(&conn).contains(&"responses".to_string()));
}

#[test]
fn test_out_of_order_declaration_rejected() {
    let mut units = get_migrations();
    units.swap(2, 3);

    let err = MigrationSet::new(units).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::MigrationOrder);
    assert_eq!(err.migration_id(), Some("004_create_responses"));
}
