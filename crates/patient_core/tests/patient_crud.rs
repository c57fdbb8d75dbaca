use patient_core::db::migrations::latest_version;
use patient_core::db::{open_db_in_memory, DbError};
use patient_core::{
    Patient, PatientRepository, PatientService, PatientValidationError, RepoError,
    SqlitePatientRepository,
};
use rusqlite::Connection;

#[test]
fn save_assigns_id_and_find_by_id_returns_equal_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    let patient = Patient::with_registration_date("Mohamed", 1_700_000_000_000, true, 75);
    let saved = repo.save(&patient).unwrap();

    assert_eq!(saved.id, Some(1));
    assert_eq!(saved.name, patient.name);
    let loaded = repo.find_by_id(1).unwrap().unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn ids_are_assigned_in_insert_order_and_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    let first = repo.save(&Patient::new("Mohamed", true, 75)).unwrap();
    let second = repo.save(&Patient::new("Ahmed", false, 50)).unwrap();
    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));

    assert!(repo.delete_by_id(2).unwrap());
    let third = repo.save(&Patient::new("Sara", true, 65)).unwrap();
    assert_eq!(third.id, Some(3));
}

#[test]
fn update_preserves_id_and_reflects_new_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    let mut saved = repo.save(&Patient::new("Ahmed", false, 50)).unwrap();
    let id = saved.id.unwrap();

    saved.is_ill = true;
    saved.score = 95;
    saved.name = "Ahmed Ali".to_string();
    let updated = repo.save(&saved).unwrap();

    assert_eq!(updated.id, Some(id));
    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert!(loaded.is_ill);
    assert_eq!(loaded.score, 95);
    assert_eq!(loaded.name, "Ahmed Ali");
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn save_with_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    let mut ghost = Patient::new("Ghost", false, 0);
    ghost.id = Some(42);

    let err = repo.save(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn save_with_non_positive_id_is_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    let mut invalid = Patient::new("Invalid", false, 0);
    invalid.id = Some(0);

    let err = repo.save(&invalid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PatientValidationError::InvalidId(0))
    ));
}

#[test]
fn find_by_id_for_missing_row_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    assert!(repo.find_by_id(7).unwrap().is_none());
    assert!(!repo.exists_by_id(7).unwrap());
}

#[test]
fn delete_removes_row_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Patient::new("Sara", true, 65)).unwrap();
    let id = saved.id.unwrap();
    assert!(repo.exists_by_id(id).unwrap());

    assert!(repo.delete_by_id(id).unwrap());
    assert!(repo.find_by_id(id).unwrap().is_none());
    assert!(!repo.delete_by_id(id).unwrap());
    assert!(!repo.delete_by_id(999).unwrap());
}

#[test]
fn find_all_matches_count_of_live_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    assert!(repo.find_all().unwrap().is_empty());
    assert_eq!(repo.count().unwrap(), 0);

    for (name, is_ill, score) in [("Mohamed", true, 75), ("Ahmed", false, 50), ("Sara", true, 65)]
    {
        repo.save(&Patient::new(name, is_ill, score)).unwrap();
    }
    repo.delete_by_id(2).unwrap();

    let all = repo.find_all().unwrap();
    let ids: Vec<_> = all.iter().filter_map(|patient| patient.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(repo.count().unwrap(), all.len() as u64);
}

#[test]
fn corrupt_score_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO patients (name, registration_date, is_ill, score) VALUES ('Overflow', 0, 0, ?1);",
        [i64::from(i32::MAX) + 1],
    )
    .unwrap();

    let err = repo.find_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("patients.score")));
}

#[test]
fn storage_failure_after_construction_surfaces_as_db_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();
    repo.save(&Patient::new("Mohamed", true, 75)).unwrap();

    conn.execute_batch("DROP TABLE patients;").unwrap();

    let save_err = repo.save(&Patient::new("Ahmed", false, 50)).unwrap_err();
    assert!(matches!(save_err, RepoError::Db(DbError::Sqlite(_))));

    let list_err = repo.find_all().unwrap_err();
    assert!(matches!(list_err, RepoError::Db(DbError::Sqlite(_))));

    let search_err = repo.find_by_name_contains("a").unwrap_err();
    assert!(matches!(search_err, RepoError::Db(DbError::Sqlite(_))));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePatientRepository::try_new(&conn).unwrap();
    let service = PatientService::new(repo);

    let created = service.register_patient("Fatima", false, 80).unwrap();
    let id = created.id.unwrap();

    let updated = service.update_condition(id, true, 90).unwrap().unwrap();
    assert_eq!(updated.id, Some(id));
    assert!(updated.is_ill);
    assert_eq!(updated.score, 90);
    assert_eq!(updated.registration_date, created.registration_date);

    assert!(service.update_condition(id + 1, true, 1).unwrap().is_none());
    assert_eq!(service.count_patients().unwrap(), 1);
    assert!(service.delete_patient(id).unwrap());
    assert!(service.list_patients().unwrap().is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqlitePatientRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_patients_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePatientRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("patients"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            registration_date INTEGER NOT NULL,
            is_ill INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePatientRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "patients",
            column: "score"
        })
    ));
}
