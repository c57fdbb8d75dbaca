//! Patient repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD plus name substring search over the `patients` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save` inserts when `id` is `None` and updates in place otherwise.
//! - List queries are ordered by `id` ascending.
//! - Name search folds ASCII case only (SQLite `LIKE` with
//!   `case_sensitive_like=OFF`); `%`, `_` and `\` in the needle match literally.
//! - Read paths reject corrupt persisted rows instead of masking them.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::patient::{Patient, PatientId, PatientValidationError};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PATIENTS_TABLE: &str = "patients";
const PATIENT_COLUMNS: &[&str] = &["id", "name", "registration_date", "is_ill", "score"];

const PATIENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    registration_date,
    is_ill,
    score
FROM patients";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for patient persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PatientValidationError),
    Db(DbError),
    /// `save` was given an id that has no row.
    NotFound(PatientId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "patient not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted patient data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PatientValidationError> for RepoError {
    fn from(value: PatientValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for patient CRUD operations.
pub trait PatientRepository {
    /// Inserts an unsaved patient or updates an existing one; returns the stored form.
    fn save(&self, patient: &Patient) -> RepoResult<Patient>;
    fn find_all(&self) -> RepoResult<Vec<Patient>>;
    fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>>;
    /// Hard-deletes a row. Returns `false` when nothing matched.
    fn delete_by_id(&self, id: PatientId) -> RepoResult<bool>;
    fn find_by_name_contains(&self, needle: &str) -> RepoResult<Vec<Patient>>;
    fn count(&self) -> RepoResult<u64>;
    fn exists_by_id(&self, id: PatientId) -> RepoResult<bool>;
}

/// SQLite-backed patient repository.
pub struct SqlitePatientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePatientRepository<'conn> {
    /// Wraps a connection after checking it carries the migrated schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for a damaged schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        ensure_table_shape(conn)?;
        Ok(Self { conn })
    }

    fn insert(&self, patient: &Patient) -> RepoResult<Patient> {
        self.conn.execute(
            "INSERT INTO patients (
                name,
                registration_date,
                is_ill,
                score
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                patient.name.as_str(),
                patient.registration_date,
                bool_to_int(patient.is_ill),
                patient.score,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("event=patient_save module=repo status=ok op=insert id={id}");
        Ok(Patient {
            id: Some(id),
            ..patient.clone()
        })
    }

    fn update(&self, id: PatientId, patient: &Patient) -> RepoResult<Patient> {
        let changed = self.conn.execute(
            "UPDATE patients
             SET
                name = ?1,
                registration_date = ?2,
                is_ill = ?3,
                score = ?4
             WHERE id = ?5;",
            params![
                patient.name.as_str(),
                patient.registration_date,
                bool_to_int(patient.is_ill),
                patient.score,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=patient_save module=repo status=ok op=update id={id}");
        Ok(patient.clone())
    }

    fn query_list(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut patients = Vec::new();

        while let Some(row) = rows.next()? {
            patients.push(parse_patient_row(row)?);
        }

        Ok(patients)
    }
}

impl PatientRepository for SqlitePatientRepository<'_> {
    fn save(&self, patient: &Patient) -> RepoResult<Patient> {
        patient.validate()?;

        match patient.id {
            None => self.insert(patient),
            Some(id) => self.update(id, patient),
        }
    }

    fn find_all(&self) -> RepoResult<Vec<Patient>> {
        self.query_list(&format!("{PATIENT_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn find_by_id(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PATIENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_patient_row(row)?));
        }

        Ok(None)
    }

    fn delete_by_id(&self, id: PatientId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?1;", [id])?;

        let removed = changed > 0;
        info!("event=patient_delete module=repo status=ok id={id} removed={removed}");
        Ok(removed)
    }

    fn find_by_name_contains(&self, needle: &str) -> RepoResult<Vec<Patient>> {
        let pattern = format!("%{}%", escape_like(needle));
        let patients = self.query_list(
            &format!("{PATIENT_SELECT_SQL} WHERE name LIKE ?1 ESCAPE '\\' ORDER BY id ASC;"),
            [pattern],
        )?;

        debug!(
            "event=patient_search module=repo status=ok needle_len={} hits={}",
            needle.chars().count(),
            patients.len()
        );
        Ok(patients)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn exists_by_id(&self, id: PatientId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM patients WHERE id = ?1;", [id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

fn ensure_table_shape(conn: &Connection) -> RepoResult<()> {
    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [PATIENTS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(PATIENTS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({PATIENTS_TABLE});"))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for &column in PATIENT_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PATIENTS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_patient_row(row: &Row<'_>) -> RepoResult<Patient> {
    let is_ill = match row.get::<_, i64>("is_ill")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_ill value `{other}` in patients.is_ill"
            )));
        }
    };

    let raw_score: i64 = row.get("score")?;
    let score = i32::try_from(raw_score).map_err(|_| {
        RepoError::InvalidData(format!(
            "score `{raw_score}` in patients.score is out of range"
        ))
    })?;

    let patient = Patient {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        registration_date: row.get("registration_date")?,
        is_ill,
        score,
    };
    patient.validate()?;
    Ok(patient)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
