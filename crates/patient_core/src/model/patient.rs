//! Patient domain model.
//!
//! # Responsibility
//! - Define the single record type persisted by the patient repository.
//! - Provide constructors that capture the registration timestamp.
//!
//! # Invariants
//! - `id` is `None` until the record is persisted.
//! - A present `id` is always positive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage-assigned row identifier.
pub type PatientId = i64;

/// Validation failures for patient identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientValidationError {
    /// Ids come from SQLite rowids, which are always >= 1.
    InvalidId(PatientId),
}

impl Display for PatientValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "patient id must be positive, got {id}"),
        }
    }
}

impl Error for PatientValidationError {}

/// A patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatientWire")]
pub struct Patient {
    pub id: Option<PatientId>,
    pub name: String,
    /// Unix epoch milliseconds.
    pub registration_date: i64,
    pub is_ill: bool,
    pub score: i32,
}

#[derive(Deserialize)]
struct PatientWire {
    id: Option<PatientId>,
    name: String,
    registration_date: i64,
    is_ill: bool,
    score: i32,
}

impl TryFrom<PatientWire> for Patient {
    type Error = PatientValidationError;

    fn try_from(wire: PatientWire) -> Result<Self, Self::Error> {
        let patient = Patient {
            id: wire.id,
            name: wire.name,
            registration_date: wire.registration_date,
            is_ill: wire.is_ill,
            score: wire.score,
        };
        patient.validate()?;
        Ok(patient)
    }
}

impl Patient {
    /// Creates an unsaved patient registered now.
    pub fn new(name: impl Into<String>, is_ill: bool, score: i32) -> Self {
        Self::with_registration_date(name, now_epoch_ms(), is_ill, score)
    }

    /// Creates an unsaved patient with a caller-provided registration time.
    ///
    /// Used by imports and tests where the timestamp must be deterministic.
    pub fn with_registration_date(
        name: impl Into<String>,
        registration_date: i64,
        is_ill: bool,
        score: i32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            registration_date,
            is_ill,
            score,
        }
    }

    /// Returns whether storage has assigned an id yet.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn validate(&self) -> Result<(), PatientValidationError> {
        match self.id {
            Some(id) if id <= 0 => Err(PatientValidationError::InvalidId(id)),
            _ => Ok(()),
        }
    }
}

impl Display for Patient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self
            .id
            .map_or_else(|| "none".to_string(), |id| id.to_string());
        write!(
            f,
            "Patient(id={id}, name={}, registration_date={}, is_ill={}, score={})",
            self.name, self.registration_date, self.is_ill, self.score
        )
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before 1970 collapse to `0`.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
