//! Patient use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::patient::{Patient, PatientId};
use crate::repo::patient_repo::{PatientRepository, RepoResult};

/// Use-case service wrapper for patient CRUD operations.
pub struct PatientService<R: PatientRepository> {
    repo: R,
}

impl<R: PatientRepository> PatientService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new patient stamped with the current time.
    pub fn register_patient(
        &self,
        name: impl Into<String>,
        is_ill: bool,
        score: i32,
    ) -> RepoResult<Patient> {
        self.repo.save(&Patient::new(name, is_ill, score))
    }

    /// Inserts or updates a patient as-is.
    pub fn save(&self, patient: &Patient) -> RepoResult<Patient> {
        self.repo.save(patient)
    }

    pub fn list_patients(&self) -> RepoResult<Vec<Patient>> {
        self.repo.find_all()
    }

    pub fn get_patient(&self, id: PatientId) -> RepoResult<Option<Patient>> {
        self.repo.find_by_id(id)
    }

    /// Lists patients whose name contains `needle` (ASCII case-insensitive).
    pub fn search_by_name(&self, needle: &str) -> RepoResult<Vec<Patient>> {
        self.repo.find_by_name_contains(needle)
    }

    /// Sets the health fields of an existing patient.
    ///
    /// Returns `Ok(None)` when no patient has this id.
    pub fn update_condition(
        &self,
        id: PatientId,
        is_ill: bool,
        score: i32,
    ) -> RepoResult<Option<Patient>> {
        let Some(mut patient) = self.repo.find_by_id(id)? else {
            return Ok(None);
        };

        patient.is_ill = is_ill;
        patient.score = score;
        self.repo.save(&patient).map(Some)
    }

    /// Removes a patient. Returns `false` when the id was already absent.
    pub fn delete_patient(&self, id: PatientId) -> RepoResult<bool> {
        self.repo.delete_by_id(id)
    }

    pub fn count_patients(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
