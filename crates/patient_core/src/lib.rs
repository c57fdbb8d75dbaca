//! Patient records core: storage bootstrap, repository, service and the CRUD demo.
//! Callers wire everything explicitly: open a connection, wrap it in a
//! repository, hand the repository to a service.

pub mod config;
pub mod db;
pub mod demo;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, DbLocation};
pub use demo::{run_demo, DemoError, DemoReport};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::patient::{now_epoch_ms, Patient, PatientId, PatientValidationError};
pub use repo::patient_repo::{PatientRepository, RepoError, RepoResult, SqlitePatientRepository};
pub use service::patient_service::PatientService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
