//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for patient records.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes call `Patient::validate()` before touching storage.
//! - Empty lookups are `Ok(None)` / empty vectors, never errors.

pub mod patient_repo;
