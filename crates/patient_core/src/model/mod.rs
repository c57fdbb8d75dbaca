//! Domain model for patient records.
//!
//! # Invariants
//! - A patient's `id` is assigned by storage and never changes afterwards.
//! - Deletion is a hard delete; there is no tombstone state in the model.

pub mod patient;
