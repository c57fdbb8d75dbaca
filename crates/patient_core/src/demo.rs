//! Fixed CRUD walkthrough printed by the CLI.
//!
//! # Responsibility
//! - Drive every repository operation once, in a fixed order.
//! - Write a human-readable transcript to the caller's sink.
//!
//! # Invariants
//! - The sequence never depends on input; only storage failures change it.
//! - Logged events carry ids and counts, never patient names.

use crate::model::patient::{Patient, PatientId};
use crate::repo::patient_repo::{PatientRepository, RepoError};
use crate::service::patient_service::PatientService;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};

pub const START_BANNER: &str =
    "========== TESTING PATIENT REPOSITORY CRUD OPERATIONS ==========";
pub const END_BANNER: &str = "========== CRUD OPERATIONS COMPLETED ==========";

const SEED_PATIENTS: &[(&str, bool, i32)] = &[
    ("Mohamed", true, 75),
    ("Ahmed", false, 50),
    ("Sara", true, 65),
    ("Fatima", false, 80),
];
const LOOKUP_ID: PatientId = 1;
const SEARCH_NEEDLE: &str = "a";
const UPDATE_ID: PatientId = 2;
const UPDATED_SCORE: i32 = 95;
const DELETE_ID: PatientId = 3;

pub type DemoResult<T> = Result<T, DemoError>;

#[derive(Debug)]
pub enum DemoError {
    Repo(RepoError),
    Io(io::Error),
}

impl Display for DemoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "repository call failed: {err}"),
            Self::Io(err) => write!(f, "failed to write demo output: {err}"),
        }
    }
}

impl Error for DemoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<RepoError> for DemoError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<io::Error> for DemoError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Summary of one demo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub created_ids: Vec<PatientId>,
    pub search_hits: usize,
    pub updated: bool,
    pub deleted: bool,
    pub final_count: usize,
}

/// Runs the CRUD walkthrough against `service`, writing the transcript to `out`.
pub fn run_demo<R, W>(service: &PatientService<R>, mut out: W) -> DemoResult<DemoReport>
where
    R: PatientRepository,
    W: Write,
{
    info!("event=demo_run module=demo status=start");
    writeln!(out, "{START_BANNER}")?;

    writeln!(out, "Creating patients...")?;
    let mut created_ids = Vec::with_capacity(SEED_PATIENTS.len());
    for (name, is_ill, score) in SEED_PATIENTS {
        let saved = service.register_patient(*name, *is_ill, *score)?;
        created_ids.extend(saved.id);
    }

    writeln!(out, "\nRetrieving all patients:")?;
    print_patients(&mut out, &service.list_patients()?)?;

    writeln!(out, "\nRetrieving patient by ID {LOOKUP_ID}:")?;
    match service.get_patient(LOOKUP_ID)? {
        Some(patient) => writeln!(out, "{patient}")?,
        None => writeln!(out, "Patient with ID {LOOKUP_ID} not found")?,
    }

    writeln!(
        out,
        "\nSearching patients with '{SEARCH_NEEDLE}' in their name:"
    )?;
    let hits = service.search_by_name(SEARCH_NEEDLE)?;
    print_patients(&mut out, &hits)?;

    writeln!(out, "\nUpdating patient with ID {UPDATE_ID}:")?;
    let updated = match service.get_patient(UPDATE_ID)? {
        Some(before) => {
            writeln!(out, "Before update: {before}")?;
            service.update_condition(UPDATE_ID, true, UPDATED_SCORE)?;
            if let Some(after) = service.get_patient(UPDATE_ID)? {
                writeln!(out, "After update: {after}")?;
            }
            true
        }
        None => {
            writeln!(out, "Patient with ID {UPDATE_ID} not found")?;
            false
        }
    };

    writeln!(out, "\nDeleting patient with ID {DELETE_ID}:")?;
    let deleted = service.delete_patient(DELETE_ID)?;

    writeln!(out, "\nFinal list of patients after deletion:")?;
    let remaining = service.list_patients()?;
    print_patients(&mut out, &remaining)?;

    writeln!(out, "{END_BANNER}")?;
    out.flush()?;

    let report = DemoReport {
        created_ids,
        search_hits: hits.len(),
        updated,
        deleted,
        final_count: remaining.len(),
    };
    info!(
        "event=demo_run module=demo status=ok created={} search_hits={} updated={} deleted={} final_count={}",
        report.created_ids.len(),
        report.search_hits,
        report.updated,
        report.deleted,
        report.final_count
    );
    Ok(report)
}

fn print_patients(out: &mut impl Write, patients: &[Patient]) -> io::Result<()> {
    for patient in patients {
        writeln!(out, "{patient}")?;
    }
    Ok(())
}
