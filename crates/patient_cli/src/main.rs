//! CLI entry point running the fixed patient CRUD demo.
//!
//! Storage location and logging come from `PATIENTS_*` variables; there are no flags.

use patient_core::db::{open_db, open_db_in_memory};
use patient_core::{
    init_logging, run_demo, AppConfig, DbLocation, PatientService, SqlitePatientRepository,
};
use std::error::Error;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("patient_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;

    if let Some(dir) = config.log_dir.as_deref() {
        let dir = dir
            .to_str()
            .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", dir.display()))?;
        init_logging(config.log_level, dir)?;
    }

    let conn = match &config.db {
        DbLocation::Memory => open_db_in_memory()?,
        DbLocation::File(path) => open_db(path)?,
    };
    let repo = SqlitePatientRepository::try_new(&conn)?;
    let service = PatientService::new(repo);

    run_demo(&service, io::stdout().lock())?;
    Ok(())
}
