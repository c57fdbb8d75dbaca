//! Process configuration resolved once at startup.
//!
//! # Responsibility
//! - Decide where patient data and log files live.
//! - Keep environment lookups out of repository and service code.
//!
//! # Invariants
//! - Only storage location and logging are configurable; the demo is fixed.
//! - Blank values are treated as unset.

use crate::logging::{default_log_level, normalize_level};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "PATIENTS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "PATIENTS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "PATIENTS_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { var: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { var, message } => write!(f, "invalid `{var}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Memory,
    File(PathBuf),
}

/// Startup configuration for the CLI runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbLocation,
    pub log_level: &'static str,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db: DbLocation::Memory,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// Only the `PATIENTS_*` keys are read; unrelated variables are never decoded.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut vars = Vec::new();
        for name in [DB_PATH_VAR, LOG_LEVEL_VAR, LOG_DIR_VAR] {
            let Some(raw) = std::env::var_os(name) else {
                continue;
            };
            let value = raw.into_string().map_err(|raw| ConfigError::InvalidValue {
                var: name,
                message: format!("value `{}` is not valid UTF-8", raw.to_string_lossy()),
            })?;
            vars.push((name, value));
        }
        Self::from_vars(vars)
    }

    /// Builds configuration from explicit key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let mut config = Self::default();

        if let Some(path) = lookup(&vars, DB_PATH_VAR) {
            config.db = DbLocation::File(PathBuf::from(path));
        }

        if let Some(level) = lookup(&vars, LOG_LEVEL_VAR) {
            config.log_level = normalize_level(level).map_err(|message| {
                ConfigError::InvalidValue {
                    var: LOG_LEVEL_VAR,
                    message,
                }
            })?;
        }

        if let Some(dir) = lookup(&vars, LOG_DIR_VAR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    var: LOG_DIR_VAR,
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
            config.log_dir = Some(dir);
        }

        Ok(config)
    }
}

fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}
