//! Environment export file loader.
//!
//! API-client environment exports are JSON documents whose `values` array
//! holds `{key, value}` records (alongside export metadata this crate does
//! not care about). The loader flattens that array into the substitution
//! map consumed by the collection builder options.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::variables::Environment;

/// Errors that can occur while loading an environment export file.
#[derive(Debug)]
pub enum EnvError {
    /// The file could not be read.
    Io(io::Error),

    /// The file content is not a valid environment export document.
    Parse(serde_json::Error),
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvError::Io(err) => write!(f, "failed to read environment file: {}", err),
            EnvError::Parse(err) => write!(f, "failed to parse environment file: {}", err),
        }
    }
}

impl std::error::Error for EnvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnvError::Io(err) => Some(err),
            EnvError::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for EnvError {
    fn from(err: io::Error) -> Self {
        EnvError::Io(err)
    }
}

impl From<serde_json::Error> for EnvError {
    fn from(err: serde_json::Error) -> Self {
        EnvError::Parse(err)
    }
}

/// The subset of an environment export document the loader reads.
#[derive(Debug, Deserialize)]
struct EnvironmentExport {
    #[serde(default)]
    values: Vec<EnvironmentValue>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentValue {
    key: String,
    #[serde(default)]
    value: String,
}

/// Loads an environment export file into a substitution map.
///
/// Later duplicate keys win, matching how the exporting client resolves
/// them.
///
/// # Arguments
///
/// * `path` - Path to the environment export JSON file
///
/// # Returns
///
/// The variable map on success, or an [`EnvError`] if the file is
/// unreadable or not a valid export document.
pub fn load_environment(path: &Path) -> Result<Environment, EnvError> {
    let content = fs::read_to_string(path)?;
    let export: EnvironmentExport = serde_json::from_str(&content)?;

    let mut environment = HashMap::new();
    for entry in export.values {
        environment.insert(entry.key, entry.value);
    }

    Ok(environment)
}
