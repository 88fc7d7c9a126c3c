//! Remux options loading.

use std::fs;
use std::io;
use std::path::Path;

use giztoy_remux::RemuxOptions;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error type for options loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file: {0}")]
    ReadFile(#[from] io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse file (tried YAML and JSON)")]
    ParseFailed,
}

/// Loads remux options, falling back to defaults when no file is given.
pub fn load_options(path: Option<&str>) -> Result<RemuxOptions, ConfigError> {
    match path {
        Some(path) => load_file(path),
        None => Ok(RemuxOptions::default()),
    }
}

/// Loads a YAML or JSON file into the provided type.
pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let data = fs::read(path.as_ref())?;
    parse_file(&data, path.as_ref())
}

/// Parses file data based on its extension, or by trying YAML then JSON.
pub fn parse_file<T: DeserializeOwned>(data: &[u8], path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => {
            if let Ok(v) = serde_yaml::from_slice(data) {
                return Ok(v);
            }
            if let Ok(v) = serde_json::from_slice(data) {
                return Ok(v);
            }
            Err(ConfigError::ParseFailed)
        }
    }
}
