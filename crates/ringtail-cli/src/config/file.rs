use crate::error::{CliError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// On-disk config formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigFormat::from_path(path);
    debug!("Loading {:?} configuration from file: {:?}", format, path);
    let content = std::fs::read_to_string(path)?;
    let parsed = match format {
        ConfigFormat::Json => serde_json::from_str(&content).map_err(anyhow::Error::from),
        ConfigFormat::Toml => toml::from_str(&content).map_err(anyhow::Error::from),
    };
    parsed.map_err(|source| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    })
}
