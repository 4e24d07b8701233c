//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AgentConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid agent configuration document.
    #[error("Error reading '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Build the effective config: defaults, merged with the file when one is given.
pub fn read_config(path: Option<&Path>) -> Result<AgentConfig, ConfigError> {
    let config = AgentConfig::default();

    match path {
        Some(path) => {
            let file_config = load_config(path)?;
            tracing::debug!(path = %path.display(), "Configuration file loaded");
            Ok(config.merge(&file_config))
        }
        None => Ok(config),
    }
}
