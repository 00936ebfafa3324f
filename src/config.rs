//! CLI configuration.
//!
//! Looked up in order: `fluent-cql.toml` in the working directory, then
//! `<config dir>/fluent-cql/config.toml`, then built-in defaults.
//!
//! ```toml
//! default_limit = 100
//! format = "json"
//! single_line = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CqlError, CqlResult};

const LOCAL_FILE: &str = "fluent-cql.toml";

/// Output rendering for compiled queries and index clause sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Row limit for index lookups when none is given
    pub default_limit: u32,
    pub format: OutputFormat,
    /// Drop the line breaks between SELECT, FROM and WHERE
    pub single_line: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_limit: 100,
            format: OutputFormat::Text,
            single_line: false,
        }
    }
}

impl Config {
    /// Load the first config file found, or defaults if there is none.
    pub fn load() -> CqlResult<Self> {
        match Self::locate() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> CqlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| CqlError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> CqlResult<Self> {
        toml::from_str(content).map_err(|e| CqlError::Config(e.to_string()))
    }

    fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_FILE);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("fluent-cql").join("config.toml"))
            .filter(|path| path.exists())
    }
}
