//! Dataset layout configuration.
//!
//! A dataset configuration names the sessions of an experiment, the protocol
//! file each one is built from, and where its session file is written. It is
//! read from a TOML file:
//!
//! ```toml
//! root_dir = "/data/ofl-repeated"
//!
//! [[sessions]]
//! session_name = "day1"
//! sub_dir = "01-day1"
//! protocol = "protocols/ofl_day1.toml"
//!
//! [grouped]
//! session_name = "ofl-repeated"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for dataset configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No dataset.toml found in standard locations")]
    NotFound,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_file_name() -> String {
    "session_blocks.json".to_string()
}

fn default_grouped_file_name() -> String {
    "grouped_session_blocks.json".to_string()
}

/// One session of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session_name: String,
    pub sub_dir: String,
    /// Protocol definition; relative paths resolve against the config file.
    pub protocol: PathBuf,
}

/// Settings for the combined file holding every session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedEntry {
    pub session_name: String,
    #[serde(default = "default_grouped_file_name")]
    pub file_name: String,
}

/// Dataset configuration from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub root_dir: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    pub sessions: Vec<SessionEntry>,
    #[serde(default)]
    pub grouped: Option<GroupedEntry>,
    /// Directory of the file this configuration came from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl DatasetConfig {
    /// Parse a dataset configuration from TOML.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: DatasetConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a dataset configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(DatasetConfig)` if successful
    /// * `Err(ConfigError)` if the file cannot be read, parsed, or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        log::debug!(
            "Loaded dataset config {} with {} sessions",
            path.display(),
            config.sessions.len()
        );
        Ok(config)
    }

    /// Load the dataset configuration from the default location.
    ///
    /// Searches for `dataset.toml` in:
    /// 1. Current directory
    /// 2. `cc_blocks/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("dataset.toml"),
            PathBuf::from("cc_blocks/dataset.toml"),
            PathBuf::from("../dataset.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Check that there is something to build and session names are unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sessions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[sessions]] entry is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for entry in &self.sessions {
            if !names.insert(entry.session_name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "session '{}' is listed more than once",
                    entry.session_name
                )));
            }
        }

        if self.file_name.is_empty() {
            return Err(ConfigError::Invalid("file_name must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn session_dir(&self, entry: &SessionEntry) -> PathBuf {
        self.root_dir.join(&entry.sub_dir)
    }

    pub fn session_file(&self, entry: &SessionEntry) -> PathBuf {
        self.session_dir(entry).join(&self.file_name)
    }

    pub fn protocol_path(&self, entry: &SessionEntry) -> PathBuf {
        match &self.base_dir {
            Some(base) if entry.protocol.is_relative() => base.join(&entry.protocol),
            _ => entry.protocol.clone(),
        }
    }

    /// Where the combined file is written, if one is configured.
    pub fn grouped_file(&self) -> Option<PathBuf> {
        self.grouped
            .as_ref()
            .map(|grouped| self.root_dir.join(&grouped.file_name))
    }
}
