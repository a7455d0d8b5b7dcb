use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collections::SessionBlocks;
use crate::core::BlockType;
use crate::sequence::create_block_events;

/// Error type for protocol definitions
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Failed to read protocol file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML protocol at '{}': {}", .0.path(), .0.inner())]
    Toml(serde_path_to_error::Error<toml::de::Error>),

    #[error("Invalid JSON protocol at '{}': {}", .0.path(), .0.inner())]
    Json(serde_path_to_error::Error<serde_json::Error>),

    #[error("Unsupported protocol format: {0}")]
    UnsupportedFormat(String),

    #[error("Block type '{0}' is defined more than once")]
    DuplicateBlockType(String),

    #[error("Sequence step {step} refers to unknown block type '{name}'. Defined: {defined:?}")]
    UnknownBlockType {
        step: usize,
        name: String,
        defined: Vec<String>,
    },

    #[error("Block type '{name}' has invalid duration {duration}; it must be finite and positive")]
    InvalidDuration { name: String, duration: f64 },

    #[error("Protocol '{0}' has an empty sequence")]
    EmptySequence(String),
}

fn default_repeat() -> usize {
    1
}

/// One step of a protocol: a run of blocks, repeated `repeat` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStep {
    pub blocks: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

/// Declarative description of a session: the block type catalogue and the
/// order in which the blocks run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    pub session_name: String,
    #[serde(default)]
    pub start_time: f64,
    pub block_types: Vec<BlockType>,
    pub sequence: Vec<SequenceStep>,
}

impl Protocol {
    /// Parse a protocol from TOML.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ProtocolError> {
        serde_path_to_error::deserialize(toml::Deserializer::new(toml_str))
            .map_err(ProtocolError::Toml)
    }

    /// Parse a protocol from JSON with the same shape as the TOML form.
    pub fn from_json_str(json_str: &str) -> Result<Self, ProtocolError> {
        let mut deserializer = serde_json::Deserializer::from_str(json_str);
        serde_path_to_error::deserialize(&mut deserializer).map_err(ProtocolError::Json)
    }

    /// Parse a protocol file, picking the format from the extension.
    pub fn from_file(path: &Path) -> Result<Self, ProtocolError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let content = std::fs::read_to_string(path).map_err(|source| ProtocolError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let protocol = match extension.as_str() {
            "toml" => Self::from_toml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => {
                return Err(ProtocolError::UnsupportedFormat(format!(
                    "'{}' ({})",
                    other,
                    path.display()
                )))
            }
        };

        log::info!(
            "Loaded protocol '{}' from {}",
            protocol.session_name,
            path.display()
        );
        Ok(protocol)
    }

    /// Expand the sequence into one shared block type per occurrence.
    ///
    /// Every catalogue entry is allocated once; all occurrences of it point to
    /// the same `Arc`.
    pub fn expand(&self) -> Result<Vec<Arc<BlockType>>, ProtocolError> {
        let catalogue = self.catalogue()?;

        if self.sequence.is_empty() {
            return Err(ProtocolError::EmptySequence(self.session_name.clone()));
        }

        let mut expanded = Vec::new();
        for (step, entry) in self.sequence.iter().enumerate() {
            let run = entry
                .blocks
                .iter()
                .map(|name| {
                    catalogue
                        .get(name.as_str())
                        .cloned()
                        .ok_or_else(|| ProtocolError::UnknownBlockType {
                            step,
                            name: name.clone(),
                            defined: self.block_types.iter().map(|t| t.name.clone()).collect(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            if entry.repeat == 0 || run.is_empty() {
                log::warn!(
                    "Protocol '{}' step {} contributes no blocks",
                    self.session_name,
                    step
                );
            }

            for _ in 0..entry.repeat {
                expanded.extend(run.iter().cloned());
            }
        }

        Ok(expanded)
    }

    /// Expand the protocol and place it on a timeline.
    pub fn build_session(&self) -> Result<SessionBlocks, ProtocolError> {
        let block_types = self.expand()?;
        let events = create_block_events(&block_types, self.start_time);
        Ok(SessionBlocks::new(self.session_name.clone(), events))
    }

    fn catalogue(&self) -> Result<HashMap<&str, Arc<BlockType>>, ProtocolError> {
        let mut catalogue = HashMap::with_capacity(self.block_types.len());

        for block_type in &self.block_types {
            if !(block_type.duration.is_finite() && block_type.duration > 0.0) {
                return Err(ProtocolError::InvalidDuration {
                    name: block_type.name.clone(),
                    duration: block_type.duration,
                });
            }
            if catalogue
                .insert(block_type.name.as_str(), Arc::new(block_type.clone()))
                .is_some()
            {
                return Err(ProtocolError::DuplicateBlockType(block_type.name.clone()));
            }
        }

        Ok(catalogue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY3: &str = r#"
session_name = "day3"

[[block_types]]
name = "baseline"
duration = 180.0
description = "Baseline recording at the start of the session"

[[block_types]]
name = "CS"
duration = 28.0
block_group = "stimulus"

[[block_types]]
name = "US"
duration = 2.0
block_group = "stimulus"

[[block_types]]
name = "ITI"
duration = 30.0

[[sequence]]
blocks = ["baseline"]

[[sequence]]
blocks = ["CS", "US", "ITI"]
repeat = 30
"#;

    #[test]
    fn test_parse_toml_defaults() {
        let protocol = Protocol::from_toml_str(DAY3).unwrap();
        assert_eq!(protocol.session_name, "day3");
        assert_eq!(protocol.start_time, 0.0);
        assert_eq!(protocol.block_types.len(), 4);
        assert_eq!(protocol.block_types[3].block_group, None);
        assert_eq!(protocol.block_types[3].description, "");
        assert_eq!(protocol.sequence[0].repeat, 1);
        assert_eq!(protocol.sequence[1].repeat, 30);
    }

    #[test]
    fn test_expand_shares_catalogue_entries() {
        let expanded = Protocol::from_toml_str(DAY3).unwrap().expand().unwrap();
        assert_eq!(expanded.len(), 1 + 30 * 3);
        assert_eq!(expanded[1].name, "CS");
        assert!(Arc::ptr_eq(&expanded[1], &expanded[4]));
    }

    #[test]
    fn test_build_session() {
        let session = Protocol::from_toml_str(DAY3).unwrap().build_session().unwrap();
        assert_eq!(session.session_name(), "day3");
        assert_eq!(session.end_time(), Some(180.0 + 30.0 * 60.0));
    }

    #[test]
    fn test_unknown_block_in_sequence() {
        let toml = r#"
session_name = "broken"

[[block_types]]
name = "CS"
duration = 30.0

[[sequence]]
blocks = ["CS", "US"]
"#;
        let err = Protocol::from_toml_str(toml).unwrap().expand().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnknownBlockType { step: 0, ref name, .. } if name == "US"
        ));
    }

    #[test]
    fn test_duplicate_block_type() {
        let toml = r#"
session_name = "dup"

[[block_types]]
name = "CS"
duration = 30.0

[[block_types]]
name = "CS"
duration = 28.0

[[sequence]]
blocks = ["CS"]
"#;
        let err = Protocol::from_toml_str(toml).unwrap().expand().unwrap_err();
        assert!(matches!(err, ProtocolError::DuplicateBlockType(ref name) if name == "CS"));
    }

    #[test]
    fn test_non_positive_duration() {
        let toml = r#"
session_name = "zero"

[[block_types]]
name = "marker"
duration = 0.0

[[sequence]]
blocks = ["marker"]
"#;
        let err = Protocol::from_toml_str(toml).unwrap().build_session().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidDuration { .. }));
    }

    #[test]
    fn test_missing_field_reports_path() {
        let toml = r#"
session_name = "nofields"

[[block_types]]
name = "CS"

[[sequence]]
blocks = ["CS"]
"#;
        let err = Protocol::from_toml_str(toml).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("duration"), "{}", message);
    }

    #[test]
    fn test_json_protocol() {
        let json = r#"{
            "session_name": "RET",
            "start_time": 5.0,
            "block_types": [
                {"name": "baseline", "duration": 180.0},
                {"name": "CS", "duration": 30.0},
                {"name": "ITI", "duration": 30.0}
            ],
            "sequence": [
                {"blocks": ["baseline"]},
                {"blocks": ["CS", "ITI"], "repeat": 30}
            ]
        }"#;
        let session = Protocol::from_json_str(json).unwrap().build_session().unwrap();
        assert_eq!(session.len(), 61);
        assert_eq!(session.block_sequence()[0].start_time, 5.0);
        assert_eq!(session.block_sequence()[1].start_time, 185.0);
    }
}
