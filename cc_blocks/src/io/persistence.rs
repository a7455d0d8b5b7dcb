use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::checksum::payload_checksum;
use crate::collections::{GroupedSessionBlocks, SessionBlocks};
use crate::core::{BlockEvent, BlockType, BlocksError};

/// Version written by this crate. Files with a higher version are rejected.
pub const FORMAT_VERSION: u32 = 1;

/// Error type for saving and loading session files
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload at '{}': {}", .0.path(), .0.inner())]
    Schema(serde_path_to_error::Error<serde_json::Error>),

    #[error("Unsupported format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Expected a {expected} file, found a {found} file")]
    KindMismatch { expected: StoredKind, found: StoredKind },

    #[error("Checksum mismatch: file records {expected}, payload hashes to {found}")]
    ChecksumMismatch { expected: String, found: String },

    #[error("Session '{session}' holds different block types named '{name}'")]
    AmbiguousBlockName { session: String, name: String },

    #[error("Session '{session}' has non-finite {field} {value} on block '{name}'")]
    NonFiniteValue {
        session: String,
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("Session '{session}' lists block type '{name}' more than once")]
    DuplicateCatalogueEntry { session: String, name: String },

    #[error("Session '{session}' has an event of unknown block type '{name}'")]
    UnknownBlockReference { session: String, name: String },

    #[error("Invalid grouped sessions: {0}")]
    Blocks(#[from] BlocksError),
}

/// Which shape a session file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredKind {
    Session,
    Grouped,
}

impl fmt::Display for StoredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredKind::Session => write!(f, "session"),
            StoredKind::Grouped => write!(f, "grouped"),
        }
    }
}

/// Anything read back by [`load_any`] when the shape is not known up front.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredBlocks {
    Session(SessionBlocks),
    Grouped(GroupedSessionBlocks),
}

impl StoredBlocks {
    pub fn kind(&self) -> StoredKind {
        match self {
            StoredBlocks::Session(_) => StoredKind::Session,
            StoredBlocks::Grouped(_) => StoredKind::Grouped,
        }
    }

    pub fn session_name(&self) -> &str {
        match self {
            StoredBlocks::Session(session) => session.session_name(),
            StoredBlocks::Grouped(grouped) => grouped.session_name(),
        }
    }
}

/// Top-level document of a session file
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format_version: u32,
    kind: StoredKind,
    saved_at: DateTime<Utc>,
    checksum: String,
    payload: Value,
}

/// Only the version, read before committing to a layout
#[derive(Debug, Deserialize)]
struct VersionProbe {
    format_version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    session_name: String,
    block_types: Vec<BlockType>,
    events: Vec<EventRecord>,
}

/// An event referencing its block type by name
#[derive(Debug, Serialize, Deserialize)]
struct EventRecord {
    block_type: String,
    start_time: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroupedRecord {
    session_name: String,
    groups: Vec<GroupRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroupRecord {
    group_name: String,
    session: SessionRecord,
}

impl SessionRecord {
    fn from_session(session: &SessionBlocks) -> Result<Self, PersistenceError> {
        let mut seen: HashMap<&str, &BlockType> = HashMap::new();
        let mut block_types = Vec::new();
        let mut events = Vec::with_capacity(session.len());

        for event in session.block_sequence() {
            let block_type = event.block_type.as_ref();
            for (field, value) in [
                ("duration", block_type.duration),
                ("start_time", event.start_time),
            ] {
                if !value.is_finite() {
                    return Err(PersistenceError::NonFiniteValue {
                        session: session.session_name().to_string(),
                        name: block_type.name.clone(),
                        field,
                        value,
                    });
                }
            }
            match seen.get(block_type.name.as_str()) {
                Some(known) if *known != block_type => {
                    return Err(PersistenceError::AmbiguousBlockName {
                        session: session.session_name().to_string(),
                        name: block_type.name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(block_type.name.as_str(), block_type);
                    block_types.push(block_type.clone());
                }
            }
            events.push(EventRecord {
                block_type: block_type.name.clone(),
                start_time: event.start_time,
            });
        }

        Ok(Self {
            session_name: session.session_name().to_string(),
            block_types,
            events,
        })
    }

    fn into_session(self) -> Result<SessionBlocks, PersistenceError> {
        let mut catalogue: HashMap<String, Arc<BlockType>> =
            HashMap::with_capacity(self.block_types.len());
        for block_type in self.block_types {
            let name = block_type.name.clone();
            if catalogue.insert(name.clone(), Arc::new(block_type)).is_some() {
                return Err(PersistenceError::DuplicateCatalogueEntry {
                    session: self.session_name,
                    name,
                });
            }
        }

        let mut block_sequence = Vec::with_capacity(self.events.len());
        for event in self.events {
            match catalogue.get(&event.block_type) {
                Some(block_type) => {
                    block_sequence.push(BlockEvent::new(Arc::clone(block_type), event.start_time))
                }
                None => {
                    return Err(PersistenceError::UnknownBlockReference {
                        session: self.session_name,
                        name: event.block_type,
                    })
                }
            }
        }

        Ok(SessionBlocks::new(self.session_name, block_sequence))
    }
}

/// Types that can be written to and read from a session file.
pub trait Storable: Sized {
    const KIND: StoredKind;

    fn to_payload(&self) -> Result<Value, PersistenceError>;

    fn from_payload(payload: Value) -> Result<Self, PersistenceError>;
}

impl Storable for SessionBlocks {
    const KIND: StoredKind = StoredKind::Session;

    fn to_payload(&self) -> Result<Value, PersistenceError> {
        Ok(serde_json::to_value(SessionRecord::from_session(self)?)?)
    }

    fn from_payload(payload: Value) -> Result<Self, PersistenceError> {
        let record: SessionRecord =
            serde_path_to_error::deserialize(payload).map_err(PersistenceError::Schema)?;
        record.into_session()
    }
}

impl Storable for GroupedSessionBlocks {
    const KIND: StoredKind = StoredKind::Grouped;

    fn to_payload(&self) -> Result<Value, PersistenceError> {
        let groups = self
            .iter()
            .map(|(group_name, session)| {
                Ok(GroupRecord {
                    group_name: group_name.to_string(),
                    session: SessionRecord::from_session(session)?,
                })
            })
            .collect::<Result<Vec<_>, PersistenceError>>()?;

        Ok(serde_json::to_value(GroupedRecord {
            session_name: self.session_name().to_string(),
            groups,
        })?)
    }

    fn from_payload(payload: Value) -> Result<Self, PersistenceError> {
        let record: GroupedRecord =
            serde_path_to_error::deserialize(payload).map_err(PersistenceError::Schema)?;

        let mut grouped = GroupedSessionBlocks::new(record.session_name);
        for group in record.groups {
            grouped.insert(group.group_name, group.session.into_session()?)?;
        }
        Ok(grouped)
    }
}

/// Serialize to the versioned JSON document.
pub fn to_json_string<T: Storable>(obj: &T) -> Result<String, PersistenceError> {
    let payload = obj.to_payload()?;
    let envelope = Envelope {
        format_version: FORMAT_VERSION,
        kind: T::KIND,
        saved_at: Utc::now(),
        checksum: payload_checksum(&payload)?,
        payload,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn read_envelope(json_str: &str) -> Result<Envelope, PersistenceError> {
    let probe: VersionProbe = serde_json::from_str(json_str)?;
    if probe.format_version == 0 || probe.format_version > FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: probe.format_version,
            supported: FORMAT_VERSION,
        });
    }

    let envelope: Envelope = serde_json::from_str(json_str)?;
    let found = payload_checksum(&envelope.payload)?;
    if found != envelope.checksum {
        return Err(PersistenceError::ChecksumMismatch {
            expected: envelope.checksum,
            found,
        });
    }
    Ok(envelope)
}

/// Parse a versioned JSON document of a known shape.
pub fn from_json_str<T: Storable>(json_str: &str) -> Result<T, PersistenceError> {
    let envelope = read_envelope(json_str)?;
    if envelope.kind != T::KIND {
        return Err(PersistenceError::KindMismatch {
            expected: T::KIND,
            found: envelope.kind,
        });
    }
    T::from_payload(envelope.payload)
}

/// Parse a versioned JSON document of either shape.
pub fn any_from_json_str(json_str: &str) -> Result<StoredBlocks, PersistenceError> {
    let envelope = read_envelope(json_str)?;
    match envelope.kind {
        StoredKind::Session => Ok(StoredBlocks::Session(SessionBlocks::from_payload(
            envelope.payload,
        )?)),
        StoredKind::Grouped => Ok(StoredBlocks::Grouped(GroupedSessionBlocks::from_payload(
            envelope.payload,
        )?)),
    }
}

/// Save to `path`, replacing any existing file.
pub fn save<T: Storable>(obj: &T, path: &Path) -> Result<(), PersistenceError> {
    let content = to_json_string(obj)?;
    std::fs::write(path, content).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved {} file {}", T::KIND, path.display());
    Ok(())
}

fn read_file(path: &Path) -> Result<String, PersistenceError> {
    std::fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a file previously written by [`save`] with the same type.
pub fn load<T: Storable>(path: &Path) -> Result<T, PersistenceError> {
    let obj = from_json_str(&read_file(path)?)?;
    log::info!("Loaded {} file {}", T::KIND, path.display());
    Ok(obj)
}

/// Load a file without knowing its shape ahead of time.
pub fn load_any(path: &Path) -> Result<StoredBlocks, PersistenceError> {
    let stored = any_from_json_str(&read_file(path)?)?;
    log::info!("Loaded {} file {}", stored.kind(), path.display());
    Ok(stored)
}

pub fn save_session(session: &SessionBlocks, path: &Path) -> Result<(), PersistenceError> {
    save(session, path)
}

pub fn load_session(path: &Path) -> Result<SessionBlocks, PersistenceError> {
    load(path)
}

pub fn save_grouped(grouped: &GroupedSessionBlocks, path: &Path) -> Result<(), PersistenceError> {
    save(grouped, path)
}

pub fn load_grouped(path: &Path) -> Result<GroupedSessionBlocks, PersistenceError> {
    load(path)
}
