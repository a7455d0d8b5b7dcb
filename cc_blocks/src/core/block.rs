//! Block types and block events.
//!
//! A [`BlockType`] describes one kind of interval in an experimental protocol
//! (a baseline, a stimulus presentation, an inter-trial interval). A
//! [`BlockEvent`] places a block type on the session timeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A kind of interval in a session.
///
/// Two block types are equal only when every field is equal, so the same
/// name with a different duration is a different block type.
///
/// # Examples
///
/// ```
/// use cc_blocks::core::BlockType;
///
/// let cs = BlockType::new("CS", 30.0)
///     .with_group("stimulus")
///     .with_description("Conditioned stimulus presentation");
///
/// assert_eq!(cs.name, "CS");
/// assert_eq!(cs.block_group.as_deref(), Some("stimulus"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockType {
    pub name: String,
    /// Length of the interval, in the session's time unit (usually seconds).
    pub duration: f64,
    #[serde(default)]
    pub block_group: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl BlockType {
    /// Creates an ungrouped block type with an empty description.
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            block_group: None,
            description: String::new(),
        }
    }

    pub fn with_group(mut self, block_group: impl Into<String>) -> Self {
        self.block_group = Some(block_group.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Wraps the block type for sharing between events.
    pub fn shared(self) -> Arc<BlockType> {
        Arc::new(self)
    }
}

// Durations compare by bit pattern so that equality stays reflexive.
impl PartialEq for BlockType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.duration.to_bits() == other.duration.to_bits()
            && self.block_group == other.block_group
            && self.description == other.description
    }
}

impl Eq for BlockType {}

impl Hash for BlockType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.duration.to_bits().hash(state);
        self.block_group.hash(state);
        self.description.hash(state);
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.block_group {
            Some(group) => write!(f, "{} [{}] ({})", self.name, group, self.duration),
            None => write!(f, "{} ({})", self.name, self.duration),
        }
    }
}

/// One occurrence of a block type on the session timeline.
///
/// The event occupies `[start_time, start_time + duration)`. The block type
/// is shared with every other event of the same kind.
#[derive(Debug, Clone)]
pub struct BlockEvent {
    pub block_type: Arc<BlockType>,
    pub start_time: f64,
}

impl BlockEvent {
    pub fn new(block_type: Arc<BlockType>, start_time: f64) -> Self {
        Self {
            block_type,
            start_time,
        }
    }

    pub fn name(&self) -> &str {
        &self.block_type.name
    }

    pub fn block_group(&self) -> Option<&str> {
        self.block_type.block_group.as_deref()
    }

    pub fn duration(&self) -> f64 {
        self.block_type.duration
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.block_type.duration
    }

    /// Returns `true` if `time` falls inside `[start_time, end_time)`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }
}

impl PartialEq for BlockEvent {
    fn eq(&self, other: &Self) -> bool {
        self.start_time.to_bits() == other.start_time.to_bits()
            && (Arc::ptr_eq(&self.block_type, &other.block_type)
                || self.block_type == other.block_type)
    }
}
