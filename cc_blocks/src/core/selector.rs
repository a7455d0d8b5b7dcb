//! Selecting events by block name or by block group.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::block::BlockType;
use super::error::{BlocksError, BlocksResult, IdentifierKind};

/// Picks out the events of one block type name or of one block group.
///
/// # Examples
///
/// ```
/// use cc_blocks::core::{BlockSelector, BlockType};
///
/// let cs = BlockType::new("CS", 30.0).with_group("stimulus");
/// assert!(BlockSelector::by_name("CS").matches(&cs));
/// assert!(BlockSelector::by_group("stimulus").matches(&cs));
/// assert!(!BlockSelector::by_name("ITI").matches(&cs));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSelector {
    ByName(String),
    ByGroup(String),
}

impl BlockSelector {
    pub fn by_name(block_name: impl Into<String>) -> Self {
        BlockSelector::ByName(block_name.into())
    }

    pub fn by_group(block_group: impl Into<String>) -> Self {
        BlockSelector::ByGroup(block_group.into())
    }

    /// Builds a selector from a `block_name` / `block_group` pair.
    ///
    /// Exactly one of the two must be given.
    pub fn from_options(
        block_name: Option<&str>,
        block_group: Option<&str>,
    ) -> BlocksResult<Self> {
        match (block_name, block_group) {
            (Some(name), None) => Ok(Self::by_name(name)),
            (None, Some(group)) => Ok(Self::by_group(group)),
            (None, None) => Err(BlocksError::InvalidArgument(
                "Either block_name or block_group must be specified.".to_string(),
            )),
            (Some(name), Some(group)) => Err(BlocksError::InvalidArgument(format!(
                "Only one of block_name ('{}') or block_group ('{}') may be specified.",
                name, group
            ))),
        }
    }

    pub fn matches(&self, block_type: &BlockType) -> bool {
        match self {
            BlockSelector::ByName(name) => block_type.name == *name,
            BlockSelector::ByGroup(group) => block_type.block_group.as_deref() == Some(group),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            BlockSelector::ByName(name) | BlockSelector::ByGroup(name) => name,
        }
    }

    pub fn kind(&self) -> IdentifierKind {
        match self {
            BlockSelector::ByName(_) => IdentifierKind::BlockName,
            BlockSelector::ByGroup(_) => IdentifierKind::BlockGroup,
        }
    }

    /// The `block_name` column value of a grouped block-starts table.
    pub fn block_name(&self) -> Option<&str> {
        match self {
            BlockSelector::ByName(name) => Some(name),
            BlockSelector::ByGroup(_) => None,
        }
    }

    /// The `block_group` column value of a grouped block-starts table.
    pub fn block_group(&self) -> Option<&str> {
        match self {
            BlockSelector::ByName(_) => None,
            BlockSelector::ByGroup(group) => Some(group),
        }
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSelector::ByName(name) => write!(f, "block_name='{}'", name),
            BlockSelector::ByGroup(group) => write!(f, "block_group='{}'", group),
        }
    }
}
