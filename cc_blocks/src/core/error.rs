//! Error types for block queries.

use polars::prelude::PolarsError;
use std::fmt;

/// Result type for block queries
pub type BlocksResult<T> = Result<T, BlocksError>;

/// Which catalogue an identifier was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    BlockName,
    BlockGroup,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::BlockName => write!(f, "block name"),
            IdentifierKind::BlockGroup => write!(f, "block group"),
        }
    }
}

/// Error type for block queries
#[derive(Debug, thiserror::Error)]
pub enum BlocksError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown {kind} '{identifier}'. Try one of {available:?}")]
    UnknownIdentifier {
        kind: IdentifierKind,
        identifier: String,
        available: Vec<String>,
    },

    #[error("Duplicate group name '{0}'")]
    DuplicateGroupName(String),

    #[error("DataFrame error: {0}")]
    Frame(#[from] PolarsError),
}

impl BlocksError {
    /// Returns `true` for the unknown name/group signal.
    pub fn is_unknown_identifier(&self) -> bool {
        matches!(self, BlocksError::UnknownIdentifier { .. })
    }

    /// Returns `true` for a rejected argument combination or value.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, BlocksError::InvalidArgument(_))
    }
}
