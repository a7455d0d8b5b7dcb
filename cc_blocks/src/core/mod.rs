//! Core domain models for experiment sessions.
//!
//! This module defines the value types every other part of the crate is built
//! on: block types, block events placed on a timeline, the selector used to
//! query them, and the query error type.

pub mod block;
pub mod error;
pub mod selector;

pub use block::{BlockEvent, BlockType};
pub use error::{BlocksError, BlocksResult, IdentifierKind};
pub use selector::BlockSelector;
