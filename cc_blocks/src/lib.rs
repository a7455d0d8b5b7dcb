//! Experiment session blocks.
//!
//! A laboratory session is a chronological run of blocks (baseline,
//! conditioned stimulus, inter-trial interval, ...). This crate places block
//! types on a timeline, answers queries about when blocks occur, samples the
//! timeline into tabular time series, and saves sessions to disk.
//!
//! - [`core`]: block types, block events, selectors and errors
//! - [`sequence`]: turning an ordered protocol into timed events
//! - [`collections`]: single and grouped sessions and their queries
//! - [`parsing`]: declarative protocol files
//! - [`io`]: session files
//! - [`config`]: dataset layout used by the `make-sessions` binary

pub mod collections;
pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod sequence;

pub use crate::collections::{GroupedSessionBlocks, SessionBlocks};
pub use crate::core::{BlockEvent, BlockSelector, BlockType, BlocksError, BlocksResult};
pub use crate::sequence::create_block_events;
