//! Saving and loading sessions.
//!
//! Sessions are stored as versioned JSON documents. Each document records its
//! format version, its shape (single session or grouped sessions), when it was
//! written, and a SHA-256 checksum of the payload. Block types are listed once
//! per session and events reference them by name.
//!
//! # Example
//!
//! ```no_run
//! use cc_blocks::io::{load_session, save_session};
//! # use cc_blocks::collections::SessionBlocks;
//! use std::path::Path;
//!
//! # fn example(session: &SessionBlocks) -> Result<(), cc_blocks::io::PersistenceError> {
//! save_session(session, Path::new("session_blocks.json"))?;
//! let restored = load_session(Path::new("session_blocks.json"))?;
//! assert_eq!(&restored, session);
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod persistence;


pub use persistence::{
    any_from_json_str, from_json_str, load, load_any, load_grouped, load_session, save,
    save_grouped, save_session, to_json_string, PersistenceError, Storable, StoredBlocks,
    StoredKind, FORMAT_VERSION,
};
