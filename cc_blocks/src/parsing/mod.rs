//! Protocol definitions.
//!
//! A protocol file lists the block types of a session and the order in which
//! they run, in TOML or JSON:
//!
//! ```toml
//! session_name = "RET"
//!
//! [[block_types]]
//! name = "baseline"
//! duration = 180.0
//!
//! [[block_types]]
//! name = "CS"
//! duration = 30.0
//! block_group = "stimulus"
//!
//! [[block_types]]
//! name = "ITI"
//! duration = 30.0
//!
//! [[sequence]]
//! blocks = ["baseline"]
//!
//! [[sequence]]
//! blocks = ["CS", "ITI"]
//! repeat = 30
//! ```

pub mod protocol_parser;

pub use protocol_parser::{Protocol, ProtocolError, SequenceStep};
