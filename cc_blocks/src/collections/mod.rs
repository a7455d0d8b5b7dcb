//! Session containers and their query surface.
//!
//! - [`session`]: one session, an ordered sequence of block events
//! - [`grouped`]: several sessions keyed by group name, queried together
//! - [`frames`]: column names and layouts of the tabular results
//!
//! # Example
//!
//! ```
//! use cc_blocks::collections::{GroupedSessionBlocks, SessionBlocks};
//! use cc_blocks::core::{BlockSelector, BlockType};
//!
//! let cs = BlockType::new("CS", 30.0).shared();
//! let iti = BlockType::new("ITI", 30.0).shared();
//! let day1 = SessionBlocks::from_block_types("day1", &[cs.clone(), iti.clone()], 0.0);
//! let day2 = SessionBlocks::from_block_types("day2", &[iti, cs], 0.0);
//!
//! let grouped =
//!     GroupedSessionBlocks::from_members("ofl", [("day1", day1), ("day2", day2)]).unwrap();
//! let starts = grouped.get_block_starts(&BlockSelector::by_name("CS")).unwrap();
//! assert_eq!(starts.height(), 2);
//! ```

pub mod frames;
pub mod grouped;
pub mod session;


pub use grouped::GroupedSessionBlocks;
pub use session::SessionBlocks;
