//! Expanding an ordered list of block types into a timed event sequence.

use std::sync::Arc;

use crate::core::{BlockEvent, BlockType};

/// Places block types back to back on a timeline.
///
/// The first event starts at `start_time`; every following event starts when
/// the previous one ends. Durations are not validated: a zero or negative
/// duration produces overlapping or backwards-moving starts.
///
/// # Examples
///
/// ```
/// use cc_blocks::core::BlockType;
/// use cc_blocks::sequence::create_block_events;
///
/// let baseline = BlockType::new("baseline", 180.0).shared();
/// let cs = BlockType::new("CS", 30.0).shared();
/// let iti = BlockType::new("ITI", 30.0).shared();
///
/// let mut protocol = vec![baseline];
/// for _ in 0..3 {
///     protocol.push(cs.clone());
///     protocol.push(iti.clone());
/// }
///
/// let events = create_block_events(&protocol, 0.0);
/// let starts: Vec<f64> = events.iter().map(|e| e.start_time).collect();
/// assert_eq!(starts, vec![0.0, 180.0, 210.0, 240.0, 270.0, 300.0, 330.0]);
/// ```
pub fn create_block_events(block_types: &[Arc<BlockType>], start_time: f64) -> Vec<BlockEvent> {
    let mut block_events = Vec::with_capacity(block_types.len());
    let mut next_start = start_time;

    for block_type in block_types {
        block_events.push(BlockEvent::new(Arc::clone(block_type), next_start));
        next_start += block_type.duration;
    }

    log::debug!(
        "Created {} block events spanning [{}, {})",
        block_events.len(),
        start_time,
        next_start
    );

    block_events
}

/// [`create_block_events`] with the first block starting at `0.0`.
pub fn create_block_events_from_zero(block_types: &[Arc<BlockType>]) -> Vec<BlockEvent> {
    create_block_events(block_types, 0.0)
}
