//! A single session: an ordered sequence of block events.

use polars::prelude::DataFrame;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::frames::{self, BinaryColumns, TimeSeriesColumns};
use crate::core::{BlockEvent, BlockSelector, BlockType, BlocksError, BlocksResult};
use crate::sequence::create_block_events;

/// A session composed of blocks.
///
/// Events are kept in insertion order, which is taken to be chronological.
/// Block types and block groups are derived from the events on demand.
///
/// # Examples
///
/// ```
/// use cc_blocks::collections::SessionBlocks;
/// use cc_blocks::core::{BlockSelector, BlockType};
///
/// let baseline = BlockType::new("baseline", 180.0).shared();
/// let cs = BlockType::new("CS", 30.0).shared();
/// let iti = BlockType::new("ITI", 30.0).shared();
/// let mut protocol = vec![baseline];
/// for _ in 0..3 {
///     protocol.extend([cs.clone(), iti.clone()]);
/// }
///
/// let session = SessionBlocks::from_block_types("RET", &protocol, 0.0);
/// let starts = session.get_block_starts(&BlockSelector::by_name("CS")).unwrap();
/// assert_eq!(starts, vec![180.0, 240.0, 300.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBlocks {
    session_name: String,
    block_sequence: Vec<BlockEvent>,
}

impl SessionBlocks {
    pub fn new(session_name: impl Into<String>, block_sequence: Vec<BlockEvent>) -> Self {
        Self {
            session_name: session_name.into(),
            block_sequence,
        }
    }

    /// Builds the event sequence from an ordered protocol of block types.
    pub fn from_block_types(
        session_name: impl Into<String>,
        block_types: &[Arc<BlockType>],
        start_time: f64,
    ) -> Self {
        Self::new(session_name, create_block_events(block_types, start_time))
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn block_sequence(&self) -> &[BlockEvent] {
        &self.block_sequence
    }

    pub fn len(&self) -> usize {
        self.block_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block_sequence.is_empty()
    }

    /// The distinct block types appearing in the session.
    pub fn block_types(&self) -> HashSet<&BlockType> {
        self.block_sequence
            .iter()
            .map(|event| event.block_type.as_ref())
            .collect()
    }

    /// The distinct, non-null block groups appearing in the session.
    pub fn block_groups(&self) -> HashSet<&str> {
        self.block_sequence
            .iter()
            .filter_map(|event| event.block_group())
            .collect()
    }

    /// The distinct block names appearing in the session, sorted.
    pub fn block_names(&self) -> BTreeSet<&str> {
        self.block_sequence.iter().map(|event| event.name()).collect()
    }

    /// Sorted list of the distinct block names.
    pub fn get_unique_block_types(&self) -> Vec<String> {
        self.block_names().into_iter().map(str::to_string).collect()
    }

    /// Sum of the durations of every event.
    pub fn total_duration(&self) -> f64 {
        self.block_sequence.iter().map(BlockEvent::duration).sum()
    }

    /// End of the last event, or `None` for an empty session.
    pub fn end_time(&self) -> Option<f64> {
        self.block_sequence.last().map(BlockEvent::end_time)
    }

    /// The event whose interval contains `time`, if any.
    pub fn block_at(&self, time: f64) -> Option<&BlockEvent> {
        self.block_sequence.iter().find(|event| event.contains(time))
    }

    /// Fails with `UnknownIdentifier` if nothing in the session matches the
    /// selector's name or group.
    pub fn check_selector(&self, selector: &BlockSelector) -> BlocksResult<()> {
        let available: BTreeSet<&str> = match selector {
            BlockSelector::ByName(_) => self.block_names(),
            BlockSelector::ByGroup(_) => self.block_groups().into_iter().collect(),
        };

        if available.contains(selector.identifier()) {
            Ok(())
        } else {
            Err(BlocksError::UnknownIdentifier {
                kind: selector.kind(),
                identifier: selector.identifier().to_string(),
                available: available.into_iter().map(str::to_string).collect(),
            })
        }
    }

    /// Start times, in sequence order, of every event matching the selector.
    pub fn get_block_starts(&self, selector: &BlockSelector) -> BlocksResult<Vec<f64>> {
        self.check_selector(selector)?;

        Ok(self
            .block_sequence
            .iter()
            .filter(|event| selector.matches(&event.block_type))
            .map(|event| event.start_time)
            .collect())
    }

    /// Number of samples each event contributes at `sampling_rate`.
    ///
    /// Fails with `InvalidArgument` when the total does not fit a series.
    pub fn samples_per_event(&self, sampling_rate: f64) -> BlocksResult<Vec<usize>> {
        Ok(self.sample_plan(sampling_rate)?.0)
    }

    /// Per-event sample counts and their total.
    fn sample_plan(&self, sampling_rate: f64) -> BlocksResult<(Vec<usize>, usize)> {
        frames::validate_sampling_rate(sampling_rate)?;

        let counts: Vec<usize> = self
            .block_sequence
            .iter()
            .map(|event| {
                if event.duration() <= 0.0 {
                    log::warn!(
                        "Block '{}' at {} has non-positive duration {}; it contributes no samples",
                        event.name(),
                        event.start_time,
                        event.duration()
                    );
                }
                frames::sample_count(event.duration(), sampling_rate)
            })
            .collect();

        let total = frames::total_samples(&counts)?;
        Ok((counts, total))
    }

    /// Per-sample block labels.
    ///
    /// Returns a DataFrame with columns `["time", "block_type", "block_group"]`
    /// where `time` is the sample index counted from 0 across the whole
    /// sequence.
    pub fn get_block_time_series(&self, sampling_rate: f64) -> BlocksResult<DataFrame> {
        Ok(self.time_series_columns(sampling_rate)?.into_frame()?)
    }

    /// Per-sample indicator of whether the selected block is running.
    ///
    /// Returns a DataFrame with columns `["time", "in_block"]`; `time` matches
    /// [`get_block_time_series`](Self::get_block_time_series) row for row.
    pub fn get_binary_block_time_series(
        &self,
        sampling_rate: f64,
        selector: &BlockSelector,
    ) -> BlocksResult<DataFrame> {
        Ok(self.binary_columns(sampling_rate, selector)?.into_frame()?)
    }

    pub(crate) fn time_series_columns(
        &self,
        sampling_rate: f64,
    ) -> BlocksResult<TimeSeriesColumns<'_>> {
        let (counts, total) = self.sample_plan(sampling_rate)?;
        let mut columns = TimeSeriesColumns::with_capacity(total);

        for (event, samples) in self.block_sequence.iter().zip(counts) {
            columns.push_block(samples, event.name(), event.block_group());
        }

        Ok(columns)
    }

    pub(crate) fn binary_columns(
        &self,
        sampling_rate: f64,
        selector: &BlockSelector,
    ) -> BlocksResult<BinaryColumns> {
        self.check_selector(selector)?;
        let (counts, total) = self.sample_plan(sampling_rate)?;
        let mut columns = BinaryColumns::with_capacity(total);

        for (event, samples) in self.block_sequence.iter().zip(counts) {
            columns.push_block(samples, selector.matches(&event.block_type));
        }

        Ok(columns)
    }
}
