//! Column layouts of the tabular query results.
//!
//! Every table the collections return is assembled here so that column names
//! and column order stay identical across single and grouped queries.

use polars::prelude::*;

use crate::core::{BlocksError, BlocksResult};

pub const TIME: &str = "time";
pub const BLOCK_TYPE: &str = "block_type";
pub const BLOCK_GROUP: &str = "block_group";
pub const BLOCK_NAME: &str = "block_name";
pub const IN_BLOCK: &str = "in_block";
pub const GROUP_NAME: &str = "group_name";
pub const START_TIME: &str = "start_time";

/// Columns of a single-session time series.
pub const TIME_SERIES_COLUMNS: [&str; 3] = [TIME, BLOCK_TYPE, BLOCK_GROUP];
/// Columns of a single-session binary series.
pub const BINARY_SERIES_COLUMNS: [&str; 2] = [TIME, IN_BLOCK];
/// Columns of grouped block starts.
pub const GROUPED_BLOCK_STARTS_COLUMNS: [&str; 4] =
    [GROUP_NAME, BLOCK_NAME, BLOCK_GROUP, START_TIME];
/// Columns of a grouped time series.
pub const GROUPED_TIME_SERIES_COLUMNS: [&str; 4] = [TIME, GROUP_NAME, BLOCK_TYPE, BLOCK_GROUP];
/// Columns of a grouped binary series.
pub const GROUPED_BINARY_SERIES_COLUMNS: [&str; 3] = [TIME, GROUP_NAME, IN_BLOCK];

/// Rejects sampling rates that cannot produce a sample count.
pub(crate) fn validate_sampling_rate(sampling_rate: f64) -> BlocksResult<()> {
    if sampling_rate.is_finite() && sampling_rate >= 0.0 {
        Ok(())
    } else {
        Err(BlocksError::InvalidArgument(format!(
            "sampling_rate must be finite and non-negative, got {}",
            sampling_rate
        )))
    }
}

/// Number of samples an interval contributes: `floor(duration * rate)`.
///
/// Truncation is deliberate and accumulates drift against real time over long
/// sequences. Degenerate (negative or non-finite) products contribute nothing.
pub(crate) fn sample_count(duration: f64, sampling_rate: f64) -> usize {
    let samples = (duration * sampling_rate).floor();
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

/// Total number of rows a series built from `counts` would hold.
///
/// The total must fit the `i64` time index.
pub(crate) fn total_samples(counts: &[usize]) -> BlocksResult<usize> {
    let total = counts
        .iter()
        .try_fold(0usize, |total, samples| total.checked_add(*samples));

    match total {
        Some(total) if i64::try_from(total).is_ok() => Ok(total),
        _ => Err(BlocksError::InvalidArgument(format!(
            "total sample count exceeds {} (durations times sampling_rate are too large)",
            i64::MAX
        ))),
    }
}

/// Per-sample labels of one session.
#[derive(Debug, Default)]
pub(crate) struct TimeSeriesColumns<'a> {
    pub time: Vec<i64>,
    pub block_type: Vec<&'a str>,
    pub block_group: Vec<Option<&'a str>>,
}

impl<'a> TimeSeriesColumns<'a> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            block_type: Vec::with_capacity(capacity),
            block_group: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Appends `samples` rows labelled with one block.
    pub fn push_block(
        &mut self,
        samples: usize,
        block_type: &'a str,
        block_group: Option<&'a str>,
    ) {
        let first = self.time.len() as i64;
        self.time.extend(first..first + samples as i64);
        self.block_type.extend(std::iter::repeat(block_type).take(samples));
        self.block_group.extend(std::iter::repeat(block_group).take(samples));
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        df! {
            TIME => self.time,
            BLOCK_TYPE => self.block_type,
            BLOCK_GROUP => self.block_group,
        }
    }
}

/// Per-sample presence indicator of one session.
#[derive(Debug, Default)]
pub(crate) struct BinaryColumns {
    pub time: Vec<i64>,
    pub in_block: Vec<bool>,
}

impl BinaryColumns {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            in_block: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn push_block(&mut self, samples: usize, in_block: bool) {
        let first = self.time.len() as i64;
        self.time.extend(first..first + samples as i64);
        self.in_block.extend(std::iter::repeat(in_block).take(samples));
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        df! {
            TIME => self.time,
            IN_BLOCK => self.in_block,
        }
    }
}

/// Block starts of every member, tagged with the member's group name.
#[derive(Debug, Default)]
pub(crate) struct GroupedStartsColumns<'a> {
    pub group_name: Vec<&'a str>,
    pub block_name: Vec<Option<&'a str>>,
    pub block_group: Vec<Option<&'a str>>,
    pub start_time: Vec<f64>,
}

impl<'a> GroupedStartsColumns<'a> {
    pub fn append(
        &mut self,
        group_name: &'a str,
        block_name: Option<&'a str>,
        block_group: Option<&'a str>,
        starts: Vec<f64>,
    ) {
        let rows = starts.len();
        self.group_name.extend(std::iter::repeat(group_name).take(rows));
        self.block_name.extend(std::iter::repeat(block_name).take(rows));
        self.block_group.extend(std::iter::repeat(block_group).take(rows));
        self.start_time.extend(starts);
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        df! {
            GROUP_NAME => self.group_name,
            BLOCK_NAME => self.block_name,
            BLOCK_GROUP => self.block_group,
            START_TIME => self.start_time,
        }
    }
}

/// Time series of every member, tagged with the member's group name.
#[derive(Debug, Default)]
pub(crate) struct GroupedTimeSeriesColumns<'a> {
    pub time: Vec<i64>,
    pub group_name: Vec<&'a str>,
    pub block_type: Vec<&'a str>,
    pub block_group: Vec<Option<&'a str>>,
}

impl<'a> GroupedTimeSeriesColumns<'a> {
    pub fn append(&mut self, group_name: &'a str, member: TimeSeriesColumns<'a>) {
        let rows = member.len();
        self.time.extend(member.time);
        self.group_name.extend(std::iter::repeat(group_name).take(rows));
        self.block_type.extend(member.block_type);
        self.block_group.extend(member.block_group);
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        df! {
            TIME => self.time,
            GROUP_NAME => self.group_name,
            BLOCK_TYPE => self.block_type,
            BLOCK_GROUP => self.block_group,
        }
    }
}

/// Binary series of every member, tagged with the member's group name.
#[derive(Debug, Default)]
pub(crate) struct GroupedBinaryColumns<'a> {
    pub time: Vec<i64>,
    pub group_name: Vec<&'a str>,
    pub in_block: Vec<bool>,
}

impl<'a> GroupedBinaryColumns<'a> {
    pub fn append(&mut self, group_name: &'a str, member: BinaryColumns) {
        let rows = member.len();
        self.time.extend(member.time);
        self.group_name.extend(std::iter::repeat(group_name).take(rows));
        self.in_block.extend(member.in_block);
    }

    pub fn into_frame(self) -> PolarsResult<DataFrame> {
        df! {
            TIME => self.time,
            GROUP_NAME => self.group_name,
            IN_BLOCK => self.in_block,
        }
    }
}
