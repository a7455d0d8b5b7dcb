//! A named collection of sessions queried as one.

use polars::prelude::DataFrame;
use std::collections::HashSet;

use super::frames::{self, GroupedBinaryColumns, GroupedStartsColumns, GroupedTimeSeriesColumns};
use super::session::SessionBlocks;
use crate::core::{BlockSelector, BlockType, BlocksError, BlocksResult};

/// Sessions keyed by group name (one per recording day, subject, ...).
///
/// Members keep their insertion order, and every query visits them in that
/// order. A query fails as a whole as soon as one member fails.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSessionBlocks {
    session_name: String,
    grouped_sessionblocks: Vec<(String, SessionBlocks)>,
}

impl GroupedSessionBlocks {
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            grouped_sessionblocks: Vec::new(),
        }
    }

    /// Collects members in iteration order, rejecting repeated group names.
    pub fn from_members<I, K>(session_name: impl Into<String>, members: I) -> BlocksResult<Self>
    where
        I: IntoIterator<Item = (K, SessionBlocks)>,
        K: Into<String>,
    {
        let mut grouped = Self::new(session_name);
        for (group_name, session) in members {
            grouped.insert(group_name, session)?;
        }
        Ok(grouped)
    }

    /// Adds a member under `group_name`.
    pub fn insert(
        &mut self,
        group_name: impl Into<String>,
        session: SessionBlocks,
    ) -> BlocksResult<()> {
        let group_name = group_name.into();
        if self.get(&group_name).is_some() {
            return Err(BlocksError::DuplicateGroupName(group_name));
        }
        self.grouped_sessionblocks.push((group_name, session));
        Ok(())
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn get(&self, group_name: &str) -> Option<&SessionBlocks> {
        self.grouped_sessionblocks
            .iter()
            .find(|(name, _)| name == group_name)
            .map(|(_, session)| session)
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.grouped_sessionblocks
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SessionBlocks)> {
        self.grouped_sessionblocks
            .iter()
            .map(|(name, session)| (name.as_str(), session))
    }

    pub fn len(&self) -> usize {
        self.grouped_sessionblocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grouped_sessionblocks.is_empty()
    }

    /// Union of the block types of every member.
    pub fn block_types(&self) -> HashSet<&BlockType> {
        self.grouped_sessionblocks
            .iter()
            .flat_map(|(_, session)| session.block_types())
            .collect()
    }

    /// Union of the block groups of every member.
    pub fn block_groups(&self) -> HashSet<&str> {
        self.grouped_sessionblocks
            .iter()
            .flat_map(|(_, session)| session.block_groups())
            .collect()
    }

    /// Start times of the selected block in every member.
    ///
    /// Returns a DataFrame with columns
    /// `["group_name", "block_name", "block_group", "start_time"]`.
    pub fn get_block_starts(&self, selector: &BlockSelector) -> BlocksResult<DataFrame> {
        let mut columns = GroupedStartsColumns::default();

        for (group_name, session) in &self.grouped_sessionblocks {
            let starts = session
                .get_block_starts(selector)
                .inspect_err(|e| log_member_failure(group_name, e))?;
            columns.append(group_name, selector.block_name(), selector.block_group(), starts);
        }

        Ok(columns.into_frame()?)
    }

    /// Per-sample block labels of every member.
    ///
    /// Returns a DataFrame with columns
    /// `["time", "group_name", "block_type", "block_group"]`. Each member's
    /// `time` column restarts at 0.
    pub fn get_block_time_series(&self, sampling_rate: f64) -> BlocksResult<DataFrame> {
        frames::validate_sampling_rate(sampling_rate)?;
        let mut columns = GroupedTimeSeriesColumns::default();

        for (group_name, session) in &self.grouped_sessionblocks {
            let member = session
                .time_series_columns(sampling_rate)
                .inspect_err(|e| log_member_failure(group_name, e))?;
            columns.append(group_name, member);
        }

        Ok(columns.into_frame()?)
    }

    /// Per-sample presence indicator of the selected block in every member.
    ///
    /// Returns a DataFrame with columns `["time", "group_name", "in_block"]`.
    pub fn get_binary_block_time_series(
        &self,
        sampling_rate: f64,
        selector: &BlockSelector,
    ) -> BlocksResult<DataFrame> {
        frames::validate_sampling_rate(sampling_rate)?;
        let mut columns = GroupedBinaryColumns::default();

        for (group_name, session) in &self.grouped_sessionblocks {
            let member = session
                .binary_columns(sampling_rate, selector)
                .inspect_err(|e| log_member_failure(group_name, e))?;
            columns.append(group_name, member);
        }

        Ok(columns.into_frame()?)
    }
}

fn log_member_failure(group_name: &str, error: &BlocksError) {
    log::debug!("Grouped query aborted at member '{}': {}", group_name, error);
}
