//! Digest composition: timeframe, collection, grouping and description

use crate::collect::{collect_changes, Change, CollectOptions};
use crate::describe::describe;
use crate::group::{group, GroupBy};
use crate::store::{Clock, ContentStore, StoreError, TaxonomyStore, UserDirectory};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Failed to list modified content: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("period must be one of: day, week, month (got {0:?})")]
pub struct InvalidPeriod(pub String);

/// The lookback period of a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    #[default]
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Phrase used when summarizing a multi-change group
    pub fn phrase(&self) -> &'static str {
        match self {
            Period::Day => "in the last day",
            Period::Week => "in the last week",
            Period::Month => "in the last month",
        }
    }

    /// Start of this period when it ends at `now`.
    ///
    /// A month is a calendar month, clamped to the last day of the shorter month.
    pub fn cutoff_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Day => now - Duration::days(1),
            Period::Week => now - Duration::days(7),
            Period::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
        }
    }
}

impl FromStr for Period {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            _ => Err(InvalidPeriod(s.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that configures one digest computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigestRequest {
    pub period: Period,
    /// Explicit cutoff, overriding the one derived from `period`
    pub cutoff: Option<DateTime<Utc>>,
    pub group_by: GroupBy,
    pub options: CollectOptions,
}

impl DigestRequest {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn with_cutoff(mut self, cutoff: DateTime<Utc>) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_options(mut self, options: CollectOptions) -> Self {
        self.options = options;
        self
    }

    /// The effective cutoff for a digest computed at `now`
    pub fn cutoff_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.cutoff.unwrap_or_else(|| self.period.cutoff_from(now))
    }
}

/// A keyed set of changes with its summary sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub key: String,
    pub changes: Vec<Change>,
    pub description: String,
}

/// Entry point for adapters, wired to its collaborators
#[derive(Clone, Copy)]
pub struct Digest<'a> {
    content: &'a dyn ContentStore,
    users: &'a dyn UserDirectory,
    taxonomy: &'a dyn TaxonomyStore,
    clock: &'a dyn Clock,
}

impl<'a> Digest<'a> {
    pub fn new(
        content: &'a dyn ContentStore,
        users: &'a dyn UserDirectory,
        taxonomy: &'a dyn TaxonomyStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            content,
            users,
            taxonomy,
            clock,
        }
    }

    /// Wire every lookup to one store that implements all of them
    pub fn from_store<S>(store: &'a S, clock: &'a dyn Clock) -> Self
    where
        S: ContentStore + UserDirectory + TaxonomyStore,
    {
        Self::new(store, store, store, clock)
    }

    /// Ungrouped changes for the request's timeframe, in store order
    pub fn get_changes(&self, request: &DigestRequest) -> Result<Vec<Change>, DigestError> {
        let cutoff = request.cutoff_at(self.clock.now());
        Ok(collect_changes(self.content, cutoff, &request.options)?)
    }

    /// Changes grouped by the request's dimension, each group described
    pub fn get_grouped_changes(&self, request: &DigestRequest) -> Result<Vec<Group>, DigestError> {
        let now = self.clock.now();
        let changes = self.get_changes(request)?;
        let total = changes.len();

        let groups: Vec<Group> = group(changes, request.group_by, self.taxonomy)
            .into_iter()
            .map(|(key, changes)| Group {
                description: describe(&changes, request.period, self.users, now),
                key,
                changes,
            })
            .collect();

        info!(
            period = %request.period,
            group_by = %request.group_by,
            changes = total,
            groups = groups.len(),
            "digest computed"
        );
        Ok(groups)
    }
}
