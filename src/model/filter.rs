//! Filter criteria carried by a filter form.

use crate::model::TimeRangeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ===== TimeRange =====

/// Unit for relative time range presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    Days,
}

/// Time window of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimeRange {
    /// The last `amount` units up to now.
    Last {
        /// Number of units.
        amount: u32,
        /// Unit of `amount`.
        unit: TimeUnit,
    },
    /// Since midnight today.
    Today,
    /// The whole of yesterday.
    Yesterday,
    /// Explicit bounds. Construct through [`TimeRange::custom`].
    Custom {
        /// Inclusive start.
        start: DateTime<Utc>,
        /// Inclusive end.
        end: DateTime<Utc>,
    },
}

impl TimeRange {
    /// Explicit range; `start` must not be after `end`.
    pub fn custom(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimeRangeError> {
        if start > end {
            return Err(TimeRangeError::StartAfterEnd { start, end });
        }
        Ok(TimeRange::Custom { start, end })
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Last {
            amount: 1,
            unit: TimeUnit::Hours,
        }
    }
}

// ===== FilterCriteria =====

/// Values of a filter form.
///
/// `revision` increases on every edit of the form instance and identifies
/// "the form changed" independently of the values themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Edit counter of the form instance.
    #[serde(default)]
    pub revision: u64,
    /// Time window of the query.
    #[serde(default)]
    pub time_range: TimeRange,
    /// Free-text query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Log levels to include.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub levels: BTreeSet<String>,
    /// Hosts to include.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub hosts: BTreeSet<String>,
    /// Components to include.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub components: BTreeSet<String>,
    /// Constraints on custom fields, by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, String>,
}
