//! Histogram buckets and chart-ready aggregates.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

// ===== HistogramBucket =====

/// One raw bucket as delivered by the histogram data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Time label of the bucket.
    pub label: String,
    /// Number of events in the bucket.
    pub count: u64,
}

impl HistogramBucket {
    /// Bucket of `count` events under `label`.
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

// ===== BarGraph =====

/// Buckets of one series (one log level), keyed by time label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarGraph {
    /// Series name, usually a log level.
    pub name: String,
    /// Buckets of the series, in time order.
    #[serde(default)]
    pub data_count: Vec<HistogramBucket>,
}

// ===== HistogramData =====

/// Label → count mapping with unique labels, in first-seen order.
///
/// Order matters for the chart's x-axis; serializes as a JSON object in
/// that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistogramData {
    entries: Vec<(String, u64)>,
}

impl HistogramData {
    /// Add `count` to `label`, appending the label if it is new.
    pub fn add(&mut self, label: &str, count: u64) {
        match self.entries.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, total)) => *total = total.saturating_add(count),
            None => self.entries.push((label.to_string(), count)),
        }
    }

    /// Count of `label`, if present.
    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, count)| *count)
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// `(label, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| *count).sum()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no label has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for HistogramData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Per-timestamp (epoch millis) counts for each level, for stacked charts.
pub type StackedHistogram = BTreeMap<i64, BTreeMap<String, u64>>;

// ===== HistogramOptions =====

/// Colour assigned to one level in the chart legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelColor {
    /// Log level.
    pub level: String,
    /// CSS colour of the level.
    pub color: String,
}

/// Chart options: the levels to plot, in legend order, with their colours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramOptions {
    /// Levels with their colours, in legend order.
    pub keys_with_colors: Vec<LevelColor>,
}

impl HistogramOptions {
    /// Replace the colour of known levels and append new ones.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (level, color) in overrides {
            match self.keys_with_colors.iter_mut().find(|entry| &entry.level == level) {
                Some(entry) => entry.color = color.clone(),
                None => self.keys_with_colors.push(LevelColor {
                    level: level.clone(),
                    color: color.clone(),
                }),
            }
        }
        self
    }

    /// Colour of `level`, if it is plotted.
    pub fn color_of(&self, level: &str) -> Option<&str> {
        self.keys_with_colors
            .iter()
            .find(|entry| entry.level == level)
            .map(|entry| entry.color.as_str())
    }

    /// Plotted levels in legend order.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.keys_with_colors.iter().map(|entry| entry.level.as_str())
    }
}

impl Default for HistogramOptions {
    fn default() -> Self {
        let defaults = [
            ("FATAL", "#830A0A"),
            ("ERROR", "#E81D1D"),
            ("WARN", "#FF8916"),
            ("INFO", "#2577B5"),
            ("DEBUG", "#65E8FF"),
            ("TRACE", "#888"),
            ("UNKNOWN", "#BDBDBD"),
        ];
        Self {
            keys_with_colors: defaults
                .into_iter()
                .map(|(level, color)| LevelColor {
                    level: level.to_string(),
                    color: color.to_string(),
                })
                .collect(),
        }
    }
}
