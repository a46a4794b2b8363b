//! JSON fixtures feeding the in-memory collaborators.
//!
//! ```json
//! {
//!   "service": {
//!     "fields": [{"name": "level", "isAvailable": true, "isDisplayed": true}],
//!     "logs": [{"level": "ERROR", "host": "h1"}],
//!     "histogram": [{"label": "1700000000000", "count": 3}]
//!   },
//!   "audit": { "fields": [], "logs": [] },
//!   "tabs": [{"id": "service", "title": "Service Logs"}],
//!   "totalCount": 1
//! }
//! ```

use crate::model::{FieldDescriptor, HistogramBucket, LogRecord, LogType, LogTypeMap, Tab};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a fixture.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("Failed to read fixture at {path}: {reason}")]
    ReadError {
        /// Path that was read.
        path: PathBuf,
        /// I/O error description.
        reason: String,
    },

    /// The fixture is not valid JSON of the expected shape.
    #[error("Invalid fixture JSON: {reason}")]
    ParseError {
        /// Parser error description.
        reason: String,
    },

    /// A raw row does not fit the schema of its domain.
    #[error("Invalid {log_type} log at index {index}: {reason}")]
    InvalidRecord {
        /// Domain of the row.
        log_type: LogType,
        /// Position of the row in its domain's list.
        index: usize,
        /// Why the row was rejected.
        reason: String,
    },
}

/// Data of one log domain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomainFixture {
    /// Field catalog of the domain.
    pub fields: Vec<FieldDescriptor>,
    /// Raw rows, validated against the domain's schema on use.
    pub logs: Vec<Value>,
    /// Histogram buckets of the domain.
    pub histogram: Vec<HistogramBucket>,
}

/// Whole fixture document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Fixture {
    /// Service log data.
    pub service: DomainFixture,
    /// Audit log data.
    pub audit: DomainFixture,
    /// Open tabs, in order.
    pub tabs: Vec<Tab>,
    /// Total count reported by loads; the row count when absent.
    pub total_count: Option<u64>,
}

impl Fixture {
    /// Read and parse a fixture file.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::ReadError` if the file cannot be read and
    /// `FixtureError::ParseError` if it is not a valid fixture.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| FixtureError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&contents)
    }

    /// # Errors
    ///
    /// Returns `FixtureError::ParseError` if `contents` is not a valid fixture.
    pub fn parse(contents: &str) -> Result<Self, FixtureError> {
        serde_json::from_str(contents).map_err(|e| FixtureError::ParseError {
            reason: e.to_string(),
        })
    }

    /// Data of `log_type`.
    pub fn domain(&self, log_type: LogType) -> &DomainFixture {
        match log_type {
            LogType::Service => &self.service,
            LogType::Audit => &self.audit,
        }
    }

    /// Field descriptors of both domains.
    pub fn columns(&self) -> LogTypeMap<Vec<FieldDescriptor>> {
        LogTypeMap::from_fn(|log_type| self.domain(log_type).fields.clone())
    }

    /// Typed rows of one domain.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::InvalidRecord` for the first row that is not a
    /// JSON object. Mistyped fields of a row are kept as custom fields.
    pub fn records(&self, log_type: LogType) -> Result<Vec<LogRecord>, FixtureError> {
        self.domain(log_type)
            .logs
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                LogRecord::from_value(log_type, raw.clone()).map_err(|e| {
                    FixtureError::InvalidRecord {
                        log_type,
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Reported total, falling back to the number of rows of `log_type`.
    pub fn total_count(&self, log_type: LogType) -> u64 {
        self.total_count
            .unwrap_or(self.domain(log_type).logs.len() as u64)
    }
}
