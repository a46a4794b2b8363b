//! Error types for the log view core.
//!
//! Errors follow the taxonomy of the view:
//!
//! - **Configuration errors** ([`UnknownLogType`], [`TabError`], [`FieldError`],
//!   [`ActiveLogError`], [`TimeRangeError`]): programmer mistakes. Operations
//!   return them immediately instead of silently doing nothing.
//! - **Data-shape problems**: not errors at all. A record missing a field simply
//!   lacks it in the projection.
//! - **Collaborator failures** ([`LoadError`]): reported by external loaders and
//!   published unchanged as observable state. The core never retries.
//!
//! [`ViewError`] composes the configuration errors so callers can use `?` across
//! operations.

use crate::model::{InvalidTabId, TabId};
use thiserror::Error;

/// Top-level error returned by [`crate::state::LogsContainer`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// A log type name matched neither domain.
    #[error(transparent)]
    UnknownLogType(#[from] UnknownLogType),

    /// A tab reference was invalid.
    #[error(transparent)]
    Tab(#[from] TabError),

    /// A field catalog edit was invalid.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// An active log entry was selected outside the service domain.
    #[error(transparent)]
    ActiveLog(#[from] ActiveLogError),

    /// A custom time range was inverted.
    #[error(transparent)]
    TimeRange(#[from] TimeRangeError),

    /// A tab id failed validation.
    #[error(transparent)]
    InvalidTabId(#[from] InvalidTabId),
}

/// A log type name that maps to neither domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown log type '{0}' (expected 'service' or 'audit')")]
pub struct UnknownLogType(pub String);

/// Invalid tab references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    /// The tab is not in the registry.
    #[error("Tab '{0}' is not open")]
    NotFound(TabId),
}

/// Invalid field catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// No field with this name is in the catalog.
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// Only available fields can be displayed.
    #[error("Field '{0}' is not available and cannot be displayed")]
    NotAvailable(String),
}

/// Invalid active log entry selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActiveLogError {
    /// The service domain is not active.
    #[error("An active log entry can only be selected while service logs are shown")]
    NotServiceContext,
}

/// Invalid time range bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    /// `start` is after `end`.
    #[error("Time range start {start} is after end {end}")]
    StartAfterEnd {
        /// Requested start.
        start: chrono::DateTime<chrono::Utc>,
        /// Requested end.
        end: chrono::DateTime<chrono::Utc>,
    },
}

/// Failure reported by an external collaborator.
///
/// Cloneable so it can be published as observable state.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("{operation} failed: {message}")]
pub struct LoadError {
    /// Which collaborator call failed (e.g. "loadLogs").
    pub operation: String,
    /// Collaborator-provided description.
    pub message: String,
}

impl LoadError {
    /// Failure of `operation` described by `message`.
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
