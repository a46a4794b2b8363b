//! External collaborators of the view core.
//!
//! The core never performs I/O itself. It calls these narrow contracts and
//! reacts to what they emit:
//! - [`LogLoader`]: raw rows per domain plus the `load_logs` trigger
//! - [`HistogramSource`]: raw histogram buckets per domain
//! - [`ColumnsLoader`]: fills a domain's field catalog
//! - [`Filtering`]: receives custom time ranges, reports auto refresh
//! - [`TabStore`]: backs the ordered tab list
//!
//! In-memory implementations live in [`memory`]; [`fixture`] builds them from
//! a JSON document.

use crate::model::{HistogramBucket, LoadError, LogRecord, LogType, Tab, TabId, TimeRangeError};
use crate::reactive::Signal;
use crate::state::FieldCatalog;
use chrono::{DateTime, Utc};

pub mod fixture;
pub mod memory;

pub use fixture::{Fixture, FixtureError};
pub use memory::{
    MemoryColumnsLoader, MemoryFiltering, MemoryHistogramSource, MemoryLogLoader, MemoryTabStore,
};

/// Loads raw log rows.
pub trait LogLoader {
    /// Raw rows of one domain, re-emitted after every load.
    fn logs(&self, log_type: LogType) -> Signal<Vec<LogRecord>>;

    /// Reload rows with the current filter criteria.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` when the load could not be started. The core
    /// publishes it and does not retry.
    fn load_logs(&self) -> Result<(), LoadError>;

    /// Number of matching events reported by the last load.
    fn total_count(&self) -> u64;
}

/// Supplies histogram buckets, already scoped by domain.
pub trait HistogramSource {
    /// Buckets of one domain, re-emitted whenever they change.
    fn buckets(&self, log_type: LogType) -> Signal<Vec<HistogramBucket>>;
}

/// Populates field catalogs.
pub trait ColumnsLoader {
    /// # Errors
    ///
    /// Returns `LoadError` when the column names could not be fetched.
    fn load_columns_names(&self, log_type: LogType, catalog: &FieldCatalog)
        -> Result<(), LoadError>;
}

/// Filtering collaborator owning query construction.
pub trait Filtering {
    /// Receives a custom time range verbatim.
    ///
    /// # Errors
    ///
    /// Returns `TimeRangeError` when `start` is after `end`.
    fn set_custom_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), TimeRangeError>;

    /// Seconds until the next automatic refresh, `None` when it is off.
    fn auto_refresh_remaining_seconds(&self) -> Option<u64>;
}

/// Persistent ordered tab storage.
pub trait TabStore {
    /// Live ordered tab list.
    fn tabs(&self) -> Signal<Vec<Tab>>;

    /// Remove the tab with `id`. Returns `false` if it was not stored.
    fn delete(&self, id: &TabId) -> bool;
}
