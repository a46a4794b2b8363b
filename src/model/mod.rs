//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod field;
pub mod filter;
pub mod histogram;
pub mod identifiers;
pub mod log_record;
pub mod log_type;
pub mod tab;

// Re-export for convenience
pub use error::{
    ActiveLogError, FieldError, LoadError, TabError, TimeRangeError, UnknownLogType, ViewError,
};
pub use field::{AvailableFields, FieldDescriptor, ListItem};
pub use filter::{FilterCriteria, TimeRange, TimeUnit};
pub use histogram::{
    BarGraph, HistogramBucket, HistogramData, HistogramOptions, LevelColor, StackedHistogram,
};
pub use identifiers::{FormId, InvalidTabId, TabId};
pub use log_record::{AuditLog, LogRecord, LogSchema, ServiceLog};
pub use log_type::{LogType, LogTypeMap};
pub use tab::{ActiveServiceLogEntry, Tab, TabAppState};
