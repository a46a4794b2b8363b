//! Presentation boundary output.
//!
//! [`ViewSnapshot`] captures everything a renderer reads from a
//! [`LogsContainer`] at one point in time.

use crate::model::{
    ActiveServiceLogEntry, FieldDescriptor, HistogramData, HistogramOptions, ListItem, LoadError,
    LogRecord, LogType, Tab, TabId,
};
use crate::state::LogsContainer;
use serde::Serialize;

/// Status line text for the number of matching events.
pub fn total_events_found_message(total_count: u64) -> String {
    format!("{total_count} events found")
}

/// Countdown text shown while auto refresh is on.
pub fn auto_refresh_message(remaining_seconds: u64) -> String {
    format!("Refreshing in {remaining_seconds} seconds")
}

/// Serializable view of every container output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    /// Active domain.
    pub log_type: Option<LogType>,
    /// Open tabs, in order.
    pub tabs: Vec<Tab>,
    /// Id of the active tab.
    pub active_tab: Option<TabId>,
    /// Column picker entries.
    pub available_columns: Vec<ListItem>,
    /// Shown columns.
    pub displayed_columns: Vec<FieldDescriptor>,
    /// Projected rows.
    pub logs: Vec<LogRecord>,
    /// Chart data of the active domain.
    pub histogram_data: HistogramData,
    /// Chart levels and colours.
    pub histogram_options: HistogramOptions,
    /// Events matching the last load.
    pub total_count: u64,
    /// Status line for `total_count`.
    pub total_events_found_message: String,
    /// Auto refresh countdown, when it is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_refresh_message: Option<String>,
    /// Row opened in detail.
    pub active_log: Option<ActiveServiceLogEntry>,
    /// Whether the log context view is open.
    pub is_service_log_context_view: bool,
    /// Whether a single service log file is shown.
    pub is_service_logs_file_view: bool,
    /// Last collaborator failure, until that operation next succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<LoadError>,
}

impl ViewSnapshot {
    /// Read every output of `container` now.
    pub fn capture(container: &LogsContainer) -> Self {
        Self {
            log_type: container.active_log_type(),
            tabs: container.tabs().latest().unwrap_or_default(),
            active_tab: container.active_tab().map(|tab| tab.id),
            available_columns: container.available_columns().latest().unwrap_or_default(),
            displayed_columns: container.displayed_columns().latest().unwrap_or_default(),
            logs: container.logs().latest().unwrap_or_default(),
            histogram_data: container.histogram_data().latest().unwrap_or_default(),
            histogram_options: container.histogram_options().clone(),
            total_count: container.total_count(),
            total_events_found_message: container.total_events_found_message(),
            auto_refresh_message: container.auto_refresh_message(),
            active_log: container.active_log().latest().flatten(),
            is_service_log_context_view: container
                .is_service_log_context_view()
                .latest()
                .unwrap_or(false),
            is_service_logs_file_view: container
                .is_service_logs_file_view()
                .latest()
                .unwrap_or(false),
            load_error: container.load_error().latest().flatten(),
        }
    }

    /// Pretty JSON unless `compact`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a value cannot be represented as JSON.
    pub fn to_json(&self, compact: bool) -> Result<String, serde_json::Error> {
        if compact {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        }
    }
}
