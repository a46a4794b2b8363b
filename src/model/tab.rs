//! Open tabs and the view state they restore.

use crate::model::{LogType, TabId};
use serde::{Deserialize, Serialize};

// ===== ActiveServiceLogEntry =====

/// The service log row currently opened in detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveServiceLogEntry {
    /// Id of the log row.
    pub id: String,
    /// Host the row was logged on.
    pub host_name: String,
    /// Component that logged the row.
    pub component_name: String,
}

// ===== TabAppState =====

/// View state a tab restores when it becomes active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabAppState {
    /// Domain to activate.
    pub active_logs_type: LogType,
    /// Whether the tab shows a single service log file.
    #[serde(default)]
    pub is_service_logs_file_view: bool,
    /// Row to open in detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_log: Option<ActiveServiceLogEntry>,
}

// ===== Tab =====

/// An open tab. Identity is the `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Unique tab id.
    pub id: TabId,
    /// Text of the tab header.
    #[serde(alias = "label")]
    pub title: String,
    /// Whether the user may close the tab.
    #[serde(default = "default_closeable")]
    pub is_closeable: bool,
    /// View state restored on activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_state: Option<TabAppState>,
}

fn default_closeable() -> bool {
    true
}

impl Tab {
    /// Closeable tab without app state.
    pub fn new(id: TabId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            is_closeable: true,
            app_state: None,
        }
    }

    /// Restore `app_state` when the tab becomes active.
    pub fn with_app_state(mut self, app_state: TabAppState) -> Self {
        self.app_state = Some(app_state);
        self
    }
}
