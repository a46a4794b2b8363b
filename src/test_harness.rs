//! Acceptance test harness over the in-memory backend.
//!
//! Wraps a [`LogsContainer`] built from a fixture, with the collaborators
//! kept at hand so tests can push rows, fail loads and inspect outputs.

use crate::config::ResolvedConfig;
use crate::integration::{self, MemoryBackend};
use crate::model::{LogType, Tab, TabId, ViewError};
use crate::source::{Fixture, FixtureError};
use crate::state::LogsContainer;

/// Fixture shared by the acceptance tests.
pub const CLUSTER_FIXTURE: &str = "tests/fixtures/cluster.json";

/// Test harness for acceptance testing.
pub struct AcceptanceTestHarness {
    container: LogsContainer,
    backend: MemoryBackend,
}

impl AcceptanceTestHarness {
    /// Load a fixture file with the default configuration.
    pub fn from_fixture(path: &str) -> Result<Self, FixtureError> {
        Self::from_fixture_with_config(path, &ResolvedConfig::default())
    }

    pub fn from_fixture_with_config(
        path: &str,
        config: &ResolvedConfig,
    ) -> Result<Self, FixtureError> {
        let fixture = Fixture::load(path)?;
        let (container, backend) = integration::build(&fixture, config)?;
        Ok(Self { container, backend })
    }

    /// Build from inline fixture JSON.
    #[allow(dead_code)]
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let fixture = Fixture::parse(json)?;
        let (container, backend) = integration::build(&fixture, &ResolvedConfig::default())?;
        Ok(Self { container, backend })
    }

    pub fn container(&self) -> &LogsContainer {
        &self.container
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    pub fn switch_log_type(&self, log_type: LogType) {
        self.container.set_active_log_type(log_type);
    }

    /// Open tab `id`. Unknown ids are passed through so the error surfaces.
    pub fn switch_tab(&self, id: &str) -> Result<(), ViewError> {
        let tab = self.tab(id)?;
        self.container.switch_tab(&tab)
    }

    pub fn close_tab(&self, id: &str, fallback: Option<&str>) -> Result<(), ViewError> {
        let tab = self.tab(id)?;
        let fallback = fallback.map(|id| self.tab(id)).transpose()?;
        self.container.close_tab(&tab, fallback.as_ref())
    }

    /// Ids of the open tabs, in order.
    pub fn tab_ids(&self) -> Vec<String> {
        self.container
            .tabs()
            .latest()
            .unwrap_or_default()
            .into_iter()
            .map(|tab| tab.id.to_string())
            .collect()
    }

    /// Projected rows as JSON.
    pub fn logs_json(&self) -> serde_json::Value {
        serde_json::to_value(self.container.logs().latest().unwrap_or_default())
            .expect("records serialize")
    }

    /// Values of the column picker entries.
    pub fn available_column_names(&self) -> Vec<String> {
        self.container
            .available_columns()
            .latest()
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.value)
            .collect()
    }

    pub fn displayed_column_names(&self) -> Vec<String> {
        self.container
            .displayed_columns()
            .latest()
            .unwrap_or_default()
            .iter()
            .map(|field| field.name().to_string())
            .collect()
    }

    /// Compact JSON of the whole view snapshot.
    pub fn snapshot_json(&self) -> String {
        self.container
            .snapshot()
            .to_json(true)
            .expect("snapshot serializes")
    }

    fn tab(&self, id: &str) -> Result<Tab, ViewError> {
        let id = TabId::new(id)?;
        let found = self
            .container
            .tabs()
            .latest()
            .unwrap_or_default()
            .into_iter()
            .find(|tab| tab.id == id);
        Ok(found.unwrap_or_else(|| Tab::new(id.clone(), id.as_str())))
    }
}
