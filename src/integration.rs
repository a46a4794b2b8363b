//! Wiring of the container to in-memory collaborators.
//!
//! The CLI shell and the tests build their view from a [`Fixture`] through
//! this module, so both exercise the same graph.

use crate::config::ResolvedConfig;
use crate::model::LogType;
use crate::source::{
    Fixture, FixtureError, MemoryColumnsLoader, MemoryFiltering, MemoryHistogramSource,
    MemoryLogLoader, MemoryTabStore,
};
use crate::state::{Collaborators, FilterForm, LogsContainer};
use std::rc::Rc;
use tracing::info;

/// In-memory collaborators filled from a fixture.
///
/// Handles stay shared with the container, so callers can keep driving the
/// collaborators (deliver rows, publish buckets, add tabs) after wiring.
#[derive(Clone)]
pub struct MemoryBackend {
    /// Raw rows per domain.
    pub log_loader: Rc<MemoryLogLoader>,
    /// Histogram buckets per domain.
    pub histogram_source: Rc<MemoryHistogramSource>,
    /// Field catalogs per domain.
    pub columns_loader: Rc<MemoryColumnsLoader>,
    /// Time ranges and auto refresh.
    pub filtering: Rc<MemoryFiltering>,
    /// Open tabs.
    pub tab_store: Rc<MemoryTabStore>,
}

impl MemoryBackend {
    /// Stage the fixture's rows, buckets and tabs.
    ///
    /// Nothing is emitted on the log streams until the first load. The
    /// reported total count is the one of `log_type`.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::InvalidRecord` if a row is not a JSON object.
    pub fn from_fixture(fixture: &Fixture, log_type: LogType) -> Result<Self, FixtureError> {
        let log_loader = Rc::new(MemoryLogLoader::new());
        let histogram_source = Rc::new(MemoryHistogramSource::new());
        for domain in LogType::ALL {
            log_loader.stage(domain, fixture.records(domain)?);
            histogram_source.publish(domain, fixture.domain(domain).histogram.clone());
        }
        log_loader.set_total_count(fixture.total_count(log_type));

        Ok(Self {
            log_loader,
            histogram_source,
            columns_loader: Rc::new(MemoryColumnsLoader::new(fixture.columns())),
            filtering: Rc::new(MemoryFiltering::new()),
            tab_store: Rc::new(MemoryTabStore::new(fixture.tabs.clone())),
        })
    }

    /// Trait-object handles over the same collaborators.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            log_loader: self.log_loader.clone(),
            histogram_source: self.histogram_source.clone(),
            columns_loader: self.columns_loader.clone(),
            filtering: self.filtering.clone(),
            tab_store: self.tab_store.clone(),
        }
    }
}

/// Build a container over `fixture` and bring it to its startup state.
///
/// Startup installs a filter form (wired to the filtering collaborator so
/// custom time ranges reach it) and activates the configured log type, which
/// requests the initial load.
///
/// # Errors
///
/// Returns `FixtureError` if the fixture rows are invalid.
pub fn build(
    fixture: &Fixture,
    config: &ResolvedConfig,
) -> Result<(LogsContainer, MemoryBackend), FixtureError> {
    let backend = MemoryBackend::from_fixture(fixture, config.default_log_type)?;
    backend.filtering.set_auto_refresh(config.auto_refresh_seconds);

    let container = LogsContainer::new(backend.collaborators(), config.histogram_options());

    let form = FilterForm::default();
    backend.filtering.attach(form.clone());
    container.set_active_filters_form(form);
    container.set_active_log_type(config.default_log_type);

    info!(
        log_type = %config.default_log_type,
        tabs = fixture.tabs.len(),
        "Container ready"
    );
    Ok((container, backend))
}
