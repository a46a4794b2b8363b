//! Root of the view state graph and its presentation boundary.

use crate::model::{
    ActiveLogError, ActiveServiceLogEntry, FieldDescriptor, HistogramData, HistogramOptions,
    ListItem, LoadError, LogRecord, LogType, LogTypeMap, Tab, TabId, ViewError,
};
use crate::reactive::{Signal, Source};
use crate::source::{ColumnsLoader, Filtering, HistogramSource, LogLoader, TabStore};
use crate::state::{
    Activation, ActiveLogSlot, FieldCatalog, FilterContext, FilterForm, HistogramAggregator,
    LoadOperation, LoadReason, LoadTrigger, LogDomain, LogTypeContext, TabRegistry, ViewProjector,
};
use crate::view::{self, ViewSnapshot};
use chrono::{DateTime, Utc};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// External services the container talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Fetches rows and re-emits them per domain.
    pub log_loader: Rc<dyn LogLoader>,
    /// Raw histogram buckets per domain.
    pub histogram_source: Rc<dyn HistogramSource>,
    /// Column names per domain.
    pub columns_loader: Rc<dyn ColumnsLoader>,
    /// Auto-refresh countdown.
    pub filtering: Rc<dyn Filtering>,
    /// Persisted tabs.
    pub tab_store: Rc<dyn TabStore>,
}

/// Wires the contexts, the derived views and the tab registry together.
///
/// All operations take `&self`, so they may be called from listeners.
/// Nothing is active after construction: the first
/// [`LogsContainer::set_active_log_type`] binds the views and requests the
/// initial load.
pub struct LogsContainer {
    log_types: LogTypeContext,
    filters: FilterContext,
    loads: LoadTrigger,
    projector: Rc<ViewProjector>,
    histogram: Rc<HistogramAggregator>,
    active_log: Rc<ActiveLogSlot>,
    tabs: TabRegistry,
    filtering: Rc<dyn Filtering>,
    histogram_options: HistogramOptions,
    service_log_context_view: Source<bool>,
    service_logs_file_view: Source<bool>,
}

impl LogsContainer {
    /// Build the graph and load the column names of every domain.
    ///
    /// Column-load failures are published on [`Self::load_error`].
    pub fn new(collaborators: Collaborators, histogram_options: HistogramOptions) -> Self {
        let Collaborators {
            log_loader,
            histogram_source,
            columns_loader,
            filtering,
            tab_store,
        } = collaborators;

        let loads = LoadTrigger::new(Rc::clone(&log_loader));
        let domains = LogTypeMap::from_fn(|log_type| LogDomain {
            catalog: FieldCatalog::new(),
            logs: log_loader.logs(log_type),
            histogram: histogram_source.buckets(log_type),
        });
        // First failure wins; every domain is still attempted.
        let mut columns = Ok(());
        for (log_type, domain) in domains.iter() {
            debug!(%log_type, "Loading column names");
            columns = columns.and(columns_loader.load_columns_names(log_type, &domain.catalog));
        }
        loads.record(LoadOperation::ColumnsNames, columns);

        let projector = Rc::new(ViewProjector::new());
        let histogram = Rc::new(HistogramAggregator::new());
        let active_log = Rc::new(ActiveLogSlot::new());

        let log_types = LogTypeContext::new(domains, loads.clone());
        log_types.register(projector.clone());
        log_types.register(histogram.clone());
        log_types.register(active_log.clone());

        Self {
            log_types,
            filters: FilterContext::new(loads.clone()),
            loads,
            projector,
            histogram,
            active_log,
            tabs: TabRegistry::new(tab_store),
            filtering,
            histogram_options,
            service_log_context_view: Source::with_value(false),
            service_logs_file_view: Source::with_value(false),
        }
    }

    // ===== Log domain =====

    /// Switch the active domain. `None` when it already was active.
    ///
    /// Leaving the Service domain also leaves the log context view.
    pub fn set_active_log_type(&self, log_type: LogType) -> Option<Activation> {
        let activation = self.log_types.set_active(log_type)?;
        if log_type != LogType::Service {
            set_flag(&self.service_log_context_view, false);
        }
        Some(activation)
    }

    /// Switch the active domain by name.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::UnknownLogType` if `name` is not a log type.
    pub fn set_active_log_type_name(&self, name: &str) -> Result<Option<Activation>, ViewError> {
        let log_type: LogType = name.parse()?;
        Ok(self.set_active_log_type(log_type))
    }

    /// Currently active domain, if any.
    pub fn active_log_type(&self) -> Option<LogType> {
        self.log_types.current()
    }

    /// Active domain changes.
    pub fn log_type(&self) -> Signal<LogType> {
        self.log_types.active()
    }

    /// Field catalog of `log_type`, for external settings pushes.
    pub fn catalog(&self, log_type: LogType) -> &FieldCatalog {
        &self.log_types.domain(log_type).catalog
    }

    // ===== Filters =====

    /// Make `form` the active filter form. `false` when it already was.
    pub fn set_active_filters_form(&self, form: FilterForm) -> bool {
        self.filters.set_active_form(form)
    }

    /// Currently active filter form, if any.
    pub fn active_filters_form(&self) -> Option<FilterForm> {
        self.filters.active_form()
    }

    /// Forward a custom time range to the filtering collaborator.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::TimeRange` if the collaborator rejects the bounds.
    pub fn set_custom_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), ViewError> {
        self.filtering.set_custom_time_range(start, end)?;
        Ok(())
    }

    // ===== Tabs =====

    /// Every open tab.
    pub fn tabs(&self) -> Signal<Vec<Tab>> {
        self.tabs.get_all()
    }

    /// The open tab, if any.
    pub fn active_tab(&self) -> Option<Tab> {
        self.tabs.active_tab()
    }

    /// Id of the open tab.
    pub fn active_tab_id(&self) -> Signal<Option<TabId>> {
        self.tabs.active()
    }

    /// Activate `tab` and restore the view state it carries.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Tab` if `tab` is not open.
    pub fn switch_tab(&self, tab: &Tab) -> Result<(), ViewError> {
        let stored = self.tabs.switch_tab(tab)?;
        self.apply_app_state(&stored)
    }

    /// Close `tab`, then switch to `fallback` if given.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Tab` if `tab` or `fallback` is not open.
    pub fn close_tab(&self, tab: &Tab, fallback: Option<&Tab>) -> Result<(), ViewError> {
        match self.tabs.close_tab(tab, fallback)? {
            Some(activated) => self.apply_app_state(&activated),
            None => Ok(()),
        }
    }

    fn apply_app_state(&self, tab: &Tab) -> Result<(), ViewError> {
        let Some(state) = &tab.app_state else {
            return Ok(());
        };
        info!(tab = %tab.id, log_type = %state.active_logs_type, "Restoring tab state");

        self.set_active_log_type(state.active_logs_type);
        set_flag(&self.service_logs_file_view, state.is_service_logs_file_view);
        if state.active_logs_type == LogType::Service {
            match &state.active_log {
                Some(entry) => self.active_log.set(entry.clone())?,
                None => self.active_log.clear(),
            }
        }
        Ok(())
    }

    // ===== Derived views =====

    /// Whitelist-projected rows of the active domain.
    pub fn logs(&self) -> Signal<Vec<LogRecord>> {
        self.projector.logs()
    }

    /// Columns the user may pick from.
    pub fn available_columns(&self) -> Signal<Vec<ListItem>> {
        self.projector.available_columns()
    }

    /// Columns shown in the table.
    pub fn displayed_columns(&self) -> Signal<Vec<FieldDescriptor>> {
        self.projector.displayed_columns()
    }

    /// Chart data of the active domain.
    pub fn histogram_data(&self) -> Signal<HistogramData> {
        self.histogram.data()
    }

    /// Level colors and order of the histogram.
    pub fn histogram_options(&self) -> &HistogramOptions {
        &self.histogram_options
    }

    /// Emissions dropped because they arrived for a retired domain.
    pub fn discarded_emissions(&self) -> u64 {
        self.projector.discarded()
    }

    // ===== Active log entry =====

    /// The service log row opened in detail.
    pub fn active_log(&self) -> Signal<Option<ActiveServiceLogEntry>> {
        self.active_log.signal()
    }

    /// # Errors
    ///
    /// Returns `ViewError::ActiveLog` unless the Service domain is active.
    pub fn set_active_log(&self, entry: ActiveServiceLogEntry) -> Result<(), ViewError> {
        self.active_log.set(entry)?;
        Ok(())
    }

    /// Deselect the active entry, leaving the log context view with it.
    pub fn clear_active_log(&self) {
        self.active_log.clear();
        set_flag(&self.service_log_context_view, false);
    }

    // ===== View flags =====

    /// Whether the service log context view is shown.
    pub fn is_service_log_context_view(&self) -> Signal<bool> {
        self.service_log_context_view.signal()
    }

    /// Show or hide the surrounding lines of the active entry.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::ActiveLog` when enabling it outside the Service
    /// domain.
    pub fn set_service_log_context_view(&self, enabled: bool) -> Result<(), ViewError> {
        if enabled && self.active_log_type() != Some(LogType::Service) {
            return Err(ActiveLogError::NotServiceContext.into());
        }
        set_flag(&self.service_log_context_view, enabled);
        Ok(())
    }

    /// Whether the service logs file view is shown.
    pub fn is_service_logs_file_view(&self) -> Signal<bool> {
        self.service_logs_file_view.signal()
    }

    /// Show or hide the service logs file view.
    pub fn set_service_logs_file_view(&self, enabled: bool) {
        set_flag(&self.service_logs_file_view, enabled);
    }

    // ===== Loading and status =====

    /// Rows matched by the last load.
    pub fn total_count(&self) -> u64 {
        self.loads.total_count()
    }

    /// Latest collaborator failure, `None` once the failed operation succeeds.
    pub fn load_error(&self) -> Signal<Option<LoadError>> {
        self.loads.error()
    }

    /// Reload requests made for `reason`.
    pub fn load_requests(&self, reason: LoadReason) -> usize {
        self.loads.requests(reason)
    }

    /// Seconds until the next auto refresh, if one is scheduled.
    pub fn auto_refresh_remaining_seconds(&self) -> Option<u64> {
        self.filtering.auto_refresh_remaining_seconds()
    }

    /// Status line for the matched row count.
    pub fn total_events_found_message(&self) -> String {
        view::total_events_found_message(self.total_count())
    }

    /// Countdown line, if an auto refresh is scheduled.
    pub fn auto_refresh_message(&self) -> Option<String> {
        self.auto_refresh_remaining_seconds()
            .map(view::auto_refresh_message)
    }

    /// Serializable capture of every output.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::capture(self)
    }
}

fn set_flag(flag: &Source<bool>, value: bool) {
    if flag.latest() != Some(value) {
        flag.emit(value);
    }
}

impl fmt::Debug for LogsContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogsContainer")
            .field("log_types", &self.log_types)
            .field("filters", &self.filters)
            .field("loads", &self.loads)
            .field("tabs", &self.tabs)
            .finish()
    }
}

#[cfg(test)]
#[path = "logs_container_tests.rs"]
mod tests;
