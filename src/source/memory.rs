//! In-memory collaborators.
//!
//! Used by the CLI shell (filled from a [`super::Fixture`]) and by tests,
//! which additionally drive them by hand: staging rows, deferring loads,
//! injecting failures.

use crate::model::{
    FieldDescriptor, HistogramBucket, LoadError, LogRecord, LogType, LogTypeMap, Tab, TabId,
    TimeRange, TimeRangeError,
};
use crate::reactive::{Signal, Source};
use crate::source::{ColumnsLoader, Filtering, HistogramSource, LogLoader, TabStore};
use crate::state::{FieldCatalog, FilterForm};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use tracing::debug;

// ===== MemoryLogLoader =====

/// Log loader serving staged rows.
///
/// `load_logs` re-emits the staged rows of every domain that has some. In
/// deferred mode the delivery waits for [`MemoryLogLoader::flush`], which
/// models a load resolving after the caller has moved on.
pub struct MemoryLogLoader {
    logs: LogTypeMap<Source<Vec<LogRecord>>>,
    staged: RefCell<LogTypeMap<Option<Vec<LogRecord>>>>,
    requests: Cell<usize>,
    failure: RefCell<Option<LoadError>>,
    total_count: Cell<u64>,
    deferred: Cell<bool>,
    pending: Cell<bool>,
}

impl MemoryLogLoader {
    /// Loader with nothing staged.
    pub fn new() -> Self {
        Self {
            logs: LogTypeMap::from_fn(|_| Source::new()),
            staged: RefCell::new(LogTypeMap::from_fn(|_| None)),
            requests: Cell::new(0),
            failure: RefCell::new(None),
            total_count: Cell::new(0),
            deferred: Cell::new(false),
            pending: Cell::new(false),
        }
    }

    /// Number of `load_logs` calls so far.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    /// Make the next `load_logs` call fail with `error`.
    pub fn fail_next(&self, error: LoadError) {
        *self.failure.borrow_mut() = Some(error);
    }

    /// Total count reported from now on.
    pub fn set_total_count(&self, total_count: u64) {
        self.total_count.set(total_count);
    }

    /// Rows delivered for `log_type` by subsequent loads.
    pub fn stage(&self, log_type: LogType, records: Vec<LogRecord>) {
        *self.staged.borrow_mut().get_mut(log_type) = Some(records);
    }

    /// Hold deliveries back until [`Self::flush`].
    pub fn set_deferred(&self, deferred: bool) {
        self.deferred.set(deferred);
    }

    /// Deliver the staged rows of a pending load. Returns `false` if no load
    /// was pending.
    pub fn flush(&self) -> bool {
        if !self.pending.replace(false) {
            return false;
        }
        self.deliver_staged();
        true
    }

    /// Emit `records` on the raw stream of `log_type` right away.
    pub fn deliver(&self, log_type: LogType, records: Vec<LogRecord>) {
        debug!(%log_type, rows = records.len(), "Delivering rows");
        self.logs.get(log_type).emit(records);
    }

    fn deliver_staged(&self) {
        let staged: Vec<(LogType, Vec<LogRecord>)> = self
            .staged
            .borrow()
            .iter()
            .filter_map(|(log_type, records)| records.clone().map(|records| (log_type, records)))
            .collect();
        for (log_type, records) in staged {
            self.deliver(log_type, records);
        }
    }
}

impl Default for MemoryLogLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LogLoader for MemoryLogLoader {
    fn logs(&self, log_type: LogType) -> Signal<Vec<LogRecord>> {
        self.logs.get(log_type).signal()
    }

    fn load_logs(&self) -> Result<(), LoadError> {
        self.requests.set(self.requests.get() + 1);
        if let Some(error) = self.failure.borrow_mut().take() {
            return Err(error);
        }
        if self.deferred.get() {
            self.pending.set(true);
        } else {
            self.deliver_staged();
        }
        Ok(())
    }

    fn total_count(&self) -> u64 {
        self.total_count.get()
    }
}

// ===== MemoryHistogramSource =====

/// Histogram buckets pushed by the caller.
pub struct MemoryHistogramSource {
    buckets: LogTypeMap<Source<Vec<HistogramBucket>>>,
}

impl MemoryHistogramSource {
    /// Source with no buckets for either domain.
    pub fn new() -> Self {
        Self {
            buckets: LogTypeMap::from_fn(|_| Source::new()),
        }
    }

    /// Emit `buckets` on the stream of `log_type`.
    pub fn publish(&self, log_type: LogType, buckets: Vec<HistogramBucket>) {
        self.buckets.get(log_type).emit(buckets);
    }
}

impl Default for MemoryHistogramSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramSource for MemoryHistogramSource {
    fn buckets(&self, log_type: LogType) -> Signal<Vec<HistogramBucket>> {
        self.buckets.get(log_type).signal()
    }
}

// ===== MemoryColumnsLoader =====

/// Fills catalogs with fixed descriptor lists.
pub struct MemoryColumnsLoader {
    columns: LogTypeMap<Vec<FieldDescriptor>>,
    failure: RefCell<Option<LoadError>>,
    calls: Cell<usize>,
}

impl MemoryColumnsLoader {
    /// Loader handing out `columns` per domain.
    pub fn new(columns: LogTypeMap<Vec<FieldDescriptor>>) -> Self {
        Self {
            columns,
            failure: RefCell::new(None),
            calls: Cell::new(0),
        }
    }

    /// Make the next load fail with `error`.
    pub fn fail_next(&self, error: LoadError) {
        *self.failure.borrow_mut() = Some(error);
    }

    /// Number of `load_columns_names` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ColumnsLoader for MemoryColumnsLoader {
    fn load_columns_names(
        &self,
        log_type: LogType,
        catalog: &FieldCatalog,
    ) -> Result<(), LoadError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(error) = self.failure.borrow_mut().take() {
            return Err(error);
        }
        catalog.replace(self.columns.get(log_type).clone());
        Ok(())
    }
}

// ===== MemoryFiltering =====

/// Records custom time ranges and forwards them to an attached form.
pub struct MemoryFiltering {
    ranges: RefCell<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    form: RefCell<Option<FilterForm>>,
    auto_refresh: Cell<Option<u64>>,
}

impl MemoryFiltering {
    /// No ranges recorded, no form attached, auto refresh off.
    pub fn new() -> Self {
        Self {
            ranges: RefCell::new(Vec::new()),
            form: RefCell::new(None),
            auto_refresh: Cell::new(None),
        }
    }

    /// Write accepted time ranges into `form`.
    pub fn attach(&self, form: FilterForm) {
        *self.form.borrow_mut() = Some(form);
    }

    /// Report `remaining_seconds` until the next refresh; `None` turns it off.
    pub fn set_auto_refresh(&self, remaining_seconds: Option<u64>) {
        self.auto_refresh.set(remaining_seconds);
    }

    /// Accepted ranges, oldest first.
    pub fn ranges(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.ranges.borrow().clone()
    }
}

impl Default for MemoryFiltering {
    fn default() -> Self {
        Self::new()
    }
}

impl Filtering for MemoryFiltering {
    fn set_custom_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), TimeRangeError> {
        let time_range = TimeRange::custom(start, end)?;
        self.ranges.borrow_mut().push((start, end));

        let form = self.form.borrow().clone();
        if let Some(form) = form {
            form.set_time_range(time_range);
        }
        Ok(())
    }

    fn auto_refresh_remaining_seconds(&self) -> Option<u64> {
        self.auto_refresh.get()
    }
}

// ===== MemoryTabStore =====

/// Tab list kept in memory.
pub struct MemoryTabStore {
    tabs: Source<Vec<Tab>>,
}

impl MemoryTabStore {
    /// Store holding `tabs`, in order.
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self {
            tabs: Source::with_value(tabs),
        }
    }

    /// Append `tab`, replacing a stored tab with the same id in place.
    pub fn add(&self, tab: Tab) {
        self.tabs.update(|tabs| match tabs.iter_mut().find(|t| t.id == tab.id) {
            Some(stored) => *stored = tab,
            None => tabs.push(tab),
        });
    }
}

impl TabStore for MemoryTabStore {
    fn tabs(&self) -> Signal<Vec<Tab>> {
        self.tabs.signal()
    }

    fn delete(&self, id: &TabId) -> bool {
        let mut removed = false;
        self.tabs.update(|tabs| {
            let before = tabs.len();
            tabs.retain(|tab| &tab.id != id);
            removed = tabs.len() != before;
        });
        removed
    }
}
