//! Reload requests towards the external log loader.

use crate::model::LoadError;
use crate::reactive::{Signal, Source};
use crate::source::LogLoader;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Why a reload was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    /// The first time any log domain became active.
    InitialActivation,
    /// The active filter form reported a value change.
    FilterChange,
}

/// Collaborator call whose outcome is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOperation {
    /// Loading column names of a domain.
    ColumnsNames,
    /// Loading log rows.
    Logs,
}

impl LoadOperation {
    /// Name carried by [`LoadError::operation`] for this call.
    pub fn as_str(self) -> &'static str {
        match self {
            LoadOperation::ColumnsNames => "loadColumnsNames",
            LoadOperation::Logs => "loadLogs",
        }
    }

    fn failed(self, error: &LoadError) -> bool {
        error.operation == self.as_str()
    }
}

struct Inner {
    loader: Rc<dyn LogLoader>,
    error: Source<Option<LoadError>>,
    initial_requests: Cell<usize>,
    filter_requests: Cell<usize>,
}

/// Forwards reload requests to the [`LogLoader`] and publishes failures.
///
/// Every `request` results in exactly one `load_logs` call. Failures are
/// published unchanged on [`LoadTrigger::error`]; the next success of the
/// same operation clears them. Nothing is retried here.
#[derive(Clone)]
pub struct LoadTrigger {
    inner: Rc<Inner>,
}

impl LoadTrigger {
    /// Trigger that forwards every request to `loader`.
    pub fn new(loader: Rc<dyn LogLoader>) -> Self {
        Self {
            inner: Rc::new(Inner {
                loader,
                error: Source::with_value(None),
                initial_requests: Cell::new(0),
                filter_requests: Cell::new(0),
            }),
        }
    }

    /// Count a reload for `reason` and ask the loader for fresh rows.
    pub fn request(&self, reason: LoadReason) {
        let counter = match reason {
            LoadReason::InitialActivation => &self.inner.initial_requests,
            LoadReason::FilterChange => &self.inner.filter_requests,
        };
        counter.set(counter.get() + 1);

        debug!(?reason, "Requesting log reload");
        let result = self.inner.loader.load_logs();
        self.record(LoadOperation::Logs, result);
    }

    /// Publish the outcome of a collaborator call.
    ///
    /// A success clears the published failure only if `operation` reported
    /// it.
    pub fn record(&self, operation: LoadOperation, result: Result<(), LoadError>) {
        match result {
            Ok(()) => {
                if matches!(self.inner.error.latest(), Some(Some(err)) if operation.failed(&err)) {
                    self.inner.error.emit(None);
                }
            }
            Err(err) => {
                warn!(operation = operation.as_str(), error = %err, "Collaborator call failed");
                self.inner.error.emit(Some(err));
            }
        }
    }

    /// Latest collaborator failure, `None` once the failed operation succeeds.
    pub fn error(&self) -> Signal<Option<LoadError>> {
        self.inner.error.signal()
    }

    /// Number of requests made for `reason`.
    pub fn requests(&self, reason: LoadReason) -> usize {
        match reason {
            LoadReason::InitialActivation => self.inner.initial_requests.get(),
            LoadReason::FilterChange => self.inner.filter_requests.get(),
        }
    }

    /// Total number of matching events, as reported by the loader.
    pub fn total_count(&self) -> u64 {
        self.inner.loader.total_count()
    }
}

impl fmt::Debug for LoadTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTrigger")
            .field("initial_requests", &self.inner.initial_requests.get())
            .field("filter_requests", &self.inner.filter_requests.get())
            .field("error", &self.inner.error.latest())
            .finish()
    }
}
