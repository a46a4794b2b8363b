//! The service log row opened in detail.

use crate::model::{ActiveLogError, ActiveServiceLogEntry, LogType};
use crate::reactive::{Scope, Signal, Source};
use crate::state::{DomainBinding, LogDomain};
use std::cell::Cell;
use tracing::debug;

/// Nullable pointer to the selected service log row.
///
/// Only valid while the Service domain is active; every activation clears it.
pub struct ActiveLogSlot {
    entry: Source<Option<ActiveServiceLogEntry>>,
    context: Cell<Option<LogType>>,
}

impl ActiveLogSlot {
    /// Slot with no entry and no active domain.
    pub fn new() -> Self {
        Self {
            entry: Source::with_value(None),
            context: Cell::new(None),
        }
    }

    /// Select `entry`.
    ///
    /// # Errors
    ///
    /// Returns `ActiveLogError::NotServiceContext` unless the Service domain
    /// is active.
    pub fn set(&self, entry: ActiveServiceLogEntry) -> Result<(), ActiveLogError> {
        if self.context.get() != Some(LogType::Service) {
            return Err(ActiveLogError::NotServiceContext);
        }
        debug!(id = %entry.id, host = %entry.host_name, "Selected log entry");
        self.entry.emit(Some(entry));
        Ok(())
    }

    /// Drop the selected entry, if any.
    pub fn clear(&self) {
        if matches!(self.entry.latest(), Some(Some(_))) {
            self.entry.emit(None);
        }
    }

    /// Selected entry, if any.
    pub fn get(&self) -> Option<ActiveServiceLogEntry> {
        self.entry.latest().flatten()
    }

    /// Selection changes.
    pub fn signal(&self) -> Signal<Option<ActiveServiceLogEntry>> {
        self.entry.signal()
    }
}

impl Default for ActiveLogSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainBinding for ActiveLogSlot {
    fn bind(&self, log_type: LogType, _domain: &LogDomain, scope: &mut Scope) {
        if !scope.token().is_current() {
            debug!(%log_type, "Skipping bind to superseded scope");
            return;
        }
        self.context.set(Some(log_type));
        self.clear();
    }
}
