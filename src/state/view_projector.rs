//! Column lists and whitelist-projected rows for the active domain.
//!
//! The projector listens to two sources of the active domain, in any order:
//!
//! - catalog emissions recompute `available_columns` and `displayed_columns`
//!   and, when the available-name set is non-empty, re-project the latest raw
//!   rows with it;
//! - raw-log emissions are projected with the latest available-name set.
//!
//! While the available-name set is empty nothing is projected and the
//! published rows stay as they were; rows arriving meanwhile are kept raw and
//! projected once a non-empty set comes back. Every activation starts from a
//! clean slate so no rows or columns of the previous domain survive a switch.

use crate::model::{AvailableFields, FieldDescriptor, ListItem, LogRecord, LogType};
use crate::reactive::{Scope, ScopeToken, Signal, Source};
use crate::state::field_catalog::{available_columns, available_fields, displayed_columns};
use crate::state::{DomainBinding, LogDomain};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

/// Project every record with the same whitelist, preserving order.
pub fn project_logs(records: &[LogRecord], available: &AvailableFields) -> Vec<LogRecord> {
    records.iter().map(|record| record.project(available)).collect()
}

#[derive(Default)]
struct Latest {
    available: Option<AvailableFields>,
    raw: Option<Vec<LogRecord>>,
}

struct Outputs {
    logs: Source<Vec<LogRecord>>,
    available_columns: Source<Vec<ListItem>>,
    displayed_columns: Source<Vec<FieldDescriptor>>,
    projections: Cell<u64>,
    discarded: Cell<u64>,
}

/// Derives the three rendering products of the active domain.
pub struct ViewProjector {
    latest: Rc<RefCell<Latest>>,
    outputs: Rc<Outputs>,
}

impl ViewProjector {
    /// Projector with every output empty.
    pub fn new() -> Self {
        Self {
            latest: Rc::new(RefCell::new(Latest::default())),
            outputs: Rc::new(Outputs {
                logs: Source::with_value(Vec::new()),
                available_columns: Source::with_value(Vec::new()),
                displayed_columns: Source::with_value(Vec::new()),
                projections: Cell::new(0),
                discarded: Cell::new(0),
            }),
        }
    }

    /// Projected rows of the active domain.
    pub fn logs(&self) -> Signal<Vec<LogRecord>> {
        self.outputs.logs.signal()
    }

    /// Columns the user may pick from.
    pub fn available_columns(&self) -> Signal<Vec<ListItem>> {
        self.outputs.available_columns.signal()
    }

    /// Columns shown in the table.
    pub fn displayed_columns(&self) -> Signal<Vec<FieldDescriptor>> {
        self.outputs.displayed_columns.signal()
    }

    /// Number of projections run so far.
    pub fn projections(&self) -> u64 {
        self.outputs.projections.get()
    }

    /// Number of emissions dropped because their scope was retired.
    pub fn discarded(&self) -> u64 {
        self.outputs.discarded.get()
    }

    /// Clear every output. Stops early if a listener switched domains.
    fn reset(&self, token: &ScopeToken) {
        *self.latest.borrow_mut() = Latest::default();
        self.outputs.logs.emit(Vec::new());
        if token.is_current() {
            self.outputs.available_columns.emit(Vec::new());
        }
        if token.is_current() {
            self.outputs.displayed_columns.emit(Vec::new());
        }
    }
}

impl Default for ViewProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainBinding for ViewProjector {
    fn bind(&self, log_type: LogType, domain: &LogDomain, scope: &mut Scope) {
        let token = scope.token();
        if !token.is_current() {
            debug!(%log_type, "Skipping bind to superseded scope");
            return;
        }
        self.reset(&token);

        let latest = Rc::clone(&self.latest);
        let outputs = Rc::clone(&self.outputs);
        scope.hold(domain.catalog.get_all().subscribe(move |fields| {
            on_fields(&token, log_type, &latest, &outputs, fields);
        }));

        let token = scope.token();
        if !token.is_current() {
            return;
        }
        let latest = Rc::clone(&self.latest);
        let outputs = Rc::clone(&self.outputs);
        scope.hold(domain.logs.subscribe(move |records| {
            on_logs(&token, log_type, &latest, &outputs, records);
        }));
    }
}

fn is_stale(token: &ScopeToken, log_type: LogType, outputs: &Outputs, source: &str) -> bool {
    if token.is_current() {
        return false;
    }
    outputs.discarded.set(outputs.discarded.get() + 1);
    debug!(
        %log_type,
        generation = token.generation(),
        source,
        "Discarding emission from retired scope"
    );
    true
}

fn on_fields(
    token: &ScopeToken,
    log_type: LogType,
    latest: &RefCell<Latest>,
    outputs: &Outputs,
    fields: &[FieldDescriptor],
) {
    if is_stale(token, log_type, outputs, "catalog") {
        return;
    }

    let available = available_fields(fields);
    let projected = {
        let mut latest = latest.borrow_mut();
        let projected = if available.is_empty() {
            debug!(%log_type, "No available fields, keeping previous rows");
            None
        } else {
            latest
                .raw
                .as_deref()
                .map(|raw| project_logs(raw, &available))
        };
        latest.available = Some(available);
        projected
    };

    outputs.available_columns.emit(available_columns(fields));
    if let Some(rows) = projected {
        if !token.is_current() {
            return;
        }
        outputs.projections.set(outputs.projections.get() + 1);
        outputs.logs.emit(rows);
    }
    if token.is_current() {
        outputs.displayed_columns.emit(displayed_columns(fields));
    }
}

fn on_logs(
    token: &ScopeToken,
    log_type: LogType,
    latest: &RefCell<Latest>,
    outputs: &Outputs,
    records: &[LogRecord],
) {
    if is_stale(token, log_type, outputs, "logs") {
        return;
    }

    let projected = {
        let mut latest = latest.borrow_mut();
        latest.raw = Some(records.to_vec());
        latest
            .available
            .as_ref()
            .filter(|available| !available.is_empty())
            .map(|available| project_logs(records, available))
    };

    match projected {
        Some(rows) => {
            outputs.projections.set(outputs.projections.get() + 1);
            outputs.logs.emit(rows);
        }
        None => debug!(%log_type, rows = records.len(), "No available fields yet, holding rows"),
    }
}

#[cfg(test)]
#[path = "view_projector_tests.rs"]
mod tests;
