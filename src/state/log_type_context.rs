//! Active log domain selection and per-domain subscription scoping.

use crate::model::{HistogramBucket, LogRecord, LogType, LogTypeMap};
use crate::reactive::{Scope, ScopeController, ScopeToken, Signal, Source};
use crate::state::{FieldCatalog, LoadReason, LoadTrigger};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

// ===== LogDomain =====

/// Everything one log domain exposes to the view.
#[derive(Debug)]
pub struct LogDomain {
    /// Field descriptors of this domain.
    pub catalog: FieldCatalog,
    /// Raw rows, re-emitted by the loader after every (re)load.
    pub logs: Signal<Vec<LogRecord>>,
    /// Raw histogram buckets for this domain.
    pub histogram: Signal<Vec<HistogramBucket>>,
}

// ===== DomainBinding =====

/// A view that follows the active domain.
///
/// `bind` is called on every activation, after the previous domain's scope has
/// been retired. Implementations subscribe to the domain's sources, hold the
/// subscriptions in `scope`, and check the scope token in every listener.
pub trait DomainBinding {
    /// Follow `domain`, holding every subscription in `scope`.
    fn bind(&self, log_type: LogType, domain: &LogDomain, scope: &mut Scope);
}

// ===== Activation =====

/// Outcome of a domain switch.
#[derive(Debug, Clone)]
pub struct Activation {
    /// Domain that became active.
    pub log_type: LogType,
    /// Domain that was active before, if any.
    pub previous: Option<LogType>,
    /// Whether this was the first activation, which triggers the initial load.
    pub first: bool,
    /// Token of the new domain scope.
    pub token: ScopeToken,
}

// ===== LogTypeContext =====

/// Single writer of the active log domain.
pub struct LogTypeContext {
    domains: LogTypeMap<LogDomain>,
    active: Source<LogType>,
    bindings: RefCell<Vec<Rc<dyn DomainBinding>>>,
    scopes: RefCell<ScopeController>,
    loads: LoadTrigger,
    initial_load_done: Cell<bool>,
}

impl LogTypeContext {
    /// No domain is active until the first [`Self::set_active`].
    pub fn new(domains: LogTypeMap<LogDomain>, loads: LoadTrigger) -> Self {
        Self {
            domains,
            active: Source::new(),
            bindings: RefCell::new(Vec::new()),
            scopes: RefCell::new(ScopeController::new("log-type")),
            loads,
            initial_load_done: Cell::new(false),
        }
    }

    /// Register a view to (re)bind on every activation, in registration order.
    ///
    /// A binding added while a domain is active is bound on the next switch.
    pub fn register(&self, binding: Rc<dyn DomainBinding>) {
        self.bindings.borrow_mut().push(binding);
    }

    /// Switch the active domain.
    ///
    /// Retires every subscription of the previous domain, publishes the new
    /// type, rebinds all registered views to the new domain's sources and, on
    /// the very first activation only, requests the initial log load.
    /// Re-activating the current domain does nothing and returns `None`.
    ///
    /// A listener may switch again while this switch is still binding. The
    /// later switch wins: the remaining views are not bound to this domain
    /// and `None` is returned.
    pub fn set_active(&self, log_type: LogType) -> Option<Activation> {
        let previous = self.current();
        if previous == Some(log_type) {
            debug!(%log_type, "Log type already active");
            return None;
        }

        let mut scope = self.scopes.borrow_mut().begin();
        let token = scope.token();
        self.active.emit(log_type);

        let domain = self.domains.get(log_type);
        let bindings: Vec<Rc<dyn DomainBinding>> = self.bindings.borrow().clone();
        for binding in bindings {
            if !token.is_current() {
                break;
            }
            binding.bind(log_type, domain, &mut scope);
        }
        if !self.scopes.borrow_mut().install(scope) {
            debug!(
                %log_type,
                generation = token.generation(),
                "Switch superseded while binding"
            );
            return None;
        }

        let first = !self.initial_load_done.replace(true);
        info!(
            %log_type,
            previous = ?previous,
            generation = token.generation(),
            first,
            "Switched log type"
        );
        if first {
            self.loads.request(LoadReason::InitialActivation);
        }

        Some(Activation {
            log_type,
            previous,
            first,
            token,
        })
    }

    /// Currently active domain, if any has been activated.
    pub fn current(&self) -> Option<LogType> {
        self.active.latest()
    }

    /// Active domain changes.
    pub fn active(&self) -> Signal<LogType> {
        self.active.signal()
    }

    /// Sources of `log_type`.
    pub fn domain(&self, log_type: LogType) -> &LogDomain {
        self.domains.get(log_type)
    }

    /// Token of the live domain scope.
    pub fn current_scope(&self) -> Option<ScopeToken> {
        self.scopes.borrow().current()
    }

    /// Subscriptions held by the live domain scope.
    pub fn live_subscriptions(&self) -> usize {
        self.scopes.borrow().live_subscriptions()
    }
}

impl fmt::Debug for LogTypeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogTypeContext")
            .field("active", &self.current())
            .field("bindings", &self.bindings.borrow().len())
            .field("scopes", &self.scopes.borrow())
            .field("initial_load_done", &self.initial_load_done.get())
            .finish()
    }
}

#[cfg(test)]
#[path = "log_type_context_tests.rs"]
mod tests;
