//! Generation-counted subscription scopes.
//!
//! A [`ScopeController`] owns at most one live [`Scope`]. Beginning a new
//! scope retires the previous one: the generation counter moves forward first,
//! then the retired subscriptions are dropped. Listeners carry a
//! [`ScopeToken`] and must check [`ScopeToken::is_current`] before touching
//! any view, which covers emissions that were already being dispatched when
//! the scope was retired.

use crate::reactive::Subscription;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

// ===== ScopeToken =====

/// Cheap handle identifying the scope a computation was started under.
#[derive(Clone)]
pub struct ScopeToken {
    generation: u64,
    current: Rc<Cell<u64>>,
}

impl ScopeToken {
    /// Whether the scope this token was minted for is still the live one.
    pub fn is_current(&self) -> bool {
        self.current.get() == self.generation
    }

    /// Generation this token was minted for.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeToken")
            .field("generation", &self.generation)
            .field("current", &self.is_current())
            .finish()
    }
}

// ===== Scope =====

/// A set of subscriptions sharing one lifetime.
#[derive(Debug)]
pub struct Scope {
    token: ScopeToken,
    subscriptions: Vec<Subscription>,
}

impl Scope {
    /// Token to hand to listeners started under this scope.
    pub fn token(&self) -> ScopeToken {
        self.token.clone()
    }

    /// Tie a subscription to this scope's lifetime.
    pub fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Number of held subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscription is held.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

// ===== ScopeController =====

/// Mints scopes and retires the previous one on each renewal.
#[derive(Debug)]
pub struct ScopeController {
    label: &'static str,
    current: Rc<Cell<u64>>,
    live: Option<Scope>,
}

impl ScopeController {
    /// Create a controller; `label` only shows up in diagnostics.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            current: Rc::new(Cell::new(0)),
            live: None,
        }
    }

    /// Retire the live scope (if any) and return a fresh one.
    ///
    /// The returned scope is not live until passed to [`Self::install`].
    /// Its token is already current, so listeners registered while binding
    /// see their replayed values.
    pub fn begin(&mut self) -> Scope {
        let generation = self.current.get() + 1;
        self.current.set(generation);

        if let Some(retired) = self.live.take() {
            debug!(
                scope = self.label,
                retired_subscriptions = retired.len(),
                generation,
                "Retiring scope"
            );
            drop(retired);
        }

        Scope {
            token: ScopeToken {
                generation,
                current: Rc::clone(&self.current),
            },
            subscriptions: Vec::new(),
        }
    }

    /// Make `scope` the live scope.
    ///
    /// A scope that was superseded while it was being populated (a re-entrant
    /// renewal) is dropped instead; returns whether it was installed.
    pub fn install(&mut self, scope: Scope) -> bool {
        if !scope.token.is_current() {
            debug!(
                scope = self.label,
                generation = scope.token.generation,
                "Discarding superseded scope"
            );
            return false;
        }
        self.live = Some(scope);
        true
    }

    /// Retire the live scope without starting a new one.
    pub fn cancel(&mut self) {
        self.current.set(self.current.get() + 1);
        self.live = None;
    }

    /// Token of the live scope, if any.
    pub fn current(&self) -> Option<ScopeToken> {
        self.live.as_ref().map(Scope::token)
    }

    /// Number of subscriptions held by the live scope.
    pub fn live_subscriptions(&self) -> usize {
        self.live.as_ref().map_or(0, Scope::len)
    }
}
