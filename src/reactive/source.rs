//! Replaying value streams with single-writer discipline.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Shared<T> {
    latest: RefCell<Option<T>>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_id: Cell<u64>,
    version: Cell<u64>,
}

impl<T> Shared<T> {
    fn empty() -> Self {
        Self {
            latest: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            version: Cell::new(0),
        }
    }

    fn snapshot_listeners(&self) -> Vec<Listener<T>> {
        self.listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }
}

// ===== Source =====

/// Write handle of a value stream.
///
/// Holding a `Source` is the write capability: it is deliberately not `Clone`.
/// Readers get a [`Signal`] via [`Source::signal`].
pub struct Source<T> {
    shared: Rc<Shared<T>>,
}

impl<T: Clone + 'static> Source<T> {
    /// Create a source with no value yet.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared::empty()),
        }
    }

    /// Create a source holding an initial value.
    ///
    /// The initial value does not count as an emission (version stays 0).
    pub fn with_value(value: T) -> Self {
        let source = Self::new();
        *source.shared.latest.borrow_mut() = Some(value);
        source
    }

    /// Store `value` as the latest value and notify every listener.
    pub fn emit(&self, value: T) {
        *self.shared.latest.borrow_mut() = Some(value.clone());
        self.shared.version.set(self.shared.version.get() + 1);

        for listener in self.shared.snapshot_listeners() {
            listener(&value);
        }
    }

    /// Edit the latest value in place and re-emit it.
    ///
    /// Returns `false` (and emits nothing) when the source has no value yet.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let next = {
            let mut latest = self.shared.latest.borrow_mut();
            match latest.as_mut() {
                Some(value) => {
                    f(value);
                    value.clone()
                }
                None => return false,
            }
        };
        self.emit(next);
        true
    }

    /// Read-only handle over this source.
    pub fn signal(&self) -> Signal<T> {
        Signal {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Clone of the latest value.
    pub fn latest(&self) -> Option<T> {
        self.shared.latest.borrow().clone()
    }
}

impl<T: Clone + 'static> Default for Source<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("latest", &self.shared.latest.borrow())
            .field("version", &self.shared.version.get())
            .field("listeners", &self.shared.listeners.borrow().len())
            .finish()
    }
}

// ===== Signal =====

/// Read-only handle over a [`Source`].
pub struct Signal<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Clone of the latest value.
    pub fn latest(&self) -> Option<T> {
        self.shared.latest.borrow().clone()
    }

    /// Number of emissions so far.
    pub fn version(&self) -> u64 {
        self.shared.version.get()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }

    /// Listen to the stream, replaying the latest value first if there is one.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let listener: Listener<T> = Rc::new(listener);
        let subscription = self.register(Rc::clone(&listener));

        let latest = self.shared.latest.borrow().clone();
        if let Some(value) = latest {
            listener(&value);
        }

        subscription
    }

    /// Listen to future emissions only.
    pub fn subscribe_changes(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.register(Rc::new(listener))
    }

    fn register(&self, listener: Listener<T>) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);
        self.shared.listeners.borrow_mut().push((id, listener));

        let weak: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared
                        .listeners
                        .borrow_mut()
                        .retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("latest", &self.shared.latest.borrow())
            .field("version", &self.shared.version.get())
            .finish()
    }
}

// ===== Subscription =====

/// Listener registration. Dropping it removes the listener.
#[must_use = "dropping a Subscription immediately removes its listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value: &T| sink.borrow_mut().push(value.clone()))
    }

    #[test]
    fn subscribe_replays_latest_value() {
        let source = Source::with_value(7);
        let (seen, listener) = recorder::<i32>();

        let _sub = source.signal().subscribe(listener);

        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn subscribe_without_value_waits_for_first_emit() {
        let source = Source::new();
        let (seen, listener) = recorder::<i32>();

        let _sub = source.signal().subscribe(listener);
        assert!(seen.borrow().is_empty());

        source.emit(1);
        source.emit(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn subscribe_changes_skips_replay() {
        let source = Source::with_value(1);
        let (seen, listener) = recorder::<i32>();

        let _sub = source.signal().subscribe_changes(listener);
        assert!(seen.borrow().is_empty());

        source.emit(2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn dropping_subscription_removes_listener() {
        let source = Source::new();
        let (seen, listener) = recorder::<i32>();

        let sub = source.signal().subscribe(listener);
        assert_eq!(source.signal().listener_count(), 1);
        drop(sub);
        assert_eq!(source.signal().listener_count(), 0);

        source.emit(5);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn explicit_unsubscribe_removes_listener() {
        let source = Source::new();
        let (seen, listener) = recorder::<i32>();

        let sub = source.signal().subscribe(listener);
        sub.unsubscribe();

        source.emit(5);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let source = Source::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        let _a = source.signal().subscribe(move |_: &i32| first.borrow_mut().push("a"));
        let second = Rc::clone(&order);
        let _b = source.signal().subscribe(move |_: &i32| second.borrow_mut().push("b"));

        source.emit(0);
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn update_edits_latest_and_emits() {
        let source = Source::with_value(vec![1]);
        let (seen, listener) = recorder::<Vec<i32>>();
        let _sub = source.signal().subscribe_changes(listener);

        assert!(source.update(|v| v.push(2)));
        assert_eq!(source.latest(), Some(vec![1, 2]));
        assert_eq!(*seen.borrow(), vec![vec![1, 2]]);
    }

    #[test]
    fn update_without_value_is_noop() {
        let source: Source<Vec<i32>> = Source::new();
        assert!(!source.update(|v| v.push(1)));
        assert_eq!(source.signal().version(), 0);
    }

    #[test]
    fn version_counts_emissions() {
        let source = Source::with_value(0);
        assert_eq!(source.signal().version(), 0);
        source.emit(1);
        source.emit(2);
        assert_eq!(source.signal().version(), 2);
    }

    #[test]
    fn listener_may_unsubscribe_reentrantly() {
        let source = Source::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let slot_in = Rc::clone(&slot);
        let calls_in = Rc::clone(&calls);
        let sub = source.signal().subscribe(move |_: &i32| {
            calls_in.set(calls_in.get() + 1);
            slot_in.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        source.emit(1);
        source.emit(2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn subscription_outliving_source_is_harmless() {
        let source = Source::new();
        let sub = source.signal().subscribe(|_: &i32| {});
        drop(source);
        drop(sub);
    }
}
