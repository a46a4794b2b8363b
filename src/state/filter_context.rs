//! Filter forms and the active-form context.

use crate::model::{FilterCriteria, FormId, TimeRange};
use crate::reactive::{ScopeController, Signal, Source};
use crate::state::{LoadReason, LoadTrigger};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

thread_local! {
    static NEXT_FORM_ID: Cell<u64> = const { Cell::new(1) };
}

// ===== FilterForm =====

struct FormInner {
    id: FormId,
    values: Source<FilterCriteria>,
}

/// One filter form instance.
///
/// Clones are handles to the same instance. Each edit bumps the criteria
/// revision and emits a value change.
#[derive(Clone)]
pub struct FilterForm {
    inner: Rc<FormInner>,
}

impl FilterForm {
    /// A new form instance with its own id.
    pub fn new(criteria: FilterCriteria) -> Self {
        let id = NEXT_FORM_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            FormId::from_raw(id)
        });
        Self {
            inner: Rc::new(FormInner {
                id,
                values: Source::with_value(criteria),
            }),
        }
    }

    /// Identity of this instance, shared by its clones.
    pub fn id(&self) -> FormId {
        self.inner.id
    }

    /// Current criteria.
    pub fn value(&self) -> FilterCriteria {
        self.inner.values.latest().unwrap_or_default()
    }

    /// Value changes of this instance.
    pub fn value_changes(&self) -> Signal<FilterCriteria> {
        self.inner.values.signal()
    }

    /// Edit the criteria and emit a value change.
    pub fn edit(&self, apply: impl FnOnce(&mut FilterCriteria)) {
        self.inner.values.update(|criteria| {
            apply(criteria);
            criteria.revision += 1;
        });
    }

    /// Replace the time range and emit a value change.
    pub fn set_time_range(&self, time_range: TimeRange) {
        self.edit(|criteria| criteria.time_range = time_range);
    }
}

impl Default for FilterForm {
    fn default() -> Self {
        Self::new(FilterCriteria::default())
    }
}

impl fmt::Debug for FilterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterForm")
            .field("id", &self.inner.id)
            .field("revision", &self.value().revision)
            .finish()
    }
}

// ===== FilterContext =====

/// Single writer of the active filter form.
///
/// Swapping the form retires the previous form's value-change listener before
/// listening to the new one, so an orphaned form can never trigger a reload.
/// Each value change of the active form requests exactly one reload; swapping
/// itself requests none.
pub struct FilterContext {
    active: Source<FilterForm>,
    scopes: RefCell<ScopeController>,
    loads: LoadTrigger,
}

impl FilterContext {
    /// No form is active until [`Self::set_active_form`].
    pub fn new(loads: LoadTrigger) -> Self {
        Self {
            active: Source::new(),
            scopes: RefCell::new(ScopeController::new("filters-form")),
            loads,
        }
    }

    /// Make `form` the active form. Returns `false` if it already was.
    pub fn set_active_form(&self, form: FilterForm) -> bool {
        if self.active_form().is_some_and(|current| current.id() == form.id()) {
            debug!(form = %form.id(), "Filter form already active");
            return false;
        }

        let mut scope = self.scopes.borrow_mut().begin();
        let token = scope.token();
        let loads = self.loads.clone();
        let form_id = form.id();
        scope.hold(form.value_changes().subscribe_changes(move |criteria| {
            if !token.is_current() {
                debug!(form = %form_id, "Ignoring change of retired filter form");
                return;
            }
            debug!(form = %form_id, revision = criteria.revision, "Filter form changed");
            loads.request(LoadReason::FilterChange);
        }));
        self.scopes.borrow_mut().install(scope);

        info!(form = %form_id, "Activated filter form");
        self.active.emit(form);
        true
    }

    /// Currently active form, if any.
    pub fn active_form(&self) -> Option<FilterForm> {
        self.active.latest()
    }

    /// Active form changes.
    pub fn active(&self) -> Signal<FilterForm> {
        self.active.signal()
    }
}

impl fmt::Debug for FilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterContext")
            .field("active", &self.active_form().map(|form| form.id()))
            .field("scopes", &self.scopes.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryLogLoader;

    fn context() -> (Rc<MemoryLogLoader>, LoadTrigger, FilterContext) {
        let loader = Rc::new(MemoryLogLoader::new());
        let loads = LoadTrigger::new(loader.clone());
        let context = FilterContext::new(loads.clone());
        (loader, loads, context)
    }

    #[test]
    fn forms_get_distinct_ids() {
        assert_ne!(FilterForm::default().id(), FilterForm::default().id());
    }

    #[test]
    fn clones_share_identity_and_values() {
        let form = FilterForm::default();
        let handle = form.clone();
        handle.edit(|criteria| criteria.query = Some("oom".into()));
        assert_eq!(form.id(), handle.id());
        assert_eq!(form.value().query.as_deref(), Some("oom"));
    }

    #[test]
    fn edit_bumps_revision() {
        let form = FilterForm::default();
        form.edit(|criteria| {
            criteria.levels.insert("ERROR".into());
        });
        form.set_time_range(TimeRange::Today);
        assert_eq!(form.value().revision, 2);
        assert_eq!(form.value().time_range, TimeRange::Today);
    }

    #[test]
    fn activating_a_form_does_not_reload() {
        let (loader, _, context) = context();
        assert!(context.set_active_form(FilterForm::default()));
        assert_eq!(loader.requests(), 0);
    }

    #[test]
    fn each_change_requests_exactly_one_reload() {
        let (loader, loads, context) = context();
        let form = FilterForm::default();
        context.set_active_form(form.clone());

        form.edit(|criteria| criteria.query = Some("a".into()));
        form.edit(|criteria| criteria.query = Some("ab".into()));
        form.edit(|criteria| criteria.query = Some("abc".into()));

        assert_eq!(loader.requests(), 3);
        assert_eq!(loads.requests(LoadReason::FilterChange), 3);
    }

    #[test]
    fn swapped_out_form_no_longer_triggers_reloads() {
        let (loader, _, context) = context();
        let old = FilterForm::default();
        let new = FilterForm::default();

        context.set_active_form(old.clone());
        context.set_active_form(new.clone());
        old.edit(|criteria| criteria.query = Some("stale".into()));
        assert_eq!(loader.requests(), 0);

        new.edit(|criteria| criteria.query = Some("fresh".into()));
        assert_eq!(loader.requests(), 1);
    }

    #[test]
    fn swap_leaves_single_listener_on_each_form() {
        let (_, _, context) = context();
        let old = FilterForm::default();
        let new = FilterForm::default();

        context.set_active_form(old.clone());
        context.set_active_form(new.clone());

        assert_eq!(old.value_changes().listener_count(), 0);
        assert_eq!(new.value_changes().listener_count(), 1);
    }

    #[test]
    fn reactivating_same_form_is_noop() {
        let (loader, _, context) = context();
        let form = FilterForm::default();
        assert!(context.set_active_form(form.clone()));
        assert!(!context.set_active_form(form.clone()));

        form.edit(|criteria| criteria.query = Some("x".into()));
        assert_eq!(loader.requests(), 1);
    }

    #[test]
    fn active_form_is_published() {
        let (_, _, context) = context();
        let form = FilterForm::default();
        context.set_active_form(form.clone());
        assert_eq!(context.active_form().map(|f| f.id()), Some(form.id()));
        assert_eq!(context.active().version(), 1);
    }
}
