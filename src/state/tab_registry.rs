//! Ordered open tabs and the active-tab pointer.

use crate::model::{Tab, TabError, TabId};
use crate::reactive::{Signal, Source};
use crate::source::TabStore;
use std::fmt;
use std::rc::Rc;
use tracing::info;

/// Open tabs, backed by a [`TabStore`], plus the active-tab pointer.
///
/// The registry is the single writer of the pointer. The pointer is weak: it
/// names a tab by id and [`TabRegistry::active_tab`] resolves it against the
/// current list, so a tab removed behind the registry's back simply reads as
/// no active tab. Choosing a fallback after a close is the caller's job.
pub struct TabRegistry {
    store: Rc<dyn TabStore>,
    active: Source<Option<TabId>>,
}

impl TabRegistry {
    /// Registry backed by `store`. No tab is active yet.
    pub fn new(store: Rc<dyn TabStore>) -> Self {
        Self {
            store,
            active: Source::with_value(None),
        }
    }

    /// Live ordered tab list.
    pub fn get_all(&self) -> Signal<Vec<Tab>> {
        self.store.tabs()
    }

    /// Current tab list.
    pub fn tabs(&self) -> Vec<Tab> {
        self.store.tabs().latest().unwrap_or_default()
    }

    /// Id of the active tab.
    pub fn active(&self) -> Signal<Option<TabId>> {
        self.active.signal()
    }

    /// The active tab, if it is still open.
    pub fn active_tab(&self) -> Option<Tab> {
        let id = self.active.latest().flatten()?;
        self.find(&id)
    }

    /// Whether a tab with `id` is open.
    pub fn contains(&self, id: &TabId) -> bool {
        self.find(id).is_some()
    }

    /// Make `tab` the active tab and return the stored copy.
    ///
    /// # Errors
    ///
    /// Returns `TabError::NotFound` if `tab` is not open.
    pub fn switch_tab(&self, tab: &Tab) -> Result<Tab, TabError> {
        let stored = self
            .find(&tab.id)
            .ok_or_else(|| TabError::NotFound(tab.id.clone()))?;
        info!(tab = %stored.id, "Switched tab");
        self.active.emit(Some(stored.id.clone()));
        Ok(stored)
    }

    /// Remove `tab` from storage, then activate `fallback` if given.
    ///
    /// Without a fallback, closing the active tab clears the pointer and
    /// closing any other tab leaves it as it was. Returns the activated
    /// fallback.
    ///
    /// # Errors
    ///
    /// Returns `TabError::NotFound` if `tab` is not open, or if `fallback` is
    /// not open or is `tab` itself. Nothing is removed in that case.
    pub fn close_tab(&self, tab: &Tab, fallback: Option<&Tab>) -> Result<Option<Tab>, TabError> {
        if !self.contains(&tab.id) {
            return Err(TabError::NotFound(tab.id.clone()));
        }
        if let Some(fallback) = fallback {
            if fallback.id == tab.id || !self.contains(&fallback.id) {
                return Err(TabError::NotFound(fallback.id.clone()));
            }
        }

        self.store.delete(&tab.id);
        info!(tab = %tab.id, fallback = ?fallback.map(|f| f.id.as_str()), "Closed tab");

        match fallback {
            Some(fallback) => self.switch_tab(fallback).map(Some),
            None => {
                if self.active.latest().flatten().as_ref() == Some(&tab.id) {
                    self.active.emit(None);
                }
                Ok(None)
            }
        }
    }

    fn find(&self, id: &TabId) -> Option<Tab> {
        self.tabs().into_iter().find(|tab| &tab.id == id)
    }
}

impl fmt::Debug for TabRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabRegistry")
            .field("tabs", &self.tabs().len())
            .field("active", &self.active.latest().flatten())
            .finish()
    }
}
