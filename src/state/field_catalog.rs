//! Per-domain field catalog and the column lists derived from it.

use crate::model::{AvailableFields, FieldDescriptor, FieldError, ListItem};
use crate::reactive::{Signal, Source};
use tracing::debug;

/// Registry of field descriptors for one log domain.
///
/// The catalog owns its descriptor list; readers observe it through
/// [`FieldCatalog::get_all`], which replays the current list and re-emits on
/// every visibility change.
#[derive(Debug)]
pub struct FieldCatalog {
    fields: Source<Vec<FieldDescriptor>>,
}

impl FieldCatalog {
    /// An empty catalog. Nothing is emitted until fields are loaded.
    pub fn new() -> Self {
        Self {
            fields: Source::new(),
        }
    }

    /// A catalog already holding `fields`.
    pub fn with_fields(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields: Source::with_value(fields),
        }
    }

    /// Live descriptor list.
    pub fn get_all(&self) -> Signal<Vec<FieldDescriptor>> {
        self.fields.signal()
    }

    /// Current descriptors (empty before the first load).
    pub fn snapshot(&self) -> Vec<FieldDescriptor> {
        self.fields.latest().unwrap_or_default()
    }

    /// Replace the whole list, e.g. after the column names were loaded.
    pub fn replace(&self, fields: Vec<FieldDescriptor>) {
        debug!(fields = fields.len(), "Replacing field catalog");
        self.fields.emit(fields);
    }

    /// Show or hide an available field.
    ///
    /// # Errors
    ///
    /// `UnknownField` if no such field exists, `NotAvailable` when trying to
    /// display an unavailable field.
    pub fn set_displayed(&self, name: &str, is_displayed: bool) -> Result<(), FieldError> {
        self.edit(name, |field| {
            if is_displayed && !field.is_available() {
                return Err(FieldError::NotAvailable(name.to_string()));
            }
            field.set_displayed(is_displayed);
            Ok(())
        })
    }

    /// Change availability. Making a field unavailable also hides it.
    ///
    /// # Errors
    ///
    /// `UnknownField` if no such field exists.
    pub fn set_available(&self, name: &str, is_available: bool) -> Result<(), FieldError> {
        self.edit(name, |field| {
            field.set_available(is_available);
            Ok(())
        })
    }

    fn edit(
        &self,
        name: &str,
        apply: impl FnOnce(&mut FieldDescriptor) -> Result<(), FieldError>,
    ) -> Result<(), FieldError> {
        let mut fields = self.snapshot();
        let field = fields
            .iter_mut()
            .find(|field| field.name() == name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        apply(field)?;
        self.fields.emit(fields);
        Ok(())
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new()
    }
}

// ===== Derivations =====

/// Column picker entries: every available field.
pub fn available_columns(fields: &[FieldDescriptor]) -> Vec<ListItem> {
    fields
        .iter()
        .filter(|field| field.is_available())
        .map(ListItem::from)
        .collect()
}

/// Columns to render: available and displayed fields.
pub fn displayed_columns(fields: &[FieldDescriptor]) -> Vec<FieldDescriptor> {
    fields
        .iter()
        .filter(|field| field.is_available() && field.is_displayed())
        .cloned()
        .collect()
}

/// Names a projected record may keep.
pub fn available_fields(fields: &[FieldDescriptor]) -> AvailableFields {
    fields
        .iter()
        .filter(|field| field.is_available())
        .map(|field| field.name().to_string())
        .collect()
}
