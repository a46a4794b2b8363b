//! Field descriptors and the column lists derived from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ===== FieldDescriptor =====

/// One entry of a domain's field catalog.
///
/// Invariant: `is_displayed` implies `is_available`. Constructors and
/// deserialization normalize a displayed-but-unavailable field to hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FieldDescriptorRepr", rename_all = "camelCase")]
pub struct FieldDescriptor {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    is_available: bool,
    is_displayed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldDescriptorRepr {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default = "default_true")]
    is_available: bool,
    #[serde(default)]
    is_displayed: bool,
}

fn default_true() -> bool {
    true
}

impl From<FieldDescriptorRepr> for FieldDescriptor {
    fn from(repr: FieldDescriptorRepr) -> Self {
        FieldDescriptor::new(repr.name)
            .with_display_name(repr.display_name)
            .with_visibility(repr.is_available, repr.is_displayed)
    }
}

impl FieldDescriptor {
    /// An available, hidden field without a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            is_available: true,
            is_displayed: false,
        }
    }

    /// Set the label shown instead of the name. Empty labels are ignored.
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name.filter(|label| !label.is_empty());
        self
    }

    /// Set both flags, keeping the display-implies-available invariant.
    pub fn with_visibility(mut self, is_available: bool, is_displayed: bool) -> Self {
        self.is_available = is_available;
        self.is_displayed = is_available && is_displayed;
        self
    }

    /// Wire name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured label, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Display name, falling back to the field name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether projected records may keep this field.
    pub fn is_available(&self) -> bool {
        self.is_available
    }

    /// Whether the field is shown as a column.
    pub fn is_displayed(&self) -> bool {
        self.is_displayed
    }

    pub(crate) fn set_available(&mut self, is_available: bool) {
        self.is_available = is_available;
        if !is_available {
            self.is_displayed = false;
        }
    }

    /// Caller must have checked availability.
    pub(crate) fn set_displayed(&mut self, is_displayed: bool) {
        self.is_displayed = self.is_available && is_displayed;
    }
}

// ===== ListItem =====

/// A column choice as offered to the column picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// Field name.
    pub value: String,
    /// Text shown in the picker.
    pub label: String,
    /// Whether the column is displayed.
    pub is_checked: bool,
}

impl From<&FieldDescriptor> for ListItem {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            value: field.name().to_string(),
            label: field.label().to_string(),
            is_checked: field.is_displayed(),
        }
    }
}

// ===== AvailableFields =====

/// Whitelist of field names a projected record may keep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableFields(BTreeSet<String>);

impl AvailableFields {
    /// Whether `name` is whitelisted.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Whether no name is whitelisted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of whitelisted names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whitelisted names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AvailableFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
