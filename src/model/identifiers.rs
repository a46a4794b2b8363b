//! Identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an open tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TabId(String);

impl TabId {
    /// Smart constructor: validates non-empty tab ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidTabId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Err(InvalidTabId::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TabId {
    type Error = InvalidTabId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<TabId> for String {
    fn from(id: TabId) -> Self {
        id.0
    }
}

/// Identity of one filter form instance.
///
/// Allocated by the form itself; two handles with the same `FormId` refer to
/// the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FormId(u64);

impl FormId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form-{}", self.0)
    }
}

// ===== Errors =====

/// Reasons a tab id is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTabId {
    /// The id is empty or only whitespace.
    #[error("Tab ID cannot be empty")]
    Empty,
}
