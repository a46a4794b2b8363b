//! Log domains and per-domain lookup.

use crate::model::UnknownLogType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===== LogType =====

/// The two log domains shown by the view. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    /// Component logs of the cluster services.
    Service,
    /// Access audit events.
    Audit,
}

impl LogType {
    /// Every domain, service first.
    pub const ALL: [LogType; 2] = [LogType::Service, LogType::Audit];

    /// Lowercase name, as used in JSON and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            LogType::Service => "service",
            LogType::Audit => "audit",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = UnknownLogType;

    /// Accepts the short names and the `serviceLogs` / `auditLogs` keys,
    /// case-insensitively.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "service" | "servicelogs" => Ok(LogType::Service),
            "audit" | "auditlogs" => Ok(LogType::Audit),
            _ => Err(UnknownLogType(raw.to_string())),
        }
    }
}

// ===== LogTypeMap =====

/// Exactly one value per [`LogType`], so lookups are total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogTypeMap<T> {
    service: T,
    audit: T,
}

impl<T> LogTypeMap<T> {
    /// Map with one value per domain.
    pub fn new(service: T, audit: T) -> Self {
        Self { service, audit }
    }

    /// Build each entry from its log type.
    pub fn from_fn(mut f: impl FnMut(LogType) -> T) -> Self {
        Self {
            service: f(LogType::Service),
            audit: f(LogType::Audit),
        }
    }

    /// Value of `log_type`.
    pub fn get(&self, log_type: LogType) -> &T {
        match log_type {
            LogType::Service => &self.service,
            LogType::Audit => &self.audit,
        }
    }

    /// Mutable value of `log_type`.
    pub fn get_mut(&mut self, log_type: LogType) -> &mut T {
        match log_type {
            LogType::Service => &mut self.service,
            LogType::Audit => &mut self.audit,
        }
    }

    /// Entries in [`LogType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (LogType, &T)> {
        LogType::ALL.into_iter().map(move |log_type| (log_type, self.get(log_type)))
    }
}
