//! Schema-typed log records for both domains.
//!
//! Each domain declares its field registry ([`LogSchema::FIELDS`]). Fields
//! outside the registry are kept in a `custom` map so that configured custom
//! columns still work. A declared field whose value does not fit its type
//! lands there too, so one odd value never rejects the whole row. Projection rebuilds a record field by field from a
//! whitelist; the source record is never altered.

use crate::model::{AvailableFields, LogType};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

// ===== LogSchema =====

/// A log record type with a declared field registry.
pub trait LogSchema: Sized {
    /// Domain the record belongs to.
    const LOG_TYPE: LogType;

    /// Wire names of the declared fields.
    const FIELDS: &'static [&'static str];

    /// Value of a field by wire name, declared or custom.
    fn field(&self, name: &str) -> Option<Value>;

    /// Undeclared fields and declared fields holding a mistyped value.
    fn custom(&self) -> &BTreeMap<String, Value>;

    /// Mutable access to [`Self::custom`].
    fn custom_mut(&mut self) -> &mut BTreeMap<String, Value>;

    /// Names of every field present on this record.
    fn field_names(&self) -> BTreeSet<String> {
        Self::FIELDS
            .iter()
            .filter(|name| self.field(name).is_some())
            .map(|name| (*name).to_string())
            .chain(self.custom().keys().cloned())
            .collect()
    }

    /// Copy of this record keeping only whitelisted fields.
    fn project(&self, available: &AvailableFields) -> Self;
}

/// Parse `value` as `T`, moving mistyped declared fields into the custom map.
fn parse_lenient<T: LogSchema + DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    let Value::Object(mut object) = value else {
        return serde_json::from_value(value);
    };
    let log_type = T::LOG_TYPE;
    let mut mistyped = BTreeMap::new();
    for name in T::FIELDS {
        let Some(field) = object.remove(*name) else {
            continue;
        };
        let alone: Map<String, Value> = [(name.to_string(), field.clone())].into_iter().collect();
        if serde_json::from_value::<T>(Value::Object(alone)).is_ok() {
            object.insert(name.to_string(), field);
        } else {
            debug!(%log_type, field = *name, "Keeping mistyped field as custom");
            mistyped.insert(name.to_string(), field);
        }
    }
    let mut record: T = serde_json::from_value(Value::Object(object))?;
    record.custom_mut().extend(mistyped);
    Ok(record)
}

fn keep<T: Clone>(available: &AvailableFields, name: &str, value: &Option<T>) -> Option<T> {
    if available.contains(name) {
        value.clone()
    } else {
        None
    }
}

fn keep_custom(available: &AvailableFields, custom: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    custom
        .iter()
        .filter(|(name, _)| available.contains(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn text(value: &Option<String>) -> Option<Value> {
    value.as_ref().map(|s| Value::String(s.clone()))
}

fn number<N: Copy + Into<Value>>(value: &Option<N>) -> Option<Value> {
    value.map(Into::into)
}

fn millis(value: &Option<DateTime<Utc>>) -> Option<Value> {
    value.map(|time| Value::from(time.timestamp_millis()))
}

// ===== ServiceLog =====

/// A service (component) log line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLog {
    /// Row id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Cluster name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// Host that wrote the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Component name.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Log level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Time the line was logged.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub logtime: Option<DateTime<Utc>>,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_message: Option<String>,
    /// Source file that logged the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Log file the line was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Line number in the source file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u64>,
    /// Address of the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Sequence number within the log file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_num: Option<u64>,
    /// Fields outside the declared registry.
    #[serde(flatten)]
    pub custom: BTreeMap<String, Value>,
}

impl LogSchema for ServiceLog {
    const LOG_TYPE: LogType = LogType::Service;

    const FIELDS: &'static [&'static str] = &[
        "id",
        "cluster",
        "host",
        "type",
        "level",
        "logtime",
        "log_message",
        "file",
        "path",
        "line_number",
        "ip",
        "seq_num",
    ];

    fn field(&self, name: &str) -> Option<Value> {
        let declared = match name {
            "id" => text(&self.id),
            "cluster" => text(&self.cluster),
            "host" => text(&self.host),
            "type" => text(&self.component),
            "level" => text(&self.level),
            "logtime" => millis(&self.logtime),
            "log_message" => text(&self.log_message),
            "file" => text(&self.file),
            "path" => text(&self.path),
            "line_number" => number(&self.line_number),
            "ip" => text(&self.ip),
            "seq_num" => number(&self.seq_num),
            _ => None,
        };
        declared.or_else(|| self.custom.get(name).cloned())
    }

    fn custom(&self) -> &BTreeMap<String, Value> {
        &self.custom
    }

    fn custom_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.custom
    }

    fn project(&self, available: &AvailableFields) -> Self {
        Self {
            id: keep(available, "id", &self.id),
            cluster: keep(available, "cluster", &self.cluster),
            host: keep(available, "host", &self.host),
            component: keep(available, "type", &self.component),
            level: keep(available, "level", &self.level),
            logtime: keep(available, "logtime", &self.logtime),
            log_message: keep(available, "log_message", &self.log_message),
            file: keep(available, "file", &self.file),
            path: keep(available, "path", &self.path),
            line_number: keep(available, "line_number", &self.line_number),
            ip: keep(available, "ip", &self.ip),
            seq_num: keep(available, "seq_num", &self.seq_num),
            custom: keep_custom(available, &self.custom),
        }
    }
}

// ===== AuditLog =====

/// An access audit event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Event id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Cluster name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// Time of the access.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub evt_time: Option<DateTime<Utc>>,
    /// Repository (service) that was accessed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Numeric repository type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<i64>,
    /// Requesting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_user: Option<String>,
    /// Accessed resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Kind of resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub res_type: Option<String>,
    /// Performed action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Requested access type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    /// 1 when access was granted, 0 when denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<i64>,
    /// Client address.
    #[serde(rename = "cliIP", default, skip_serializing_if = "Option::is_none")]
    pub cli_ip: Option<String>,
    /// Component that enforced the policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforcer: Option<String>,
    /// Reason given for the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Id of the deciding policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<i64>,
    /// Fields outside the declared registry.
    #[serde(flatten)]
    pub custom: BTreeMap<String, Value>,
}

impl LogSchema for AuditLog {
    const LOG_TYPE: LogType = LogType::Audit;

    const FIELDS: &'static [&'static str] = &[
        "id",
        "cluster",
        "evtTime",
        "repo",
        "repoType",
        "reqUser",
        "resource",
        "resType",
        "action",
        "access",
        "result",
        "cliIP",
        "enforcer",
        "reason",
        "policy",
    ];

    fn field(&self, name: &str) -> Option<Value> {
        let declared = match name {
            "id" => text(&self.id),
            "cluster" => text(&self.cluster),
            "evtTime" => millis(&self.evt_time),
            "repo" => text(&self.repo),
            "repoType" => number(&self.repo_type),
            "reqUser" => text(&self.req_user),
            "resource" => text(&self.resource),
            "resType" => text(&self.res_type),
            "action" => text(&self.action),
            "access" => text(&self.access),
            "result" => number(&self.result),
            "cliIP" => text(&self.cli_ip),
            "enforcer" => text(&self.enforcer),
            "reason" => text(&self.reason),
            "policy" => number(&self.policy),
            _ => None,
        };
        declared.or_else(|| self.custom.get(name).cloned())
    }

    fn custom(&self) -> &BTreeMap<String, Value> {
        &self.custom
    }

    fn custom_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.custom
    }

    fn project(&self, available: &AvailableFields) -> Self {
        Self {
            id: keep(available, "id", &self.id),
            cluster: keep(available, "cluster", &self.cluster),
            evt_time: keep(available, "evtTime", &self.evt_time),
            repo: keep(available, "repo", &self.repo),
            repo_type: keep(available, "repoType", &self.repo_type),
            req_user: keep(available, "reqUser", &self.req_user),
            resource: keep(available, "resource", &self.resource),
            res_type: keep(available, "resType", &self.res_type),
            action: keep(available, "action", &self.action),
            access: keep(available, "access", &self.access),
            result: keep(available, "result", &self.result),
            cli_ip: keep(available, "cliIP", &self.cli_ip),
            enforcer: keep(available, "enforcer", &self.enforcer),
            reason: keep(available, "reason", &self.reason),
            policy: keep(available, "policy", &self.policy),
            custom: keep_custom(available, &self.custom),
        }
    }
}

// ===== LogRecord =====

/// A log row of either domain. Serializes as a flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogRecord {
    /// A service log line.
    Service(ServiceLog),
    /// An audit event.
    Audit(AuditLog),
}

impl LogRecord {
    /// Domain of the row.
    pub fn log_type(&self) -> LogType {
        match self {
            LogRecord::Service(_) => ServiceLog::LOG_TYPE,
            LogRecord::Audit(_) => AuditLog::LOG_TYPE,
        }
    }

    /// Value of a field by wire name, declared or custom.
    pub fn field(&self, name: &str) -> Option<Value> {
        match self {
            LogRecord::Service(log) => log.field(name),
            LogRecord::Audit(log) => log.field(name),
        }
    }

    /// Names of every field present on the row.
    pub fn field_names(&self) -> BTreeSet<String> {
        match self {
            LogRecord::Service(log) => log.field_names(),
            LogRecord::Audit(log) => log.field_names(),
        }
    }

    /// Whitelist projection; see [`LogSchema::project`].
    pub fn project(&self, available: &AvailableFields) -> LogRecord {
        match self {
            LogRecord::Service(log) => LogRecord::Service(log.project(available)),
            LogRecord::Audit(log) => LogRecord::Audit(log.project(available)),
        }
    }

    /// Parse a JSON object as a record of the given domain.
    ///
    /// Declared fields with a value of the wrong type are kept as custom
    /// fields under their wire name.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not a JSON object.
    pub fn from_value(log_type: LogType, value: Value) -> Result<LogRecord, serde_json::Error> {
        Ok(match log_type {
            LogType::Service => LogRecord::Service(parse_lenient(value)?),
            LogType::Audit => LogRecord::Audit(parse_lenient(value)?),
        })
    }
}

impl From<ServiceLog> for LogRecord {
    fn from(log: ServiceLog) -> Self {
        LogRecord::Service(log)
    }
}

impl From<AuditLog> for LogRecord {
    fn from(log: AuditLog) -> Self {
        LogRecord::Audit(log)
    }
}
