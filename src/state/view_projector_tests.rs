//! Tests for column derivation and whitelist projection.

use super::*;
use crate::model::{AuditLog, ServiceLog};
use crate::reactive::{ScopeController, Source};
use crate::state::FieldCatalog;
use serde_json::json;

// ===== Test Helpers =====

struct Domain {
    catalog_fields: Vec<FieldDescriptor>,
    raw: Source<Vec<LogRecord>>,
    domain: LogDomain,
}

fn domain(fields: Vec<FieldDescriptor>) -> Domain {
    let raw = Source::new();
    let domain = LogDomain {
        catalog: FieldCatalog::new(),
        logs: raw.signal(),
        histogram: Source::new().signal(),
    };
    Domain {
        catalog_fields: fields,
        raw,
        domain,
    }
}

impl Domain {
    fn load_fields(&self) {
        self.domain.catalog.replace(self.catalog_fields.clone());
    }
}

fn field(name: &str, is_available: bool, is_displayed: bool) -> FieldDescriptor {
    FieldDescriptor::new(name).with_visibility(is_available, is_displayed)
}

fn service_row(value: serde_json::Value) -> LogRecord {
    LogRecord::from_value(LogType::Service, value).expect("service row")
}

fn bind(
    projector: &ViewProjector,
    scopes: &mut ScopeController,
    log_type: LogType,
    domain: &Domain,
) {
    let mut scope = scopes.begin();
    projector.bind(log_type, &domain.domain, &mut scope);
    assert!(scopes.install(scope));
}

fn logs_json(projector: &ViewProjector) -> serde_json::Value {
    serde_json::to_value(projector.logs().latest().unwrap_or_default()).expect("json")
}

fn names(fields: &[FieldDescriptor]) -> Vec<&str> {
    fields.iter().map(FieldDescriptor::name).collect()
}

// ===== Projection =====

#[test]
fn level_only_catalog_projects_level_only() {
    let service = domain(vec![field("level", true, true), field("host", false, false)]);
    service.load_fields();
    service
        .raw
        .emit(vec![service_row(json!({"level": "ERROR", "host": "h1", "extra": "x"}))]);

    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);

    assert_eq!(logs_json(&projector), json!([{"level": "ERROR"}]));
    assert_eq!(
        projector.available_columns().latest(),
        Some(vec![ListItem {
            value: "level".into(),
            label: "level".into(),
            is_checked: true,
        }])
    );
    let displayed = projector.displayed_columns().latest().unwrap_or_default();
    assert_eq!(names(&displayed), vec!["level"]);
}

#[test]
fn raw_rows_are_never_altered() {
    let service = domain(vec![field("level", true, true)]);
    service.load_fields();
    let row = service_row(json!({"level": "WARN", "host": "h2"}));
    service.raw.emit(vec![row.clone()]);

    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);

    assert_eq!(service.raw.latest(), Some(vec![row]));
}

#[test]
fn rows_arriving_before_fields_are_projected_once_fields_arrive() {
    let service = domain(vec![field("host", true, false)]);
    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);

    service
        .raw
        .emit(vec![service_row(json!({"level": "INFO", "host": "h1"}))]);
    assert_eq!(logs_json(&projector), json!([]));
    assert_eq!(projector.projections(), 0);

    service.load_fields();
    assert_eq!(logs_json(&projector), json!([{"host": "h1"}]));
    assert_eq!(projector.projections(), 1);
}

#[test]
fn order_of_rows_is_preserved() {
    let service = domain(vec![field("seq_num", true, true)]);
    service.load_fields();
    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);

    service.raw.emit(
        [3, 1, 2]
            .into_iter()
            .map(|n| service_row(json!({"seq_num": n, "level": "INFO"})))
            .collect(),
    );

    assert_eq!(
        logs_json(&projector),
        json!([{"seq_num": 3}, {"seq_num": 1}, {"seq_num": 2}])
    );
}

#[test]
fn catalog_change_reprojects_latest_rows() {
    let service = domain(vec![field("level", true, true), field("host", true, false)]);
    service.load_fields();
    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);
    service
        .raw
        .emit(vec![service_row(json!({"level": "ERROR", "host": "h1"}))]);
    assert_eq!(logs_json(&projector), json!([{"level": "ERROR", "host": "h1"}]));

    service
        .domain
        .catalog
        .set_available("host", false)
        .expect("known field");

    assert_eq!(logs_json(&projector), json!([{"level": "ERROR"}]));
}

#[test]
fn empty_available_set_keeps_previous_rows() {
    let service = domain(vec![field("level", true, true)]);
    service.load_fields();
    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);
    service
        .raw
        .emit(vec![service_row(json!({"level": "ERROR", "host": "h1"}))]);
    let projections = projector.projections();
    let logs_version = projector.logs().version();

    service
        .domain
        .catalog
        .set_available("level", false)
        .expect("known field");

    assert_eq!(projector.projections(), projections);
    assert_eq!(projector.logs().version(), logs_version);
    assert_eq!(logs_json(&projector), json!([{"level": "ERROR"}]));
    assert_eq!(projector.available_columns().latest(), Some(Vec::new()));
    assert_eq!(projector.displayed_columns().latest(), Some(Vec::new()));
}

#[test]
fn rows_arriving_under_empty_set_leave_published_rows_unchanged() {
    let service = domain(vec![field("level", true, true)]);
    service.load_fields();
    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);
    service
        .raw
        .emit(vec![service_row(json!({"level": "ERROR", "host": "h1"}))]);
    service
        .domain
        .catalog
        .set_available("level", false)
        .expect("known field");
    let logs_version = projector.logs().version();

    service
        .raw
        .emit(vec![service_row(json!({"level": "DEBUG", "host": "h9"}))]);
    service.raw.emit(Vec::new());

    assert_eq!(projector.logs().version(), logs_version);
    assert_eq!(logs_json(&projector), json!([{"level": "ERROR"}]));
}

#[test]
fn rows_held_under_empty_set_are_projected_when_fields_return() {
    let service = domain(vec![field("level", true, true)]);
    service.load_fields();
    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);
    service
        .domain
        .catalog
        .set_available("level", false)
        .expect("known field");
    service
        .raw
        .emit(vec![service_row(json!({"level": "DEBUG", "host": "h9"}))]);
    assert_eq!(logs_json(&projector), json!([]));

    service
        .domain
        .catalog
        .set_available("level", true)
        .expect("known field");

    assert_eq!(logs_json(&projector), json!([{"level": "DEBUG"}]));
}

#[test]
fn displayed_columns_are_a_subset_of_available_columns() {
    let service = domain(vec![
        field("level", true, true),
        field("host", true, false),
        field("ip", false, false),
    ]);
    service.load_fields();
    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);

    let available: Vec<String> = projector
        .available_columns()
        .latest()
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.value)
        .collect();
    let displayed = projector.displayed_columns().latest().unwrap_or_default();

    assert_eq!(available, vec!["level".to_string(), "host".to_string()]);
    assert!(displayed
        .iter()
        .all(|field| available.iter().any(|name| name == field.name())));
}

// ===== Domain switches =====

#[test]
fn switch_starts_from_clean_slate() {
    let service = domain(vec![field("level", true, true)]);
    service.load_fields();
    service
        .raw
        .emit(vec![service_row(json!({"level": "ERROR"}))]);
    let audit = domain(vec![field("reqUser", true, true)]);

    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);
    assert_eq!(logs_json(&projector), json!([{"level": "ERROR"}]));

    bind(&projector, &mut scopes, LogType::Audit, &audit);

    assert_eq!(logs_json(&projector), json!([]));
    assert_eq!(projector.available_columns().latest(), Some(Vec::new()));
    assert_eq!(projector.displayed_columns().latest(), Some(Vec::new()));
}

#[test]
fn retired_domain_rows_do_not_reach_outputs() {
    let service = domain(vec![field("level", true, true)]);
    service.load_fields();
    let audit = domain(vec![field("reqUser", true, true)]);
    audit.load_fields();
    audit.raw.emit(vec![AuditLog {
        req_user: Some("admin".into()),
        ..AuditLog::default()
    }
    .into()]);

    let projector = ViewProjector::new();
    let mut scopes = ScopeController::new("test");
    bind(&projector, &mut scopes, LogType::Service, &service);
    bind(&projector, &mut scopes, LogType::Audit, &audit);

    service.raw.emit(vec![ServiceLog {
        level: Some("FATAL".into()),
        ..ServiceLog::default()
    }
    .into()]);

    assert_eq!(logs_json(&projector), json!([{"reqUser": "admin"}]));
    assert_eq!(service.raw.signal().listener_count(), 0);
}

#[test]
fn in_transit_rows_of_retired_scope_are_discarded() {
    let service = domain(vec![field("level", true, true)]);
    service.load_fields();
    let audit = Rc::new(domain(vec![field("reqUser", true, true)]));
    let projector = Rc::new(ViewProjector::new());
    let scopes = Rc::new(RefCell::new(ScopeController::new("test")));

    // Subscribed before the projector, so it switches domains while the
    // emission is still being dispatched.
    let _switcher = {
        let projector = Rc::clone(&projector);
        let scopes = Rc::clone(&scopes);
        let audit = Rc::clone(&audit);
        service.raw.signal().subscribe_changes(move |_| {
            let mut scope = scopes.borrow_mut().begin();
            projector.bind(LogType::Audit, &audit.domain, &mut scope);
            scopes.borrow_mut().install(scope);
        })
    };

    {
        let mut scope = scopes.borrow_mut().begin();
        projector.bind(LogType::Service, &service.domain, &mut scope);
        scopes.borrow_mut().install(scope);
    }
    assert_eq!(projector.discarded(), 0);

    service
        .raw
        .emit(vec![service_row(json!({"level": "ERROR"}))]);

    assert_eq!(logs_json(&projector), json!([]));
    assert_eq!(projector.discarded(), 1);
}
