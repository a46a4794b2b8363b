//! Acceptance tests for the log view screen.
//!
//! Each test loads the cluster fixture, drives the container through the
//! operations a screen would call and checks the published outputs.

use crate::config::ResolvedConfig;
use crate::model::{LoadError, LogType, TabError, ViewError};
use crate::state::LoadReason;
use crate::test_harness::{AcceptanceTestHarness, CLUSTER_FIXTURE};
use serde_json::json;

fn harness() -> AcceptanceTestHarness {
    AcceptanceTestHarness::from_fixture(CLUSTER_FIXTURE).expect("Should load cluster fixture")
}

// ===== Opening the screen =====

#[test]
fn opening_screen_shows_service_logs_restricted_to_available_fields() {
    // GIVEN: the default configuration (service logs first)
    // WHEN: the screen opens
    // THEN: rows carry only available fields, hidden-but-available included
    let harness = harness();

    assert_eq!(
        harness.container().active_log_type(),
        Some(LogType::Service)
    );
    assert_eq!(
        harness.logs_json()[0],
        json!({
            "host": "c6401.ambari.apache.org",
            "type": "hdfs_namenode",
            "level": "ERROR",
            "logtime": 1700000000000_i64,
            "log_message": "Failed to connect to journal node"
        })
    );
    assert_eq!(
        harness.available_column_names(),
        vec!["logtime", "level", "type", "log_message", "host"]
    );
    assert_eq!(
        harness.displayed_column_names(),
        vec!["logtime", "level", "type", "log_message"]
    );
}

#[test]
fn custom_fields_outside_catalog_are_dropped() {
    let harness = harness();
    let third = &harness.logs_json()[2];

    assert_eq!(third["level"], json!("WARN"));
    assert!(third.get("thread_name").is_none());
    assert!(third.get("seq_num").is_none());
}

#[test]
fn opening_screen_requests_exactly_one_load() {
    let harness = harness();

    assert_eq!(harness.backend().log_loader.requests(), 1);
    assert_eq!(
        harness
            .container()
            .load_requests(LoadReason::InitialActivation),
        1
    );
    assert_eq!(
        harness.container().total_events_found_message(),
        "3 events found"
    );
}

#[test]
fn configured_audit_start_opens_access_logs() {
    let config = ResolvedConfig {
        default_log_type: LogType::Audit,
        ..ResolvedConfig::default()
    };
    let harness = AcceptanceTestHarness::from_fixture_with_config(CLUSTER_FIXTURE, &config)
        .expect("Should load cluster fixture");

    assert_eq!(harness.container().active_log_type(), Some(LogType::Audit));
    assert_eq!(
        harness.logs_json()[1],
        json!({
            "evtTime": 1700000090000_i64,
            "reqUser": "admin",
            "resource": "default/sales",
            "action": "select",
            "result": 0
        })
    );
}

// ===== Switching log types =====

#[test]
fn switching_to_audit_replaces_rows_columns_and_histogram() {
    let harness = harness();
    harness.switch_log_type(LogType::Audit);

    let logs = harness.logs_json();
    assert_eq!(logs.as_array().map(Vec::len), Some(2));
    assert!(logs
        .as_array()
        .into_iter()
        .flatten()
        .all(|row| row.get("reqUser").is_some() && row.get("level").is_none()));
    assert_eq!(
        harness.available_column_names(),
        vec!["evtTime", "reqUser", "resource", "action", "result"]
    );
    let histogram = harness
        .container()
        .histogram_data()
        .latest()
        .unwrap_or_default();
    assert_eq!(histogram.total(), 2);
}

#[test]
fn switching_back_does_not_reload() {
    let harness = harness();
    harness.switch_log_type(LogType::Audit);
    harness.switch_log_type(LogType::Service);

    assert_eq!(harness.backend().log_loader.requests(), 1);
    assert_eq!(harness.logs_json().as_array().map(Vec::len), Some(3));
}

#[test]
fn rows_for_the_hidden_domain_never_show() {
    let harness = harness();
    harness.switch_log_type(LogType::Audit);
    let before = harness.logs_json();

    harness
        .backend()
        .log_loader
        .deliver(LogType::Service, Vec::new());

    assert_eq!(harness.logs_json(), before);
}

// ===== Column visibility =====

#[test]
fn hiding_a_column_keeps_it_in_rows() {
    let harness = harness();
    harness
        .container()
        .catalog(LogType::Service)
        .set_displayed("type", false)
        .expect("available field");

    assert_eq!(
        harness.displayed_column_names(),
        vec!["logtime", "level", "log_message"]
    );
    assert_eq!(harness.logs_json()[0]["type"], json!("hdfs_namenode"));
}

#[test]
fn making_a_column_unavailable_drops_it_from_rows() {
    let harness = harness();
    harness
        .container()
        .catalog(LogType::Service)
        .set_available("host", false)
        .expect("known field");

    assert!(harness.logs_json()[0].get("host").is_none());
    assert!(!harness
        .available_column_names()
        .contains(&"host".to_string()));
}

#[test]
fn making_a_column_available_brings_it_back() {
    let harness = harness();
    harness
        .container()
        .catalog(LogType::Service)
        .set_available("ip", true)
        .expect("known field");

    assert_eq!(harness.logs_json()[0]["ip"], json!("192.168.64.101"));
    assert!(harness.logs_json()[2].get("ip").is_none());
}

// ===== Filters =====

#[test]
fn time_range_change_reloads_once() {
    let harness = harness();
    let start = chrono::DateTime::from_timestamp(1_700_000_000, 0).expect("start");
    let end = chrono::DateTime::from_timestamp(1_700_003_600, 0).expect("end");

    harness
        .container()
        .set_custom_time_range(start, end)
        .expect("valid range");

    assert_eq!(
        harness.container().load_requests(LoadReason::FilterChange),
        1
    );
    assert_eq!(harness.backend().log_loader.requests(), 2);
}

#[test]
fn failed_reload_is_published_then_cleared() {
    let harness = harness();
    let form = harness
        .container()
        .active_filters_form()
        .expect("startup form");
    let error = LoadError::new("loadLogs", "503 Service Unavailable");
    harness.backend().log_loader.fail_next(error.clone());

    form.edit(|criteria| criteria.query = Some("level:ERROR".into()));
    assert_eq!(
        harness.container().load_error().latest(),
        Some(Some(error))
    );

    form.edit(|criteria| criteria.query = None);
    assert_eq!(harness.container().load_error().latest(), Some(None));
}

// ===== Tabs =====

#[test]
fn opening_file_tab_restores_file_view_and_entry() {
    let harness = harness();
    harness.switch_log_type(LogType::Audit);

    harness.switch_tab("c6401-namenode").expect("open tab");

    let container = harness.container();
    assert_eq!(container.active_log_type(), Some(LogType::Service));
    assert_eq!(container.is_service_logs_file_view().latest(), Some(true));
    assert_eq!(
        container
            .active_log()
            .latest()
            .flatten()
            .map(|entry| entry.component_name),
        Some("hdfs_namenode".to_string())
    );
}

#[test]
fn closing_file_tab_falls_back_to_service_logs() {
    let harness = harness();
    harness.switch_tab("c6401-namenode").expect("open tab");

    harness
        .close_tab("c6401-namenode", Some("serviceLogs"))
        .expect("close tab");

    assert_eq!(harness.tab_ids(), vec!["serviceLogs", "auditLogs"]);
    let container = harness.container();
    assert_eq!(
        container.active_tab().map(|tab| tab.id.to_string()),
        Some("serviceLogs".to_string())
    );
    assert_eq!(container.is_service_logs_file_view().latest(), Some(false));
    assert_eq!(container.active_log().latest(), Some(None));
}

#[test]
fn closing_unknown_tab_is_an_error() {
    let harness = harness();

    let result = harness.close_tab("nope", None);

    assert!(matches!(
        result,
        Err(ViewError::Tab(TabError::NotFound(ref id))) if id.as_str() == "nope"
    ));
    assert_eq!(harness.tab_ids().len(), 3);
}

#[test]
fn empty_tab_id_is_rejected() {
    let harness = harness();
    assert!(matches!(
        harness.switch_tab(" "),
        Err(ViewError::InvalidTabId(_))
    ));
}

// ===== Status =====

#[test]
fn auto_refresh_countdown_follows_configuration() {
    let config = ResolvedConfig {
        auto_refresh_seconds: Some(10),
        ..ResolvedConfig::default()
    };
    let harness = AcceptanceTestHarness::from_fixture_with_config(CLUSTER_FIXTURE, &config)
        .expect("Should load cluster fixture");

    assert_eq!(
        harness.container().auto_refresh_message().as_deref(),
        Some("Refreshing in 10 seconds")
    );
    harness.backend().filtering.set_auto_refresh(None);
    assert_eq!(harness.container().auto_refresh_message(), None);
}
