//! Projection throughput benchmarks.
//!
//! Measures the whitelist projection alone and the full path from a raw-log
//! emission to the published rows of the container.
//!
//! Run with: cargo bench

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logscope::model::{
    AvailableFields, FieldDescriptor, HistogramOptions, LogRecord, LogType, LogTypeMap, ServiceLog,
};
use logscope::source::{
    MemoryColumnsLoader, MemoryFiltering, MemoryHistogramSource, MemoryLogLoader, MemoryTabStore,
};
use logscope::state::{project_logs, Collaborators, LogsContainer};
use serde_json::Value;
use std::rc::Rc;

/// Service rows with every schema field set plus a few custom fields.
fn generate_rows(count: usize) -> Vec<LogRecord> {
    (0..count)
        .map(|i| {
            let mut log = ServiceLog {
                id: Some(format!("log-{i:06}")),
                cluster: Some("cl1".into()),
                host: Some(format!("c64{:02}.ambari.apache.org", i % 16)),
                component: Some("hdfs_namenode".into()),
                level: Some(["INFO", "WARN", "ERROR"][i % 3].into()),
                log_message: Some("Block report processed ".repeat(4)),
                file: Some("FSNamesystem.java".into()),
                path: Some("/var/log/hadoop/hdfs/namenode.log".into()),
                line_number: Some(i as u64),
                ip: Some("192.168.64.101".into()),
                seq_num: Some(i as u64),
                ..ServiceLog::default()
            };
            log.custom
                .insert("thread_name".into(), Value::from("IPC Server handler"));
            log.custom.insert("bundle_id".into(), Value::from(i as u64));
            log.into()
        })
        .collect()
}

fn service_fields() -> Vec<FieldDescriptor> {
    ["logtime", "level", "type", "log_message", "host", "thread_name"]
        .into_iter()
        .map(|name| FieldDescriptor::new(name).with_visibility(true, true))
        .collect()
}

fn benchmark_project_logs(c: &mut Criterion) {
    let available: AvailableFields = service_fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();

    let mut group = c.benchmark_group("project_logs");
    for count in [100, 1_000, 10_000] {
        let rows = generate_rows(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| black_box(project_logs(black_box(rows), black_box(&available))))
        });
    }
    group.finish();
}

fn benchmark_container_emission(c: &mut Criterion) {
    let loader = Rc::new(MemoryLogLoader::new());
    let container = LogsContainer::new(
        Collaborators {
            log_loader: loader.clone(),
            histogram_source: Rc::new(MemoryHistogramSource::new()),
            columns_loader: Rc::new(MemoryColumnsLoader::new(LogTypeMap::new(
                service_fields(),
                Vec::new(),
            ))),
            filtering: Rc::new(MemoryFiltering::new()),
            tab_store: Rc::new(MemoryTabStore::new(Vec::new())),
        },
        HistogramOptions::default(),
    );
    container.set_active_log_type(LogType::Service);
    let rows = generate_rows(1_000);

    c.bench_function("container_emission_1000_rows", |b| {
        b.iter(|| {
            loader.deliver(LogType::Service, black_box(rows.clone()));
            black_box(container.logs().version())
        })
    });
}

criterion_group!(benches, benchmark_project_logs, benchmark_container_emission);
criterion_main!(benches);
