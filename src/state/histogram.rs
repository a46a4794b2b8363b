//! Histogram aggregation for the active domain.

use crate::model::{
    BarGraph, HistogramBucket, HistogramData, HistogramOptions, LogType, StackedHistogram,
};
use crate::reactive::{Scope, Signal, Source};
use crate::state::{DomainBinding, LogDomain};
use chrono::DateTime;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// Turns raw buckets of the active domain into chart data.
///
/// Holds no cross-domain state: each activation starts from empty data and
/// follows only the new domain's bucket source.
pub struct HistogramAggregator {
    data: Rc<Source<HistogramData>>,
}

impl HistogramAggregator {
    /// Aggregator holding empty data.
    pub fn new() -> Self {
        Self {
            data: Rc::new(Source::with_value(HistogramData::default())),
        }
    }

    /// Label → count mapping, labels unique and in first-seen order.
    /// Counts of repeated labels are summed.
    pub fn project(buckets: &[HistogramBucket]) -> HistogramData {
        let mut data = HistogramData::default();
        for bucket in buckets {
            data.add(&bucket.label, bucket.count);
        }
        data
    }

    /// Per-timestamp counts of every level, for stacked charts.
    ///
    /// Each timestamp gets every level of `options` initialized to 0. Bucket
    /// labels are epoch milliseconds or RFC 3339 timestamps; buckets with any
    /// other label are skipped.
    pub fn project_series(series: &[BarGraph], options: &HistogramOptions) -> StackedHistogram {
        let mut stacked = StackedHistogram::new();
        for graph in series {
            for bucket in &graph.data_count {
                let Some(timestamp) = parse_timestamp(&bucket.label) else {
                    debug!(
                        label = %bucket.label,
                        series = %graph.name,
                        "Skipping bucket with unparseable time"
                    );
                    continue;
                };
                let levels = stacked.entry(timestamp).or_insert_with(|| {
                    options
                        .levels()
                        .map(|level| (level.to_string(), 0))
                        .collect::<BTreeMap<_, _>>()
                });
                levels.insert(graph.name.clone(), bucket.count);
            }
        }
        stacked
    }

    /// Chart data of the active domain.
    pub fn data(&self) -> Signal<HistogramData> {
        self.data.signal()
    }
}

impl Default for HistogramAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainBinding for HistogramAggregator {
    fn bind(&self, log_type: LogType, domain: &LogDomain, scope: &mut Scope) {
        let token = scope.token();
        if !token.is_current() {
            debug!(%log_type, "Skipping bind to superseded scope");
            return;
        }
        self.data.emit(HistogramData::default());

        let data = Rc::clone(&self.data);
        scope.hold(domain.histogram.subscribe(move |buckets| {
            if !token.is_current() {
                debug!(%log_type, "Discarding histogram buckets from retired scope");
                return;
            }
            data.emit(HistogramAggregator::project(buckets));
        }));
    }
}

fn parse_timestamp(label: &str) -> Option<i64> {
    label.parse::<i64>().ok().or_else(|| {
        DateTime::parse_from_rfc3339(label)
            .ok()
            .map(|time| time.timestamp_millis())
    })
}
