//! Metrics sink boundary.
//!
//! Engine logic MUST NOT write counters directly.
//! All instrumentation flows through MetricsEvent and MetricsSink; the
//! engine routes every event to its configured sink or, absent one, the
//! process-local global state.

use crate::obs::metrics;

///
/// FetchStrategy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchStrategy {
    Context,
    Cache,
    Action,
    Query,
}

///
/// StaleKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StaleKind {
    Query,
    Action,
    Geocode,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    FetchStarted {
        strategy: FetchStrategy,
    },
    FetchSkipped,
    MarkersReconciled {
        placed: u64,
        replaced: u64,
        suppressed: u64,
    },
    GeocodeRequested,
    GeocodeFailed,
    StaleCompletionDropped {
        kind: StaleKind,
    },
    AttributeWritten,
    ActionFailed,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into global counter state.
/// Acts as the concrete sink when no instance sink is configured.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::FetchStarted { strategy } => {
                m.ops.fetch_cycles = m.ops.fetch_cycles.saturating_add(1);
                let counter = match strategy {
                    FetchStrategy::Context => &mut m.ops.fetch_context_hits,
                    FetchStrategy::Cache => &mut m.ops.fetch_cache_hits,
                    FetchStrategy::Action => &mut m.ops.fetch_actions,
                    FetchStrategy::Query => &mut m.ops.fetch_queries,
                };
                *counter = counter.saturating_add(1);
            }
            MetricsEvent::FetchSkipped => {
                m.ops.fetch_skipped = m.ops.fetch_skipped.saturating_add(1);
            }
            MetricsEvent::MarkersReconciled {
                placed,
                replaced,
                suppressed,
            } => {
                m.ops.markers_placed = m.ops.markers_placed.saturating_add(placed);
                m.ops.markers_replaced = m.ops.markers_replaced.saturating_add(replaced);
                m.ops.markers_suppressed = m.ops.markers_suppressed.saturating_add(suppressed);
            }
            MetricsEvent::GeocodeRequested => {
                m.ops.geocode_requests = m.ops.geocode_requests.saturating_add(1);
            }
            MetricsEvent::GeocodeFailed => {
                m.ops.geocode_failures = m.ops.geocode_failures.saturating_add(1);
            }
            MetricsEvent::StaleCompletionDropped { .. } => {
                m.ops.stale_drops = m.ops.stale_drops.saturating_add(1);
            }
            MetricsEvent::AttributeWritten => {
                m.ops.attribute_writes = m.ops.attribute_writes.saturating_add(1);
            }
            MetricsEvent::ActionFailed => {
                m.ops.action_failures = m.ops.action_failures.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

/// Route one event to the instance sink, or the global state without one.
pub(crate) fn record(sink: Option<&'static dyn MetricsSink>, event: MetricsEvent) {
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current counter state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all counter state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink {
        calls: AtomicUsize,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn instance_sink_bypasses_global_state() {
        metrics_reset_all();
        let sink: &'static CountingSink = Box::leak(Box::new(CountingSink {
            calls: AtomicUsize::new(0),
        }));

        record(Some(sink), MetricsEvent::GeocodeRequested);

        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics_report().counters.geocode_requests, 0);
    }

    #[test]
    fn global_sink_accumulates_counters() {
        metrics_reset_all();

        record(
            None,
            MetricsEvent::FetchStarted {
                strategy: FetchStrategy::Query,
            },
        );
        record(
            None,
            MetricsEvent::MarkersReconciled {
                placed: 3,
                replaced: 1,
                suppressed: 1,
            },
        );
        record(None, MetricsEvent::StaleCompletionDropped { kind: StaleKind::Geocode });

        let counters = metrics_report().counters;
        assert_eq!(counters.fetch_cycles, 1);
        assert_eq!(counters.fetch_queries, 1);
        assert_eq!(counters.markers_placed, 3);
        assert_eq!(counters.markers_replaced, 1);
        assert_eq!(counters.markers_suppressed, 1);
        assert_eq!(counters.stale_drops, 1);
    }
}
