//! Observability: runtime telemetry (counters) and sink abstractions.
//!
//! This module never touches engine internals directly; all
//! instrumentation flows through [`MetricsEvent`] emitted at the engine
//! boundary.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventReport, OpsCounters};
pub use sink::{FetchStrategy, MetricsEvent, MetricsSink, StaleKind, metrics_report, metrics_reset_all};
