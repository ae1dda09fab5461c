//! Observability: runtime counters and the sink boundary.
//!
//! Engine code never touches `metrics` directly; every counter update flows
//! through `sink::record`. Human-readable events go through `tracing`.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, TableCounters};
pub use sink::{
    FinishKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
