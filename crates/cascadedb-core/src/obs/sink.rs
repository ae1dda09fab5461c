//! Metrics sink boundary.
//!
//! This module is the only allowed bridge between execution logic and the
//! process-local metrics state.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// FinishKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FinishKind {
    Completed,
    Suspended,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    StepStart {
        origin_table: &'a str,
        resumed: bool,
    },
    Scan {
        table: &'a str,
        documents: u64,
        bytes: u64,
    },
    RowsDeleted {
        table: &'a str,
        rows: u64,
    },
    StepFinish {
        origin_table: &'a str,
        kind: FinishKind,
        documents: u64,
        bytes: u64,
    },
    Cancelled {
        origin_table: &'a str,
        in_progress: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::StepStart { resumed, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.steps_started = m.ops.steps_started.saturating_add(1);
                    if resumed {
                        m.ops.steps_resumed = m.ops.steps_resumed.saturating_add(1);
                    }
                });
            }

            MetricsEvent::Scan {
                table,
                documents,
                bytes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.scans = m.ops.scans.saturating_add(1);
                    m.ops.documents_scanned = m.ops.documents_scanned.saturating_add(documents);
                    m.ops.bytes_read = m.ops.bytes_read.saturating_add(bytes);

                    let entry = m.tables.entry(table.to_string()).or_default();
                    entry.scans = entry.scans.saturating_add(1);
                    entry.documents_scanned = entry.documents_scanned.saturating_add(documents);
                });
            }

            MetricsEvent::RowsDeleted { table, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows);
                    let entry = m.tables.entry(table.to_string()).or_default();
                    entry.rows_deleted = entry.rows_deleted.saturating_add(rows);
                });
            }

            MetricsEvent::StepFinish {
                kind,
                documents,
                bytes,
                ..
            } => {
                metrics::with_state_mut(|m| {
                    match kind {
                        FinishKind::Completed => {
                            m.ops.steps_completed = m.ops.steps_completed.saturating_add(1);
                        }
                        FinishKind::Suspended => {
                            m.ops.steps_suspended = m.ops.steps_suspended.saturating_add(1);
                        }
                    }
                    m.ops.max_step_documents = m.ops.max_step_documents.max(documents);
                    m.ops.max_step_bytes = m.ops.max_step_bytes.max(bytes);
                });
            }

            MetricsEvent::Cancelled { in_progress, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.cancellations = m.ops.cancellations.saturating_add(1);
                    if in_progress {
                        m.ops.cancellations_in_progress =
                            m.ops.cancellations_in_progress.saturating_add(1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::with_state(Clone::clone)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit, including unwinds.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
