use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventReport
/// Ephemeral, in-memory counters for cascade steps.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Step entrypoints
    pub steps_started: u64,
    pub steps_resumed: u64,

    // Step exits
    pub steps_completed: u64,
    pub steps_suspended: u64,
    pub cancellations: u64,
    pub cancellations_in_progress: u64,

    // Work
    pub scans: u64,
    pub documents_scanned: u64,
    pub bytes_read: u64,
    pub rows_deleted: u64,

    // Largest single-step totals seen
    pub max_step_documents: u64,
    pub max_step_bytes: u64,
}

///
/// TableCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableCounters {
    pub scans: u64,
    pub documents_scanned: u64,
    pub rows_deleted: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventReport> = RefCell::new(EventReport::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventReport) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset() {
    with_state_mut(|m| *m = EventReport::default());
}
