use crate::{
    db::{continuation::Origin, store::DocumentStore},
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};

///
/// GuardVerdict
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuardVerdict {
    Proceed,
    Stale(StaleReason),
}

///
/// StaleReason
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StaleReason {
    OriginMissing,
    MarkerChanged,
}

impl StaleReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::OriginMissing => "origin document no longer exists",
            Self::MarkerChanged => "origin deletion marker changed",
        }
    }
}

/// Decide whether a delivered continuation may still run.
///
/// Reads only; never mutates the store. An id that does not belong to the
/// origin table is a caller defect and fails hard.
pub fn check_origin<S>(
    store: &S,
    marker_field: &str,
    origin: &Origin,
) -> Result<GuardVerdict, InternalError>
where
    S: DocumentStore + ?Sized,
{
    if !store.owns_id(&origin.table, origin.id) {
        return Err(InternalError::invalid_reference(&origin.table, origin.id));
    }

    let Some(doc) = store.get(&origin.table, origin.id)? else {
        return Ok(GuardVerdict::Stale(StaleReason::OriginMissing));
    };

    if doc.marker(marker_field) != origin.deletion_marker.as_ref() {
        return Ok(GuardVerdict::Stale(StaleReason::MarkerChanged));
    }

    Ok(GuardVerdict::Proceed)
}

/// Log and count an abandoned continuation.
///
/// An in-progress cancellation leaves partial work behind and is reported as
/// an error.
pub fn report_stale(origin: &Origin, reason: StaleReason, in_progress: bool) {
    if in_progress {
        tracing::error!(
            table = %origin.table,
            id = %origin.id,
            reason = reason.as_str(),
            "cascading deletion cancelled after partial progress"
        );
    } else {
        tracing::info!(
            table = %origin.table,
            id = %origin.id,
            reason = reason.as_str(),
            "scheduled cascading deletion cancelled"
        );
    }

    sink::record(MetricsEvent::Cancelled {
        origin_table: origin.table.as_str(),
        in_progress,
    });
}
