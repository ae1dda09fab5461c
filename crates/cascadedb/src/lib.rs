//! ## Crate layout
//! - `core`: relationship model, the resumable deletion engine, store and
//!   scheduler contracts, in-memory backends, config and observability.
//! - `error`: the stable public error type.
//!
//! Deletions run one budget-bounded step at a time. A host wires a
//! `DocumentStore`, a `Scheduler` and an `EdgeGraph` into a `Cascade`, calls
//! `request_cascading_deletion` or `schedule_cascading_deletion`, and hands
//! every delivered continuation back to `resume`.

pub use cascadedb_core as core;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

use cascadedb_core::{
    db::{
        Cascade, StepOutcome,
        store::{DocumentStore, Scheduler},
    },
    model::EdgeGraph,
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Queue handler entry point: run the step for one delivered, encoded
/// continuation.
///
/// Hosts redeliver the same bytes when the returned error is transient.
pub fn deliver<S, Q, G>(cascade: &Cascade<'_, S, Q, G>, bytes: &[u8]) -> Result<StepOutcome, Error>
where
    S: DocumentStore + ?Sized,
    Q: Scheduler + ?Sized,
    G: EdgeGraph + ?Sized,
{
    cascade.resume_encoded(bytes).map_err(Error::from)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            db::store::{
                DocumentStore, Scheduler,
                memory::{MemoryScheduler, MemoryStore},
            },
            prelude::*,
        },
        error::Error,
    };
}
