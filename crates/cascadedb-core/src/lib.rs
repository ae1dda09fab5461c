//! Core runtime for cascadedb: relationship model, the resumable deletion
//! engine, storage/scheduler contracts with in-memory backends, and
//! observability.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod serialize;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Most documents one step may scan.
pub const HARD_DOC_CAP: u64 = 8192 / 4;

/// Most estimated bytes one step may read.
pub const HARD_BYTE_CAP: u64 = 1 << 18;

///
/// Prelude
///
/// Prelude contains only domain vocabulary and the engine entry point.
/// No errors, codecs or backends are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::CascadeConfig,
        db::{Cascade, StepOutcome},
        model::{Cardinality, DeletionBehavior, EdgeDescriptor, EdgeGraph, EdgeStorage, Schema},
        types::{Id, TableName},
        value::{Document, Value},
    };
}
