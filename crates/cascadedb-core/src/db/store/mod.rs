//! Storage and scheduling contracts consumed by the deletion engine.
//!
//! The engine never owns a transaction. Each call into a `Cascade` entry
//! point is expected to run inside one atomic unit of work provided by the
//! host, and every primitive here must be safe to repeat.

pub mod memory;


use crate::{
    db::continuation::ContinuationMessage,
    error::InternalError,
    types::{Id, TableName},
    value::{Document, Value},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Cursor
///
/// Opaque, store-issued resume position inside one index scan.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    #[must_use]
    pub fn new(position: impl Into<String>) -> Self {
        Self(position.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

///
/// IndexQuery
/// Equality scan over one index of one table.
///

#[derive(Clone, Copy, Debug)]
pub struct IndexQuery<'a> {
    pub table: &'a TableName,
    pub index: &'a str,
    pub key: &'a Value,
}

///
/// PageRequest
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub cursor: Option<Cursor>,
    pub num_items: u64,
    pub max_bytes: u64,
}

///
/// Page
///
/// One page of an index scan. `continue_cursor` resumes strictly after the
/// last returned document; for an empty page it repeats the request cursor.
/// `bytes_read` is the store's own read accounting for this page.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page {
    pub documents: Vec<Document>,
    pub continue_cursor: Option<Cursor>,
    pub is_done: bool,
    pub bytes_read: u64,
}

///
/// DocumentStore
///
/// Primitive operations the engine needs from the host store.
///
/// Contract:
/// - `paginate` returns at most `num_items` documents, ordered and stable
///   for a given cursor, and only exceeds `max_bytes` when its first
///   document alone does.
/// - `delete` of an absent document is a no-op.
///

pub trait DocumentStore {
    /// True when `id` is a well-formed id for `table`, whether or not the
    /// document still exists.
    fn owns_id(&self, table: &TableName, id: Id) -> bool;

    fn get(&self, table: &TableName, id: Id) -> Result<Option<Document>, InternalError>;

    fn paginate(&self, query: IndexQuery<'_>, request: PageRequest)
    -> Result<Page, InternalError>;

    fn delete(&self, table: &TableName, id: Id) -> Result<(), InternalError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn owns_id(&self, table: &TableName, id: Id) -> bool {
        (**self).owns_id(table, id)
    }

    fn get(&self, table: &TableName, id: Id) -> Result<Option<Document>, InternalError> {
        (**self).get(table, id)
    }

    fn paginate(
        &self,
        query: IndexQuery<'_>,
        request: PageRequest,
    ) -> Result<Page, InternalError> {
        (**self).paginate(query, request)
    }

    fn delete(&self, table: &TableName, id: Id) -> Result<(), InternalError> {
        (**self).delete(table, id)
    }
}

///
/// Scheduler
///
/// Work queue carrying continuations between steps.
/// Delivery is at-least-once with best-effort timing.
///

pub trait Scheduler {
    fn enqueue(&self, delay_ms: u64, message: ContinuationMessage) -> Result<(), InternalError>;
}

impl<Q: Scheduler + ?Sized> Scheduler for &Q {
    fn enqueue(&self, delay_ms: u64, message: ContinuationMessage) -> Result<(), InternalError> {
        (**self).enqueue(delay_ms, message)
    }
}
