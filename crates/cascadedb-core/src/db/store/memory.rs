//! In-memory reference backends.
//!
//! `MemoryStore` and `MemoryScheduler` implement the engine contracts for
//! embedding and tests. Both are single-threaded (interior mutability via
//! `RefCell`), matching a host that runs one step at a time.

use crate::{
    db::{
        StepOutcome,
        budget::estimate_document_bytes,
        continuation::ContinuationMessage,
        store::{Cursor, DocumentStore, IndexQuery, Page, PageRequest, Scheduler},
    },
    error::InternalError,
    types::{Id, TableName},
    value::{Document, Value},
};
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, VecDeque},
    ops::Bound,
};

///
/// MemoryState
///

#[derive(Clone, Debug, Default)]
struct MemoryState {
    rows: BTreeMap<TableName, BTreeMap<Id, Document>>,
    // table -> index name -> indexed field
    indexes: BTreeMap<TableName, BTreeMap<String, String>>,
    // every id ever issued, kept after delete so stale references stay well-formed
    issued: BTreeMap<Id, TableName>,
    next_id: u128,
    rows_deleted: u64,
}

///
/// MemoryStore
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<MemoryState>,
    pending_faults: Cell<u32>,
    // flat per-document charge replacing the JSON size estimate
    document_bytes: Option<u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that charges every scanned document exactly `bytes`.
    #[must_use]
    pub fn with_document_bytes(bytes: u64) -> Self {
        Self {
            document_bytes: Some(bytes),
            ..Self::default()
        }
    }

    fn charge(&self, doc: &Document) -> u64 {
        self.document_bytes
            .unwrap_or_else(|| estimate_document_bytes(doc))
    }

    /// Declare an equality index on `field`. Scans through undeclared
    /// indexes are rejected.
    pub fn define_index(&self, table: &TableName, index: &str, field: &str) {
        self.state
            .borrow_mut()
            .indexes
            .entry(table.clone())
            .or_default()
            .insert(index.to_string(), field.to_string());
    }

    /// Insert a new document and return its freshly issued id.
    pub fn insert<I, K>(&self, table: &TableName, fields: I) -> Id
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = Id::from_u128(state.next_id);
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();

        state.issued.insert(id, table.clone());
        state
            .rows
            .entry(table.clone())
            .or_default()
            .insert(id, Document::new(id, fields));

        id
    }

    /// Set (or clear, with `Value::Null`) one field on an existing document.
    pub fn set_field(
        &self,
        table: &TableName,
        id: Id,
        field: &str,
        value: Value,
    ) -> Result<(), InternalError> {
        let mut state = self.state.borrow_mut();
        let doc = state
            .rows
            .get_mut(table)
            .and_then(|rows| rows.get_mut(&id))
            .ok_or_else(|| {
                InternalError::store_internal(format!("document not found: {table}/{id}"))
            })?;
        doc.fields.insert(field.to_string(), value);

        Ok(())
    }

    #[must_use]
    pub fn contains(&self, table: &TableName, id: Id) -> bool {
        self.state
            .borrow()
            .rows
            .get(table)
            .is_some_and(|rows| rows.contains_key(&id))
    }

    #[must_use]
    pub fn len(&self, table: &TableName) -> usize {
        self.state.borrow().rows.get(table).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        self.state.borrow().rows.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Ids currently stored in `table`, in id order.
    #[must_use]
    pub fn ids(&self, table: &TableName) -> Vec<Id> {
        self.state
            .borrow()
            .rows
            .get(table)
            .map(|rows| rows.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of deletes that actually removed a row.
    #[must_use]
    pub fn rows_deleted(&self) -> u64 {
        self.state.borrow().rows_deleted
    }

    /// Make the next `count` scan/delete calls fail with a transient error.
    pub fn inject_transient_faults(&self, count: u32) {
        self.pending_faults.set(count);
    }

    /// Run `f` as one all-or-nothing unit: on error every store mutation made
    /// inside it is rolled back.
    pub fn atomic<T>(
        &self,
        f: impl FnOnce() -> Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        let snapshot = self.state.borrow().clone();
        let result = f();
        if result.is_err() {
            *self.state.borrow_mut() = snapshot;
        }

        result
    }

    fn take_fault(&self) -> Result<(), InternalError> {
        let pending = self.pending_faults.get();
        if pending == 0 {
            return Ok(());
        }
        self.pending_faults.set(pending - 1);

        Err(InternalError::store_unavailable(
            "injected transient store fault",
        ))
    }
}

impl DocumentStore for MemoryStore {
    fn owns_id(&self, table: &TableName, id: Id) -> bool {
        self.state.borrow().issued.get(&id) == Some(table)
    }

    fn get(&self, table: &TableName, id: Id) -> Result<Option<Document>, InternalError> {
        Ok(self
            .state
            .borrow()
            .rows
            .get(table)
            .and_then(|rows| rows.get(&id))
            .cloned())
    }

    fn paginate(&self, query: IndexQuery<'_>, request: PageRequest) -> Result<Page, InternalError> {
        self.take_fault()?;

        let state = self.state.borrow();
        let field = state
            .indexes
            .get(query.table)
            .and_then(|indexes| indexes.get(query.index))
            .ok_or_else(|| {
                InternalError::store_unsupported(format!(
                    "unknown index '{}' on table '{}'",
                    query.index, query.table
                ))
            })?;

        let lower = match &request.cursor {
            Some(cursor) => {
                let after = Id::parse(cursor.as_str()).map_err(|err| {
                    InternalError::store_unsupported(format!("invalid scan cursor: {err}"))
                })?;
                Bound::Excluded(after)
            }
            None => Bound::Unbounded,
        };

        let mut documents = Vec::new();
        let mut bytes_read = 0u64;
        let mut is_done = true;

        if let Some(rows) = state.rows.get(query.table) {
            let matching = rows
                .range((lower, Bound::Unbounded))
                .map(|(_, doc)| doc)
                .filter(|doc| doc.field(field) == Some(query.key));

            for doc in matching {
                if documents.len() as u64 >= request.num_items {
                    is_done = false;
                    break;
                }
                let size = self.charge(doc);
                if !documents.is_empty() && bytes_read.saturating_add(size) > request.max_bytes {
                    is_done = false;
                    break;
                }
                bytes_read = bytes_read.saturating_add(size);
                documents.push(doc.clone());
            }
        }

        let continue_cursor = documents
            .last()
            .map(|doc| Cursor::new(doc.id.to_string()))
            .or(request.cursor);

        Ok(Page {
            documents,
            continue_cursor,
            is_done,
            bytes_read,
        })
    }

    fn delete(&self, table: &TableName, id: Id) -> Result<(), InternalError> {
        self.take_fault()?;

        let mut state = self.state.borrow_mut();
        let removed = state
            .rows
            .get_mut(table)
            .and_then(|rows| rows.remove(&id))
            .is_some();
        if removed {
            state.rows_deleted += 1;
        }

        Ok(())
    }
}

///
/// QueuedContinuation
/// Continuation as persisted by the scheduler: encoded bytes plus delay.
///

#[derive(Clone, Debug)]
struct QueuedContinuation {
    delay_ms: u64,
    bytes: Vec<u8>,
}

///
/// MemoryScheduler
///
/// FIFO queue of encoded continuations. Messages are stored encoded so that
/// every delivery exercises the wire format.
///

#[derive(Debug, Default)]
pub struct MemoryScheduler {
    queue: RefCell<VecDeque<QueuedContinuation>>,
    enqueued: Cell<u64>,
    delivered: Cell<u64>,
    retried: Cell<u64>,
}

impl MemoryScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Total messages ever enqueued.
    #[must_use]
    pub const fn enqueued(&self) -> u64 {
        self.enqueued.get()
    }

    /// Total deliveries handed to a handler, retries included.
    #[must_use]
    pub const fn delivered(&self) -> u64 {
        self.delivered.get()
    }

    /// Deliveries put back after a retryable failure.
    #[must_use]
    pub const fn retried(&self) -> u64 {
        self.retried.get()
    }

    /// Delays of the queued messages, front first.
    #[must_use]
    pub fn pending_delays(&self) -> Vec<u64> {
        self.queue.borrow().iter().map(|q| q.delay_ms).collect()
    }

    /// Decode the front message without removing it.
    pub fn peek(&self) -> Result<Option<ContinuationMessage>, InternalError> {
        self.queue
            .borrow()
            .front()
            .map(|queued| ContinuationMessage::decode(&queued.bytes).map_err(InternalError::from))
            .transpose()
    }

    /// Remove and decode the front message.
    pub fn take_next(&self) -> Result<Option<ContinuationMessage>, InternalError> {
        let queued = self.queue.borrow_mut().pop_front();

        queued
            .map(|queued| ContinuationMessage::decode(&queued.bytes).map_err(InternalError::from))
            .transpose()
    }

    /// Deliver queued messages to `handler` until the queue drains.
    ///
    /// A retryable failure puts the same encoded message back at the front;
    /// any other failure stops delivery and is returned. `max_deliveries`
    /// bounds the loop.
    pub fn run_until_idle<F>(&self, max_deliveries: u64, mut handler: F) -> Result<u64, InternalError>
    where
        F: FnMut(ContinuationMessage) -> Result<StepOutcome, InternalError>,
    {
        let mut deliveries = 0u64;

        loop {
            let Some(queued) = self.queue.borrow_mut().pop_front() else {
                return Ok(deliveries);
            };
            if deliveries >= max_deliveries {
                self.queue.borrow_mut().push_front(queued);
                return Err(InternalError::scheduler_unavailable(format!(
                    "delivery limit of {max_deliveries} reached with work still queued"
                )));
            }

            let message = ContinuationMessage::decode(&queued.bytes)?;
            deliveries += 1;
            self.delivered.set(self.delivered.get() + 1);

            match handler(message) {
                Ok(_) => {}
                Err(err) if err.is_retryable() => {
                    self.retried.set(self.retried.get() + 1);
                    self.queue.borrow_mut().push_front(queued);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Scheduler for MemoryScheduler {
    fn enqueue(&self, delay_ms: u64, message: ContinuationMessage) -> Result<(), InternalError> {
        let bytes = message.encode()?;
        self.queue
            .borrow_mut()
            .push_back(QueuedContinuation { delay_ms, bytes });
        self.enqueued.set(self.enqueued.get() + 1);

        Ok(())
    }
}
