//! Cascading deletion engine.
//!
//! A deletion walks the ownership graph depth-first through an explicit
//! `Stack`. Each call into `Cascade` runs one budget-bounded step; unfinished
//! work is handed to the `Scheduler` as a `ContinuationMessage` and picked up
//! again through `resume`.

pub mod budget;
pub mod continuation;
pub(crate) mod executor;
pub mod guard;
pub mod plan;
pub mod stack;
pub mod store;


use crate::{
    config::CascadeConfig,
    db::{
        continuation::{ContinuationMessage, Origin},
        executor::StepExecutor,
        guard::{GuardVerdict, check_origin, report_stale},
        stack::Stack,
        store::{DocumentStore, Scheduler},
    },
    error::InternalError,
    model::EdgeGraph,
    obs::sink::{self, MetricsEvent},
    types::{Id, TableName},
};

///
/// StepOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// The stack drained; nothing was enqueued.
    Completed,

    /// The budget ran out; one continuation carrying `depth` frames was enqueued.
    Suspended { depth: usize },

    /// The origin guard rejected the continuation; nothing was mutated.
    Cancelled,
}

///
/// Cascade
///
/// Entry points of the deletion engine, bound to one store, scheduler and
/// edge graph. Every method is one step and expects to run inside a single
/// atomic unit of work provided by the host.
///

pub struct Cascade<'a, S: ?Sized, Q: ?Sized, G: ?Sized> {
    store: &'a S,
    scheduler: &'a Q,
    graph: &'a G,
    config: CascadeConfig,
}

impl<'a, S, Q, G> Cascade<'a, S, Q, G>
where
    S: DocumentStore + ?Sized,
    Q: Scheduler + ?Sized,
    G: EdgeGraph + ?Sized,
{
    pub fn new(
        store: &'a S,
        scheduler: &'a Q,
        graph: &'a G,
        config: CascadeConfig,
    ) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self {
            store,
            scheduler,
            graph,
            config,
        })
    }

    /// Engine with the default step caps.
    #[must_use]
    pub fn with_defaults(store: &'a S, scheduler: &'a Q, graph: &'a G) -> Self {
        Self {
            store,
            scheduler,
            graph,
            config: CascadeConfig::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Delete `id` of `table` and everything it owns, running the first
    /// budget window synchronously.
    ///
    /// A document that no longer exists is a no-op.
    pub fn request_cascading_deletion(
        &self,
        table: &TableName,
        id: Id,
    ) -> Result<(), InternalError> {
        let Some(origin) = self.capture_origin(table, id)? else {
            tracing::debug!(%table, %id, "cascading deletion requested for missing document");
            return Ok(());
        };

        tracing::info!(%table, %id, "cascading deletion started");
        sink::record(MetricsEvent::StepStart {
            origin_table: table.as_str(),
            resumed: false,
        });

        let stack = Stack::for_origin(self.graph, table, id);
        StepExecutor::new(self.store, self.scheduler, self.graph, &self.config, &origin)
            .run(stack)?;

        Ok(())
    }

    /// Enqueue the hard phase of a deletion to run after `delay_ms`.
    ///
    /// The caller soft-deletes the entity first; the marker observed now is
    /// what the guard compares against on delivery, so clearing it cancels
    /// the deletion.
    pub fn schedule_cascading_deletion(
        &self,
        table: &TableName,
        id: Id,
        delay_ms: u64,
    ) -> Result<(), InternalError> {
        let Some(origin) = self.capture_origin(table, id)? else {
            tracing::debug!(%table, %id, "cascading deletion scheduled for missing document");
            return Ok(());
        };

        tracing::info!(%table, %id, delay_ms, "cascading deletion scheduled");
        self.scheduler
            .enqueue(delay_ms, ContinuationMessage::scheduled(origin))
    }

    /// Run one step for a delivered continuation.
    pub fn resume(&self, message: ContinuationMessage) -> Result<StepOutcome, InternalError> {
        message.validate()?;

        let verdict = check_origin(
            self.store,
            &self.config.deletion_marker_field,
            &message.origin,
        )?;
        if let GuardVerdict::Stale(reason) = verdict {
            report_stale(&message.origin, reason, message.in_progress);
            return Ok(StepOutcome::Cancelled);
        }

        let ContinuationMessage {
            origin,
            stack,
            in_progress,
        } = message;

        sink::record(MetricsEvent::StepStart {
            origin_table: origin.table.as_str(),
            resumed: in_progress,
        });

        let stack = if in_progress {
            stack
        } else {
            Stack::for_origin(self.graph, &origin.table, origin.id)
        };

        StepExecutor::new(self.store, self.scheduler, self.graph, &self.config, &origin).run(stack)
    }

    /// Decode a continuation from its wire form and resume it.
    pub fn resume_encoded(&self, bytes: &[u8]) -> Result<StepOutcome, InternalError> {
        let message = ContinuationMessage::decode(bytes)?;

        self.resume(message)
    }

    // Validate the id and capture the current deletion marker.
    fn capture_origin(&self, table: &TableName, id: Id) -> Result<Option<Origin>, InternalError> {
        if !self.store.owns_id(table, id) {
            return Err(InternalError::invalid_reference(table, id));
        }

        let Some(doc) = self.store.get(table, id)? else {
            return Ok(None);
        };

        Ok(Some(Origin {
            table: table.clone(),
            id,
            deletion_marker: doc.marker(&self.config.deletion_marker_field).cloned(),
        }))
    }
}
