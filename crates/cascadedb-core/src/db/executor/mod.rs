mod page;

use page::PageStep;

use crate::{
    config::CascadeConfig,
    db::{
        StepOutcome,
        budget::Budget,
        continuation::{ContinuationMessage, Origin},
        stack::{PageFrame, Stack, StackFrame},
        store::{DocumentStore, Scheduler},
    },
    error::InternalError,
    model::EdgeGraph,
    obs::sink::{self, FinishKind, MetricsEvent},
    value::Value,
};

///
/// StepExecutor
///
/// Runs one budget window of a cascading deletion.
///
/// Every call starts from a fresh `Budget`. The loop either drains the stack
/// (completion) or, once the budget is exhausted with work left, persists the
/// stack into exactly one continuation and stops.
///

pub(crate) struct StepExecutor<'a, S: ?Sized, Q: ?Sized, G: ?Sized> {
    store: &'a S,
    scheduler: &'a Q,
    graph: &'a G,
    config: &'a CascadeConfig,
    origin: &'a Origin,
}

impl<'a, S, Q, G> StepExecutor<'a, S, Q, G>
where
    S: DocumentStore + ?Sized,
    Q: Scheduler + ?Sized,
    G: EdgeGraph + ?Sized,
{
    pub(crate) const fn new(
        store: &'a S,
        scheduler: &'a Q,
        graph: &'a G,
        config: &'a CascadeConfig,
        origin: &'a Origin,
    ) -> Self {
        Self {
            store,
            scheduler,
            graph,
            config,
            origin,
        }
    }

    pub(crate) fn run(&self, mut stack: Stack) -> Result<StepOutcome, InternalError> {
        let mut budget = Budget::from_config(self.config);

        while let Some(frame) = stack.pop() {
            match frame {
                StackFrame::Edge(mut edge) => {
                    // Descend: tasks first, the entity itself last.
                    if let Some(task) = edge.remaining.pop_front() {
                        let key = Value::Id(edge.id);
                        stack.push(StackFrame::Edge(edge));
                        stack.push(StackFrame::Page(PageFrame::start(task, key)));
                        continue;
                    }

                    self.store.delete(&edge.table, edge.id)?;
                    sink::record(MetricsEvent::RowsDeleted {
                        table: edge.table.as_str(),
                        rows: 1,
                    });
                }
                StackFrame::Page(page) => {
                    let step = page::process_page(self, &mut stack, page, &mut budget)?;
                    if step == PageStep::Deferred {
                        return self.suspend(stack, &budget);
                    }
                }
            }

            if budget.exceeded() && !stack.is_empty() {
                return self.suspend(stack, &budget);
            }
        }

        self.finish(FinishKind::Completed, &budget);
        tracing::info!(
            table = %self.origin.table,
            id = %self.origin.id,
            documents = budget.documents_processed(),
            "cascading deletion complete"
        );

        Ok(StepOutcome::Completed)
    }

    fn suspend(&self, stack: Stack, budget: &Budget) -> Result<StepOutcome, InternalError> {
        let depth = stack.len();
        let message = ContinuationMessage::suspended(self.origin.clone(), stack);
        self.scheduler
            .enqueue(self.config.continuation_delay_ms, message)?;

        self.finish(FinishKind::Suspended, budget);
        tracing::debug!(
            table = %self.origin.table,
            id = %self.origin.id,
            depth,
            documents = budget.documents_processed(),
            bytes = budget.bytes_read(),
            "cascading deletion suspended"
        );

        Ok(StepOutcome::Suspended { depth })
    }

    fn finish(&self, kind: FinishKind, budget: &Budget) {
        sink::record(MetricsEvent::StepFinish {
            origin_table: self.origin.table.as_str(),
            kind,
            documents: budget.documents_processed(),
            bytes: budget.bytes_read(),
        });
    }
}
