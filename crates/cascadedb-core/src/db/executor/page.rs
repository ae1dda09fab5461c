use crate::{
    db::{
        budget::Budget,
        executor::StepExecutor,
        plan::Approach,
        stack::{EdgeFrame, PageFrame, Stack, StackFrame},
        store::{DocumentStore, IndexQuery, PageRequest, Scheduler},
    },
    error::InternalError,
    model::EdgeGraph,
    obs::sink::{self, MetricsEvent},
};

///
/// PageStep
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum PageStep {
    Applied,
    /// The page would overrun the byte cap; the frame was re-pushed untouched.
    Deferred,
}

/// Run one index scan for the popped `frame` and apply its approach.
///
/// `Paginate` deletes the whole page and re-pushes the frame until the scan
/// is done. `Cascade` fetches a single target, re-pushes the frame with the
/// advanced cursor and pushes a fresh frame for the target above it.
pub(super) fn process_page<S, Q, G>(
    exec: &StepExecutor<'_, S, Q, G>,
    stack: &mut Stack,
    frame: PageFrame,
    budget: &mut Budget,
) -> Result<PageStep, InternalError>
where
    S: DocumentStore + ?Sized,
    Q: Scheduler + ?Sized,
    G: EdgeGraph + ?Sized,
{
    let requested = frame
        .approach
        .requested_items(exec.config.max_documents_per_step);
    let limits = budget.clamp(requested);

    let page = exec.store.paginate(
        IndexQuery {
            table: &frame.target_table,
            index: &frame.index_name,
            key: &frame.key_value,
        },
        PageRequest {
            cursor: frame.cursor.clone(),
            num_items: limits.num_items,
            max_bytes: limits.max_bytes,
        },
    )?;

    let fetched = u64::try_from(page.documents.len()).unwrap_or(u64::MAX);
    if fetched > limits.num_items {
        return Err(InternalError::executor_invariant(format!(
            "store returned {fetched} documents for a page of {} on {}.{}",
            limits.num_items, frame.target_table, frame.index_name
        )));
    }

    if budget.would_overflow(page.bytes_read) {
        tracing::debug!(
            table = %frame.target_table,
            index = %frame.index_name,
            bytes = page.bytes_read,
            read = budget.bytes_read(),
            "page deferred to the next step"
        );
        stack.push(StackFrame::Page(frame));

        return Ok(PageStep::Deferred);
    }

    budget.record(fetched, page.bytes_read);
    sink::record(MetricsEvent::Scan {
        table: frame.target_table.as_str(),
        documents: fetched,
        bytes: page.bytes_read,
    });
    tracing::debug!(
        table = %frame.target_table,
        index = %frame.index_name,
        documents = fetched,
        bytes = page.bytes_read,
        done = page.is_done,
        "cascade scan"
    );

    match frame.approach {
        Approach::Paginate => {
            for doc in &page.documents {
                exec.store.delete(&frame.target_table, doc.id)?;
            }
            if fetched > 0 {
                sink::record(MetricsEvent::RowsDeleted {
                    table: frame.target_table.as_str(),
                    rows: fetched,
                });
            }
            if !page.is_done {
                stack.push(StackFrame::Page(frame.advance(page.continue_cursor)));
            }
        }
        Approach::Cascade => {
            if page.is_done && page.documents.is_empty() {
                return Ok(PageStep::Applied);
            }

            let table = frame.target_table.clone();
            stack.push(StackFrame::Page(frame.advance(page.continue_cursor)));
            for doc in &page.documents {
                stack.push(StackFrame::Edge(EdgeFrame::planned(
                    exec.graph, &table, doc.id,
                )));
            }
        }
    }

    Ok(PageStep::Applied)
}
