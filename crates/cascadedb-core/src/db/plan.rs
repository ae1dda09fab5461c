use crate::{
    model::{EdgeDescriptor, EdgeGraph, EdgeShape},
    types::TableName,
};
use serde::{Deserialize, Serialize};

///
/// Approach
///
/// How the dependents found by one edge task are removed.
///
/// `Cascade` walks targets one at a time because each target owns further
/// dependents. `Paginate` bulk-deletes whole pages of leaf rows.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Approach {
    Cascade,
    Paginate,
}

impl Approach {
    /// Page size this approach asks for before budget clamping.
    #[must_use]
    pub const fn requested_items(self, doc_cap: u64) -> u64 {
        match self {
            Self::Cascade => 1,
            Self::Paginate => doc_cap,
        }
    }
}

///
/// EdgeTask
/// One index scan to run for one entity being deleted.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EdgeTask {
    pub target_table: TableName,
    pub index_name: String,
    pub approach: Approach,
}

impl EdgeTask {
    fn new(target_table: &TableName, index_name: &str, approach: Approach) -> Self {
        Self {
            target_table: target_table.clone(),
            index_name: index_name.to_string(),
            approach,
        }
    }
}

/// Produce the ordered edge tasks for deleting one entity of `table`.
///
/// Pure and total: unknown tables yield no tasks, declaration order is kept,
/// local-field edges are skipped.
#[must_use]
pub fn plan_edge_tasks<G>(graph: &G, table: &TableName) -> Vec<EdgeTask>
where
    G: EdgeGraph + ?Sized,
{
    let mut tasks = Vec::new();

    for edge in graph.edges_for(table) {
        match edge.shape() {
            Some(EdgeShape::TargetBackRef { table, index }) => {
                let approach = if cascades_further(graph, table) {
                    Approach::Cascade
                } else {
                    Approach::Paginate
                };
                tasks.push(EdgeTask::new(table, index, approach));
            }
            Some(EdgeShape::JoinTable {
                table,
                forward_key,
                inverse_key,
                symmetric,
            }) => {
                tasks.push(EdgeTask::new(table, forward_key, Approach::Paginate));
                if symmetric {
                    tasks.push(EdgeTask::new(table, inverse_key, Approach::Paginate));
                }
            }
            Some(EdgeShape::LocalField { .. }) | None => {}
        }
    }

    tasks
}

// deleting a row of `table` must itself reach dependents
fn cascades_further<G>(graph: &G, table: &TableName) -> bool
where
    G: EdgeGraph + ?Sized,
{
    graph
        .edges_for(table)
        .iter()
        .any(EdgeDescriptor::is_cascading)
}
