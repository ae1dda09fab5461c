use crate::{
    db::{
        plan::{Approach, EdgeTask, plan_edge_tasks},
        store::Cursor,
    },
    model::EdgeGraph,
    types::{Id, TableName},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

///
/// EdgeFrame
///
/// One entity awaiting deletion. The entity itself is deleted only after
/// every task in `remaining` has been drained.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EdgeFrame {
    pub id: Id,
    pub table: TableName,
    pub remaining: VecDeque<EdgeTask>,
}

impl EdgeFrame {
    /// Frame for `id` with its tasks taken from the planner.
    #[must_use]
    pub fn planned<G>(graph: &G, table: &TableName, id: Id) -> Self
    where
        G: EdgeGraph + ?Sized,
    {
        Self {
            id,
            table: table.clone(),
            remaining: plan_edge_tasks(graph, table).into(),
        }
    }
}

///
/// PageFrame
/// An in-flight index scan for one edge task.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PageFrame {
    pub approach: Approach,
    pub target_table: TableName,
    pub index_name: String,
    pub key_value: Value,
    pub cursor: Option<Cursor>,
}

impl PageFrame {
    /// Begin scanning `task` for rows whose indexed field equals `key_value`.
    #[must_use]
    pub fn start(task: EdgeTask, key_value: Value) -> Self {
        Self {
            approach: task.approach,
            target_table: task.target_table,
            index_name: task.index_name,
            key_value,
            cursor: None,
        }
    }

    /// Same scan, resumed from `cursor`.
    #[must_use]
    pub fn advance(self, cursor: Option<Cursor>) -> Self {
        Self { cursor, ..self }
    }
}

///
/// StackFrame
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StackFrame {
    Edge(EdgeFrame),
    Page(PageFrame),
}

///
/// Stack
///
/// Explicit depth-first traversal state. The top is the last element.
/// Serialized verbatim into continuations.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Stack(Vec<StackFrame>);

impl Stack {
    /// Initial stack for deleting `id` of `table`.
    #[must_use]
    pub fn for_origin<G>(graph: &G, table: &TableName, id: Id) -> Self
    where
        G: EdgeGraph + ?Sized,
    {
        Self(vec![StackFrame::Edge(EdgeFrame::planned(graph, table, id))])
    }

    pub fn push(&mut self, frame: StackFrame) {
        self.0.push(frame);
    }

    pub fn pop(&mut self) -> Option<StackFrame> {
        self.0.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<StackFrame>> for Stack {
    fn from(frames: Vec<StackFrame>) -> Self {
        Self(frames)
    }
}
