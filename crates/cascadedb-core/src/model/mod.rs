//! Read-only relationship metadata consumed by the deletion planner.
//!
//! Edge declarations are authored elsewhere; this module only describes
//! them and classifies each one into a closed shape.

pub mod edge;
pub mod schema;


use crate::types::TableName;

// re-exports
pub use edge::{Cardinality, DeletionBehavior, EdgeDescriptor, EdgeShape, EdgeStorage};
pub use schema::{Schema, SchemaBuilder, SchemaError};

///
/// EdgeGraph
///
/// Schema lookup contract: all edges declared on one table.
/// Unknown tables have no edges.
///

pub trait EdgeGraph {
    fn edges_for(&self, table: &TableName) -> &[EdgeDescriptor];
}

impl<G: EdgeGraph + ?Sized> EdgeGraph for &G {
    fn edges_for(&self, table: &TableName) -> &[EdgeDescriptor] {
        (**self).edges_for(table)
    }
}
