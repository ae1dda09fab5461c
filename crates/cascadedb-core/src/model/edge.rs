use crate::types::TableName;
use serde::{Deserialize, Serialize};

///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Cardinality {
    Single,
    Multiple,
}

///
/// EdgeStorage
///
/// Where the edge is physically recorded, seen from the declaring table.
/// `Field`: a field on this side (single) or on the target (multiple).
/// `Ref`: a back-reference on the target (single) or a join table (multiple).
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EdgeStorage {
    Field,
    Ref,
}

///
/// DeletionBehavior
///
/// Declared soft-deletion behavior of the edge. The scheduled hard phase
/// removes owned dependents regardless of this flag.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum DeletionBehavior {
    #[default]
    None,
    Soft,
}

///
/// EdgeDescriptor
///
/// One declared relationship edge.
///
/// Key naming:
/// - target back-reference edges: `inverse_key` is the field on the target
///   table pointing back here, and the name of its index.
/// - join-table edges: `forward_key` is the join-row field pointing here,
///   `inverse_key` the field pointing at the other endpoint.
/// - local field edges: `forward_key` is the field on this table.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EdgeDescriptor {
    pub name: String,
    pub target_table: TableName,
    pub cardinality: Cardinality,
    pub storage: EdgeStorage,
    pub join_table: Option<TableName>,
    pub forward_key: String,
    pub inverse_key: String,
    pub symmetric: bool,
    pub deletion_behavior: DeletionBehavior,
}

impl EdgeDescriptor {
    /// Single edge stored as a field on the declaring table.
    #[must_use]
    pub fn local_field(name: &str, target_table: TableName, field: &str) -> Self {
        Self {
            name: name.to_string(),
            target_table,
            cardinality: Cardinality::Single,
            storage: EdgeStorage::Field,
            join_table: None,
            forward_key: field.to_string(),
            inverse_key: String::new(),
            symmetric: false,
            deletion_behavior: DeletionBehavior::None,
        }
    }

    /// Single edge whose target stores a back-reference field (1:1 owner side).
    #[must_use]
    pub fn single_ref(name: &str, target_table: TableName, back_ref: &str) -> Self {
        Self {
            name: name.to_string(),
            target_table,
            cardinality: Cardinality::Single,
            storage: EdgeStorage::Ref,
            join_table: None,
            forward_key: String::new(),
            inverse_key: back_ref.to_string(),
            symmetric: false,
            deletion_behavior: DeletionBehavior::None,
        }
    }

    /// Multiple edge whose targets each store a back-reference field (1:many).
    #[must_use]
    pub fn many_field(name: &str, target_table: TableName, back_ref: &str) -> Self {
        Self {
            name: name.to_string(),
            target_table,
            cardinality: Cardinality::Multiple,
            storage: EdgeStorage::Field,
            join_table: None,
            forward_key: String::new(),
            inverse_key: back_ref.to_string(),
            symmetric: false,
            deletion_behavior: DeletionBehavior::None,
        }
    }

    /// Many-to-many edge stored in a join table.
    #[must_use]
    pub fn join(
        name: &str,
        target_table: TableName,
        join_table: TableName,
        forward_key: &str,
        inverse_key: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            target_table,
            cardinality: Cardinality::Multiple,
            storage: EdgeStorage::Ref,
            join_table: Some(join_table),
            forward_key: forward_key.to_string(),
            inverse_key: inverse_key.to_string(),
            symmetric: false,
            deletion_behavior: DeletionBehavior::None,
        }
    }

    #[must_use]
    pub const fn symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    #[must_use]
    pub const fn with_deletion_behavior(mut self, behavior: DeletionBehavior) -> Self {
        self.deletion_behavior = behavior;
        self
    }

    /// Classify this descriptor into its storage shape.
    ///
    /// Returns `None` only for a multiple `Ref` edge without a join table,
    /// which schema validation rejects.
    #[must_use]
    pub fn shape(&self) -> Option<EdgeShape<'_>> {
        match (self.cardinality, self.storage) {
            (Cardinality::Single, EdgeStorage::Field) => Some(EdgeShape::LocalField {
                field: &self.forward_key,
            }),
            (Cardinality::Single, EdgeStorage::Ref) | (Cardinality::Multiple, EdgeStorage::Field) => {
                Some(EdgeShape::TargetBackRef {
                    table: &self.target_table,
                    index: &self.inverse_key,
                })
            }
            (Cardinality::Multiple, EdgeStorage::Ref) => {
                self.join_table.as_ref().map(|join_table| EdgeShape::JoinTable {
                    table: join_table,
                    forward_key: &self.forward_key,
                    inverse_key: &self.inverse_key,
                    symmetric: self.symmetric,
                })
            }
        }
    }

    /// True when deleting the declaring entity must reach across this edge.
    #[must_use]
    pub const fn is_cascading(&self) -> bool {
        matches!(
            (self.cardinality, self.storage),
            (Cardinality::Single, EdgeStorage::Ref) | (Cardinality::Multiple, _)
        )
    }
}

///
/// EdgeShape
///
/// Closed classification of an edge by where its rows live.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EdgeShape<'a> {
    /// The declaring row holds the foreign key. Not traversed by cascades.
    LocalField { field: &'a str },

    /// Target rows hold a back-reference, scanned through `index`.
    TargetBackRef { table: &'a TableName, index: &'a str },

    /// Join rows in `table` link both endpoints.
    JoinTable {
        table: &'a TableName,
        forward_key: &'a str,
        inverse_key: &'a str,
        symmetric: bool,
    },
}
