use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{EdgeDescriptor, EdgeGraph, EdgeShape},
    types::TableName,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Schema-authoring defects detected when a `Schema` is built.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("table '{0}' declared twice")]
    DuplicateTable(TableName),

    #[error("table '{table}' declares edge '{edge}' twice")]
    DuplicateEdge { table: TableName, edge: String },

    #[error("table '{table}' edge '{edge}' targets undeclared table '{target}'")]
    UnknownTarget {
        table: TableName,
        edge: String,
        target: TableName,
    },

    #[error("table '{table}' edge '{edge}' is many-to-many but has no join table")]
    MissingJoinTable { table: TableName, edge: String },

    #[error("table '{table}' edge '{edge}' is missing its '{key}' key")]
    MissingKey {
        table: TableName,
        edge: String,
        key: &'static str,
    },

    #[error("table '{table}' edge '{edge}' is symmetric but not a self-referential join edge")]
    InvalidSymmetric { table: TableName, edge: String },
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Schema, err.to_string())
    }
}

///
/// Schema
///
/// Validated table -> edges map. Every referenced target table is declared,
/// even when it declares no edges itself.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    tables: BTreeMap<TableName, Vec<EdgeDescriptor>>,
}

impl Schema {
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }
}

impl EdgeGraph for Schema {
    fn edges_for(&self, table: &TableName) -> &[EdgeDescriptor] {
        self.tables.get(table).map_or(&[], Vec::as_slice)
    }
}

///
/// SchemaBuilder
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    tables: Vec<(TableName, Vec<EdgeDescriptor>)>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn table(mut self, name: TableName, edges: Vec<EdgeDescriptor>) -> Self {
        self.tables.push((name, edges));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        // Phase 1: collect declared tables.
        let mut tables = BTreeMap::new();
        for (name, edges) in self.tables {
            if tables.contains_key(&name) {
                return Err(SchemaError::DuplicateTable(name));
            }
            tables.insert(name, edges);
        }

        // Phase 2: validate each edge against the declared table set.
        for (table, edges) in &tables {
            let mut seen = BTreeSet::new();
            for edge in edges {
                if !seen.insert(edge.name.as_str()) {
                    return Err(SchemaError::DuplicateEdge {
                        table: table.clone(),
                        edge: edge.name.clone(),
                    });
                }
                validate_edge(&tables, table, edge)?;
            }
        }

        Ok(Schema { tables })
    }
}

// Validate one edge's shape, keys and target.
fn validate_edge(
    tables: &BTreeMap<TableName, Vec<EdgeDescriptor>>,
    table: &TableName,
    edge: &EdgeDescriptor,
) -> Result<(), SchemaError> {
    let missing_key = |key| SchemaError::MissingKey {
        table: table.clone(),
        edge: edge.name.clone(),
        key,
    };

    if !tables.contains_key(&edge.target_table) {
        return Err(SchemaError::UnknownTarget {
            table: table.clone(),
            edge: edge.name.clone(),
            target: edge.target_table.clone(),
        });
    }

    let Some(shape) = edge.shape() else {
        return Err(SchemaError::MissingJoinTable {
            table: table.clone(),
            edge: edge.name.clone(),
        });
    };

    let symmetric_ok = match shape {
        EdgeShape::LocalField { field } => {
            if field.is_empty() {
                return Err(missing_key("forward_key"));
            }
            false
        }
        EdgeShape::TargetBackRef { index, .. } => {
            if index.is_empty() {
                return Err(missing_key("inverse_key"));
            }
            false
        }
        EdgeShape::JoinTable {
            forward_key,
            inverse_key,
            ..
        } => {
            if forward_key.is_empty() {
                return Err(missing_key("forward_key"));
            }
            if inverse_key.is_empty() {
                return Err(missing_key("inverse_key"));
            }
            edge.target_table == *table
        }
    };

    if edge.symmetric && !symmetric_ok {
        return Err(SchemaError::InvalidSymmetric {
            table: table.clone(),
            edge: edge.name.clone(),
        });
    }

    Ok(())
}
