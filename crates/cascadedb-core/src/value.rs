use crate::types::Id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Value
///
/// Closed scalar surface for document fields, deletion markers and index
/// equality keys. Equality is structural; there is no cross-variant coercion.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Text(String),
    Id(Id),
    Timestamp(u64),
    List(Vec<Self>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Id> for Value {
    fn from(id: Id) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

///
/// Document
///
/// One stored record. The id is assigned by the store; field names are
/// free-form and indexes refer to them by name.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Document {
    pub id: Id,
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    #[must_use]
    pub const fn new(id: Id, fields: BTreeMap<String, Value>) -> Self {
        Self { id, fields }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Read a deletion marker. A missing field and an explicit `Null` both
    /// mean "not marked".
    #[must_use]
    pub fn marker(&self, name: &str) -> Option<&Value> {
        self.field(name).filter(|value| !value.is_null())
    }
}
