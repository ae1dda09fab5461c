use derive_more::Display;
use serde::{Deserialize, Serialize, Serializer, de::Deserializer};
use std::borrow::Borrow;
use thiserror::Error as ThisError;

///
/// TableNameError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum TableNameError {
    #[error("table name is empty")]
    Empty,

    #[error("table name length {len} exceeds max {max}")]
    TooLong { len: usize, max: usize },

    #[error("table name '{0}' contains characters outside [A-Za-z0-9_]")]
    InvalidCharacters(String),
}

///
/// TableName
///
/// Validated table identifier. Names are ASCII and bounded so they can be
/// embedded in continuations and index keys without escaping.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TableName(String);

impl TableName {
    pub const MAX_LEN: usize = 64;

    pub fn new(name: impl Into<String>) -> Result<Self, TableNameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(TableNameError::Empty);
        }
        if name.len() > Self::MAX_LEN {
            return Err(TableNameError::TooLong {
                len: name.len(),
                max: Self::MAX_LEN,
            });
        }
        if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(TableNameError::InvalidCharacters(name));
        }

        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for TableName {
    type Error = TableNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for TableName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TableName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        Self::new(s).map_err(serde::de::Error::custom)
    }
}
