use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize, Serializer, de::Deserializer};
use thiserror::Error as ThisError;
use ulid::Ulid;

///
/// IdError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum IdError {
    #[error("invalid id string: '{0}'")]
    InvalidString(String),
}

///
/// Id
///
/// ULID-backed document id. Ordering follows the underlying ULID, which is
/// also the scan order inside one index key.
/// Serialized as the canonical 26-character string so continuations stay
/// readable and self-contained.
///

#[derive(Clone, Copy, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Id(Ulid);

impl Id {
    #[must_use]
    pub const fn from_u128(n: u128) -> Self {
        Self(Ulid::from_bytes(n.to_be_bytes()))
    }

    #[must_use]
    pub const fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        Self(Ulid::from_parts(timestamp_ms, random))
    }

    pub fn parse(encoded: &str) -> Result<Self, IdError> {
        Ulid::from_string(encoded)
            .map(Self)
            .map_err(|_| IdError::InvalidString(encoded.to_string()))
    }
}

impl From<Ulid> for Id {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
