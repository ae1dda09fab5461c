use crate::{
    db::stack::Stack,
    error::{ErrorClass, ErrorOrigin, InternalError},
    serialize::{deserialize_bounded, serialize},
    types::{Id, TableName},
    value::Value,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Upper bound on an encoded continuation accepted by `decode`.
pub const MAX_CONTINUATION_BYTES: usize = 1024 * 1024;

///
/// ContinuationWireError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ContinuationWireError {
    #[error("failed to encode continuation: {0}")]
    Encode(String),

    #[error("failed to decode continuation: {0}")]
    Decode(String),

    #[error("unsupported continuation version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("in-progress continuation carries an empty stack")]
    EmptyInProgressStack,
}

impl From<ContinuationWireError> for InternalError {
    fn from(err: ContinuationWireError) -> Self {
        let class = match err {
            ContinuationWireError::Encode(_) => ErrorClass::Internal,
            ContinuationWireError::Decode(_) | ContinuationWireError::UnsupportedVersion { .. } => {
                ErrorClass::Corruption
            }
            ContinuationWireError::EmptyInProgressStack => ErrorClass::InvariantViolation,
        };

        Self::new(class, ErrorOrigin::Serialize, err.to_string())
    }
}

///
/// ContinuationVersion
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ContinuationVersion {
    V1,
}

impl ContinuationVersion {
    const V1_TAG: u8 = 1;
    const CURRENT: Self = Self::V1;

    const fn decode(raw: u8) -> Option<Self> {
        match raw {
            Self::V1_TAG => Some(Self::V1),
            _ => None,
        }
    }

    const fn encode(self) -> u8 {
        match self {
            Self::V1 => Self::V1_TAG,
        }
    }
}

///
/// Origin
///
/// The entity whose deletion started the cascade, with the deletion marker
/// observed when deletion was first requested.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Origin {
    pub table: TableName,
    pub id: Id,
    pub deletion_marker: Option<Value>,
}

///
/// ContinuationMessage
///
/// Self-contained payload carried by the scheduler between steps.
/// `in_progress` is false only for a scheduled deletion that has not run yet;
/// such a message carries no stack.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContinuationMessage {
    pub origin: Origin,
    pub stack: Stack,
    pub in_progress: bool,
}

impl ContinuationMessage {
    /// Scheduled, not yet started deletion of `origin`.
    #[must_use]
    pub fn scheduled(origin: Origin) -> Self {
        Self {
            origin,
            stack: Stack::default(),
            in_progress: false,
        }
    }

    /// Suspended deletion with traversal state `stack`.
    #[must_use]
    pub const fn suspended(origin: Origin, stack: Stack) -> Self {
        Self {
            origin,
            stack,
            in_progress: true,
        }
    }

    pub fn validate(&self) -> Result<(), ContinuationWireError> {
        if self.in_progress && self.stack.is_empty() {
            return Err(ContinuationWireError::EmptyInProgressStack);
        }

        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, ContinuationWireError> {
        self.validate()?;

        let wire = ContinuationWire {
            version: ContinuationVersion::CURRENT.encode(),
            origin: self.origin.clone(),
            stack: self.stack.clone(),
            in_progress: self.in_progress,
        };

        serialize(&wire).map_err(|err| ContinuationWireError::Encode(err.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ContinuationWireError> {
        let wire: ContinuationWire = deserialize_bounded(bytes, MAX_CONTINUATION_BYTES)
            .map_err(|err| ContinuationWireError::Decode(err.to_string()))?;

        match ContinuationVersion::decode(wire.version) {
            Some(ContinuationVersion::V1) => {}
            None => {
                return Err(ContinuationWireError::UnsupportedVersion {
                    version: wire.version,
                });
            }
        }

        let message = Self {
            origin: wire.origin,
            stack: wire.stack,
            in_progress: wire.in_progress,
        };
        message.validate()?;

        Ok(message)
    }
}

///
/// ContinuationWire
///

#[derive(Deserialize, Serialize)]
struct ContinuationWire {
    version: u8,
    origin: Origin,
    stack: Stack,
    in_progress: bool,
}

///
/// TESTS
///
