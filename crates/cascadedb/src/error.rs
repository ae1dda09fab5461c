use cascadedb_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// True when redelivering the same continuation may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::Transient)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and queue handlers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The origin id is not valid for its table. Never retried.
    InvalidOrigin,

    /// Store or scheduler unavailable; redeliver the same message.
    Transient,

    /// A continuation payload could not be decoded.
    Corrupt,

    /// Configuration, schema or store capability problem.
    Unsupported,

    /// The caller cannot remediate this.
    Internal,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::InvalidReference => Self::InvalidOrigin,
            ErrorClass::Unavailable => Self::Transient,
            ErrorClass::Corruption => Self::Corrupt,
            ErrorClass::Unsupported => Self::Unsupported,
            ErrorClass::InvariantViolation | ErrorClass::Internal => Self::Internal,
        }
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Store,
    Scheduler,
    Schema,
    Serialize,
    Executor,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Scheduler => Self::Scheduler,
            CoreErrorOrigin::Schema => Self::Schema,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::Executor => Self::Executor,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Store => "store",
            Self::Scheduler => "scheduler",
            Self::Schema => "schema",
            Self::Serialize => "serialize",
            Self::Executor => "executor",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_classes_map_to_public_kinds() {
        let cases = [
            (InternalError::invalid_reference("teams", "x"), ErrorKind::InvalidOrigin),
            (InternalError::store_unavailable("down"), ErrorKind::Transient),
            (InternalError::scheduler_unavailable("full"), ErrorKind::Transient),
            (
                InternalError::new(ErrorClass::Corruption, CoreErrorOrigin::Serialize, "bad"),
                ErrorKind::Corrupt,
            ),
            (
                InternalError::new(
                    ErrorClass::InvariantViolation,
                    CoreErrorOrigin::Executor,
                    "broken",
                ),
                ErrorKind::Internal,
            ),
        ];

        for (internal, kind) in cases {
            let message = internal.message.clone();
            let public = Error::from(internal);
            assert_eq!(public.kind, kind);
            assert_eq!(public.message, message);
        }
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(Error::from(InternalError::store_unavailable("down")).is_transient());
        assert!(!Error::from(InternalError::invalid_reference("teams", "x")).is_transient());
    }
}
