use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; the facade maps it into the public error type.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an invalid-reference error for an id that does not belong
    /// to the named table. Caller defect; never retried.
    pub fn invalid_reference(table: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::InvalidReference,
            ErrorOrigin::Store,
            format!("invalid id '{id}' for table '{table}'"),
        )
    }

    /// Construct a transient store failure.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unavailable, ErrorOrigin::Store, message.into())
    }

    /// Construct a transient scheduler failure.
    pub fn scheduler_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Unavailable,
            ErrorOrigin::Scheduler,
            message.into(),
        )
    }

    /// Construct a store-origin unsupported error.
    pub(crate) fn store_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Store, message.into())
    }

    /// Construct a store-origin internal error.
    pub(crate) fn store_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, message.into())
    }

    /// Construct an executor-origin invariant violation.
    pub(crate) fn executor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Executor,
            message.into(),
        )
    }

    /// Construct a serialize-origin corruption error.
    pub(crate) fn serialize_corruption(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Corruption,
            ErrorOrigin::Serialize,
            message.into(),
        )
    }

    /// Construct a serialize-origin internal error.
    pub(crate) fn serialize_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Serialize, message.into())
    }

    /// True when the failure is transient and the same continuation may be
    /// redelivered unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class, ErrorClass::Unavailable)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidReference,
    Unavailable,
    Corruption,
    Unsupported,
    InvariantViolation,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidReference => "invalid_reference",
            Self::Unavailable => "unavailable",
            Self::Corruption => "corruption",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Store,
    Scheduler,
    Schema,
    Serialize,
    Executor,
    Config,
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
