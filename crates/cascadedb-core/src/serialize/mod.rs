use crate::error::InternalError;
use serde::{Serialize, de::DeserializeOwned};
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::Error as ThisError;

///
/// SerializeError
///
/// CBOR codec failures. Size limits are chosen by the caller; the
/// continuation envelope passes its own.
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("payload of {len} bytes is over the {max_bytes} byte limit")]
    TooLarge { len: usize, max_bytes: usize },
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::Serialize(_) => Self::serialize_internal(err.to_string()),
            SerializeError::Deserialize(_) | SerializeError::TooLarge { .. } => {
                Self::serialize_corruption(err.to_string())
            }
        }
    }
}

/// Encode `value` as CBOR.
pub fn serialize<T>(value: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    serde_cbor::to_vec(value).map_err(|err| SerializeError::Serialize(err.to_string()))
}

/// Decode CBOR produced by [`serialize`].
///
/// Payloads over `max_bytes` are refused before decoding. A decoder panic on
/// hostile input surfaces as a `Deserialize` error.
pub fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > max_bytes {
        return Err(SerializeError::TooLarge {
            len: bytes.len(),
            max_bytes,
        });
    }

    catch_unwind(AssertUnwindSafe(|| serde_cbor::from_slice::<T>(bytes)))
        .map_err(|_| SerializeError::Deserialize("decoder panicked".to_string()))?
        .map_err(|err| SerializeError::Deserialize(err.to_string()))
}

///
/// TESTS
///
