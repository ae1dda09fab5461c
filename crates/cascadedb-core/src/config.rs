use crate::{
    HARD_BYTE_CAP, HARD_DOC_CAP,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse cascade config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("{field} = {value} exceeds the hard cap {cap}")]
    AboveHardCap {
        field: &'static str,
        value: u64,
        cap: u64,
    },

    #[error("deletion_marker_field must not be empty")]
    EmptyMarkerField,
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, err.to_string())
    }
}

///
/// CascadeConfig
///
/// Per-deployment tuning for the deletion engine.
/// Step caps may be lowered below the hard caps but never raised above them.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CascadeConfig {
    /// Documents one step may scan before suspending.
    pub max_documents_per_step: u64,

    /// Approximate bytes one step may read before suspending.
    pub max_bytes_per_step: u64,

    /// Delay handed to the scheduler with every in-progress continuation.
    pub continuation_delay_ms: u64,

    /// Document field holding the soft-deletion marker.
    pub deletion_marker_field: String,
}

impl CascadeConfig {
    pub const DEFAULT_MARKER_FIELD: &'static str = "deletion_time";

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_cap(
            "max_documents_per_step",
            self.max_documents_per_step,
            HARD_DOC_CAP,
        )?;
        check_cap("max_bytes_per_step", self.max_bytes_per_step, HARD_BYTE_CAP)?;

        if self.deletion_marker_field.is_empty() {
            return Err(ConfigError::EmptyMarkerField);
        }

        Ok(())
    }

    #[must_use]
    pub const fn with_step_caps(mut self, max_documents: u64, max_bytes: u64) -> Self {
        self.max_documents_per_step = max_documents;
        self.max_bytes_per_step = max_bytes;
        self
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_documents_per_step: HARD_DOC_CAP,
            max_bytes_per_step: HARD_BYTE_CAP,
            continuation_delay_ms: 0,
            deletion_marker_field: Self::DEFAULT_MARKER_FIELD.to_string(),
        }
    }
}

const fn check_cap(field: &'static str, value: u64, cap: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero { field });
    }
    if value > cap {
        return Err(ConfigError::AboveHardCap { field, value, cap });
    }

    Ok(())
}

///
/// TESTS
///
