//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration. Always fatal:
/// the run never starts on a broken configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to load configuration from {path}: {message}")]
    Load { path: String, message: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigurationError {
    /// Create a load error
    pub fn load(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl From<ConfigurationError> for crate::error::SweepError {
    fn from(err: ConfigurationError) -> Self {
        Self::configuration(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
