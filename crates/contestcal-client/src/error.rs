//! Client error types.

use contestcal_core::TracingError;
use contestcal_providers::ProviderError;
use contestcal_sync::SyncError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Sync failed before any contest was processed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication required.
    #[error("authentication required: {0}")]
    AuthRequired(String),

    /// Logging could not be set up.
    #[error("logging error: {0}")]
    Logging(#[from] TracingError),
}

impl ClientError {
    /// Convenience constructor for [`ClientError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
