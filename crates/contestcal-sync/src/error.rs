//! Sync error types.

use contestcal_providers::ProviderError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A contest source or calendar call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A contest cannot be turned into an event.
    #[error("contest {id} is invalid: {reason}")]
    InvalidContest { id: i64, reason: String },

    /// The look-ahead is zero or too long to represent.
    #[error("window of {days} days is out of range (1..={max})", max = crate::runner::MAX_WINDOW_DAYS)]
    InvalidWindow { days: u32 },
}

impl SyncError {
    /// Creates an invalid contest error.
    pub fn invalid_contest(id: i64, reason: impl Into<String>) -> Self {
        Self::InvalidContest {
            id,
            reason: reason.into(),
        }
    }
}
