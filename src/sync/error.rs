//! Error types for the sync pipeline

use crate::error::AppError;
use crate::search::SearchError;
use crate::store::StoreError;

/// Result type for sync operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while propagating events into the index
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The search engine rejected or failed the operation
    #[error("Search engine error: {0}")]
    Search(#[from] SearchError),

    /// The canonical store could not be read
    #[error("Canonical store error: {0}")]
    Store(#[from] StoreError),

    /// The queue could not accept or deliver an event
    #[error("Queue error: {0}")]
    Queue(String),
}

impl SyncError {
    /// Whether the queue should retry the event. Exhausted retries move the
    /// event to the dead letter; non-retryable failures go there directly.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Search(e) => e.is_retryable(),
            SyncError::Store(StoreError::Unavailable(_)) => true,
            SyncError::Store(StoreError::InvalidRecord(_)) => false,
            SyncError::Queue(_) => false,
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        AppError::Internal(err.to_string())
    }
}
