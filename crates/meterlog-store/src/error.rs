//! Error types for meterlog storage.

use meterlog_core::{MeterId, ReadingId, ValidationError};

/// Result type for key-value store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store failed or is disabled.
    ///
    /// Surfaced to the user as a non-retryable failure of the current
    /// operation; nothing is queued or retried.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Encoding a collection to JSON failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors that can occur in repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The candidate reading violates the per-meter invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No meter with this id exists.
    #[error("meter not found: {meter_id}")]
    MeterNotFound {
        /// The meter id that was not found.
        meter_id: MeterId,
    },

    /// No reading with this id exists.
    #[error("reading not found: {reading_id}")]
    ReadingNotFound {
        /// The reading id that was not found.
        reading_id: ReadingId,
    },
}
