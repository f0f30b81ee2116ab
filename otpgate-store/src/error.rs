//! Error types for the registries.

use thiserror::Error;

/// Result type for registry operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No device or client with this identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// Another accepted validation advanced the counters first.
    #[error("stale update for {0}: counters already at or past the proposed value")]
    StaleUpdate(String),

    /// The device was disabled before the advance could be written.
    #[error("device disabled: {0}")]
    Disabled(String),

    /// An identifier is already registered.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored data that cannot be turned back into a record.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A lock was poisoned by a panicking writer.
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// True for errors that mean the store itself is unhealthy rather than
    /// that the request named something absent or stale.
    pub fn is_backend_fault(&self) -> bool {
        matches!(
            self,
            StoreError::Database(_) | StoreError::InvalidData(_) | StoreError::Storage(_)
        )
    }
}
