//! Error types for SyncStore core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Table was not found in the backing store.
    #[error("table not found: {name}")]
    TableNotFound {
        /// Name of the table.
        name: String,
    },

    /// Record was not found by id.
    #[error("record not found: {id}")]
    RecordNotFound {
        /// The normalized id that was looked up.
        id: String,
    },

    /// A record with the same normalized id already exists in the table.
    #[error("duplicate record id: {id}")]
    DuplicateId {
        /// The normalized id that collided.
        id: String,
    },

    /// Record is malformed for the attempted operation.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of what is wrong with the record.
        message: String,
    },

    /// Storage backend failure.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the backend failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a record-not-found error.
    pub fn record_not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }

    /// Creates a duplicate-id error.
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Creates an invalid-record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
