//! Error types for the reconciliation engine.

use syncstore_core::CoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during reconciliation.
///
/// Malformed individual records are not errors at this level; they are
/// skipped during classification. What surfaces here are failures of
/// the facade and store while applying side effects.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A facade or store operation failed.
    #[error("store error: {0}")]
    Core(#[from] CoreError),
}
