//! Workspace error types.

use draftwork_snapshot::SnapshotError;
use thiserror::Error;

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Errors that can occur during workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Path fails the safety rules. Never partially applied.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Document or snapshot unknown.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Create on a path that already has content.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Underlying persistence I/O failed. Fatal to the operation; the
    /// workspace does not retry.
    #[error("Storage failure: {0}")]
    Storage(#[from] std::io::Error),

    /// The snapshot store failed.
    #[error("Snapshot store failure: {0}")]
    Snapshot(SnapshotError),
}

impl WorkspaceError {
    /// Create an invalid path error.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath(message.into())
    }

    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<SnapshotError> for WorkspaceError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::NotFound(id) => WorkspaceError::NotFound(id),
            other => WorkspaceError::Snapshot(other),
        }
    }
}
