//! Error types for strata-live

use crate::notifier::NotifyError;
use strata_session::SessionError;
use strata_store::StorageError;
use thiserror::Error;

/// Errors that can occur in live query operations
#[derive(Error, Debug)]
pub enum LiveError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unable to access table '{table}': permission denied")]
    PermissionDenied { table: String },

    #[error("Permission evaluation failed: {0}")]
    Evaluation(String),

    #[error("Unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to commit teardown of connection {connection_id}: {source}")]
    CommitFailed {
        connection_id: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to notify connection {connection_id}: {source}")]
    NotifyFailed {
        connection_id: String,
        #[source]
        source: NotifyError,
    },

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Connection {0} is already registered")]
    DuplicateConnection(String),

    #[error("Connection {0} is closed")]
    ConnectionClosed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LiveError {
    fn from(e: serde_json::Error) -> Self {
        LiveError::Serialization(e.to_string())
    }
}

impl From<SessionError> for LiveError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(msg) => LiveError::NotFound(msg),
            SessionError::PermissionDenied { table } => LiveError::PermissionDenied { table },
            SessionError::Evaluation(msg) => LiveError::Evaluation(msg),
            SessionError::Storage(e) => LiveError::Storage(e),
        }
    }
}

/// Result type for live query operations
pub type Result<T> = std::result::Result<T, LiveError>;
