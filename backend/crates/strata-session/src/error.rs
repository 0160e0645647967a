//! Error types for strata-session

use strata_store::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unable to access table '{table}': permission denied")]
    PermissionDenied { table: String },

    #[error("Permission evaluation failed: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
