use thiserror::Error;

use crate::document::validate::ValidationError;
use crate::uploads::UploadError;

/// Failures raised by the section list operations of a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("section {0} does not exist in this document")]
    UnknownSection(String),
    #[error("a document must keep at least one section")]
    LastSection,
}

/// Failures reported by store, storage and draft collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How an error is presented to the person using the editor or reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Blocks the save locally; nothing was sent.
    Validation,
    /// Full-screen error with a way back to a listing. Permission failures land here too.
    NotFound,
    /// Transient alert; the user may retry.
    Transport,
}

#[derive(Debug, Error)]
pub enum DocError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Section(#[from] SectionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("not permitted to modify this document")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DocError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DocError::Validation(_) | DocError::Section(_) | DocError::Upload(_) => {
                ErrorCategory::Validation
            }
            DocError::NotFound(_) | DocError::Forbidden => ErrorCategory::NotFound,
            DocError::Store(StoreError::NotFound(_)) | DocError::Store(StoreError::Permission(_)) => {
                ErrorCategory::NotFound
            }
            DocError::Store(_) => ErrorCategory::Transport,
        }
    }
}
