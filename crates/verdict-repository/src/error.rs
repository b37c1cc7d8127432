//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while loading decision documents
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No document exists for the key
    #[error("Decision not found: {0}")]
    NotFound(String),

    /// The loader failed for a reason other than a missing document
    #[error("Failed to load decision '{key}': {source}")]
    Internal {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Key cannot be mapped to a document location
    #[error("Invalid decision key: {0}")]
    InvalidKey(String),

    /// Loader root directory does not exist
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },
}

impl RepositoryError {
    /// Wrap any error as an internal failure for `key`
    pub fn internal(key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        RepositoryError::Internal {
            key: key.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}
