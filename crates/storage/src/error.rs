//! Error types for the project storage system.
//!
//! Most failures in practice come from an incomplete project setup, so every
//! message names the missing file and how to provide it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during project storage operations.
#[derive(Debug, Error)]
pub enum ProjectStorageError {
    #[error("Project not found: {}. Create the directory and add a manuscript.txt to it", path.display())]
    ProjectNotFound { path: PathBuf },

    #[error("Manuscript not found: {}. Save the manuscript as plain UTF-8 text at this path", path.display())]
    ManuscriptNotFound { path: PathBuf },

    #[error("Manuscript is too large: {size} bytes (max: {max_size} bytes)")]
    ManuscriptTooLarge { size: u64, max_size: u64 },

    #[error("Manuscript is not valid UTF-8: {}. Re-save it with UTF-8 encoding", path.display())]
    InvalidManuscriptEncoding {
        path: PathBuf,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error(
        "Metadata directory not found: {}. Create it and add {} and {} with the book's title and author",
        path.display(),
        crate::types::TITLE_FILE,
        crate::types::AUTHOR_FILE
    )]
    MetadataDirectoryNotFound { path: PathBuf },

    #[error("Missing required metadata '{field}': add a non-empty {}", path.display())]
    MissingMetadata { field: String, path: PathBuf },

    #[error("Asset not found: {}", path.display())]
    AssetNotFound { path: PathBuf },

    #[error("Storage operation failed: {operation}")]
    StorageOperationFailed {
        operation: String,
        #[source]
        source: Option<eyre::Report>,
    },
}

impl ProjectStorageError {
    pub(crate) fn operation(operation: impl Into<String>, error: std::io::Error) -> Self {
        let operation = operation.into();
        Self::StorageOperationFailed {
            source: Some(eyre::eyre!("{}: {}", operation, error)),
            operation,
        }
    }
}

/// Result type alias for project storage operations.
pub type Result<T> = std::result::Result<T, ProjectStorageError>;
