//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting user data.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data directory could not be created.
    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be serialized.
    #[error("failed to serialize user data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing or replacing the data file failed.
    #[error("failed to write user data to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
