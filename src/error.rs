//! Error types for project and sidecar operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A project operation was requested before any folder was opened
    #[error("No project folder is open")]
    MissingProject,

    #[error("Failed to {action} {}: {source}", .path.display())]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The sidecar exists but is not a valid record array
    #[error("Malformed metadata in {}: {source}", .path.display())]
    MalformedMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file is gone but its record could not be removed.
    /// The next reconcile drops the orphaned record.
    #[error("Deleted {name} but failed to remove its record: {source}")]
    PartialDeleteFailure {
        name: String,
        #[source]
        source: Box<StoreError>,
    },

    #[error("Invalid image name: {0:?}")]
    InvalidName(String),

    #[error("Invalid timestamp {0:?} (expected YYYY-MM-DDTHH:mm)")]
    InvalidTimestamp(String),

    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl StoreError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
