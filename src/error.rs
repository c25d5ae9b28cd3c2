//! Error types for the sorting engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while classifying, moving or merging entries.
#[derive(Debug, Error)]
pub enum SortError {
    /// A path could not be made absolute or has no usable file name.
    #[error("Invalid path {}", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory to sort is missing or is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Failed to create a destination directory.
    #[error("Failed to create directory {}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list the contents of a directory.
    #[error("Failed to read directory {}", .path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a file or folder to its destination.
    #[error("Failed to move {} to {}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither a numbered nor a hashed name is free in the destination.
    #[error("No free name for {} after {attempts} attempts", .path.display())]
    NameExhausted { path: PathBuf, attempts: usize },

    /// Failed to write the custom group marker file.
    #[error("Failed to write marker file {}", .path.display())]
    MarkerWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the history file.
    #[error("Failed to write history file")]
    HistoryWriteFailed(#[source] std::io::Error),

    /// Failed to read the history file.
    #[error("Failed to read history file")]
    HistoryReadFailed(#[source] std::io::Error),

    /// History file has invalid format.
    #[error("Invalid history file format: {reason}")]
    InvalidHistoryFormat { reason: String },
}

/// Result type for engine operations.
pub type SortResult<T> = Result<T, SortError>;
