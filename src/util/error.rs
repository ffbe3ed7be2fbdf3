//! Error types for the export pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for export operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The scene has never been saved, so there is no export directory
    #[error("Scene must be saved before exporting (no export directory)")]
    SceneNotSaved,

    /// Compressed output was requested but no pak archive is available
    #[error("No pak system available for compressed output")]
    NoPakSystem,

    /// The floating-point self-check failed; matrix inversion is unreliable
    #[error("Floating-point precision self-check failed, refusing to export")]
    PrecisionCheck,

    /// Output directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Scene data failed to read or validate
    #[error("Invalid scene data: {0}")]
    InvalidScene(String),

    /// Document write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// The external resource compiler reported a failure
    #[error("Resource compiler failed during {stage}: {description}")]
    CompilerFailed { stage: String, description: String },

    /// Archive has already been finalized
    #[error("Pak archive is finished and cannot accept entries")]
    ArchiveFinished,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid scene error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidScene(msg.into())
    }

    /// Create a compiler failure error.
    pub fn compiler(stage: impl Into<String>, description: impl Into<String>) -> Self {
        Self::CompilerFailed {
            stage: stage.into(),
            description: description.into(),
        }
    }
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;
