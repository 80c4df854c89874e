//! Error types for the ingestion pipeline
//!
//! This module provides error handling for every stage of the pipeline, from
//! archive traversal through scene publication. All errors include error codes
//! for categorization and enough context to diagnose a failed run from logs.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: Event and document (JSON) errors
//! - **E3xxx**: Scene document validation errors
//! - **E4xxx**: Workspace errors
//! - **E5xxx**: Conversion errors
//! - **E6xxx**: Publish errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading a stream or file
//! - `E1002`: ZIP archive structure error
//! - `E1003`: Missing geometry file
//! - `E1004`: Unsupported archive feature
//! - `E1005`: Unsafe archive entry path
//! - `E2001`: Invalid storage event notification
//! - `E2002`: JSON serialization or parsing error
//! - `E3001`: Invalid scene document
//! - `E4001`: Workspace reset/prepare/write failure
//! - `E5001`: Model conversion failure
//! - `E6001`: Object store failure
//! - `E6002`: Scene registry failure

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting an archive and composing a scene
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing data
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - Truncated archive stream
    /// - Disk read or write error
    /// - Insufficient permissions
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive structure error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted or truncated archive
    /// - A record signature that is neither a local header nor the
    ///   central directory
    /// - A member whose compressed data disagrees with its declared size
    ///
    /// **Suggestions**:
    /// - Verify the uploaded object is a valid ZIP archive
    /// - Re-export or re-upload the photogrammetry output
    #[error("[E1002] Archive error: {0}")]
    Archive(String),

    /// The expected geometry file was not found
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - The archive contained no textured-mesh member for the active
    ///   profile
    /// - The triggering object name selected the wrong profile
    #[error("[E1003] Missing geometry file: {0}")]
    MissingGeometry(String),

    /// The archive uses a feature this reader does not support
    ///
    /// **Error Code**: E1004
    ///
    /// **Common Causes**:
    /// - A compression method other than stored or DEFLATE
    /// - Encrypted members
    /// - ZIP64 members, or stored members with a trailing data descriptor
    #[error("[E1004] Unsupported archive feature: {0}")]
    Unsupported(String),

    /// An archive entry path would escape the workspace
    ///
    /// **Error Code**: E1005
    ///
    /// **Common Causes**:
    /// - Absolute entry paths
    /// - `..` path components (zip-slip)
    #[error("[E1005] Unsafe archive entry path: {0}")]
    UnsafeEntryPath(String),

    /// The storage event notification is malformed
    ///
    /// **Error Code**: E2001
    #[error("[E2001] Invalid storage event: {0}")]
    InvalidEvent(String),

    /// JSON serialization or parsing error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scene document failed validation
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - A node child index out of bounds of the node array
    /// - A root node index out of bounds of the node array
    #[error("[E3001] Invalid scene document: {0}")]
    InvalidScene(String),

    /// Workspace operation failed
    ///
    /// **Error Code**: E4001
    ///
    /// **Common Causes**:
    /// - Scratch root not writable (permission denied)
    /// - Disk full while materializing an entry
    ///
    /// Workspace failures before extraction are fatal for the run.
    #[error("[E4001] Workspace error at {path}: {source}")]
    Workspace {
        /// The workspace path the operation failed on
        path: PathBuf,
        /// The underlying filesystem error
        source: io::Error,
    },

    /// The external model converter rejected or failed on the input
    ///
    /// **Error Code**: E5001
    ///
    /// Conversion failures are fatal for the run; no retry is attempted.
    #[error("[E5001] Conversion failed: {0}")]
    Conversion(String),

    /// Object store read or write failed
    ///
    /// **Error Code**: E6001
    #[error("[E6001] Object store error: {0}")]
    Store(String),

    /// Scene registry call failed
    ///
    /// **Error Code**: E6002
    #[error("[E6002] Scene registry error: {0}")]
    Registry(String),
}

impl Error {
    /// Create an Archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Error::Archive(message.into())
    }

    /// Create a MissingGeometry error for a path that should have existed
    pub fn missing_geometry(path: &Path) -> Self {
        Error::MissingGeometry(path.display().to_string())
    }

    /// Create an Unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported(message.into())
    }

    /// Create an UnsafeEntryPath error
    pub fn unsafe_entry_path(path: impl Into<String>) -> Self {
        Error::UnsafeEntryPath(path.into())
    }

    /// Create an InvalidEvent error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Error::InvalidEvent(message.into())
    }

    /// Create an InvalidScene error
    pub fn invalid_scene(message: impl Into<String>) -> Self {
        Error::InvalidScene(message.into())
    }

    /// Create a Workspace error with the path the operation failed on
    pub fn workspace(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Workspace {
            path: path.into(),
            source,
        }
    }

    /// Create a Conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Error::Conversion(message.into())
    }

    /// Create a Store error
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(message.into())
    }

    /// Create a Registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Error::Registry(message.into())
    }
}
