//! Error types for seglog
//!
//! Each layer has its own error enum; this module defines the unified
//! [`Error`] callers can collect them into. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.
//!
//! # Taxonomy
//!
//! - **I/O**: open/seek/read/write/truncate failures, carrying the operation
//!   and path
//! - **Framing**: truncated header, truncated body, unterminated record
//! - **Checkpoint format**: malformed persisted reader state
//! - **Closed**: the reader stopped on request, not on failure

use crate::checkpoint::CheckpointFormatError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for seglog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type
#[derive(Debug, Error)]
pub enum Error {
    /// I/O failure with the operation and path that produced it
    #[error("{op} {}: {source}", .path.display())]
    Io {
        /// Operation that failed (e.g. "open segment")
        op: &'static str,
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A frame could not be decoded or encoded
    #[error("Framing error: {0}")]
    Framing(String),

    /// Persisted checkpoint is malformed
    #[error("Checkpoint format error: {0}")]
    CheckpointFormat(#[from] CheckpointFormatError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The record handler rejected a record
    #[error("Handler failed: {0}")]
    Handler(String),

    /// Reader stopped because `close` was called
    #[error("Reader closed")]
    Closed,
}

impl Error {
    /// Build an I/O error with context.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// True if the reader stopped on request.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }
}
