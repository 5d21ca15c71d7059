//! Error types for image intake and document export

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for imagify operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting images or exporting a document
#[derive(Error, Debug)]
pub enum Error {
    /// A file input could not be read
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// An accepted image could not be decoded into pixels during export
    #[error("Failed to decode image #{index}: {reason}")]
    Decode { index: usize, reason: String },

    /// An entry payload is not a base64 data URI
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// Decoding a single image took longer than the configured limit
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Export invoked without images or without an output name
    #[error("Export precondition failed: {0}")]
    Precondition(String),

    /// Export invoked while another export is still running
    #[error("An export is already in progress")]
    Busy,

    /// Output name is not a plain file name (it has a directory part)
    #[error("Invalid output file name {0:?}: must not contain a directory")]
    InvalidFileName(String),

    /// Failed to build or serialize the PDF
    #[error("PDF serialization failed: {0}")]
    Pdf(String),

    /// Invalid page geometry or intake settings
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error stems from a single image failing to decode
    /// (including a decode that exceeded its time limit).
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::Timeout(_))
    }
}
