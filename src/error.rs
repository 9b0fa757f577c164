//! Error types for prepkit.
//!
//! Each component reports its own error type so callers can tell a failed
//! download from a broken archive or a bad image. [`Error`] wraps all of them
//! for callers that just want to propagate with `?`.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::Shape;

/// Result type alias for prepkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors raised while fetching a remote file
#[derive(Debug, Error)]
pub enum TransferError {
    /// The source locator is not an http(s) URL
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP request failed with status: {0}")]
    Status(reqwest::StatusCode),

    /// Writing the destination file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading or extracting a zip archive
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive structures could not be parsed
    #[error("{0}")]
    Malformed(String),

    #[error("unsupported compression method {method} for {name}")]
    UnsupportedCompression { name: String, method: u16 },

    #[error("CRC-32 mismatch for {name}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("size mismatch for {name}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },
}

impl ExtractionError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ExtractionError::Malformed(msg.into())
    }
}

/// Errors raised by the image helpers
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} file is not valid image")]
    Undecodable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path} invalid extension format")]
    UnsupportedExtension { path: PathBuf },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("something went wrong writing {path}: the result is not a valid image file")]
    CorruptOutput { path: PathBuf },

    #[error("image shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: Shape, actual: Shape },
}
