//! Error types for range-fetch backends

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store error types
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL could not be parsed
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL string
        url: String,
    },

    /// Server answered with a status the store cannot use
    #[error("Unexpected HTTP status: {0}")]
    UnexpectedStatus(u16),

    /// Server does not honor range requests
    #[error("Server does not support partial content (range requests)")]
    PartialContentNotSupported,

    /// Response did not contain exactly the requested bytes
    #[error("Range size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Requested byte count
        expected: u64,
        /// Byte count actually returned
        actual: u64,
    },

    /// Requested range extends past the 64-bit address space
    #[error("Range {offset}+{length} overflows the addressable space")]
    RangeOverflow {
        /// Requested start offset
        offset: u64,
        /// Requested length
        length: u64,
    },

    /// Requested range lies outside the archive
    #[error("Range {offset}+{length} is out of bounds for archive of {size} bytes")]
    RangeOutOfBounds {
        /// Requested start offset
        offset: u64,
        /// Requested length
        length: u64,
        /// Total archive size
        size: u64,
    },
}
