//! Error types for archive reading

use std::sync::Arc;
use thiserror::Error;

/// Result type for reader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reader error types
///
/// A missing tile is not an error: lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed archive bytes
    #[error("Format error: {0}")]
    Format(#[from] pmtiles_format::Error),

    /// Transport failure, surfaced unchanged
    #[error("Store error: {0}")]
    Store(#[from] pmtiles_store::Error),

    /// Metadata region is not valid JSON
    #[error("Metadata is not valid JSON: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Directory entry points past the end of the 64-bit address space
    ///
    /// Only a corrupt or hostile archive produces a region offset plus
    /// entry offset that cannot be represented.
    #[error("Directory entry offset overflows the archive address space")]
    OffsetOverflow,

    /// Directory walk exceeded the recursion cap
    ///
    /// Well-formed archives are trees with at most a few levels; hitting
    /// the cap means a cyclic or pathological directory structure.
    #[error("Directory recursion exceeded {0} levels (cyclic archive?)")]
    DirectoryDepthExceeded(usize),

    /// Failure propagated from a directory fetch
    ///
    /// Directory loads run through the single-flight cache, so every
    /// failing load arrives wrapped this way: when several lookups wait on
    /// one in-flight load, each receives the same shared cause.
    #[error("Directory load failed: {0}")]
    Load(#[source] Arc<Error>),
}
