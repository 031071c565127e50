//! Range-fetch backends for PMTiles archives
//!
//! A PMTiles reader never downloads a whole archive; it asks a store for
//! exact byte ranges (header, directory nodes, tile payloads). This crate
//! defines that capability as the [`RangeRead`] trait — one async
//! operation returning exactly the requested bytes — and ships three
//! backends:
//!
//! - [`HttpStore`]: remote archives over HTTP `Range` requests (reqwest)
//! - [`FileStore`]: local archives via `tokio::fs`
//! - [`MemoryStore`]: in-memory archives, mainly for tests and fixtures
//!
//! Retry and backoff are deliberately not implemented here; callers that
//! want them configure their own [`reqwest::Client`].

#![warn(missing_docs)]

mod error;
mod file;
mod http;
mod memory;

pub use error::{Error, Result};
pub use file::FileStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

use bytes::Bytes;
use std::future::Future;

/// Capability to fetch an exact byte range from an archive
///
/// Implementations must resolve with exactly `length` bytes or fail; the
/// consumer treats a short read as an error and never retries on its own.
/// The returned future is `Send` so lookups can be multiplexed across
/// tasks.
pub trait RangeRead: Send + Sync + 'static {
    /// Fetch `length` bytes starting at byte `offset`
    fn read_range(&self, offset: u64, length: u64)
    -> impl Future<Output = Result<Bytes>> + Send;
}
