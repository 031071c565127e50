//! Async reader for PMTiles v3 archives
//!
//! Opens a single-file tiled archive through any
//! [`RangeRead`](pmtiles_store::RangeRead) backend and answers per-tile
//! lookups by walking the archive's directory tree, fetching only the byte
//! ranges it needs. Decoded directory nodes are cached with single-flight
//! fetch deduplication, so concurrent lookups never download the same node
//! twice.
//!
//! # Example
//!
//! ```no_run
//! use pmtiles_reader::Reader;
//! use pmtiles_store::HttpStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpStore::new("https://example.com/planet.pmtiles")?;
//! let reader = Reader::open(store).await?;
//!
//! println!("zoom {}..{}", reader.min_zoom(), reader.max_zoom());
//! if let Some(tile) = reader.get_tile(0, 0, 0).await? {
//!     println!("got {} bytes", tile.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
mod error;
mod reader;

pub use cache::DirectoryCache;
pub use error::{Error, Result};
pub use reader::{Reader, ReaderOptions, TileRange};
