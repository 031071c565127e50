//! Binary format layer for PMTiles v3 archives.
//!
//! PMTiles is a single-file archive for tiled data, designed so that clients
//! fetch only the byte ranges they need: a fixed-size header, compressed
//! directory nodes mapping tile ids to byte ranges, and the tile payloads
//! themselves. This crate covers the pure, I/O-free part of reading one:
//!
//! - [`Header`] parsing and validation
//! - [`Directory`] decoding (column-oriented varint/delta encoding)
//! - tile coordinate to tile id conversion ([`tile_id`])
//! - internal and tile-level decompression dispatch ([`decompress`])
//!
//! Everything here is a pure function of its input bytes; fetching those
//! bytes is the transport's job.

#![warn(missing_docs)]

pub mod compression;
pub mod directory;
pub mod error;
pub mod header;
pub mod tile_id;
pub mod varint;

pub use compression::decompress;
pub use directory::{Directory, Entry};
pub use error::{Error, Result};
pub use header::{Compression, Header, TileType};
pub use tile_id::{tile_id_to_zxy, zxy_to_tile_id};
