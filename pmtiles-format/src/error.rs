//! Error types for PMTiles format parsing

use thiserror::Error;

use crate::header::Compression;

/// Result type for format operations
pub type Result<T> = std::result::Result<T, Error>;

/// PMTiles format error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive does not start with the `PMTiles` magic
    #[error("Invalid archive magic: expected 'PMTiles', got {0:?}")]
    BadMagic([u8; 7]),

    /// Archive uses a spec version this reader does not understand
    #[error("Unsupported PMTiles spec version: {0}")]
    UnsupportedVersion(u8),

    /// Buffer ended before a complete value could be decoded
    #[error("Truncated data while decoding {context}")]
    Truncated {
        /// What was being decoded when the buffer ran out
        context: &'static str,
    },

    /// Varint does not fit in 64 bits
    #[error("Varint exceeds 64-bit range")]
    VarintOverflow,

    /// A directory column decoded fewer entries than the declared count
    #[error("Directory column '{column}' ended after {decoded} of {declared} entries")]
    CountMismatch {
        /// Column being decoded
        column: &'static str,
        /// Entries decoded before the buffer ran out
        decoded: usize,
        /// Entry count declared at the head of the directory
        declared: usize,
    },

    /// A directory column holds a value its field cannot represent
    #[error("Directory column '{column}' overflows at entry {index}")]
    ColumnOverflow {
        /// Column being decoded
        column: &'static str,
        /// Entry whose value is out of range
        index: usize,
    },

    /// Reconstructed tile ids are not strictly increasing
    #[error("Directory tile ids are not strictly increasing at entry {0}")]
    NonIncreasingTileId(usize),

    /// First entry used the "previous offset + length" marker
    #[error("First directory entry has no previous offset to extend")]
    DanglingOffsetMarker,

    /// Compression identifier byte is not part of the spec
    #[error("Unknown compression identifier: {0}")]
    UnknownCompression(u8),

    /// Tile type identifier byte is not part of the spec
    #[error("Unknown tile type identifier: {0}")]
    UnknownTileType(u8),

    /// Codec is valid but this build cannot decode it
    #[error("Unsupported compression codec: {0:?}")]
    UnsupportedCompression(Compression),

    /// Codec failure or corrupt compressed input
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Zoom level outside the representable tile id space
    #[error("Zoom level {0} exceeds the maximum of 31")]
    ZoomOutOfRange(u8),

    /// Column or row outside the zoom level's grid
    #[error("Tile coordinate ({x}, {y}) out of range for zoom {z}")]
    CoordinateOutOfRange {
        /// Zoom level
        z: u8,
        /// Column
        x: u32,
        /// Row
        y: u32,
    },

    /// Tile id past the end of the zoom-31 address space
    #[error("Tile id {0} exceeds the representable address space")]
    TileIdOutOfRange(u64),
}
