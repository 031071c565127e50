//! PMTiles v3 fixed-size header
//!
//! The first 127 bytes of an archive describe where everything else lives:
//! byte ranges for the root directory, JSON metadata, leaf directories and
//! tile data, plus tile counts, codec identifiers and spatial metadata.
//! All multi-byte fields are little-endian.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::{Error, Result};

/// Magic bytes at the start of every archive
pub const MAGIC: [u8; 7] = *b"PMTiles";

/// The only spec version this reader supports
pub const SUPPORTED_VERSION: u8 = 3;

/// Compression codec identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Compression {
    /// Compression not declared by the encoder
    Unknown = 0,
    /// No compression
    None = 1,
    /// Gzip
    Gzip = 2,
    /// Brotli
    Brotli = 3,
    /// Zstandard
    Zstd = 4,
}

impl Compression {
    /// Decode a compression identifier byte
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::None),
            2 => Ok(Self::Gzip),
            3 => Ok(Self::Brotli),
            4 => Ok(Self::Zstd),
            other => Err(Error::UnknownCompression(other)),
        }
    }
}

/// Tile payload type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TileType {
    /// Type not declared by the encoder
    Unknown = 0,
    /// Mapbox Vector Tile
    Mvt = 1,
    /// PNG raster
    Png = 2,
    /// JPEG raster
    Jpeg = 3,
    /// WebP raster
    Webp = 4,
    /// AVIF raster
    Avif = 5,
}

impl TileType {
    /// Decode a tile type identifier byte
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Mvt),
            2 => Ok(Self::Png),
            3 => Ok(Self::Jpeg),
            4 => Ok(Self::Webp),
            5 => Ok(Self::Avif),
            other => Err(Error::UnknownTileType(other)),
        }
    }
}

/// Parsed archive header
///
/// Parsed once at open; immutable afterwards. Offsets are absolute byte
/// positions within the archive, lengths are in bytes. Coordinates are
/// stored as the raw e7 fixed-point values the format uses; see
/// [`Header::bounds`] and [`Header::center`] for degrees.
#[derive(Debug, Clone)]
pub struct Header {
    /// Byte offset of the compressed root directory
    pub root_offset: u64,
    /// Byte length of the compressed root directory
    pub root_length: u64,
    /// Byte offset of the compressed JSON metadata
    pub metadata_offset: u64,
    /// Byte length of the compressed JSON metadata
    pub metadata_length: u64,
    /// Byte offset of the leaf-directories region
    pub leaf_directories_offset: u64,
    /// Byte length of the leaf-directories region
    pub leaf_directories_length: u64,
    /// Byte offset of the tile-data region
    pub tile_data_offset: u64,
    /// Byte length of the tile-data region
    pub tile_data_length: u64,
    /// Number of tile ids addressed by the archive
    pub addressed_tiles_count: u64,
    /// Number of directory entries pointing at tile data
    pub tile_entries_count: u64,
    /// Number of distinct tile payloads
    pub tile_contents_count: u64,
    /// Whether tile data is ordered by tile id (clustered)
    pub clustered: bool,
    /// Compression applied to directories and metadata
    pub internal_compression: Compression,
    /// Compression applied to each tile payload
    pub tile_compression: Compression,
    /// Payload type of the tiles
    pub tile_type: TileType,
    /// Minimum zoom level with tiles
    pub min_zoom: u8,
    /// Maximum zoom level with tiles
    pub max_zoom: u8,
    /// West bound, degrees longitude * 1e7
    pub min_lon_e7: i32,
    /// South bound, degrees latitude * 1e7
    pub min_lat_e7: i32,
    /// East bound, degrees longitude * 1e7
    pub max_lon_e7: i32,
    /// North bound, degrees latitude * 1e7
    pub max_lat_e7: i32,
    /// Suggested starting zoom
    pub center_zoom: u8,
    /// Center longitude, degrees * 1e7
    pub center_lon_e7: i32,
    /// Center latitude, degrees * 1e7
    pub center_lat_e7: i32,
}

impl Header {
    /// Encoded length of the header in bytes
    pub const LENGTH: u64 = 127;

    /// Parse the fixed-size header from the start of an archive
    ///
    /// # Errors
    /// * [`Error::Truncated`] if fewer than 127 bytes are supplied
    /// * [`Error::BadMagic`] if the magic marker is wrong
    /// * [`Error::UnsupportedVersion`] for spec versions other than 3
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LENGTH as usize {
            return Err(Error::Truncated { context: "header" });
        }

        let mut magic = [0u8; 7];
        magic.copy_from_slice(&data[0..7]);
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }

        let version = data[7];
        if version != SUPPORTED_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut cur = Cursor::new(&data[8..]);

        let root_offset = cur.read_u64::<LittleEndian>()?;
        let root_length = cur.read_u64::<LittleEndian>()?;
        let metadata_offset = cur.read_u64::<LittleEndian>()?;
        let metadata_length = cur.read_u64::<LittleEndian>()?;
        let leaf_directories_offset = cur.read_u64::<LittleEndian>()?;
        let leaf_directories_length = cur.read_u64::<LittleEndian>()?;
        let tile_data_offset = cur.read_u64::<LittleEndian>()?;
        let tile_data_length = cur.read_u64::<LittleEndian>()?;
        let addressed_tiles_count = cur.read_u64::<LittleEndian>()?;
        let tile_entries_count = cur.read_u64::<LittleEndian>()?;
        let tile_contents_count = cur.read_u64::<LittleEndian>()?;
        let clustered = cur.read_u8()? == 1;
        let internal_compression = Compression::from_u8(cur.read_u8()?)?;
        let tile_compression = Compression::from_u8(cur.read_u8()?)?;
        let tile_type = TileType::from_u8(cur.read_u8()?)?;
        let min_zoom = cur.read_u8()?;
        let max_zoom = cur.read_u8()?;
        let min_lon_e7 = cur.read_i32::<LittleEndian>()?;
        let min_lat_e7 = cur.read_i32::<LittleEndian>()?;
        let max_lon_e7 = cur.read_i32::<LittleEndian>()?;
        let max_lat_e7 = cur.read_i32::<LittleEndian>()?;
        let center_zoom = cur.read_u8()?;
        let center_lon_e7 = cur.read_i32::<LittleEndian>()?;
        let center_lat_e7 = cur.read_i32::<LittleEndian>()?;

        Ok(Self {
            root_offset,
            root_length,
            metadata_offset,
            metadata_length,
            leaf_directories_offset,
            leaf_directories_length,
            tile_data_offset,
            tile_data_length,
            addressed_tiles_count,
            tile_entries_count,
            tile_contents_count,
            clustered,
            internal_compression,
            tile_compression,
            tile_type,
            min_zoom,
            max_zoom,
            min_lon_e7,
            min_lat_e7,
            max_lon_e7,
            max_lat_e7,
            center_zoom,
            center_lon_e7,
            center_lat_e7,
        })
    }

    /// Bounding box in degrees as `(min_lon, min_lat, max_lon, max_lat)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (
            f64::from(self.min_lon_e7) / 1e7,
            f64::from(self.min_lat_e7) / 1e7,
            f64::from(self.max_lon_e7) / 1e7,
            f64::from(self.max_lat_e7) / 1e7,
        )
    }

    /// Center point in degrees as `(lon, lat, zoom)`
    pub fn center(&self) -> (f64, f64, u8) {
        (
            f64::from(self.center_lon_e7) / 1e7,
            f64::from(self.center_lat_e7) / 1e7,
            self.center_zoom,
        )
    }

    /// Whether the header satisfies the spec's ordering invariants
    ///
    /// A compliant header has `min_zoom <= max_zoom` and a bounding box
    /// with min <= max on both axes. Non-compliant archives are still
    /// readable; callers that care should check this at open.
    pub fn is_compliant(&self) -> bool {
        self.min_zoom <= self.max_zoom
            && self.min_lon_e7 <= self.max_lon_e7
            && self.min_lat_e7 <= self.max_lat_e7
    }
}
