//! Shared fixture helpers: build complete PMTiles archives in memory

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression as GzLevel;
use flate2::write::GzEncoder;
use std::io::Write;

use pmtiles_format::header::{MAGIC, SUPPORTED_VERSION};
use pmtiles_format::{Compression, Header, TileType};

/// Bounds of the reference fixture archive, in degrees
pub const FIXTURE_BOUNDS: (f64, f64, f64, f64) =
    (-176.684714, -14.37374, 145.830418, 71.341223);

/// The same bounds as the e7 fixed-point values stored in the header
const FIXTURE_BOUNDS_E7: (i32, i32, i32, i32) =
    (-1766847140, -143737400, 1458304180, 713412230);

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Regions of an archive under construction; offsets are assigned by
/// [`assemble`] in file order: header, root, metadata, leaves, tiles
pub struct ArchiveSpec {
    /// Compressed root directory
    pub root: Vec<u8>,
    /// Compressed JSON metadata
    pub metadata: Vec<u8>,
    /// Leaf-directories region (already compressed node by node)
    pub leaves: Vec<u8>,
    /// Tile-data region
    pub tiles: Vec<u8>,
    pub internal_compression: Compression,
    pub tile_compression: Compression,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

/// Byte ranges of the assembled archive's regions, for request-log checks
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub root: (u64, u64),
    pub metadata: (u64, u64),
    pub leaves_offset: u64,
    pub tiles_offset: u64,
}

pub fn assemble(spec: &ArchiveSpec) -> (Vec<u8>, Layout) {
    let root_offset = Header::LENGTH;
    let metadata_offset = root_offset + spec.root.len() as u64;
    let leaves_offset = metadata_offset + spec.metadata.len() as u64;
    let tiles_offset = leaves_offset + spec.leaves.len() as u64;

    let mut buf = Vec::new();
    buf.extend_from_slice(&MAGIC);
    buf.push(SUPPORTED_VERSION);
    for value in [
        root_offset,
        spec.root.len() as u64,
        metadata_offset,
        spec.metadata.len() as u64,
        leaves_offset,
        spec.leaves.len() as u64,
        tiles_offset,
        spec.tiles.len() as u64,
        0, // addressed tiles
        0, // tile entries
        0, // tile contents
    ] {
        buf.write_u64::<LittleEndian>(value).unwrap();
    }
    buf.push(1); // clustered
    buf.push(spec.internal_compression as u8);
    buf.push(spec.tile_compression as u8);
    buf.push(TileType::Mvt as u8);
    buf.push(spec.min_zoom);
    buf.push(spec.max_zoom);
    buf.write_i32::<LittleEndian>(FIXTURE_BOUNDS_E7.0).unwrap();
    buf.write_i32::<LittleEndian>(FIXTURE_BOUNDS_E7.1).unwrap();
    buf.write_i32::<LittleEndian>(FIXTURE_BOUNDS_E7.2).unwrap();
    buf.write_i32::<LittleEndian>(FIXTURE_BOUNDS_E7.3).unwrap();
    buf.push(0); // center zoom
    buf.write_i32::<LittleEndian>(0).unwrap();
    buf.write_i32::<LittleEndian>(0).unwrap();
    assert_eq!(buf.len() as u64, Header::LENGTH);

    let layout = Layout {
        root: (root_offset, spec.root.len() as u64),
        metadata: (metadata_offset, spec.metadata.len() as u64),
        leaves_offset,
        tiles_offset,
    };

    buf.extend_from_slice(&spec.root);
    buf.extend_from_slice(&spec.metadata);
    buf.extend_from_slice(&spec.leaves);
    buf.extend_from_slice(&spec.tiles);
    (buf, layout)
}
