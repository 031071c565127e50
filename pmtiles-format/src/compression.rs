//! Decompression dispatch for directories, metadata and tile payloads
//!
//! PMTiles declares one codec for internal structures (directories and
//! metadata) and one for tile payloads. This module decodes gzip and
//! zstandard; brotli is part of the format but not linked into this build
//! and fails with [`Error::UnsupportedCompression`].

use flate2::read::GzDecoder;
use std::io::Read;
use tracing::trace;

use crate::header::Compression;
use crate::{Error, Result};

/// Decompress a buffer according to the declared codec
///
/// `Compression::None` returns the input unchanged. Codec failures and
/// corrupt input surface as [`Error::Decompression`].
pub fn decompress(codec: Compression, data: &[u8]) -> Result<Vec<u8>> {
    match codec {
        Compression::None => Ok(data.to_vec()),
        Compression::Gzip => decompress_gzip(data),
        Compression::Zstd => decompress_zstd(data),
        Compression::Brotli | Compression::Unknown => Err(Error::UnsupportedCompression(codec)),
    }
}

fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    trace!("Gzip decompression of {} bytes", data.len());

    let mut decoder = GzDecoder::new(data);
    let mut result = Vec::new();
    decoder
        .read_to_end(&mut result)
        .map_err(|e| Error::Decompression(format!("gzip: {e}")))?;

    Ok(result)
}

fn decompress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    trace!("Zstd decompression of {} bytes", data.len());

    zstd::stream::decode_all(data).map_err(|e| Error::Decompression(format!("zstd: {e}")))
}
