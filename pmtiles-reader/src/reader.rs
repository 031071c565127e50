//! Archive facade: open, metadata, per-tile lookup

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use pmtiles_format::{
    Compression, Directory, Header, TileType, decompress, zxy_to_tile_id,
};
use pmtiles_store::RangeRead;

use crate::cache::{DirKey, DirectoryCache};
use crate::{Error, Result};

/// Directory hops allowed within one lookup
///
/// Well-formed archives use at most three directory levels; anything past
/// this cap is a cyclic or pathological directory structure.
const MAX_DIRECTORY_DEPTH: usize = 4;

/// Absolute byte range of one tile payload within the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// Absolute byte offset of the payload
    pub offset: u64,
    /// Payload length in bytes
    pub length: u64,
}

/// Configuration for opening an archive
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    /// Bound on cached decoded directories; `None` caches every node for
    /// the life of the reader
    pub max_cached_directories: Option<usize>,
}

/// An open PMTiles archive
///
/// Owns the header, the directory cache and a handle to the range-fetch
/// store for as long as the archive is open. Cheap to share behind an
/// `Arc`; all methods take `&self` and concurrent lookups are safe.
pub struct Reader<S> {
    store: Arc<S>,
    header: Header,
    cache: DirectoryCache,
    metadata: OnceCell<Arc<serde_json::Value>>,
}

impl<S: RangeRead> Reader<S> {
    /// Open an archive: fetch and parse the fixed-size header
    ///
    /// After this resolves, every header accessor answers without further
    /// I/O. Directories and metadata are fetched lazily on first use.
    pub async fn open(store: S) -> Result<Self> {
        Self::with_options(store, ReaderOptions::default()).await
    }

    /// Open an archive with explicit options
    pub async fn with_options(store: S, options: ReaderOptions) -> Result<Self> {
        let bytes = store.read_range(0, Header::LENGTH).await?;
        let header = Header::parse(&bytes)?;

        if !header.is_compliant() {
            warn!("archive header violates ordering invariants (still readable)");
        }
        debug!(
            "opened archive: zoom {}..{}, {:?} tiles, {} addressed",
            header.min_zoom, header.max_zoom, header.tile_type, header.addressed_tiles_count
        );

        Ok(Self {
            store: Arc::new(store),
            header,
            cache: DirectoryCache::new(options.max_cached_directories),
            metadata: OnceCell::new(),
        })
    }

    /// The parsed archive header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Bounding box in degrees as `(min_lon, min_lat, max_lon, max_lat)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.header.bounds()
    }

    /// Center point in degrees as `(lon, lat, zoom)`
    pub fn center(&self) -> (f64, f64, u8) {
        self.header.center()
    }

    /// Minimum zoom level with tiles
    pub fn min_zoom(&self) -> u8 {
        self.header.min_zoom
    }

    /// Maximum zoom level with tiles
    pub fn max_zoom(&self) -> u8 {
        self.header.max_zoom
    }

    /// Payload type of the tiles
    pub fn tile_type(&self) -> TileType {
        self.header.tile_type
    }

    /// Compression applied to each tile payload
    pub fn tile_compression(&self) -> Compression {
        self.header.tile_compression
    }

    /// Compression applied to directories and metadata
    pub fn internal_compression(&self) -> Compression {
        self.header.internal_compression
    }

    /// Whether the archive contains vector tiles
    pub fn is_vector(&self) -> bool {
        self.header.tile_type == TileType::Mvt
    }

    /// Whether tile data is ordered by tile id
    pub fn clustered(&self) -> bool {
        self.header.clustered
    }

    /// Number of resolved directories currently cached
    pub fn cached_directories(&self) -> usize {
        self.cache.len()
    }

    /// The archive's JSON metadata, fetched and parsed on first call
    ///
    /// Memoized for the life of the reader; concurrent first calls share
    /// one fetch.
    pub async fn metadata(&self) -> Result<Arc<serde_json::Value>> {
        let value = self
            .metadata
            .get_or_try_init(|| async {
                let bytes = self
                    .store
                    .read_range(self.header.metadata_offset, self.header.metadata_length)
                    .await?;
                let json = decompress(self.header.internal_compression, &bytes)?;
                Ok::<_, Error>(Arc::new(serde_json::from_slice(&json)?))
            })
            .await?;
        Ok(Arc::clone(value))
    }

    /// Fetch the tile at `(z, x, y)`, applying tile-level decompression
    ///
    /// Returns `Ok(None)` when the archive has no tile there. Coordinates
    /// outside the representable domain (zoom above 31, or `x`/`y` beyond
    /// the zoom's grid) are also a plain `None`: no archive can contain
    /// them. Payloads whose declared compression is `None` or `Unknown`
    /// are returned as stored.
    pub async fn get_tile(&self, z: u8, x: u32, y: u32) -> Result<Option<Bytes>> {
        let Some(raw) = self.get_tile_raw(z, x, y).await? else {
            return Ok(None);
        };
        match self.header.tile_compression {
            Compression::None | Compression::Unknown => Ok(Some(raw)),
            codec => Ok(Some(Bytes::from(decompress(codec, &raw)?))),
        }
    }

    /// Fetch the tile at `(z, x, y)` without tile-level decompression
    ///
    /// Same lookup as [`Reader::get_tile`], but the payload is returned
    /// exactly as stored, useful when passing compressed tiles straight
    /// through to a client that decompresses them itself.
    pub async fn get_tile_raw(&self, z: u8, x: u32, y: u32) -> Result<Option<Bytes>> {
        let tile_id = match zxy_to_tile_id(z, x, y) {
            Ok(id) => id,
            Err(
                pmtiles_format::Error::ZoomOutOfRange(_)
                | pmtiles_format::Error::CoordinateOutOfRange { .. },
            ) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let Some(range) = self.locate(tile_id).await? else {
            return Ok(None);
        };

        let bytes = self.store.read_range(range.offset, range.length).await?;
        Ok(Some(bytes))
    }

    /// Resolve a tile id to the absolute byte range of its payload
    ///
    /// Walks the directory tree from the root, recursing into leaf
    /// directories through the cache. Hops within one call are strictly
    /// sequential; independent calls interleave freely and share the
    /// cache. Consecutive tile ids may resolve to the same range when the
    /// archive aliases duplicate tiles.
    pub async fn locate(&self, tile_id: u64) -> Result<Option<TileRange>> {
        let mut key = DirKey {
            offset: self.header.root_offset,
            length: self.header.root_length,
        };

        for _ in 0..MAX_DIRECTORY_DEPTH {
            let directory = self.load_directory(key).await?;

            match directory.find(tile_id) {
                None => return Ok(None),
                Some(entry) if entry.is_leaf() => {
                    key = DirKey {
                        offset: self
                            .header
                            .leaf_directories_offset
                            .checked_add(entry.offset)
                            .ok_or(Error::OffsetOverflow)?,
                        length: u64::from(entry.length),
                    };
                }
                Some(entry) => {
                    let offset = self
                        .header
                        .tile_data_offset
                        .checked_add(entry.offset)
                        .ok_or(Error::OffsetOverflow)?;
                    return Ok(Some(TileRange {
                        offset,
                        length: u64::from(entry.length),
                    }));
                }
            }
        }

        Err(Error::DirectoryDepthExceeded(MAX_DIRECTORY_DEPTH))
    }

    /// Fetch, decompress and decode one directory node through the cache
    async fn load_directory(&self, key: DirKey) -> Result<Arc<Directory>> {
        let store = Arc::clone(&self.store);
        let codec = self.header.internal_compression;

        self.cache
            .get_or_load(key, async move {
                let bytes = store.read_range(key.offset, key.length).await?;
                let data = decompress(codec, &bytes)?;
                Ok(Directory::deserialize(&data)?)
            })
            .await
    }
}
