//! Directory nodes: ordered runs of tile-id to byte-range entries
//!
//! A directory is serialized column-wise: an entry count, then every
//! `tile_id` as a delta from the previous id, then every `run_length`,
//! every `length`, and finally every offset word. An offset word of `0`
//! means "this entry starts where the previous one ended"; any other word
//! stores `offset + 1`. Delta encoding makes the decoded ids strictly
//! increasing by construction, and the decoder rejects buffers where they
//! are not.

use tracing::trace;

use crate::varint::{read_varint, write_varint};
use crate::{Error, Result};

/// One directory row
///
/// `run_length == 0` marks a pointer to a leaf directory rather than tile
/// data; its offset is then relative to the leaf-directories region. A data
/// entry covers every tile id in `[tile_id, tile_id + run_length)` with the
/// same bytes, so archives can alias identical tiles across consecutive
/// ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// First tile id covered by this entry
    pub tile_id: u64,
    /// Number of consecutive tile ids covered; 0 for a leaf pointer
    pub run_length: u32,
    /// Byte length of the referenced data
    pub length: u32,
    /// Byte offset into the tile-data or leaf-directories region
    pub offset: u64,
}

impl Entry {
    /// Whether this entry points at a leaf directory instead of tile data
    pub fn is_leaf(&self) -> bool {
        self.run_length == 0
    }
}

/// An ordered sequence of directory entries
///
/// Decoded from one decompressed byte buffer; entries are strictly
/// increasing by `tile_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<Entry>,
}

/// Upper bound on the declared entry count honored before reading columns.
/// Prevents a corrupt count varint from forcing a huge allocation.
const MAX_ENTRIES: usize = 1 << 24;

impl Directory {
    /// Decode a directory from a decompressed buffer
    ///
    /// Pure function of the input bytes; the caller is responsible for
    /// applying the archive's internal decompression first (see
    /// [`crate::decompress`]).
    ///
    /// # Errors
    /// * [`Error::Truncated`] / [`Error::CountMismatch`] if a column ends
    ///   before the declared entry count
    /// * [`Error::NonIncreasingTileId`] if the reconstructed ids are not
    ///   strictly increasing
    /// * [`Error::ColumnOverflow`] if a run length or byte length exceeds
    ///   32 bits, or a reconstructed offset exceeds 64
    /// * [`Error::DanglingOffsetMarker`] if the first entry claims to
    ///   extend a previous one
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut pos = 0;
        let (count, consumed) = read_varint(data).map_err(|_| Error::Truncated {
            context: "directory entry count",
        })?;
        pos += consumed;

        let count = usize::try_from(count).map_err(|_| Error::CountMismatch {
            column: "entry count",
            decoded: 0,
            declared: usize::MAX,
        })?;
        if count > MAX_ENTRIES {
            return Err(Error::CountMismatch {
                column: "entry count",
                decoded: 0,
                declared: count,
            });
        }

        let mut entries = vec![
            Entry {
                tile_id: 0,
                run_length: 0,
                length: 0,
                offset: 0,
            };
            count
        ];

        // Column 1: tile id deltas, reconstructed by running sum
        let mut tile_id = 0u64;
        for (i, entry) in entries.iter_mut().enumerate() {
            let delta = column_varint(data, &mut pos, "tile_id", i, count)?;
            if i > 0 && delta == 0 {
                return Err(Error::NonIncreasingTileId(i));
            }
            tile_id = tile_id
                .checked_add(delta)
                .ok_or(Error::NonIncreasingTileId(i))?;
            entry.tile_id = tile_id;
        }

        // Column 2: run lengths
        for i in 0..count {
            let run_length = column_varint(data, &mut pos, "run_length", i, count)?;
            entries[i].run_length =
                u32::try_from(run_length).map_err(|_| Error::ColumnOverflow {
                    column: "run_length",
                    index: i,
                })?;
        }

        // Column 3: byte lengths
        for i in 0..count {
            let length = column_varint(data, &mut pos, "length", i, count)?;
            entries[i].length = u32::try_from(length).map_err(|_| Error::ColumnOverflow {
                column: "length",
                index: i,
            })?;
        }

        // Column 4: offsets, with 0 marking contiguous placement
        for i in 0..count {
            let word = column_varint(data, &mut pos, "offset", i, count)?;
            entries[i].offset = if word == 0 {
                if i == 0 {
                    return Err(Error::DanglingOffsetMarker);
                }
                let prev = entries[i - 1];
                prev.offset
                    .checked_add(u64::from(prev.length))
                    .ok_or(Error::ColumnOverflow {
                        column: "offset",
                        index: i,
                    })?
            } else {
                word - 1
            };
        }

        trace!("Decoded directory with {count} entries");
        Ok(Self { entries })
    }

    /// Encode this directory in the canonical column-oriented form
    ///
    /// The canonical encoder always emits the contiguous-placement marker
    /// when an entry starts where the previous one ended, so decoding a
    /// canonically-encoded buffer and re-serializing it is byte-identical.
    /// Exists for fixture construction and round-trip testing; this crate
    /// does not write archives.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(self.entries.len() as u64, &mut out);

        let mut prev_id = 0u64;
        for entry in &self.entries {
            write_varint(entry.tile_id - prev_id, &mut out);
            prev_id = entry.tile_id;
        }
        for entry in &self.entries {
            write_varint(u64::from(entry.run_length), &mut out);
        }
        for entry in &self.entries {
            write_varint(u64::from(entry.length), &mut out);
        }
        let mut prev: Option<Entry> = None;
        for entry in &self.entries {
            let contiguous = prev
                .is_some_and(|p| p.offset + u64::from(p.length) == entry.offset);
            if contiguous {
                write_varint(0, &mut out);
            } else {
                write_varint(entry.offset + 1, &mut out);
            }
            prev = Some(*entry);
        }
        out
    }

    /// Build a directory from entries already known to be ordered
    ///
    /// # Panics
    /// Panics in debug builds if the entries are not strictly increasing
    /// by `tile_id`.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].tile_id < w[1].tile_id),
            "directory entries must be strictly increasing by tile_id"
        );
        Self { entries }
    }

    /// The decoded entries, strictly increasing by `tile_id`
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry responsible for `tile_id`, if any
    ///
    /// Binary-searches for the greatest entry whose `tile_id` is at or
    /// below the target. A data entry matches only when the target falls
    /// inside its run; a leaf pointer matches any target at or past its
    /// first id, since only the leaf itself knows where its range ends.
    pub fn find(&self, tile_id: u64) -> Option<&Entry> {
        let idx = self
            .entries
            .partition_point(|entry| entry.tile_id <= tile_id);
        if idx == 0 {
            return None;
        }

        let entry = &self.entries[idx - 1];
        if entry.is_leaf() || tile_id - entry.tile_id < u64::from(entry.run_length) {
            Some(entry)
        } else {
            None
        }
    }
}

/// Read one varint belonging to a directory column, mapping truncation to
/// a column-aware error.
fn column_varint(
    data: &[u8],
    pos: &mut usize,
    column: &'static str,
    decoded: usize,
    declared: usize,
) -> Result<u64> {
    match read_varint(&data[*pos..]) {
        Ok((value, consumed)) => {
            *pos += consumed;
            Ok(value)
        }
        Err(Error::Truncated { .. }) => Err(Error::CountMismatch {
            column,
            decoded,
            declared,
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_entries() -> Vec<Entry> {
        vec![
            Entry {
                tile_id: 0,
                run_length: 1,
                length: 100,
                offset: 0,
            },
            Entry {
                tile_id: 1,
                run_length: 3,
                length: 64,
                offset: 100,
            },
            Entry {
                tile_id: 10,
                run_length: 1,
                length: 32,
                offset: 500,
            },
        ]
    }

    #[test]
    fn round_trip() {
        let dir = Directory::from_entries(sample_entries());
        let encoded = dir.serialize();
        let decoded = Directory::deserialize(&encoded).unwrap();
        assert_eq!(decoded.entries(), dir.entries());

        // Canonical encoding is stable under decode + re-encode
        assert_eq!(decoded.serialize(), encoded);
    }

    #[test]
    fn contiguous_offsets_use_marker() {
        let dir = Directory::from_entries(sample_entries());
        let encoded = dir.serialize();
        // Offset column: entry 0 explicit (0+1), entry 1 contiguous (0),
        // entry 2 explicit (500+1)
        let tail = &encoded[encoded.len() - 4..];
        assert_eq!(tail[0], 1);
        assert_eq!(tail[1], 0);

        let decoded = Directory::deserialize(&encoded).unwrap();
        assert_eq!(decoded.entries()[1].offset, 100);
    }

    #[test]
    fn empty_directory() {
        let dir = Directory::from_entries(Vec::new());
        let decoded = Directory::deserialize(&dir.serialize()).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.find(0), None);
    }

    #[test]
    fn rejects_non_increasing_ids() {
        // Two entries with a zero second delta decode to equal tile ids
        let mut buf = Vec::new();
        for v in [2u64, 5, 0, 1, 1, 10, 10, 1, 11] {
            crate::varint::write_varint(v, &mut buf);
        }
        assert!(matches!(
            Directory::deserialize(&buf),
            Err(Error::NonIncreasingTileId(1))
        ));
    }

    #[test]
    fn rejects_short_column() {
        let dir = Directory::from_entries(sample_entries());
        let encoded = dir.serialize();
        let result = Directory::deserialize(&encoded[..encoded.len() - 2]);
        assert!(matches!(
            result,
            Err(Error::CountMismatch { column: "offset", .. })
        ));
    }

    #[test]
    fn rejects_dangling_offset_marker() {
        // Single entry whose offset word is the contiguous marker
        let mut buf = Vec::new();
        for v in [1u64, 5, 1, 10, 0] {
            crate::varint::write_varint(v, &mut buf);
        }
        assert!(matches!(
            Directory::deserialize(&buf),
            Err(Error::DanglingOffsetMarker)
        ));
    }

    #[test]
    fn rejects_oversized_run_length() {
        let mut buf = Vec::new();
        for v in [1u64, 5, 1 << 33, 10, 1] {
            crate::varint::write_varint(v, &mut buf);
        }
        assert!(matches!(
            Directory::deserialize(&buf),
            Err(Error::ColumnOverflow {
                column: "run_length",
                index: 0
            })
        ));
    }

    #[test]
    fn rejects_oversized_length() {
        let mut buf = Vec::new();
        for v in [1u64, 5, 1, 1 << 40, 1] {
            crate::varint::write_varint(v, &mut buf);
        }
        assert!(matches!(
            Directory::deserialize(&buf),
            Err(Error::ColumnOverflow {
                column: "length",
                index: 0
            })
        ));
    }

    #[test]
    fn rejects_overflowing_contiguous_offset() {
        // Entry 0 sits at the top of the address space; entry 1 claims to
        // start where it ends, which has no representable position
        let mut buf = Vec::new();
        for v in [2u64, 1, 1, 1, 1, 10, 10, u64::MAX - 4, 0] {
            crate::varint::write_varint(v, &mut buf);
        }
        assert!(matches!(
            Directory::deserialize(&buf),
            Err(Error::ColumnOverflow {
                column: "offset",
                index: 1
            })
        ));
    }

    #[test]
    fn rejects_truncated_count() {
        assert!(Directory::deserialize(&[0x80]).is_err());
    }

    #[test]
    fn find_covers_runs_and_gaps() {
        let dir = Directory::from_entries(sample_entries());

        assert_eq!(dir.find(0).unwrap().offset, 0);
        // Run of 3 starting at tile id 1 all alias the same range
        for id in 1..=3 {
            assert_eq!(dir.find(id).unwrap().offset, 100);
        }
        // Gap between runs
        for id in 4..10 {
            assert_eq!(dir.find(id), None);
        }
        assert_eq!(dir.find(10).unwrap().offset, 500);
        assert_eq!(dir.find(11), None);
    }

    #[test]
    fn find_leaf_matches_open_ended() {
        let dir = Directory::from_entries(vec![
            Entry {
                tile_id: 0,
                run_length: 1,
                length: 10,
                offset: 0,
            },
            Entry {
                tile_id: 5,
                run_length: 0,
                length: 200,
                offset: 0,
            },
        ]);

        // Anything at or past the leaf pointer resolves to the leaf
        assert!(dir.find(5).unwrap().is_leaf());
        assert!(dir.find(5000).unwrap().is_leaf());
        // But ids before it still miss
        assert_eq!(dir.find(3), None);
    }
}
