//! Conversion between tile coordinates and the global tile id space
//!
//! Tile ids linearize every `(zoom, x, y)` into a single monotonic u64:
//! each zoom level occupies a contiguous block of ids after all lower
//! zooms (`sum(4^k)` tiles below level `z`), and within a level the id is
//! the Hilbert-curve distance of `(x, y)` on the `2^z` by `2^z` grid, so
//! spatially adjacent tiles tend to get adjacent ids. Directories are
//! ordered by this id, which is what makes range queries over them work.

use crate::{Error, Result};

/// Largest supported zoom level
///
/// 31 is the limit at which the per-zoom Hilbert distance still fits the
/// id space; it also bounds `x`/`y` to `u32`.
pub const MAX_ZOOM: u8 = 31;

/// Convert `(zoom, x, y)` to a global tile id
///
/// # Errors
/// * [`Error::ZoomOutOfRange`] if `z > 31`
/// * [`Error::CoordinateOutOfRange`] if `x` or `y` is at or beyond `2^z`
///
/// # Example
/// ```
/// use pmtiles_format::zxy_to_tile_id;
///
/// assert_eq!(zxy_to_tile_id(0, 0, 0).unwrap(), 0);
/// assert_eq!(zxy_to_tile_id(1, 1, 0).unwrap(), 4);
/// assert_eq!(zxy_to_tile_id(2, 0, 0).unwrap(), 5);
/// ```
pub fn zxy_to_tile_id(z: u8, x: u32, y: u32) -> Result<u64> {
    if z > MAX_ZOOM {
        return Err(Error::ZoomOutOfRange(z));
    }
    if u64::from(x) >= 1u64 << z || u64::from(y) >= 1u64 << z {
        return Err(Error::CoordinateOutOfRange { z, x, y });
    }

    let base = tiles_below(z);
    let n = 1u64 << z;
    let mut tx = u64::from(x);
    let mut ty = u64::from(y);
    let mut d = 0u64;

    let mut s = n >> 1;
    while s > 0 {
        let rx = u64::from(tx & s > 0);
        let ry = u64::from(ty & s > 0);
        d += s * s * ((3 * rx) ^ ry);
        rotate(s, &mut tx, &mut ty, rx, ry);
        s >>= 1;
    }

    Ok(base + d)
}

/// Convert a global tile id back to `(zoom, x, y)`
///
/// Exact inverse of [`zxy_to_tile_id`] over the whole representable
/// domain.
///
/// # Errors
/// * [`Error::TileIdOutOfRange`] if the id lies past the zoom-31 block
pub fn tile_id_to_zxy(tile_id: u64) -> Result<(u8, u32, u32)> {
    let mut base = 0u64;
    for z in 0..=MAX_ZOOM {
        let level_tiles = 1u64 << (2 * u32::from(z));
        if tile_id < base + level_tiles {
            let (x, y) = hilbert_position(z, tile_id - base);
            return Ok((z, x, y));
        }
        base += level_tiles;
    }
    Err(Error::TileIdOutOfRange(tile_id))
}

/// Number of tiles in all zoom levels below `z`: `sum(4^k for k in 0..z)`
fn tiles_below(z: u8) -> u64 {
    ((1u64 << (2 * u32::from(z))) - 1) / 3
}

/// Hilbert distance to `(x, y)` within a single zoom level
fn hilbert_position(z: u8, mut t: u64) -> (u32, u32) {
    let n = 1u64 << z;
    let mut x = 0u64;
    let mut y = 0u64;

    let mut s = 1u64;
    while s < n {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);
        rotate(s, &mut x, &mut y, rx, ry);
        x += s * rx;
        y += s * ry;
        t /= 4;
        s <<= 1;
    }

    (x as u32, y as u32)
}

/// One step of the Hilbert curve quadrant rotation
///
/// Only the bits below `s` carry curve state at this step; the reflection
/// wraps in the bits above, which no later step reads.
fn rotate(s: u64, x: &mut u64, y: &mut u64, rx: u64, ry: u64) {
    if ry == 0 {
        if rx == 1 {
            *x = (s - 1).wrapping_sub(*x);
            *y = (s - 1).wrapping_sub(*y);
        }
        std::mem::swap(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_level_anchors() {
        // The first id of each level comes right after all lower levels
        assert_eq!(zxy_to_tile_id(0, 0, 0).unwrap(), 0);
        assert_eq!(zxy_to_tile_id(1, 0, 0).unwrap(), 1);
        assert_eq!(zxy_to_tile_id(2, 0, 0).unwrap(), 5);
        assert_eq!(zxy_to_tile_id(3, 0, 0).unwrap(), 21);
    }

    #[test]
    fn zoom_one_traversal() {
        // Hilbert order at z1: (0,0), (0,1), (1,1), (1,0)
        assert_eq!(zxy_to_tile_id(1, 0, 0).unwrap(), 1);
        assert_eq!(zxy_to_tile_id(1, 0, 1).unwrap(), 2);
        assert_eq!(zxy_to_tile_id(1, 1, 1).unwrap(), 3);
        assert_eq!(zxy_to_tile_id(1, 1, 0).unwrap(), 4);
    }

    #[test]
    fn bijection_low_zooms() {
        // Exhaustive through z6: every coordinate inverts exactly, and
        // each level's ids are a permutation of its block
        for z in 0u8..=6 {
            let n = 1u32 << z;
            let base = (0..z).map(|k| 1u64 << (2 * u32::from(k))).sum::<u64>();
            let mut seen = vec![false; (n as usize) * (n as usize)];

            for x in 0..n {
                for y in 0..n {
                    let id = zxy_to_tile_id(z, x, y).unwrap();
                    assert!(id >= base && id < base + seen.len() as u64);
                    let slot = (id - base) as usize;
                    assert!(!seen[slot], "duplicate id {id} at z{z}");
                    seen[slot] = true;

                    assert_eq!(tile_id_to_zxy(id).unwrap(), (z, x, y));
                }
            }
        }
    }

    #[test]
    fn bijection_max_zoom_corners() {
        let max = (1u32 << 31) - 1;
        for (x, y) in [(0, 0), (max, 0), (0, max), (max, max), (12345, 987654)] {
            let id = zxy_to_tile_id(MAX_ZOOM, x, y).unwrap();
            assert_eq!(tile_id_to_zxy(id).unwrap(), (MAX_ZOOM, x, y));
        }
    }

    #[test]
    fn reflected_quadrants_stay_in_range() {
        // Coordinates in the reflected quadrants exceed the step size
        // partway through the walk; they must still convert cleanly
        assert_eq!(zxy_to_tile_id(2, 3, 0).unwrap(), 20);
        assert_eq!(tile_id_to_zxy(20).unwrap(), (2, 3, 0));

        let max = (1u32 << 31) - 1;
        let id = zxy_to_tile_id(MAX_ZOOM, max, 0).unwrap();
        assert_eq!(tile_id_to_zxy(id).unwrap(), (MAX_ZOOM, max, 0));
    }

    #[test]
    fn rejects_out_of_domain() {
        assert!(matches!(
            zxy_to_tile_id(32, 0, 0),
            Err(Error::ZoomOutOfRange(32))
        ));
        assert!(matches!(
            zxy_to_tile_id(3, 8, 0),
            Err(Error::CoordinateOutOfRange { .. })
        ));
        assert!(matches!(
            zxy_to_tile_id(0, 0, 1),
            Err(Error::CoordinateOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_id_past_address_space() {
        // One past the last id of zoom 31
        let past = (0..=31u32).map(|k| 1u64 << (2 * k)).sum::<u64>();
        assert!(matches!(
            tile_id_to_zxy(past),
            Err(Error::TileIdOutOfRange(_))
        ));
        assert!(tile_id_to_zxy(past - 1).is_ok());
    }
}
