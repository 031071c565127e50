//! Property-based coverage for the codec and tile id conversion

use proptest::collection::vec;
use proptest::prelude::*;

use pmtiles_format::varint::{read_varint, write_varint};
use pmtiles_format::{Directory, Entry, tile_id_to_zxy, zxy_to_tile_id};

proptest! {
    #[test]
    fn varint_round_trip(value in any::<u64>()) {
        let mut encoded = Vec::new();
        write_varint(value, &mut encoded);
        let (decoded, consumed) = read_varint(&encoded).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn tile_id_bijection(z in 0u8..=31, frac_x in 0.0f64..1.0, frac_y in 0.0f64..1.0) {
        let n = 1u64 << z;
        let x = ((frac_x * n as f64) as u64).min(n - 1) as u32;
        let y = ((frac_y * n as f64) as u64).min(n - 1) as u32;

        let id = zxy_to_tile_id(z, x, y).unwrap();
        prop_assert_eq!(tile_id_to_zxy(id).unwrap(), (z, x, y));
    }

    #[test]
    fn directory_round_trip(
        raw in vec((1u64..1000, 0u32..4, 1u32..100_000, 0u64..1_000_000), 0..64)
    ) {
        // Turn random tuples into a strictly increasing, canonical
        // directory: ids by cumulative gaps, offsets re-derived so the
        // encoder's contiguity marker is exercised for some entries.
        let mut entries = Vec::with_capacity(raw.len());
        let mut tile_id = 0u64;
        let mut end = 0u64;
        for (i, (gap, run_extra, length, jump)) in raw.into_iter().enumerate() {
            tile_id += gap;
            let contiguous = jump % 2 == 0;
            let offset = if contiguous || i == 0 { end } else { end + jump };
            entries.push(Entry {
                tile_id,
                run_length: 1 + run_extra,
                length,
                offset,
            });
            end = offset + u64::from(length);
        }

        let dir = Directory::from_entries(entries);
        let encoded = dir.serialize();
        let decoded = Directory::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.entries(), dir.entries());
        prop_assert_eq!(decoded.serialize(), encoded);
    }
}

#[test]
fn locate_spans_and_gaps() {
    let entries = vec![
        Entry {
            tile_id: 5,
            run_length: 4,
            length: 10,
            offset: 0,
        },
        Entry {
            tile_id: 100,
            run_length: 1,
            length: 20,
            offset: 10,
        },
    ];
    let dir = Directory::from_entries(entries);

    for id in 0..5 {
        assert!(dir.find(id).is_none());
    }
    for id in 5..9 {
        let entry = dir.find(id).unwrap();
        assert_eq!((entry.offset, entry.length), (0, 10));
    }
    for id in 9..100 {
        assert!(dir.find(id).is_none());
    }
    assert_eq!(dir.find(100).unwrap().length, 20);
    assert!(dir.find(101).is_none());
}
