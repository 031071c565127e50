//! Variable-length integer encoding used by PMTiles directories
//!
//! Directories serialize every numeric column as unsigned varints: 7 bits
//! per byte, least significant group first, high bit set while more bytes
//! follow. A u64 therefore occupies at most 10 bytes.

use crate::{Error, Result};

/// Maximum encoded length of a u64 varint
pub const MAX_VARINT_LEN: usize = 10;

/// Read a variable-length u64 from the front of a byte slice
///
/// Returns the decoded value and the number of bytes consumed.
///
/// # Errors
/// * [`Error::Truncated`] if the slice ends mid-varint
/// * [`Error::VarintOverflow`] if the value does not fit in 64 bits
///
/// # Example
/// ```
/// use pmtiles_format::varint::read_varint;
///
/// let (value, consumed) = read_varint(&[0x96, 0x01]).unwrap();
/// assert_eq!(value, 150);
/// assert_eq!(consumed, 2);
/// ```
pub fn read_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut consumed = 0;

    for &byte in data {
        consumed += 1;

        let group = u64::from(byte & 0x7F);

        // The tenth byte may only carry the single remaining bit
        if shift >= 64 || (shift == 63 && group > 1) {
            return Err(Error::VarintOverflow);
        }

        result |= group << shift;

        if byte & 0x80 == 0 {
            return Ok((result, consumed));
        }

        shift += 7;

        if consumed >= MAX_VARINT_LEN {
            return Err(Error::VarintOverflow);
        }
    }

    Err(Error::Truncated { context: "varint" })
}

/// Append a variable-length u64 to a byte vector
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80;
            out.push(byte);
        } else {
            out.push(byte);
            break;
        }
    }
}
