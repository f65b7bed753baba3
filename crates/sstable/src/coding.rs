//! Integer encodings shared by the block and filter block formats.
//!
//! ## Fixed-width
//!
//! ```text
//! u32: 4 bytes, little-endian
//! ```
//!
//! ## Varint32
//!
//! 7 payload bits per byte, least-significant group first. The high bit of
//! each byte is a continuation flag. A `u32` needs at most 5 bytes.
//!
//! ```text
//! 300 -> [0xAC, 0x02]
//! ```

use byteorder::{ByteOrder, LittleEndian};

/// Size of an encoded fixed-width `u32`.
pub const U32_BYTES: usize = 4;

/// Longest valid varint32 encoding.
pub const MAX_VARINT32_BYTES: usize = 5;

/// Decodes a little-endian `u32` from the first four bytes of `src`.
///
/// # Panics
///
/// Panics if `src` is shorter than four bytes. Callers bounds-check first.
#[must_use]
pub fn decode_fixed32(src: &[u8]) -> u32 {
    LittleEndian::read_u32(src)
}

/// Appends `value` to `dst` as a little-endian `u32`.
pub fn put_fixed32(dst: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; U32_BYTES];
    LittleEndian::write_u32(&mut buf, value);
    dst.extend_from_slice(&buf);
}

/// Decodes a varint32 from the front of `src`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends mid-varint or runs past [`MAX_VARINT32_BYTES`].
#[must_use]
pub fn get_varint32(src: &[u8]) -> Option<(u32, usize)> {
    let mut result = 0u32;
    for (i, &byte) in src.iter().take(MAX_VARINT32_BYTES).enumerate() {
        result |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }
    }
    None
}

/// Appends `value` to `dst` as a varint32.
pub fn put_varint32(dst: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        dst.push((value as u8) | 0x80);
        value >>= 7;
    }
    dst.push(value as u8);
}

/// Number of bytes [`put_varint32`] would write for `value`.
#[must_use]
pub fn varint_length(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}
