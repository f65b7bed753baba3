//! Entry header codec.
//!
//! Each entry in a block's data region looks like:
//!
//! ```text
//! [shared: varint32][non_shared: varint32][value_len: varint32]
//! [key suffix: non_shared bytes][value: value_len bytes]
//! ```
//!
//! `shared` is the length of the prefix reused from the previous entry's
//! key, so `key = prev_key[..shared] ++ suffix`. Entries at restart points
//! always have `shared == 0`.
//!
//! When all three lengths are below 128 each varint is a single byte, and
//! [`decode_entry`] takes a fast path that reads them directly.

use crate::coding::{get_varint32, put_varint32};
use crate::error::{Error, Result};

/// Smallest possible header: three single-byte varints.
pub const MIN_HEADER_BYTES: usize = 3;

/// The three lengths at the front of every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    /// Bytes of key prefix shared with the previous entry.
    pub shared: usize,
    /// Bytes of key suffix stored in this entry.
    pub non_shared: usize,
    /// Bytes of value stored in this entry.
    pub value_len: usize,
}

impl EntryHeader {
    /// Bytes of payload (key suffix + value) that follow the header.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.non_shared.saturating_add(self.value_len)
    }
}

/// Decodes the header at the front of `input`.
///
/// On success returns the header and the remaining input, which starts at
/// the key suffix and is guaranteed to hold at least
/// `non_shared + value_len` bytes.
///
/// # Errors
///
/// Returns [`Error::Corruption`] if the header is truncated, a varint is
/// malformed, or the payload runs past the end of `input`.
pub fn decode_entry(input: &[u8]) -> Result<(EntryHeader, &[u8])> {
    if input.len() < MIN_HEADER_BYTES {
        return Err(Error::corruption("truncated entry header"));
    }

    let (shared, non_shared, value_len, rest) = if (input[0] | input[1] | input[2]) < 128 {
        // Fast path: all three values are encoded in one byte each
        (
            u32::from(input[0]),
            u32::from(input[1]),
            u32::from(input[2]),
            &input[MIN_HEADER_BYTES..],
        )
    } else {
        let mut rest = input;
        let mut fields = [0u32; 3];
        for field in &mut fields {
            let (value, n) =
                get_varint32(rest).ok_or_else(|| Error::corruption("bad entry header varint"))?;
            *field = value;
            rest = &rest[n..];
        }
        (fields[0], fields[1], fields[2], rest)
    };

    let header = EntryHeader {
        shared: shared as usize,
        non_shared: non_shared as usize,
        value_len: value_len as usize,
    };

    // Both the key suffix and the value must fit in what is left.
    if rest.len() < header.payload_len() {
        return Err(Error::corruption("entry payload exceeds block"));
    }

    Ok((header, rest))
}

/// Appends an entry to `dst`.
///
/// This mirrors the on-disk layout so fixtures can be produced without a
/// block builder; it performs no ordering or restart bookkeeping.
pub fn encode_entry(dst: &mut Vec<u8>, shared: usize, key_suffix: &[u8], value: &[u8]) {
    put_varint32(dst, shared as u32);
    put_varint32(dst, key_suffix.len() as u32);
    put_varint32(dst, value.len() as u32);
    dst.extend_from_slice(key_suffix);
    dst.extend_from_slice(value);
}
