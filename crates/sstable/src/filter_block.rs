//! Filter block reader.
//!
//! ## Layout
//!
//! ```text
//! [filter_0][filter_1]...[filter_{N-1}]
//! [offset_0: u32 LE]...[offset_{N-1}: u32 LE]
//! [array_start: u32 LE][base_lg: u8]
//! ```
//!
//! Filter `i` covers the data blocks whose file offset `o` satisfies
//! `o >> base_lg == i` and occupies `[offset_i, offset_{i+1})`, where the
//! last filter ends at `array_start`.
//!
//! Filters only ever save I/O, so every problem with this block resolves to
//! "the key may be present": a malformed block behaves as if no filter had
//! been written.

use std::fmt;

use bloom::FilterPolicy;
use tracing::debug;

use crate::coding::{decode_fixed32, U32_BYTES};

/// Default `base_lg`: one filter per 2 KiB of data-block file offsets.
pub const FILTER_BASE_LG: u8 = 11;

/// Trailer size: `array_start` (u32) + `base_lg` (u8).
pub const FILTER_TRAILER_BYTES: usize = U32_BYTES + 1;

/// Answers "may this data block contain `key`?" from a filter block.
pub struct FilterBlockReader<'a> {
    policy: &'a dyn FilterPolicy,
    /// The whole filter block.
    data: &'a [u8],
    /// Start of the offset array, equal to the filter payload length.
    offsets_start: usize,
    /// Number of entries in the offset array.
    num: usize,
    base_lg: u8,
}

impl<'a> FilterBlockReader<'a> {
    /// Parses the trailer of `contents`.
    ///
    /// A block shorter than [`FILTER_TRAILER_BYTES`], or whose offset array
    /// would start past the filter payload, yields a reader with no filters
    /// that answers `true` for everything.
    pub fn new(policy: &'a dyn FilterPolicy, contents: &'a [u8]) -> Self {
        let mut reader = Self {
            policy,
            data: &[],
            offsets_start: 0,
            num: 0,
            base_lg: 0,
        };

        let n = contents.len();
        if n < FILTER_TRAILER_BYTES {
            debug!(len = n, "filter block too small, ignoring filters");
            return reader;
        }

        reader.base_lg = contents[n - 1];
        let last_word = decode_fixed32(&contents[n - FILTER_TRAILER_BYTES..n - 1]) as usize;
        if last_word > n - FILTER_TRAILER_BYTES {
            debug!(len = n, last_word, "filter offset array out of range, ignoring filters");
            return reader;
        }

        reader.data = contents;
        reader.offsets_start = last_word;
        reader.num = (n - FILTER_TRAILER_BYTES - last_word) / U32_BYTES;
        reader
    }

    /// Returns `false` only if the data block at `block_offset` definitely
    /// does not contain `key`.
    pub fn key_may_match(&self, block_offset: u64, key: &[u8]) -> bool {
        let index = block_offset.checked_shr(u32::from(self.base_lg)).unwrap_or(0);
        if index >= self.num as u64 {
            // Errors are treated as potential matches
            return true;
        }

        let at = self.offsets_start + index as usize * U32_BYTES;
        let start = decode_fixed32(&self.data[at..at + U32_BYTES]) as usize;
        let limit = decode_fixed32(&self.data[at + U32_BYTES..at + 2 * U32_BYTES]) as usize;

        if start == limit {
            // Empty filters do not match any keys
            false
        } else if start < limit && limit <= self.offsets_start {
            self.policy.key_may_match(key, &self.data[start..limit])
        } else {
            true
        }
    }

    /// Number of filters in the block (0 for a missing or malformed block).
    #[must_use]
    pub fn num_filters(&self) -> usize {
        self.num
    }

    /// log2 of the file-offset range each filter covers.
    #[must_use]
    pub fn base_lg(&self) -> u8 {
        self.base_lg
    }
}

impl fmt::Debug for FilterBlockReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBlockReader")
            .field("policy", &self.policy.name())
            .field("base_lg", &self.base_lg)
            .field("payload_len", &self.offsets_start)
            .field("num", &self.num)
            .finish()
    }
}
