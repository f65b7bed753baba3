//! Block container: validates a decompressed block and hands out iterators.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ entry_0 | entry_1 | ... | entry_{k-1}                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │ restart_0 (u32 LE) | ... | restart_{m-1} (u32 LE)            │
//! ├──────────────────────────────────────────────────────────────┤
//! │ num_restarts (u32 LE)                                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A block whose trailer cannot be right (shorter than 4 bytes, or a
//! restart count that would not fit) is kept as a size-zero error marker.
//! Construction never fails; the problem surfaces through the iterator.

use std::borrow::Cow;
use std::fmt;

use tracing::warn;

use crate::block_iter::BlockIter;
use crate::coding::{decode_fixed32, U32_BYTES};
use crate::comparator::Comparator;
use crate::error::Error;

/// Raw, already-decompressed bytes of one block.
///
/// `data` is either owned (`Cow::Owned`, e.g. a buffer the table reader
/// allocated for a read) or borrowed (`Cow::Borrowed`, e.g. a slice into an
/// mmap or a cache entry that outlives the block).
#[derive(Debug, Clone)]
pub struct BlockContents<'a> {
    /// The block bytes, trailer included.
    pub data: Cow<'a, [u8]>,
    /// Whether the table reader may insert this block into a block cache.
    pub cachable: bool,
}

impl<'a> BlockContents<'a> {
    /// Wraps a heap buffer the block will own.
    pub fn owned(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
            cachable: true,
        }
    }

    /// Wraps bytes owned elsewhere; they must outlive the block.
    pub fn borrowed(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            cachable: false,
        }
    }
}

/// An immutable, validated data or index block.
pub struct Block<'a> {
    data: Cow<'a, [u8]>,
    /// Validated length, 0 if the trailer is malformed.
    size: usize,
    /// Offset of the restart array (only meaningful when `size > 0`).
    restart_offset: usize,
    cachable: bool,
}

impl<'a> Block<'a> {
    /// Validates the trailer of `contents`.
    ///
    /// # Validation
    ///
    /// - The block must hold at least the 4-byte restart count.
    /// - `num_restarts` must be at most `(len - 4) / 4`.
    ///
    /// A block failing either check gets `size() == 0` and only produces
    /// error iterators.
    pub fn new(contents: BlockContents<'a>) -> Self {
        let BlockContents { data, cachable } = contents;
        let len = data.len();

        let (size, restart_offset) = if len < U32_BYTES {
            warn!(len, "block too small for restart count");
            (0, 0)
        } else {
            let num_restarts = decode_fixed32(&data[len - U32_BYTES..]) as usize;
            let max_restarts_allowed = (len - U32_BYTES) / U32_BYTES;
            if num_restarts > max_restarts_allowed {
                warn!(len, num_restarts, "block restart count exceeds block size");
                (0, 0)
            } else {
                (len, len - (1 + num_restarts) * U32_BYTES)
            }
        };

        Self {
            data,
            size,
            restart_offset,
            cachable,
        }
    }

    /// Validated byte length of the block; 0 for a malformed block.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of restart points; 0 for a malformed block.
    #[must_use]
    pub fn num_restarts(&self) -> u32 {
        if self.size < U32_BYTES {
            return 0;
        }
        decode_fixed32(&self.data[self.size - U32_BYTES..])
    }

    /// Returns `true` if the block owns its bytes.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }

    /// Returns `true` if the block may be placed in a block cache.
    #[must_use]
    pub fn is_cachable(&self) -> bool {
        self.cachable
    }

    /// Returns an iterator over the block's entries, ordered by `cmp`.
    ///
    /// - Malformed block: an iterator that is never valid and whose
    ///   `status()` reports corruption.
    /// - No restart points: an empty iterator.
    /// - Otherwise: a live iterator, initially unpositioned.
    pub fn iter<'b>(&'b self, cmp: &'b dyn Comparator) -> BlockIter<'b> {
        if self.size < U32_BYTES {
            return BlockIter::error(Error::corruption("bad block contents"));
        }
        match self.num_restarts() as usize {
            0 => BlockIter::empty(),
            num_restarts => BlockIter::new(
                cmp,
                &self.data[..self.size],
                self.restart_offset,
                num_restarts,
            ),
        }
    }
}

impl fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("size", &self.size)
            .field("num_restarts", &self.num_restarts())
            .field("restart_offset", &self.restart_offset)
            .field("owned", &self.is_owned())
            .field("cachable", &self.cachable)
            .finish()
    }
}
