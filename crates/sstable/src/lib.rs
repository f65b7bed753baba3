//! # SSTable - Block Read Path
//!
//! Decodes the blocks of an immutable sorted-string table.
//!
//! The table reader (not part of this crate) reads a block from disk,
//! verifies and decompresses it, and hands the raw bytes to [`Block`]. A
//! block validates its trailer once and then produces [`BlockIter`]s that
//! walk its prefix-compressed entries in either direction and seek by key.
//! Separately, the table's filter block is wrapped in a
//! [`FilterBlockReader`] that answers "could data block X hold key K?"
//! before any data block is read.
//!
//! ## Block layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ ENTRIES (sorted by comparator)                                │
//! │                                                               │
//! │ shared (varint32) | non_shared (varint32) | value_len (varint32)│
//! │ key_suffix (non_shared bytes) | value (value_len bytes)       │
//! │                                                               │
//! │ Every `restart_interval` entries the key is stored in full    │
//! │ (shared = 0); that entry is a restart point.                  │
//! ├───────────────────────────────────────────────────────────────┤
//! │ RESTART ARRAY                                                 │
//! │                                                               │
//! │ restart_offset (u32 LE) ... one per restart point             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ num_restarts (u32 LE, last 4 bytes)                            │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Filter block layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ filter_0 | filter_1 | ... (opaque, produced by a FilterPolicy) │
//! ├───────────────────────────────────────────────────────────────┤
//! │ filter_offset (u32 LE) ... one per filter                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │ array_start (u32 LE) | base_lg (u8)                            │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All fixed-width integers are little-endian.
//!
//! ## Error model
//!
//! Nothing here panics on bad input. A malformed block yields iterators
//! whose [`BlockIter::status`] is [`Error::Corruption`]; a malformed filter
//! block answers "may match" for every key.
//!
//! ## Example
//!
//! ```rust
//! use sstable::{Block, BlockContents, BytewiseComparator};
//!
//! // One entry ("k" -> "v") and a single restart point at offset 0.
//! let raw = vec![0, 1, 1, b'k', b'v', 0, 0, 0, 0, 1, 0, 0, 0];
//! let block = Block::new(BlockContents::owned(raw));
//! let mut iter = block.iter(&BytewiseComparator);
//! iter.seek_to_first();
//! assert_eq!(iter.key(), b"k");
//! assert_eq!(iter.value(), b"v");
//! ```

mod block;
mod block_iter;
pub mod coding;
mod comparator;
pub mod entry;
mod error;
mod filter_block;

pub use block::{Block, BlockContents};
pub use block_iter::{BlockIter, Entries};
pub use bloom::FilterPolicy;
pub use comparator::{BytewiseComparator, Comparator};
pub use entry::{decode_entry, EntryHeader};
pub use error::{Error, Result};
pub use filter_block::{FilterBlockReader, FILTER_BASE_LG, FILTER_TRAILER_BYTES};

#[cfg(test)]
mod tests;
