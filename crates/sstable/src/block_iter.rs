//! Bidirectional cursor over the entries of one block.
//!
//! ## States
//!
//! ```text
//! Error ──────────────── terminal, status() = Corruption, never valid
//! Empty ──────────────── terminal, no entries, never valid
//! Live ─┬─ Positioned ── key/value of one entry
//!       └─ Invalid ───── past either end, or parked after corruption
//! ```
//!
//! A live iterator decodes entries lazily. Keys are prefix-compressed, so
//! the current key is materialized into an owned buffer and each step
//! forward rebuilds it from the shared prefix plus the stored suffix.
//! Values are never copied; they are sub-slices of the block.
//!
//! Moving backwards cannot undo prefix compression, so [`BlockIter::prev`]
//! jumps to the closest restart point before the current entry and replays
//! forward. It costs at most one restart interval of decodes.

use std::cmp::Ordering;
use std::fmt;

use tracing::debug;

use crate::coding::{decode_fixed32, U32_BYTES};
use crate::comparator::Comparator;
use crate::entry::decode_entry;
use crate::error::{Error, Result};

/// Cursor over the entries of a [`Block`](crate::Block).
///
/// Obtained from [`Block::iter`](crate::Block::iter). A fresh iterator is
/// not positioned; call one of the `seek*` methods first.
pub struct BlockIter<'a> {
    state: State<'a>,
}

enum State<'a> {
    /// Built from a malformed block.
    Error(Error),
    /// Built from a block with no restart points.
    Empty,
    Live(Cursor<'a>),
}

struct Cursor<'a> {
    cmp: &'a dyn Comparator,
    /// Block bytes up to and including the trailer.
    data: &'a [u8],
    /// Offset of the restart array; entries live in `data[..restarts]`.
    restarts: usize,
    num_restarts: usize,
    pos: Position,
    /// Offset just past the current entry, where the next decode starts.
    next_offset: usize,
    /// Index of the restart interval holding the current entry.
    restart_index: usize,
    key: Vec<u8>,
    status: Option<Error>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Invalid,
    /// On the entry starting at `offset`, whose value is `data[value_start..value_end]`.
    At {
        offset: usize,
        value_start: usize,
        value_end: usize,
    },
}

impl<'a> BlockIter<'a> {
    pub(crate) fn new(
        cmp: &'a dyn Comparator,
        data: &'a [u8],
        restarts: usize,
        num_restarts: usize,
    ) -> Self {
        debug_assert!(num_restarts > 0);
        Self {
            state: State::Live(Cursor {
                cmp,
                data,
                restarts,
                num_restarts,
                pos: Position::Invalid,
                next_offset: restarts,
                restart_index: num_restarts,
                key: Vec::new(),
                status: None,
            }),
        }
    }

    pub(crate) fn error(err: Error) -> Self {
        Self {
            state: State::Error(err),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            state: State::Empty,
        }
    }

    /// Returns `true` if the iterator is positioned on an entry.
    #[must_use]
    pub fn valid(&self) -> bool {
        match &self.state {
            State::Live(c) => c.is_positioned(),
            State::Error(_) | State::Empty => false,
        }
    }

    /// Positions on the first entry of the block.
    pub fn seek_to_first(&mut self) {
        if let State::Live(c) = &mut self.state {
            c.seek_to_restart_point(0);
            c.parse_next_key();
        }
    }

    /// Positions on the last entry of the block.
    pub fn seek_to_last(&mut self) {
        if let State::Live(c) = &mut self.state {
            c.seek_to_restart_point(c.num_restarts - 1);
            while c.parse_next_key() && c.next_offset < c.restarts {
                // Keep skipping
            }
        }
    }

    /// Positions on the first entry whose key is `>= target`, or becomes
    /// invalid if every key is smaller.
    pub fn seek(&mut self, target: &[u8]) {
        if let State::Live(c) = &mut self.state {
            c.seek(target);
        }
    }

    /// Advances to the next entry.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is not [`valid`](Self::valid).
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        let c = self.positioned_mut("next");
        c.parse_next_key();
    }

    /// Steps back to the previous entry, becoming invalid when called on
    /// the first one.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is not [`valid`](Self::valid).
    pub fn prev(&mut self) {
        let c = self.positioned_mut("prev");
        c.prev();
    }

    /// Key of the current entry.
    ///
    /// The key is reassembled from prefix-compressed pieces and lives in the
    /// iterator, so it cannot be held across a move.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is not [`valid`](Self::valid).
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.positioned("key").key
    }

    /// Value of the current entry, borrowed straight from the block.
    ///
    /// # Panics
    ///
    /// Panics if the iterator is not [`valid`](Self::valid).
    #[must_use]
    pub fn value(&self) -> &'a [u8] {
        let c = self.positioned("value");
        let data: &'a [u8] = c.data;
        match c.pos {
            Position::At {
                value_start,
                value_end,
                ..
            } => &data[value_start..value_end],
            Position::Invalid => unreachable!("positioned cursor"),
        }
    }

    /// `Ok(())` unless the block or one of its entries was found corrupt.
    pub fn status(&self) -> Result<()> {
        match &self.state {
            State::Error(err) => Err(err.clone()),
            State::Empty => Ok(()),
            State::Live(c) => c.status.clone().map_or(Ok(()), Err),
        }
    }

    /// Yields `(key, value)` pairs from the current entry forward.
    ///
    /// The first item is the entry the iterator is on (nothing if it is
    /// invalid); each later item advances the iterator by one.
    pub fn entries(&mut self) -> Entries<'_, 'a> {
        Entries {
            iter: self,
            started: false,
        }
    }

    fn positioned(&self, op: &str) -> &Cursor<'a> {
        match &self.state {
            State::Live(c) if c.is_positioned() => c,
            _ => panic!("{}() called on an invalid block iterator", op),
        }
    }

    fn positioned_mut(&mut self, op: &str) -> &mut Cursor<'a> {
        match &mut self.state {
            State::Live(c) if c.is_positioned() => c,
            _ => panic!("{}() called on an invalid block iterator", op),
        }
    }
}

impl fmt::Debug for BlockIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Error(err) => f.debug_tuple("BlockIter::Error").field(err).finish(),
            State::Empty => f.write_str("BlockIter::Empty"),
            State::Live(c) => f
                .debug_struct("BlockIter")
                .field("comparator", &c.cmp.name())
                .field("num_restarts", &c.num_restarts)
                .field("position", &c.pos)
                .field("restart_index", &c.restart_index)
                .field("status", &c.status)
                .finish(),
        }
    }
}

/// Forward adapter returned by [`BlockIter::entries`].
pub struct Entries<'i, 'a> {
    iter: &'i mut BlockIter<'a>,
    started: bool,
}

impl<'a> Iterator for Entries<'_, 'a> {
    type Item = (Vec<u8>, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.started {
            if !self.iter.valid() {
                return None;
            }
            self.iter.next();
        }
        self.started = true;

        if self.iter.valid() {
            Some((self.iter.key().to_vec(), self.iter.value()))
        } else {
            None
        }
    }
}

impl<'a> Cursor<'a> {
    fn is_positioned(&self) -> bool {
        matches!(self.pos, Position::At { .. })
    }

    /// Reads entry `index` of the restart array. Offsets are block-relative.
    fn restart_point(&self, index: usize) -> usize {
        debug_assert!(index < self.num_restarts);
        let at = self.restarts + index * U32_BYTES;
        decode_fixed32(&self.data[at..at + U32_BYTES]) as usize
    }

    fn seek_to_restart_point(&mut self, index: usize) {
        self.key.clear();
        self.restart_index = index;
        // pos is fixed up by parse_next_key()
        self.next_offset = self.restart_point(index);
    }

    /// Decodes the entry at `next_offset`. Returns `false` (and leaves the
    /// cursor invalid) at the end of the block or on corruption.
    fn parse_next_key(&mut self) -> bool {
        let current = self.next_offset;
        if current >= self.restarts {
            // No more entries to return.
            self.mark_invalid();
            return false;
        }

        let data = self.data;
        let (header, rest) = match decode_entry(&data[current..self.restarts]) {
            Ok(decoded) if decoded.0.shared <= self.key.len() => decoded,
            _ => {
                self.corruption_error(current);
                return false;
            }
        };

        let key_start = self.restarts - rest.len();
        let value_start = key_start + header.non_shared;
        let value_end = value_start + header.value_len;

        self.key.truncate(header.shared);
        self.key.extend_from_slice(&data[key_start..value_start]);
        self.pos = Position::At {
            offset: current,
            value_start,
            value_end,
        };
        self.next_offset = value_end;

        while self.restart_index + 1 < self.num_restarts
            && self.restart_point(self.restart_index + 1) < current
        {
            self.restart_index += 1;
        }
        true
    }

    fn seek(&mut self, target: &[u8]) {
        // Binary search in restart array to find the last restart point
        // with a key < target
        let data = self.data;
        let mut left = 0;
        let mut right = self.num_restarts - 1;
        while left < right {
            let mid = (left + right + 1) / 2;
            let region = self.restart_point(mid);
            if region >= self.restarts {
                self.corruption_error(region);
                return;
            }

            let mid_key = match decode_entry(&data[region..self.restarts]) {
                // Restart entries store their key in full.
                Ok((header, rest)) if header.shared == 0 => &rest[..header.non_shared],
                _ => {
                    self.corruption_error(region);
                    return;
                }
            };

            if self.cmp.compare(mid_key, target) == Ordering::Less {
                // Key at "mid" is smaller than "target"; blocks before
                // "mid" are uninteresting.
                left = mid;
            } else {
                // Key at "mid" is >= "target"; blocks at or after "mid"
                // are uninteresting.
                right = mid - 1;
            }
        }

        // Linear search (within restart block) for first key >= target
        self.seek_to_restart_point(left);
        while self.parse_next_key() {
            if self.cmp.compare(&self.key, target) != Ordering::Less {
                return;
            }
        }
    }

    fn prev(&mut self) {
        let original = match self.pos {
            Position::At { offset, .. } => offset,
            Position::Invalid => return,
        };

        // Scan backwards to a restart point before the current entry
        let mut index = self.restart_index;
        while self.restart_point(index) >= original {
            if index == 0 {
                // No more entries
                self.mark_invalid();
                return;
            }
            index -= 1;
        }

        self.seek_to_restart_point(index);
        // Loop until end of current entry hits the start of original entry
        while self.parse_next_key() && self.next_offset < original {}
    }

    fn mark_invalid(&mut self) {
        self.pos = Position::Invalid;
        self.next_offset = self.restarts;
        self.restart_index = self.num_restarts;
    }

    fn corruption_error(&mut self, offset: usize) {
        debug!(offset, restarts = self.restarts, "bad entry in block");
        self.mark_invalid();
        self.status = Some(Error::corruption("bad entry in block"));
        self.key.clear();
    }
}
