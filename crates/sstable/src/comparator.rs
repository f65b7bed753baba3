//! Key ordering capability.

use std::cmp::Ordering;

/// A total order over byte-string keys.
///
/// Blocks are written in the order of some comparator and must be read back
/// with the same one; seeking with a different order gives meaningless (but
/// memory-safe) results.
pub trait Comparator: Send + Sync {
    /// Name of the ordering, persisted alongside tables that use it.
    fn name(&self) -> &str;

    /// Three-way comparison of `a` and `b`.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// Lexicographic byte-wise ordering (the default).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BytewiseComparator;

impl Comparator for BytewiseComparator {
    fn name(&self) -> &str {
        "sstable.BytewiseComparator"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}
