//! # Bloom - Filter Policies
//!
//! Approximate membership tests over serialized filters.
//!
//! A filter can tell you with certainty that a key is **not** in the set it
//! was built from (no false negatives), but may occasionally report that a
//! key **is** in the set when it isn't (false positives).
//!
//! ## Usage in the block read path
//!
//! The SSTable filter block stores one serialized filter per range of data
//! blocks. The reader never interprets the filter bytes itself; it hands
//! `(key, filter_bytes)` to a [`FilterPolicy`] and trusts the verdict. This
//! crate provides that capability trait plus the default
//! [`BloomFilterPolicy`].
//!
//! ## Filter wire format (`BloomFilterPolicy`)
//!
//! ```text
//! [bits: ceil(n * bits_per_key / 8) bytes][k: u8]
//! ```
//!
//! The trailing byte records the number of probes so that filters written
//! with a different `bits_per_key` can still be read. Values of `k` above
//! 30 are reserved and always match.
//!
//! ## Example
//!
//! ```rust
//! use bloom::{BloomFilterPolicy, FilterPolicy};
//!
//! let policy = BloomFilterPolicy::new(10);
//! let mut filter = Vec::new();
//! policy.create_filter(&[b"hello".as_slice()], &mut filter);
//! assert!(policy.key_may_match(b"hello", &filter));
//! ```

/// Largest probe count a filter may declare before it is treated as a
/// reserved encoding.
pub const MAX_PROBES: u8 = 30;

/// Smallest filter bit-array, so tiny key sets still get a usable FP rate.
const MIN_FILTER_BITS: usize = 64;

/// Capability for building and querying serialized membership filters.
///
/// Implementations must be deterministic: a filter created from a set of
/// keys must answer `true` for every one of those keys, across processes.
pub trait FilterPolicy: Send + Sync {
    /// Name of the policy, persisted alongside tables that use it.
    fn name(&self) -> &str;

    /// Appends a filter summarizing `keys` to `dst`.
    fn create_filter(&self, keys: &[&[u8]], dst: &mut Vec<u8>);

    /// Returns `false` only if `key` was definitely not among the keys
    /// `filter` was built from.
    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool;
}

/// A bloom filter policy with a fixed number of bits per key.
///
/// Uses double hashing: `h(i) = h1 + i * h2` where `h1` and `h2` are derived
/// from FNV-1a with two different seeds.
#[derive(Debug, Clone, Copy)]
pub struct BloomFilterPolicy {
    bits_per_key: usize,
    /// Number of probes (k).
    num_probes: u8,
}

impl BloomFilterPolicy {
    /// Creates a policy that spends `bits_per_key` bits per inserted key.
    ///
    /// The probe count is `bits_per_key * ln(2)`, clamped to `1..=30`.
    ///
    /// # Panics
    ///
    /// Panics if `bits_per_key` is 0.
    pub fn new(bits_per_key: usize) -> Self {
        assert!(bits_per_key > 0, "bits_per_key must be > 0");

        // Optimal number of hashes: k = (m/n) * ln(2)
        let k = (bits_per_key as f64 * std::f64::consts::LN_2) as usize;
        let k = k.clamp(1, MAX_PROBES as usize) as u8;

        Self {
            bits_per_key,
            num_probes: k,
        }
    }

    /// Returns the configured bits per key.
    #[must_use]
    pub fn bits_per_key(&self) -> usize {
        self.bits_per_key
    }

    /// Returns the number of probes written into new filters.
    #[must_use]
    pub fn num_probes(&self) -> u8 {
        self.num_probes
    }
}

impl Default for BloomFilterPolicy {
    fn default() -> Self {
        Self::new(10)
    }
}

impl FilterPolicy for BloomFilterPolicy {
    fn name(&self) -> &str {
        "sstable.BuiltinBloomFilter"
    }

    fn create_filter(&self, keys: &[&[u8]], dst: &mut Vec<u8>) {
        let bits = (keys.len() * self.bits_per_key).max(MIN_FILTER_BITS);
        let byte_len = (bits + 7) / 8;
        let num_bits = (byte_len * 8) as u64;

        let init = dst.len();
        dst.resize(init + byte_len, 0);
        dst.push(self.num_probes);

        let array = &mut dst[init..init + byte_len];
        for key in keys {
            let (h1, h2) = hash_pair(key);
            for i in 0..self.num_probes {
                set_bit(array, bit_index(h1, h2, i, num_bits));
            }
        }
    }

    fn key_may_match(&self, key: &[u8], filter: &[u8]) -> bool {
        let len = filter.len();
        if len < 2 {
            return false;
        }

        let k = filter[len - 1];
        if k > MAX_PROBES {
            // Reserved for newer encodings; consider it a match.
            return true;
        }

        let array = &filter[..len - 1];
        let num_bits = (array.len() * 8) as u64;
        let (h1, h2) = hash_pair(key);
        (0..k).all(|i| get_bit(array, bit_index(h1, h2, i, num_bits)))
    }
}

// ---- Internal helpers ----

/// Computes two independent 64-bit hashes using FNV-1a with different seeds.
fn hash_pair(key: &[u8]) -> (u64, u64) {
    let h1 = fnv1a_64(key, 0xcbf29ce484222325);
    let h2 = fnv1a_64(key, 0x517cc1b727220a95);
    (h1, h2)
}

/// Double hashing: h(i) = (h1 + i * h2) mod num_bits.
fn bit_index(h1: u64, h2: u64, i: u8, num_bits: u64) -> u64 {
    h1.wrapping_add((i as u64).wrapping_mul(h2)) % num_bits
}

fn set_bit(bits: &mut [u8], idx: u64) {
    let byte_idx = (idx / 8) as usize;
    let bit_offset = (idx % 8) as u8;
    bits[byte_idx] |= 1 << bit_offset;
}

fn get_bit(bits: &[u8], idx: u64) -> bool {
    let byte_idx = (idx / 8) as usize;
    let bit_offset = (idx % 8) as u8;
    (bits[byte_idx] >> bit_offset) & 1 == 1
}

/// FNV-1a 64-bit hash with a configurable starting basis.
fn fnv1a_64(data: &[u8], basis: u64) -> u64 {
    const FNV_PRIME: u64 = 0x00000100000001b3;
    let mut hash = basis;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests;
