//! Fixture encoders mirroring the on-disk formats.

use bloom::FilterPolicy;

use crate::coding::put_fixed32;
use crate::entry::encode_entry;
use crate::{Block, BlockContents};

/// Encodes `entries` (already sorted) as a block with a restart point every
/// `restart_interval` entries. An empty input still gets restart 0.
pub fn build_block<K, V>(entries: &[(K, V)], restart_interval: usize) -> Vec<u8>
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    assert!(restart_interval > 0);
    let mut buf = Vec::new();
    let mut restarts = Vec::new();
    let mut last_key: &[u8] = &[];

    for (i, (k, v)) in entries.iter().enumerate() {
        let key = k.as_ref();
        let shared = if i % restart_interval == 0 {
            restarts.push(buf.len() as u32);
            0
        } else {
            common_prefix_len(last_key, key)
        };
        encode_entry(&mut buf, shared, &key[shared..], v.as_ref());
        last_key = key;
    }

    if restarts.is_empty() {
        restarts.push(0);
    }
    for r in &restarts {
        put_fixed32(&mut buf, *r);
    }
    put_fixed32(&mut buf, restarts.len() as u32);
    buf
}

pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

pub fn owned_block(raw: Vec<u8>) -> Block<'static> {
    Block::new(BlockContents::owned(raw))
}

/// `key1`, `key2`, `key3` with restart points before `key1` and `key3`.
pub fn scenario_block() -> Vec<u8> {
    build_block(
        &[
            (b"key1".as_slice(), b"value1".as_slice()),
            (b"key2".as_slice(), b"value2".as_slice()),
            (b"key3".as_slice(), b"value3".as_slice()),
        ],
        2,
    )
}

/// Encodes a filter block the way a table writer lays one out: data blocks
/// start at the given file offsets (ascending) and contribute their keys to
/// filter `offset >> base_lg`.
pub fn build_filter_block(
    policy: &dyn FilterPolicy,
    blocks: &[(u64, Vec<&[u8]>)],
    base_lg: u8,
) -> Vec<u8> {
    let mut result = Vec::new();
    let mut filter_offsets: Vec<u32> = Vec::new();
    let mut pending: Vec<&[u8]> = Vec::new();

    for (block_offset, keys) in blocks {
        let filter_index = block_offset.checked_shr(u32::from(base_lg)).unwrap_or(0) as usize;
        while filter_index > filter_offsets.len() {
            generate_filter(policy, &mut result, &mut filter_offsets, &mut pending);
        }
        pending.extend(keys.iter().copied());
    }
    if !pending.is_empty() {
        generate_filter(policy, &mut result, &mut filter_offsets, &mut pending);
    }

    let array_start = result.len() as u32;
    for offset in &filter_offsets {
        put_fixed32(&mut result, *offset);
    }
    put_fixed32(&mut result, array_start);
    result.push(base_lg);
    result
}

fn generate_filter<'k>(
    policy: &dyn FilterPolicy,
    result: &mut Vec<u8>,
    offsets: &mut Vec<u32>,
    keys: &mut Vec<&'k [u8]>,
) {
    offsets.push(result.len() as u32);
    if !keys.is_empty() {
        policy.create_filter(keys, result);
        keys.clear();
    }
}

/// Test policy whose filter is the exact key set, so verdicts have no
/// false positives: `[len: u8][key]...`.
pub struct ExactSetPolicy;

impl FilterPolicy for ExactSetPolicy {
    fn name(&self) -> &str {
        "test.ExactSet"
    }

    fn create_filter(&self, keys: &[&[u8]], dst: &mut Vec<u8>) {
        for key in keys {
            dst.push(key.len() as u8);
            dst.extend_from_slice(key);
        }
    }

    fn key_may_match(&self, key: &[u8], mut filter: &[u8]) -> bool {
        while let Some((&len, rest)) = filter.split_first() {
            let len = len as usize;
            if rest.len() < len {
                return false;
            }
            if &rest[..len] == key {
                return true;
            }
            filter = &rest[len..];
        }
        false
    }
}
