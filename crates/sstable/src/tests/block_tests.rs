use super::helpers::*;
use crate::coding::put_fixed32;
use crate::*;

// -------------------- Construction --------------------

#[test]
fn valid_block_keeps_its_size() {
    let raw = scenario_block();
    let len = raw.len();
    let block = owned_block(raw);
    assert_eq!(block.size(), len);
    assert_eq!(block.num_restarts(), 2);
}

#[test]
fn too_small_block_is_error_marker() {
    for raw in [vec![], vec![1], vec![1, 0, 0]] {
        let block = owned_block(raw);
        assert_eq!(block.size(), 0);
        assert_eq!(block.num_restarts(), 0);
    }
}

#[test]
fn oversized_restart_count_is_error_marker() {
    // 8 bytes can hold at most one restart offset.
    let mut raw = Vec::new();
    put_fixed32(&mut raw, 0);
    put_fixed32(&mut raw, 2);
    let block = owned_block(raw);
    assert_eq!(block.size(), 0);

    let cmp = BytewiseComparator;
    let mut iter = block.iter(&cmp);
    assert!(!iter.valid());
    assert!(iter.status().unwrap_err().is_corruption());
    iter.seek_to_first();
    assert!(!iter.valid());
    iter.seek(b"");
    assert!(!iter.valid());
    assert!(iter.status().unwrap_err().is_corruption());

    let mut raw = scenario_block();
    let len = raw.len();
    raw[len - 4..].copy_from_slice(&u32::MAX.to_le_bytes());
    let block = owned_block(raw);
    assert_eq!(block.size(), 0);
    let mut iter = block.iter(&cmp);
    iter.seek_to_last();
    assert!(!iter.valid());
    assert!(iter.status().unwrap_err().is_corruption());
}

#[test]
fn restart_count_exactly_at_limit_is_valid() {
    let mut raw = Vec::new();
    put_fixed32(&mut raw, 0);
    put_fixed32(&mut raw, 1);
    let block = owned_block(raw);
    assert_eq!(block.size(), 8);
    assert_eq!(block.num_restarts(), 1);
}

// -------------------- Ownership --------------------

#[test]
fn owned_and_borrowed_contents() {
    let raw = scenario_block();

    let borrowed = Block::new(BlockContents::borrowed(&raw));
    assert!(!borrowed.is_owned());
    assert!(!borrowed.is_cachable());

    let owned = owned_block(raw.clone());
    assert!(owned.is_owned());
    assert!(owned.is_cachable());

    let cmp = BytewiseComparator;
    let mut a = borrowed.iter(&cmp);
    let mut b = owned.iter(&cmp);
    a.seek_to_first();
    b.seek_to_first();
    while a.valid() {
        assert!(b.valid());
        assert_eq!(a.key(), b.key());
        assert_eq!(a.value(), b.value());
        a.next();
        b.next();
    }
    assert!(!b.valid());
}

#[test]
fn values_borrow_from_the_block_buffer() {
    let raw = scenario_block();
    let block = Block::new(BlockContents::borrowed(&raw));
    let cmp = BytewiseComparator;
    let mut iter = block.iter(&cmp);
    iter.seek_to_first();

    let value = iter.value();
    let range = raw.as_ptr_range();
    assert!(range.contains(&value.as_ptr()));
}

// -------------------- Iterator factory --------------------

#[test]
fn error_block_yields_corruption_iterator() {
    let block = owned_block(vec![0, 0]);
    let cmp = BytewiseComparator;
    let mut iter = block.iter(&cmp);
    assert!(!iter.valid());
    assert!(iter.status().unwrap_err().is_corruption());

    // Positioning calls are harmless no-ops.
    iter.seek_to_first();
    iter.seek_to_last();
    iter.seek(b"a");
    assert!(!iter.valid());
    assert!(iter.status().is_err());
}

#[test]
fn zero_restarts_yields_empty_iterator() {
    let block = owned_block(vec![0, 0, 0, 0]);
    assert_eq!(block.size(), 4);
    let cmp = BytewiseComparator;
    let mut iter = block.iter(&cmp);
    iter.seek_to_first();
    assert!(!iter.valid());
    iter.seek(b"");
    assert!(!iter.valid());
    assert!(iter.status().is_ok());
}

#[test]
fn block_without_entries_is_never_valid() {
    let raw = build_block::<&[u8], &[u8]>(&[], 16);
    let block = owned_block(raw);
    assert_eq!(block.num_restarts(), 1);
    let cmp = BytewiseComparator;
    let mut iter = block.iter(&cmp);
    iter.seek_to_first();
    assert!(!iter.valid());
    iter.seek_to_last();
    assert!(!iter.valid());
    iter.seek(b"anything");
    assert!(!iter.valid());
    assert!(iter.status().is_ok());
}

#[test]
fn iterators_are_independent() {
    let block = owned_block(scenario_block());
    let cmp = BytewiseComparator;
    let mut first = block.iter(&cmp);
    let mut last = block.iter(&cmp);
    first.seek_to_first();
    last.seek_to_last();
    assert_eq!(first.key(), b"key1");
    assert_eq!(last.key(), b"key3");
}

#[test]
fn block_is_shareable_across_threads() {
    let block = owned_block(scenario_block());
    let cmp = BytewiseComparator;
    std::thread::scope(|s| {
        for target in [b"key1", b"key2", b"key3"] {
            let block = &block;
            let cmp = &cmp;
            s.spawn(move || {
                let mut iter = block.iter(cmp);
                iter.seek(target);
                assert_eq!(iter.key(), target);
            });
        }
    });
}

#[test]
fn debug_impl_hides_payload() {
    let block = owned_block(scenario_block());
    let debug = format!("{:?}", block);
    assert!(debug.contains("Block"));
    assert!(debug.contains("num_restarts: 2"));
    assert!(!debug.contains("value1"));
}
