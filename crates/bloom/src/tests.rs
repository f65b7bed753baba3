use super::*;

fn build(policy: &BloomFilterPolicy, keys: &[&[u8]]) -> Vec<u8> {
    let mut filter = Vec::new();
    policy.create_filter(keys, &mut filter);
    filter
}

// -------------------- Construction --------------------

#[test]
fn new_derives_probe_count() {
    assert_eq!(BloomFilterPolicy::new(10).num_probes(), 6);
    assert_eq!(BloomFilterPolicy::new(1).num_probes(), 1);
    assert_eq!(BloomFilterPolicy::new(100).num_probes(), MAX_PROBES);
}

#[test]
#[should_panic(expected = "bits_per_key must be > 0")]
fn new_panics_on_zero_bits() {
    BloomFilterPolicy::new(0);
}

#[test]
fn default_uses_ten_bits_per_key() {
    let policy = BloomFilterPolicy::default();
    assert_eq!(policy.bits_per_key(), 10);
    assert_eq!(policy.name(), "sstable.BuiltinBloomFilter");
}

// -------------------- Create / Match --------------------

#[test]
fn empty_filter_matches_nothing() {
    let policy = BloomFilterPolicy::new(10);
    let filter = build(&policy, &[]);
    assert!(!policy.key_may_match(b"hello", &filter));
    assert!(!policy.key_may_match(b"", &filter));
}

#[test]
fn small_filter() {
    let policy = BloomFilterPolicy::new(10);
    let filter = build(&policy, &[b"hello".as_slice(), b"world".as_slice()]);
    assert!(policy.key_may_match(b"hello", &filter));
    assert!(policy.key_may_match(b"world", &filter));
    assert!(!policy.key_may_match(b"x", &filter));
    assert!(!policy.key_may_match(b"foo", &filter));
}

#[test]
fn filter_is_appended_after_existing_bytes() {
    let policy = BloomFilterPolicy::new(10);
    let mut dst = b"prefix".to_vec();
    policy.create_filter(&[b"k".as_slice()], &mut dst);
    assert!(dst.starts_with(b"prefix"));
    assert!(policy.key_may_match(b"k", &dst[6..]));
    // 64 bits minimum + probe byte
    assert_eq!(dst.len(), 6 + 8 + 1);
}

#[test]
fn many_keys_all_found() {
    let policy = BloomFilterPolicy::new(10);
    let keys: Vec<[u8; 8]> = (0..1000u64).map(|i| i.to_le_bytes()).collect();
    let refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
    let filter = build(&policy, &refs);
    for key in &refs {
        assert!(policy.key_may_match(key, &filter), "key {:?} should be found", key);
    }
}

#[test]
fn false_positive_rate_is_reasonable() {
    let policy = BloomFilterPolicy::new(10);
    let n = 10_000u64;
    let keys: Vec<[u8; 8]> = (0..n).map(|i| i.to_le_bytes()).collect();
    let refs: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();
    let filter = build(&policy, &refs);

    let mut false_positives = 0;
    for i in n..n * 2 {
        if policy.key_may_match(&i.to_le_bytes(), &filter) {
            false_positives += 1;
        }
    }

    // ~1% expected at 10 bits/key; allow statistical slack
    let actual_fpr = false_positives as f64 / n as f64;
    assert!(actual_fpr < 0.03, "FPR too high: {:.4}", actual_fpr);
}

#[test]
fn empty_and_binary_keys() {
    let policy = BloomFilterPolicy::new(10);
    let binary = [0u8, 1, 2, 255, 254, 253];
    let filter = build(&policy, &[b"".as_slice(), binary.as_slice()]);
    assert!(policy.key_may_match(b"", &filter));
    assert!(policy.key_may_match(&binary, &filter));
}

// -------------------- Malformed filters --------------------

#[test]
fn short_filter_never_matches() {
    let policy = BloomFilterPolicy::new(10);
    assert!(!policy.key_may_match(b"a", &[]));
    assert!(!policy.key_may_match(b"a", &[6]));
}

#[test]
fn reserved_probe_count_always_matches() {
    let policy = BloomFilterPolicy::new(10);
    let filter = [0u8, 0, 0, 0, MAX_PROBES + 1];
    assert!(policy.key_may_match(b"anything", &filter));
}

#[test]
fn reads_filters_written_with_other_settings() {
    let writer = BloomFilterPolicy::new(20);
    let reader = BloomFilterPolicy::new(5);
    let filter = build(&writer, &[b"alpha".as_slice(), b"beta".as_slice()]);
    assert!(reader.key_may_match(b"alpha", &filter));
    assert!(reader.key_may_match(b"beta", &filter));
}

#[test]
fn debug_impl_works() {
    let debug = format!("{:?}", BloomFilterPolicy::new(10));
    assert!(debug.contains("BloomFilterPolicy"));
    assert!(debug.contains("bits_per_key"));
}
