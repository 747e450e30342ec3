//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the addressing, round-trip, expiry and counter
//! properties of the filesystem store.

use std::path::Path;

use chrono::Duration;
use proptest::prelude::*;
use tempfile::TempDir;

use crate::cache::{path_for, FsStore, Value};
use crate::error::CacheError;

// == Strategies ==
/// Generates arbitrary non-empty keys, including non-ASCII text
fn key_strategy() -> impl Strategy<Value = String> {
    "\\PC{1,64}"
}

/// Generates payloads of every kind, including arbitrary finite floats
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::UInt),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,128}".prop_map(Value::String),
    ]
}

fn test_store() -> (TempDir, FsStore) {
    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path().join("cache")).unwrap();
    (dir, store)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Paths are a pure function of the key: same key, same path, with the
    // three two-character fan-out levels taken from the digest prefix.
    #[test]
    fn prop_path_layout(key in key_strategy()) {
        let root = Path::new("/cache");
        let path = path_for(root, &key);
        prop_assert_eq!(&path, &path_for(root, &key));

        let rel = path.strip_prefix(root).unwrap();
        let parts: Vec<&str> = rel.iter().map(|p| p.to_str().unwrap()).collect();
        prop_assert_eq!(parts.len(), 4);

        let digest = parts[3];
        prop_assert_eq!(digest.len(), 32);
        prop_assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        prop_assert_eq!(parts[0], &digest[0..2]);
        prop_assert_eq!(parts[1], &digest[2..4]);
        prop_assert_eq!(parts[2], &digest[4..6]);
    }

    #[test]
    fn prop_distinct_keys_distinct_paths(a in key_strategy(), b in key_strategy()) {
        prop_assume!(a != b);
        let root = Path::new("/cache");
        prop_assert_ne!(path_for(root, &a), path_for(root, &b));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Set followed by Get returns exactly the stored value.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let (_dir, store) = test_store();

        store.set(&key, value.clone(), Duration::hours(1)).unwrap();

        prop_assert_eq!(store.get(&key).unwrap(), value);
    }

    // A later Set replaces the earlier value.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let (_dir, store) = test_store();

        store.set(&key, value1, Duration::hours(1)).unwrap();
        store.set(&key, value2.clone(), Duration::hours(1)).unwrap();

        prop_assert_eq!(store.get(&key).unwrap(), value2);
    }

    // Non-positive TTLs are misses on first read, and the file is gone after.
    #[test]
    fn prop_non_positive_ttl_is_collected(
        key in key_strategy(),
        value in value_strategy(),
        ttl_secs in -3600i64..=0
    ) {
        let (_dir, store) = test_store();

        store.set(&key, value, Duration::seconds(ttl_secs)).unwrap();

        prop_assert!(matches!(store.get(&key), Err(CacheError::Expired(_))));
        prop_assert!(!store.path_for(&key).exists());
        prop_assert!(matches!(store.get(&key), Err(CacheError::NotFound(_))));
    }

    // Delete never fails, whether or not the key was set.
    #[test]
    fn prop_delete_idempotent(key in key_strategy(), set_first in any::<bool>()) {
        let (_dir, store) = test_store();

        if set_first {
            store.set(&key, Value::Int(1), Duration::hours(1)).unwrap();
        }

        prop_assert!(store.delete(&key).is_ok());
        prop_assert!(store.delete(&key).is_ok());
        prop_assert!(store.get(&key).unwrap_err().is_miss());
    }

    // Flush clears every key.
    #[test]
    fn prop_flush_clears_all(keys in prop::collection::vec(key_strategy(), 1..10)) {
        let (_dir, store) = test_store();

        for key in &keys {
            store.set(key, Value::from(key.as_str()), Duration::hours(1)).unwrap();
        }
        store.flush().unwrap();

        for key in &keys {
            prop_assert!(store.get(key).unwrap_err().is_miss());
        }
    }

    // Counters follow i64 wrapping arithmetic and keep their expiry.
    #[test]
    fn prop_counter_arithmetic(
        key in key_strategy(),
        start in any::<i64>(),
        up in 0u64..1_000_000,
        down in 0u64..1_000_000
    ) {
        let (_dir, store) = test_store();

        store.set(&key, Value::Int(start), Duration::hours(1)).unwrap();
        let path = store.path_for(&key);
        let before = crate::cache::CacheItem::from_bytes(&std::fs::read(&path).unwrap())
            .unwrap()
            .expires_at;

        store.increment(&key, up).unwrap();
        store.decrement(&key, down).unwrap();

        let expected = start.wrapping_add(up as i64).wrapping_sub(down as i64);
        prop_assert_eq!(store.get(&key).unwrap(), Value::Int(expected));

        let after = crate::cache::CacheItem::from_bytes(&std::fs::read(&path).unwrap())
            .unwrap()
            .expires_at;
        prop_assert_eq!(before, after);
    }

    // Counters on non-numeric payloads fail and leave the bytes untouched.
    #[test]
    fn prop_non_numeric_counter_rejected(key in key_strategy(), text in "[a-z]{0,32}") {
        let (_dir, store) = test_store();

        store.set(&key, Value::String(text), Duration::hours(1)).unwrap();
        let path = store.path_for(&key);
        let before = std::fs::read(&path).unwrap();

        let is_type_mismatch = matches!(
            store.increment(&key, 1),
            Err(CacheError::TypeMismatch { .. })
        );
        prop_assert!(is_type_mismatch);
        prop_assert_eq!(std::fs::read(&path).unwrap(), before);
    }
}
