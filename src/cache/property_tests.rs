//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify key derivation and freshness invariants.

use std::collections::BTreeMap;
use std::path::PathBuf;

use proptest::prelude::*;

use crate::cache::{current_timestamp_ms, derive_key, file_name_for, CacheEntry, KEY_LENGTH};
use crate::models::DownloadOptions;

// == Strategies ==
/// Generates plausible remote image URIs
fn uri_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,10}",
        "[a-z0-9]{1,12}",
        prop_oneof![Just(""), Just(".png"), Just(".jpeg"), Just(".webp")],
    )
        .prop_map(|(host, name, ext)| format!("https://{host}.example/images/{name}{ext}"))
}

/// Generates header maps of varying size
fn headers_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[A-Za-z-]{1,12}", "[a-zA-Z0-9 /=_-]{0,16}", 0..4)
}

fn options_with(headers: BTreeMap<String, String>) -> DownloadOptions {
    DownloadOptions {
        headers,
        method: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Identical (uri, headers) pairs always derive the same key, the basis
    // for both dedup and stable on-disk addressing.
    #[test]
    fn prop_key_derivation_is_deterministic(
        uri in uri_strategy(),
        headers in headers_strategy()
    ) {
        let options = options_with(headers);
        let first = derive_key(&uri, &options).unwrap();
        let second = derive_key(&uri, &options).unwrap();
        prop_assert_eq!(first, second, "Key derivation must be deterministic");
    }

    // Derived filenames are safe to place in a flat cache directory: fixed
    // hex prefix, no separators, bounded extension.
    #[test]
    fn prop_derived_file_names_are_filesystem_safe(
        uri in uri_strategy(),
        headers in headers_strategy()
    ) {
        let options = options_with(headers);
        let key = derive_key(&uri, &options).unwrap();
        let file_name = file_name_for(&uri, &key);

        prop_assert_eq!(key.len(), KEY_LENGTH);
        prop_assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        prop_assert!(!file_name.contains('/') && !file_name.contains('\\'));
        prop_assert!(file_name.len() <= KEY_LENGTH + 6, "Extension must stay bounded");
        prop_assert!(file_name.starts_with(&key));
    }

    // Requests with different content-relevant options must not share a
    // cached file.
    #[test]
    fn prop_distinct_headers_yield_distinct_keys(
        uri in uri_strategy(),
        a in headers_strategy(),
        b in headers_strategy()
    ) {
        prop_assume!(a != b);
        let key_a = derive_key(&uri, &options_with(a)).unwrap();
        let key_b = derive_key(&uri, &options_with(b)).unwrap();
        prop_assert_ne!(key_a, key_b, "Different options must partition the cache");
    }

    // The freshness predicate matches the arithmetic definition
    // `age <= max_age` for any age/window pair.
    #[test]
    fn prop_freshness_matches_window(
        age_ms in 0u64..100_000_000,
        max_age_secs in 0u64..100_000
    ) {
        // Keep a margin around the boundary so wall-clock progress between
        // entry construction and the check cannot flip the expectation
        let window_ms = max_age_secs * 1000;
        prop_assume!(age_ms.abs_diff(window_ms) > 5_000);

        let entry = CacheEntry {
            path: PathBuf::from("/cache/k"),
            modification_time_ms: current_timestamp_ms().saturating_sub(age_ms),
            size: 1,
        };

        let expected = age_ms <= window_ms;
        prop_assert_eq!(entry.is_fresh(Some(max_age_secs)), expected);
        prop_assert!(entry.is_fresh(None), "No window means never stale");
    }
}
