//! Canonical serialization for deterministic fingerprints.
//!
//! Dataset fingerprints and policy parameter hashes are xxh64 digests of
//! canonical JSON.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: struct fields serialize in declaration order
//! - Stable map order: hashed data uses `BTreeMap`/`BTreeSet`, never `HashMap`
//! - Integer-only policy parameters, so no float formatting drift

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes.
///
/// Values that cannot be represented as JSON (maps with non-string keys)
/// serialize to an empty byte string, so they all share one fingerprint.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "canonical serialization failed");
        Vec::new()
    })
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}

/// Compute canonical hash and return as a 16-character hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_determinism() {
        let mut stats = BTreeMap::new();
        stats.insert("reasoning", 3u64);
        stats.insert("planning", 1u64);

        assert_eq!(canonical_hash(&stats), canonical_hash(&stats.clone()));
    }

    #[test]
    fn test_btreemap_insertion_order_irrelevant() {
        let mut a = BTreeMap::new();
        a.insert("x", 1);
        a.insert("y", 2);

        let mut b = BTreeMap::new();
        b.insert("y", 2);
        b.insert("x", 1);

        assert_eq!(canonical_hash_hex(&a), canonical_hash_hex(&b));
    }

    #[test]
    fn test_hex_width() {
        assert_eq!(canonical_hash_hex(&"anything").len(), 16);
    }
}
