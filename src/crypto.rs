//! Hashing primitives for PowLedger
//!
//! Blocks are hashed over a canonical JSON encoding: every object has its keys
//! sorted, recursively, before the value is rendered. Two blocks with the same
//! logical content therefore hash identically no matter how their fields were
//! assembled.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::blockchain::Block;

/// Length of a hex encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// SHA-256 of `bytes`, rendered as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Rebuild `value` with the keys of every nested object in sorted order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Canonical byte encoding of a JSON value.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    canonicalize(value).to_string().into_bytes()
}

/// Digest of an arbitrary JSON value under the canonical encoding.
pub fn hash_json(value: &Value) -> String {
    sha256_hex(&canonical_bytes(value))
}

/// Digest of a block. Equivalent to `block.hash()`.
pub fn hash_block(block: &Block) -> String {
    hash_json(&block.to_json())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;
    use serde_json::json;

    fn sample_block() -> Block {
        Block {
            index: 2,
            timestamp: 1_700_000_000.25,
            transactions: vec![
                Transaction::new("alice", "bob", 5),
                Transaction::reward("miner"),
            ],
            proof: 35293,
            previous_hash: "ab".repeat(32),
        }
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex(b"").len(), HASH_HEX_LEN);
    }

    #[test]
    fn test_canonical_bytes_sort_nested_keys() {
        let value = json!({"b": 1, "a": {"d": [{"z": 0, "y": 1}], "c": 2}});
        let bytes = canonical_bytes(&value);
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"c":2,"d":[{"y":1,"z":0}]},"b":1}"#
        );
    }

    #[test]
    fn test_hash_ignores_field_order() {
        let block = sample_block();
        let reordered = json!({
            "transactions": [
                {"amount": 5, "recipient": "bob", "sender": "alice"},
                {"recipient": "miner", "amount": 1, "sender": "0"},
            ],
            "proof": 35293,
            "previous_hash": "ab".repeat(32),
            "timestamp": 1_700_000_000.25,
            "index": 2,
        });
        assert_eq!(hash_block(&block), hash_json(&reordered));
        assert_eq!(hash_block(&block), hash_block(&block.clone()));
        assert_eq!(hash_block(&block).len(), HASH_HEX_LEN);
    }

    #[test]
    fn test_hash_changes_with_any_field() {
        let base = sample_block();
        let original = hash_block(&base);

        let mut changed = base.clone();
        changed.index += 1;
        assert_ne!(hash_block(&changed), original);

        let mut changed = base.clone();
        changed.timestamp += 0.5;
        assert_ne!(hash_block(&changed), original);

        let mut changed = base.clone();
        changed.proof += 1;
        assert_ne!(hash_block(&changed), original);

        let mut changed = base.clone();
        changed.previous_hash = "cd".repeat(32);
        assert_ne!(hash_block(&changed), original);

        let mut changed = base.clone();
        changed.transactions[0].amount = 6;
        assert_ne!(hash_block(&changed), original);

        let mut changed = base;
        changed.transactions.reverse();
        assert_ne!(hash_block(&changed), original);
    }
}
