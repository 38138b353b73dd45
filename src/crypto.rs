//! Block hashing for AuraChain
//!
//! A block's hash is the SHA-256 of its canonical JSON text. The canonical text is what
//! other AuraChain nodes on the network produce when serialising with sorted keys:
//!
//! - object keys sorted by code point at every level
//! - `", "` between items and `": "` between a key and its value
//! - every non-ASCII character escaped as `\uXXXX` (surrogate pairs above the BMP)
//! - floats in shortest round-trip form, positional with a trailing `.0` when the decimal
//!   exponent is in `-4..16`, otherwise scientific with a signed two-digit exponent (`1e-05`)
//!
//! Nodes therefore agree on every block hash regardless of implementation.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;

use crate::blockchain::Block;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hash of a block's canonical serialisation.
pub fn hash_block(block: &Block) -> String {
    sha256_hex(canonical_json(&block.to_json()).as_bytes())
}

/// Render `value` as canonical JSON text.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => write_float(f, out),
            _ => out.push_str(&n.to_string()),
        },
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Sort explicitly; the map's own iteration order depends on serde_json features.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(key, out);
                out.push_str(": ");
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

fn write_float(f: f64, out: &mut String) {
    // `{:e}` yields the shortest round-trip digits as `d[.ddd]e<exp>`.
    let scientific = format!("{:e}", f);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..16).contains(&exponent) {
        let positional = f.to_string();
        out.push_str(&positional);
        if !positional.contains('.') {
            out.push_str(".0");
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        let _ = write!(out, "{}e{}{:02}", mantissa, sign, exponent.abs());
    }
}

fn write_string(s: &str, out: &mut String) {
    // serde_json handles quoting and control-character escapes; non-ASCII is widened after.
    let quoted = Value::String(s.to_owned()).to_string();
    for c in quoted.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{:04x}", unit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{PreviousHash, Transaction};
    use serde_json::json;

    fn sample_block() -> Block {
        Block {
            index: 2,
            timestamp: 1700000000.5,
            transactions: vec![Transaction::new("alice", "bob", 5)],
            proof: 35293,
            previous_hash: PreviousHash::Digest("ab".repeat(32)),
        }
    }

    #[test]
    fn test_canonical_json_matches_network_text() {
        let genesis = Block {
            index: 1,
            timestamp: 1700000000.5,
            transactions: vec![],
            proof: 100,
            previous_hash: PreviousHash::Genesis,
        };
        assert_eq!(
            canonical_json(&genesis.to_json()),
            r#"{"index": 1, "previousHash": 1, "proof": 100, "timestamp": 1700000000.5, "transactions": []}"#
        );
    }

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let a = json!({"receiver": "b", "amount": 1, "sender": "a"});
        let b = json!({"sender": "a", "receiver": "b", "amount": 1});
        assert_eq!(canonical_json(&a), canonical_json(&b));
        assert_eq!(
            canonical_json(&a),
            r#"{"amount": 1, "receiver": "b", "sender": "a"}"#
        );
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        assert_eq!(canonical_json(&json!("é")), r#""\u00e9""#);
        assert_eq!(canonical_json(&json!("🔺")), r#""\ud83d\udd3a""#);
        assert_eq!(canonical_json(&json!("a\nb")), r#""a\nb""#);
    }

    #[test]
    fn test_float_text_matches_network_form() {
        assert_eq!(canonical_json(&json!({"amount": 0.00001})), r#"{"amount": 1e-05}"#);
        assert_eq!(canonical_json(&json!(0.0001)), "0.0001");
        assert_eq!(canonical_json(&json!(1e16)), "1e+16");
        assert_eq!(canonical_json(&json!(1e15)), "1000000000000000.0");
        assert_eq!(canonical_json(&json!(2.5)), "2.5");
        assert_eq!(canonical_json(&json!(3.0)), "3.0");
        assert_eq!(canonical_json(&json!(-1.5e-7)), "-1.5e-07");
        assert_eq!(canonical_json(&json!(1.25e100)), "1.25e+100");
        assert_eq!(canonical_json(&json!(5)), "5");
    }

    #[test]
    fn test_small_float_amount_uses_exponent_form() {
        let mut block = sample_block();
        block.transactions[0].amount = serde_json::Number::from_f64(0.00001).unwrap();
        let text = canonical_json(&block.to_json());
        assert!(text.contains(r#""amount": 1e-05"#));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let block = sample_block();
        let first = hash_block(&block);
        assert_eq!(first, hash_block(&block.clone()));
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_ignores_field_construction_order() {
        let from_struct = sample_block();
        let from_wire: Block = serde_json::from_value(json!({
            "transactions": [{"amount": 5, "receiver": "bob", "sender": "alice"}],
            "previousHash": "ab".repeat(32),
            "proof": 35293,
            "timestamp": 1700000000.5,
            "index": 2
        }))
        .unwrap();
        assert_eq!(hash_block(&from_struct), hash_block(&from_wire));
    }

    #[test]
    fn test_hash_changes_with_content() {
        let block = sample_block();
        let mut altered = block.clone();
        altered.proof += 1;
        assert_ne!(hash_block(&block), hash_block(&altered));
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
