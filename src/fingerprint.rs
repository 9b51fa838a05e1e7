//! Deterministic repository content fingerprints.
//!
//! A repository's `current_hash` is a pure function of its blocks'
//! `(title, description, content)` fields: blocks are ordered by
//! `(created_at, id)` and the three fields are concatenated with no
//! separators, `content` rendered as canonical JSON (recursively sorted
//! keys, compact). The digest is SHA-256, lowercase hex with a `0x` prefix.
//!
//! Recomputation happens after every block mutation. It is not transactional
//! with the mutation: two concurrent edits can leave a hash reflecting only
//! the last writer's read. Acceptable for an advisory fingerprint; anchoring
//! re-reads immediately before submission.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::Block;

/// Canonical byte sequence for a set of blocks.
pub fn canonicalize(blocks: &[Block]) -> Vec<u8> {
    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut out = Vec::new();
    for block in ordered {
        out.extend_from_slice(block.title.as_deref().unwrap_or("").as_bytes());
        out.extend_from_slice(block.description.as_deref().unwrap_or("").as_bytes());
        let mut content = String::new();
        write_canonical_json(&block.content, &mut content);
        out.extend_from_slice(content.as_bytes());
    }
    out
}

/// SHA-256 digest as `0x`-prefixed lowercase hex.
pub fn digest(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(Sha256::digest(bytes)))
}

/// The repository fingerprint: digest of the canonical block bytes.
pub fn repository_fingerprint(blocks: &[Block]) -> String {
    digest(&canonicalize(blocks))
}

/// Render JSON with object keys sorted recursively and no whitespace, so
/// logically equal content always yields identical bytes regardless of how
/// the map was ordered when it arrived.
fn write_canonical_json(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Display on Value::String produces the escaped JSON form.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical_json(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_json(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn block(id: u128, created_at: DateTime<Utc>, title: &str, content: Value) -> Block {
        Block {
            id: Uuid::from_u128(id),
            repo_id: Uuid::nil(),
            kind: "text".to_string(),
            title: Some(title.to_string()),
            description: Some(format!("{} description", title)),
            content,
            status: "in_review".to_string(),
            owner_address: "0xabc".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let blocks = vec![
            block(1, at(100), "a", json!({"x": 1})),
            block(2, at(200), "b", json!({"y": 2})),
        ];
        assert_eq!(canonicalize(&blocks), canonicalize(&blocks));
        assert_eq!(
            repository_fingerprint(&blocks),
            repository_fingerprint(&blocks)
        );
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = block(1, at(100), "a", json!({}));
        let b = block(2, at(200), "b", json!({}));
        let forward = canonicalize(&[a.clone(), b.clone()]);
        let reversed = canonicalize(&[b, a]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_id_breaks_created_at_ties() {
        let a = block(1, at(100), "a", json!({}));
        let b = block(2, at(100), "b", json!({}));
        let forward = canonicalize(&[a.clone(), b.clone()]);
        let reversed = canonicalize(&[b, a]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_content_key_order_is_irrelevant() {
        let c1: Value = serde_json::from_str(r#"{"a": 1, "b": {"d": 4, "c": 3}}"#).unwrap();
        let c2: Value = serde_json::from_str(r#"{"b": {"c": 3, "d": 4}, "a": 1}"#).unwrap();
        let h1 = repository_fingerprint(&[block(1, at(100), "t", c1)]);
        let h2 = repository_fingerprint(&[block(1, at(100), "t", c2)]);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_field_change_changes_digest() {
        let base = block(1, at(100), "title", json!({"k": "v"}));

        let mut changed_title = base.clone();
        changed_title.title = Some("other".to_string());
        let mut changed_desc = base.clone();
        changed_desc.description = Some("other".to_string());
        let mut changed_content = base.clone();
        changed_content.content = json!({"k": "w"});

        let original = repository_fingerprint(&[base]);
        assert_ne!(original, repository_fingerprint(&[changed_title]));
        assert_ne!(original, repository_fingerprint(&[changed_desc]));
        assert_ne!(original, repository_fingerprint(&[changed_content]));
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let mut b = block(1, at(100), "", json!({}));
        b.title = None;
        b.description = None;
        assert_eq!(canonicalize(&[b]), b"{}".to_vec());
    }

    #[test]
    fn test_digest_format() {
        let d = digest(b"hello");
        assert!(d.starts_with("0x"));
        assert_eq!(d.len(), 66);
        assert_eq!(d, d.to_lowercase());
        // SHA-256("hello"), fixed across processes and restarts.
        assert_eq!(
            d,
            "0x2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_canonical_json_escaping_and_scalars() {
        let mut out = String::new();
        write_canonical_json(&json!({"q": "a\"b", "n": 1.5, "t": true, "z": null}), &mut out);
        assert_eq!(out, r#"{"n":1.5,"q":"a\"b","t":true,"z":null}"#);
    }
}
