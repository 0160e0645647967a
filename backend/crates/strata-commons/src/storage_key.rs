//! Storage key trait for type-safe key serialization with lexicographic ordering
//!
//! Keys are serialized with the `storekey` crate, which preserves the natural
//! ordering of strings and tuples. A tuple `(a, b)` encodes to a byte prefix
//! of `(a, b, c)`, which is what makes prefix scans over composite keys work.
//!
//! storekey writes each string followed by a `0x00` terminator and does not
//! escape `0x00` inside the string, so `("a\0b", "c")` and `("a", "b\0c")`
//! would share an encoding. String components of a key therefore go through
//! [`escape_component`] first: `0x01` becomes `0x01 0x02` and `0x00` becomes
//! `0x01 0x01`. The escaped text holds no `0x00` and sorts like the original.
//!
//! ```rust,ignore
//! use strata_commons::{encode_key, decode_key};
//!
//! let key = encode_key(&("app", "main"));
//! let (ns, db): (String, String) = decode_key(&key)?;
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;

const ESCAPE: char = '\u{1}';

/// Encode a value to bytes using storekey's order-preserving format.
///
/// Supported inputs are strings, integers, options, tuples and vecs of those.
pub fn encode_key<T: Serialize>(value: &T) -> Vec<u8> {
    storekey::serialize(value).expect("storekey encoding should not fail for valid types")
}

/// Encode a value as a prefix for range scans.
///
/// Identical to [`encode_key`], the name only documents intent. For a key
/// `(ns, db, table, id)` encode `(ns, db, table)` to scan one table.
pub fn encode_prefix<T: Serialize>(value: &T) -> Vec<u8> {
    encode_key(value)
}

/// Decode a value from storekey-encoded bytes.
pub fn decode_key<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    storekey::deserialize(bytes).map_err(|e| format!("storekey decode error: {:?}", e))
}

/// Escape a string component so it contains no `0x00` byte.
pub fn escape_component(s: &str) -> Cow<'_, str> {
    if !s.contains(['\u{0}', ESCAPE]) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\u{0}' => out.push_str("\u{1}\u{1}"),
            ESCAPE => out.push_str("\u{1}\u{2}"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse of [`escape_component`].
pub fn unescape_component(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\u{1}') => out.push('\u{0}'),
            Some('\u{2}') => out.push(ESCAPE),
            other => return Err(format!("Invalid key escape sequence: {:?}", other)),
        }
    }
    Ok(out)
}

/// Trait for keys that can be serialized for storage.
///
/// Composite keys MUST encode every component (use [`encode_key`] with a
/// tuple of [`escape_component`] strings) so that two distinct keys never
/// share an encoding.
pub trait StorageKey: Clone + Send + Sync + 'static {
    /// Serialize this key to bytes for storage using order-preserving encoding.
    fn storage_key(&self) -> Vec<u8>;

    /// Deserialize this key from bytes
    fn from_storage_key(bytes: &[u8]) -> Result<Self, String>
    where
        Self: Sized;
}

impl StorageKey for String {
    fn storage_key(&self) -> Vec<u8> {
        encode_key(&escape_component(self))
    }

    fn from_storage_key(bytes: &[u8]) -> Result<Self, String> {
        unescape_component(&decode_key::<String>(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_key_roundtrip() {
        let key = "alice".to_string();
        let bytes = key.storage_key();
        assert_eq!(String::from_storage_key(&bytes).unwrap(), "alice");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        // A naive length-prefixed encoding would sort "bob" before "alice"
        let alice = encode_key(&"alice");
        let bob = encode_key(&"bob");
        assert!(alice < bob);
    }

    #[test]
    fn test_tuple_prefix() {
        let full = encode_key(&("app", "main", "person"));
        let prefix = encode_prefix(&("app", "main"));
        assert!(full.starts_with(&prefix));

        // "mai" must not be a prefix match for "main"
        let partial = encode_prefix(&("app", "mai"));
        assert!(!full.starts_with(&partial));
    }

    #[test]
    fn test_escape_roundtrip() {
        for raw in ["plain", "a\0b", "\u{1}", "\0\u{1}\u{2}x", ""] {
            let escaped = escape_component(raw);
            assert!(!escaped.contains('\0'));
            assert_eq!(unescape_component(&escaped).unwrap(), raw);
        }
        assert!(matches!(escape_component("plain"), Cow::Borrowed(_)));
        assert!(unescape_component("\u{1}x").is_err());
    }

    #[test]
    fn test_escape_preserves_order() {
        let mut raw = vec!["a", "a\0", "a\u{1}", "a\u{2}", "a\0z", "ab", "\0"];
        raw.sort();
        let mut encoded: Vec<Vec<u8>> = raw
            .iter()
            .map(|s| encode_key(&escape_component(s)))
            .collect();
        let in_order = encoded.clone();
        encoded.sort();
        assert_eq!(encoded, in_order);
    }

    #[test]
    fn test_string_key_with_nul_roundtrip() {
        let key = "a\0b".to_string();
        assert_eq!(String::from_storage_key(&key.storage_key()).unwrap(), key);
    }
}
