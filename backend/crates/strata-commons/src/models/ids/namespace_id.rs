//! Type-safe wrapper for namespace identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage_key::{
    decode_key, encode_key, escape_component, unescape_component, StorageKey,
};

/// Type-safe wrapper for namespace identifiers.
///
/// Ensures namespace IDs cannot be accidentally used where database IDs or table
/// names are expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(String);

impl NamespaceId {
    /// Creates a new NamespaceId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the namespace ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NamespaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NamespaceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NamespaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl StorageKey for NamespaceId {
    fn storage_key(&self) -> Vec<u8> {
        encode_key(&escape_component(self.as_str()))
    }

    fn from_storage_key(bytes: &[u8]) -> Result<Self, String> {
        unescape_component(&decode_key::<String>(bytes)?).map(NamespaceId)
    }
}
