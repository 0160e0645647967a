//! Identifier of a live query registration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a live query registration.
///
/// Generated once when a LIVE statement is registered and stable for the
/// lifetime of the registration. The value has no required structure beyond
/// global uniqueness (the default generator produces UUID v4 strings), and it
/// is the string a client later passes to KILL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiveQueryId(String);

impl LiveQueryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the live query ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for LiveQueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LiveQueryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LiveQueryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for LiveQueryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
