use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for client connections (sockets).
///
/// Assigned by the transport when a connection is accepted. Used as the key of
/// the socket registry and stamped on every live query the connection owns so
/// that notifications can be routed back to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create a new connection ID from a unique identifier
    #[inline]
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self(unique_id.into())
    }

    /// Parse from string format
    pub fn from_string(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("ConnectionId cannot be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }

    /// Get the connection ID as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_rejects_empty() {
        assert!(ConnectionId::from_string("").is_err());
        assert_eq!(ConnectionId::from_string("conn-1").unwrap().as_str(), "conn-1");
    }
}
