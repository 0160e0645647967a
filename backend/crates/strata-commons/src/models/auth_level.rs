//! Authentication levels of a connection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The trust level a session was authenticated at.
///
/// Variants are ordered from most to least trusted. Anything at
/// [`AuthLevel::Scope`] or below is subject to per-table permission checks;
/// root, namespace and database sessions bypass them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    /// Root (whole key-value store) access
    Root,
    /// Namespace-level access
    Namespace,
    /// Database-level access
    Database,
    /// Scoped access (end users signed into a scope)
    Scope,
    /// Unauthenticated
    Anonymous,
}

impl AuthLevel {
    /// Whether a session at this level must pass table permission checks.
    #[inline]
    pub fn requires_permission_checks(self) -> bool {
        self >= AuthLevel::Scope
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthLevel::Root => "root",
            AuthLevel::Namespace => "namespace",
            AuthLevel::Database => "database",
            AuthLevel::Scope => "scope",
            AuthLevel::Anonymous => "anonymous",
        }
    }
}

impl fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "root" | "kv" => Ok(AuthLevel::Root),
            "namespace" | "ns" => Ok(AuthLevel::Namespace),
            "database" | "db" => Ok(AuthLevel::Database),
            "scope" | "sc" => Ok(AuthLevel::Scope),
            "anonymous" | "no" => Ok(AuthLevel::Anonymous),
            other => Err(format!("Unknown auth level '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_check_threshold() {
        assert!(!AuthLevel::Root.requires_permission_checks());
        assert!(!AuthLevel::Namespace.requires_permission_checks());
        assert!(!AuthLevel::Database.requires_permission_checks());
        assert!(AuthLevel::Scope.requires_permission_checks());
        assert!(AuthLevel::Anonymous.requires_permission_checks());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("kv".parse::<AuthLevel>().unwrap(), AuthLevel::Root);
        assert_eq!("SC".parse::<AuthLevel>().unwrap(), AuthLevel::Scope);
        assert!("admin".parse::<AuthLevel>().is_err());
    }
}
