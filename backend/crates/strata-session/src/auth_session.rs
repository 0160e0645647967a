//! Resolved identity of a connection.
//!
//! Authentication itself happens in the transport layer; by the time a socket
//! is created its [`AuthSession`] is final.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strata_commons::AuthLevel;

/// Connection metadata exposed to permission clauses as `$session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Option<String>,
    pub ip: Option<String>,
    pub origin: Option<String>,
}

/// The authenticated identity of one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub level: AuthLevel,
    /// Scope name for [`AuthLevel::Scope`] sessions.
    pub scope: Option<String>,
    /// The authenticated record (exposed as `$auth`).
    pub data: JsonValue,
    pub session: SessionInfo,
}

impl AuthSession {
    pub fn new(level: AuthLevel) -> Self {
        Self {
            level,
            scope: None,
            data: JsonValue::Null,
            session: SessionInfo::default(),
        }
    }

    pub fn root() -> Self {
        Self::new(AuthLevel::Root)
    }

    /// A session signed into `scope` as the record `data`.
    pub fn scoped(scope: impl Into<String>, data: JsonValue) -> Self {
        Self {
            level: AuthLevel::Scope,
            scope: Some(scope.into()),
            data,
            session: SessionInfo::default(),
        }
    }

    pub fn with_session(mut self, session: SessionInfo) -> Self {
        self.session = session;
        self
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new(AuthLevel::Anonymous)
    }
}
