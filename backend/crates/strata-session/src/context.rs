//! Per-request execution context.

use crate::auth_session::AuthSession;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use strata_commons::{AuthLevel, DatabaseId, NamespaceId};

/// Variable holding server environment information.
pub const VAR_ENV: &str = "ENV";
/// Variable holding the authenticated record.
pub const VAR_AUTH: &str = "auth";
/// Variable holding the scope name.
pub const VAR_SCOPE: &str = "scope";
/// Variable holding connection metadata.
pub const VAR_SESSION: &str = "session";

/// Execution context handed to permission checks and target resolution.
///
/// Built per request from the connection's [`AuthSession`]; carries the auth
/// level plus a variable namespace (`$auth`, `$scope`, `$session`, `$ENV` and
/// statement parameters).
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    auth_level: AuthLevel,
    namespace_id: NamespaceId,
    database_id: DatabaseId,
    variables: HashMap<String, JsonValue>,
}

impl ExecutionContext {
    pub fn new(auth_level: AuthLevel, namespace_id: NamespaceId, database_id: DatabaseId) -> Self {
        Self {
            auth_level,
            namespace_id,
            database_id,
            variables: HashMap::new(),
        }
    }

    /// Build the context of a connection operating in `ns`/`db`.
    pub fn from_session(
        auth: &AuthSession,
        namespace_id: NamespaceId,
        database_id: DatabaseId,
    ) -> Self {
        let mut ctx = Self::new(auth.level, namespace_id, database_id);
        ctx.set_variable(
            VAR_ENV,
            serde_json::json!({
                "server": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }),
        );
        ctx.set_variable(VAR_AUTH, auth.data.clone());
        ctx.set_variable(
            VAR_SCOPE,
            auth.scope
                .as_ref()
                .map(|s| JsonValue::String(s.clone()))
                .unwrap_or(JsonValue::Null),
        );
        ctx.set_variable(
            VAR_SESSION,
            serde_json::to_value(&auth.session).unwrap_or(JsonValue::Null),
        );
        ctx
    }

    pub fn auth_level(&self) -> AuthLevel {
        self.auth_level
    }

    pub fn namespace_id(&self) -> &NamespaceId {
        &self.namespace_id
    }

    pub fn database_id(&self) -> &DatabaseId {
        &self.database_id
    }

    pub fn variable(&self, name: &str) -> Option<&JsonValue> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: JsonValue) {
        self.variables.insert(name.into(), value);
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.set_variable(name, value);
        self
    }
}
