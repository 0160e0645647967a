use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use strata_commons::LiveQueryId;

/// Method tag of every outbound notification message.
pub const NOTIFY_METHOD: &str = "notify";

/// Kind of change carried by a [`Dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    pub query: LiveQueryId,
    pub action: Action,
    pub result: JsonValue,
}

impl Dispatch {
    pub fn new(query: LiveQueryId, action: Action, result: JsonValue) -> Self {
        Self {
            query,
            action,
            result,
        }
    }
}

/// Message handed to a connection's notifier on flush.
///
/// Serializes as `{"method":"notify","params":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcNotification {
    pub method: String,
    pub params: Vec<Dispatch>,
}

impl RpcNotification {
    /// Wrap an ordered batch into a `notify` message.
    pub fn notify(params: Vec<Dispatch>) -> Self {
        Self {
            method: NOTIFY_METHOD.to_string(),
            params,
        }
    }
}
