use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use strata_commons::{ConnectionId, LiveQueryId, TableName};

/// A LIVE/KILL target as produced by the parser, or after resolution.
///
/// LIVE acts on `Table` and `Ident`; KILL acts on `Text`. Everything else is
/// rejected with `UnsupportedTarget` once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Target {
    Table(TableName),
    Ident(String),
    /// `$name`, resolved from the execution context variables
    Param(String),
    Text(String),
    Value(JsonValue),
}

impl Target {
    /// Table named by this target, if it names one.
    pub fn table_name(&self) -> Option<TableName> {
        match self {
            Target::Table(name) => Some(name.clone()),
            Target::Ident(name) => Some(TableName::new(name.as_str())),
            Target::Param(_) | Target::Text(_) | Target::Value(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Table(name) => write!(f, "{}", name),
            Target::Ident(name) => write!(f, "{}", name),
            Target::Param(name) => write!(f, "${}", name),
            Target::Text(text) => write!(f, "\"{}\"", text),
            Target::Value(value) => write!(f, "{}", value),
        }
    }
}

/// A LIVE SELECT registration.
///
/// `id` and `connection` are stamped at registration time. The statement is
/// persisted once per watched table so the write path can route changes back
/// to the owning connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatement {
    #[serde(default)]
    pub id: Option<LiveQueryId>,
    #[serde(default)]
    pub connection: Option<ConnectionId>,
    pub what: Vec<Target>,
    /// Projection text, carried as parsed
    #[serde(default)]
    pub expr: Option<String>,
    /// WHERE condition text, carried as parsed
    #[serde(default)]
    pub cond: Option<String>,
}

impl LiveStatement {
    pub fn new(what: Vec<Target>) -> Self {
        Self {
            id: None,
            connection: None,
            what,
            expr: None,
            cond: None,
        }
    }

    pub fn with_expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn with_cond(mut self, cond: impl Into<String>) -> Self {
        self.cond = Some(cond.into());
        self
    }

    /// Tables this registration is persisted under.
    pub fn watched_tables(&self) -> Vec<TableName> {
        self.what.iter().filter_map(Target::table_name).collect()
    }
}

/// A KILL statement: each target should resolve to a live query id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillStatement {
    pub what: Vec<Target>,
}

impl KillStatement {
    pub fn new(what: Vec<Target>) -> Self {
        Self { what }
    }

    pub fn for_ids<'a>(ids: impl IntoIterator<Item = &'a LiveQueryId>) -> Self {
        Self::new(
            ids.into_iter()
                .map(|id| Target::Text(id.as_str().to_string()))
                .collect(),
        )
    }
}
