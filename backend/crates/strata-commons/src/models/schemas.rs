//! Catalog definitions: namespaces, databases and tables with their permissions.

use serde::{Deserialize, Serialize};

use crate::models::{DatabaseId, NamespaceId, TableName};

/// A defined namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDefinition {
    pub name: NamespaceId,
}

/// A defined database inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDefinition {
    pub namespace_id: NamespaceId,
    pub name: DatabaseId,
}

/// A defined table inside a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub namespace_id: NamespaceId,
    pub database_id: DatabaseId,
    pub name: TableName,
    #[serde(default)]
    pub permissions: TablePermissions,
}

impl TableDefinition {
    pub fn new(
        namespace_id: NamespaceId,
        database_id: DatabaseId,
        name: TableName,
        permissions: TablePermissions,
    ) -> Self {
        Self {
            namespace_id,
            database_id,
            name,
            permissions,
        }
    }
}

/// Permission specification attached to a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TablePermissions {
    /// No permission clauses were defined. Scoped sessions get no access.
    #[default]
    Unspecified,
    /// Per-operation permission clauses.
    Expression(PermissionExpression),
}

/// Per-operation permission clauses of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionExpression {
    pub select: PermissionRule,
    pub create: PermissionRule,
    pub update: PermissionRule,
    pub delete: PermissionRule,
}

impl PermissionExpression {
    /// Same rule for every operation.
    pub fn uniform(rule: PermissionRule) -> Self {
        Self {
            select: rule.clone(),
            create: rule.clone(),
            update: rule.clone(),
            delete: rule,
        }
    }
}

/// One permission clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionRule {
    /// `FULL`
    Full,
    /// `NONE`
    None,
    /// `WHERE <condition>`, evaluated by an expression evaluator.
    Where(String),
}
