//! Table permission gate.
//!
//! Decides whether a session may observe a table before a live query is
//! registered against it.
//!
//! # Access Rules
//! - **Root / Namespace / Database** sessions: always allowed, no lookups
//! - **Scope / Anonymous** sessions: the namespace, database and table must
//!   exist, and the table's `select` clause must evaluate to true
//! - A table without permission clauses denies scoped sessions

use crate::context::ExecutionContext;
use crate::error::{SessionError, SessionResult};
use log::debug;
use std::sync::Arc;
use strata_commons::{DatabaseId, NamespaceId, PermissionRule, TableName, TablePermissions};
use strata_store::Catalog;

/// Evaluates a single permission clause against a context.
pub trait PermissionEvaluator: Send + Sync {
    fn evaluate(
        &self,
        ctx: &ExecutionContext,
        rule: &PermissionRule,
        table: &TableName,
    ) -> SessionResult<bool>;
}

/// Evaluator for `FULL` / `NONE` clauses.
///
/// `WHERE` clauses need the query engine; without it they fail closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticPermissionEvaluator;

impl PermissionEvaluator for StaticPermissionEvaluator {
    fn evaluate(
        &self,
        _ctx: &ExecutionContext,
        rule: &PermissionRule,
        table: &TableName,
    ) -> SessionResult<bool> {
        match rule {
            PermissionRule::Full => Ok(true),
            PermissionRule::None => Ok(false),
            PermissionRule::Where(cond) => {
                debug!(
                    "No expression engine for WHERE clause on table '{}' ({}); denying",
                    table, cond
                );
                Ok(false)
            }
        }
    }
}

pub struct PermissionChecker {
    catalog: Arc<dyn Catalog>,
    evaluator: Arc<dyn PermissionEvaluator>,
}

impl PermissionChecker {
    pub fn new(catalog: Arc<dyn Catalog>, evaluator: Arc<dyn PermissionEvaluator>) -> Self {
        Self { catalog, evaluator }
    }

    /// Check that the session behind `ctx` may select from `ns.db.table`.
    pub fn check(
        &self,
        ctx: &ExecutionContext,
        ns: &NamespaceId,
        db: &DatabaseId,
        table: &TableName,
    ) -> SessionResult<()> {
        if !ctx.auth_level().requires_permission_checks() {
            return Ok(());
        }

        if self.catalog.get_namespace(ns)?.is_none() {
            return Err(SessionError::NotFound(format!(
                "The namespace '{}' does not exist",
                ns
            )));
        }

        if self.catalog.get_database(ns, db)?.is_none() {
            return Err(SessionError::NotFound(format!(
                "The database '{}' does not exist",
                db
            )));
        }

        let definition = self.catalog.get_table(ns, db, table)?.ok_or_else(|| {
            SessionError::NotFound(format!("The table '{}' does not exist", table))
        })?;

        match &definition.permissions {
            TablePermissions::Expression(perms) => {
                if self.evaluator.evaluate(ctx, &perms.select, &definition.name)? {
                    Ok(())
                } else {
                    Err(SessionError::PermissionDenied {
                        table: table.to_string(),
                    })
                }
            }
            TablePermissions::Unspecified => Err(SessionError::PermissionDenied {
                table: table.to_string(),
            }),
        }
    }
}
