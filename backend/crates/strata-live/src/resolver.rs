//! Resolution of raw LIVE/KILL targets against the execution context.

use crate::error::Result;
use crate::models::Target;
use serde_json::Value as JsonValue;
use strata_session::ExecutionContext;

/// Resolves a parsed target to a concrete table, identifier or value.
pub trait TargetResolver: Send + Sync {
    fn resolve(&self, ctx: &ExecutionContext, target: &Target) -> Result<Target>;
}

/// Substitutes `$param` targets from the context variables.
///
/// A string parameter becomes [`Target::Text`]; any other value, including an
/// unbound parameter (`NULL`), becomes [`Target::Value`]. Other targets are
/// returned unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextTargetResolver;

impl TargetResolver for ContextTargetResolver {
    fn resolve(&self, ctx: &ExecutionContext, target: &Target) -> Result<Target> {
        match target {
            Target::Param(name) => Ok(match ctx.variable(name) {
                Some(JsonValue::String(s)) => Target::Text(s.clone()),
                Some(value) => Target::Value(value.clone()),
                None => Target::Value(JsonValue::Null),
            }),
            Target::Value(JsonValue::String(s)) => Ok(Target::Text(s.clone())),
            Target::Table(_) | Target::Ident(_) | Target::Text(_) | Target::Value(_) => {
                Ok(target.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_commons::{AuthLevel, DatabaseId, NamespaceId, TableName};

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(AuthLevel::Root, NamespaceId::new("app"), DatabaseId::new("main"))
            .with_variable("id", json!("lq-1"))
            .with_variable("num", json!(7))
    }

    #[test]
    fn test_params_resolve_from_variables() {
        let resolver = ContextTargetResolver;
        assert_eq!(
            resolver.resolve(&ctx(), &Target::Param("id".into())).unwrap(),
            Target::Text("lq-1".into())
        );
        assert_eq!(
            resolver.resolve(&ctx(), &Target::Param("num".into())).unwrap(),
            Target::Value(json!(7))
        );
        assert_eq!(
            resolver.resolve(&ctx(), &Target::Param("missing".into())).unwrap(),
            Target::Value(JsonValue::Null)
        );
    }

    #[test]
    fn test_tables_pass_through() {
        let table = Target::Table(TableName::new("person"));
        assert_eq!(ContextTargetResolver.resolve(&ctx(), &table).unwrap(), table);
    }
}
