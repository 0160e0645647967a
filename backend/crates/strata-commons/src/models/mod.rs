//! Data models shared across Strata crates.

pub mod auth_level;
pub mod ids;
pub mod live_query_key;
pub mod schemas;

pub use auth_level::AuthLevel;
pub use ids::{ConnectionId, DatabaseId, LiveQueryId, NamespaceId, TableName};
pub use live_query_key::{LiveQueryKey, LIVE_QUERY_KEY_TAG};
pub use schemas::{
    DatabaseDefinition, NamespaceDefinition, PermissionExpression, PermissionRule, TableDefinition,
    TablePermissions,
};
