//! Type-safe identifier wrappers.

mod connection_id;
mod database_id;
mod live_query_id;
mod namespace_id;
mod table_name;

pub use connection_id::ConnectionId;
pub use database_id::DatabaseId;
pub use live_query_id::LiveQueryId;
pub use namespace_id::NamespaceId;
pub use table_name::TableName;
