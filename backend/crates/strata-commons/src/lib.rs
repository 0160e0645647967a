//! # strata-commons
//!
//! Shared building blocks for the Strata live-query subsystem:
//!
//! - Type-safe identifiers ([`NamespaceId`], [`DatabaseId`], [`TableName`],
//!   [`ConnectionId`], [`LiveQueryId`])
//! - Authentication levels ([`AuthLevel`]) used by the permission gate
//! - Catalog definitions with table permissions ([`TableDefinition`])
//! - Order-preserving storage key encoding ([`StorageKey`], [`LiveQueryKey`])
//!
//! This crate has no knowledge of sockets, storage engines or sessions so that
//! every other crate in the workspace can depend on it.

pub mod models;
pub mod storage_key;

pub use models::{
    AuthLevel, ConnectionId, DatabaseDefinition, DatabaseId, LiveQueryId, LiveQueryKey,
    NamespaceDefinition, NamespaceId, PermissionExpression, PermissionRule, TableDefinition,
    TableName, TablePermissions, LIVE_QUERY_KEY_TAG,
};
pub use storage_key::{
    decode_key, encode_key, encode_prefix, escape_component, unescape_component, StorageKey,
};
