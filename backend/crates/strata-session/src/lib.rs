//! # strata-session
//!
//! Session identity, execution context and permissions for Strata.
//!
//! This crate provides:
//! - [`AuthSession`]: the already-resolved identity of a connection
//! - [`ExecutionContext`]: per-request auth level, scope and variables
//! - [`PermissionChecker`]: the table permission gate applied to scoped sessions
//!
//! ## Security Philosophy
//!
//! - **Fail Closed**: a scoped session gets access to a table only when the
//!   table exists and its `select` clause evaluates to true.
//! - Root, namespace and database sessions are trusted and bypass table checks.

pub mod auth_session;
pub mod context;
pub mod error;
pub mod permissions;

pub use auth_session::{AuthSession, SessionInfo};
pub use context::{ExecutionContext, VAR_AUTH, VAR_ENV, VAR_SCOPE, VAR_SESSION};
pub use error::{SessionError, SessionResult};
pub use permissions::{PermissionChecker, PermissionEvaluator, StaticPermissionEvaluator};
