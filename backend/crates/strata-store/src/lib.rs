//! # strata-store
//!
//! Key-value store abstraction consumed by the live-query subsystem.
//!
//! ## Architecture
//!
//! ```text
//! strata-live (lifecycle manager)
//!     ↓
//! StorageTransaction (begin / get / put / clr / commit)
//!     ↓
//! StorageBackend (pluggable engine, InMemoryBackend included)
//! ```
//!
//! The crate only invokes the engine; isolation and durability are the
//! backend's concern. [`StorageBackend::batch`] is the single atomic primitive a
//! transaction commits through.

pub mod catalog;
pub mod in_memory;
pub mod storage_trait;
pub mod transaction;

pub use catalog::{Catalog, StoreCatalog, CATALOG_PARTITION};
pub use in_memory::InMemoryBackend;
pub use storage_trait::{KvIterator, Operation, Partition, Result, StorageBackend, StorageError};
pub use transaction::StorageTransaction;

// Make test_utils available for testing in dependent crates
pub mod test_utils;

// Re-export StorageKey from strata-commons to avoid import inconsistency
pub use strata_commons::StorageKey;
