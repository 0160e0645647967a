//! Storage backend abstraction for pluggable storage implementations.
//!
//! The `StorageBackend` trait defines the operations the live-query subsystem
//! needs from an engine:
//! - get/put/delete for key-value access
//! - batch for atomic multi-operation writes
//! - scan for prefix queries
//! - partition management
//!
//! ## Partition Model
//!
//! Backends map a [`Partition`] to their native concept (column family, tree,
//! key prefix, in-memory map). Live query registrations live in their own
//! partition so the write path can scan them without touching table data.
//!
//! ## Example Usage
//!
//! ```rust
//! use strata_store::{InMemoryBackend, Partition, StorageBackend};
//!
//! let backend = InMemoryBackend::new();
//! let partition = Partition::new("live_queries");
//! backend.create_partition(&partition).unwrap();
//! backend.put(&partition, b"key", b"value").unwrap();
//! assert_eq!(backend.get(&partition, b"key").unwrap(), Some(b"value".to_vec()));
//! ```

use std::fmt;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Iterator over `(key, value)` pairs returned by [`StorageBackend::scan`].
pub type KvIterator<'a> = Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + Send + 'a>;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Partition not found
    PartitionNotFound(String),

    /// Generic I/O error from underlying storage
    IoError(String),

    /// Serialization/deserialization error
    SerializationError(String),

    /// Write attempted through a read-only transaction
    ReadOnlyTransaction,

    /// Other errors
    Other(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::PartitionNotFound(p) => write!(f, "Partition not found: {}", p),
            StorageError::IoError(msg) => write!(f, "I/O error: {}", msg),
            StorageError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::ReadOnlyTransaction => {
                write!(f, "Cannot write through a read-only transaction")
            }
            StorageError::Other(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

/// Represents a logical partition of data within a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    name: String,
}

impl Partition {
    /// Creates a new partition with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the partition name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<String> for Partition {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Partition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Represents a single operation in a batch transaction.
///
/// Used with `StorageBackend::batch()` for atomic multi-operation writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert or update a key-value pair
    Put {
        partition: Partition,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Delete a key
    Delete { partition: Partition, key: Vec<u8> },
}

impl Operation {
    pub fn partition(&self) -> &Partition {
        match self {
            Operation::Put { partition, .. } | Operation::Delete { partition, .. } => partition,
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Operation::Put { key, .. } | Operation::Delete { key, .. } => key,
        }
    }
}

/// Trait for pluggable storage backend implementations.
///
/// Implementations must be thread-safe (Send + Sync) to allow concurrent access
/// from every connection and from background sweeps.
///
/// ## Error Handling
///
/// Implementations should:
/// - Return `PartitionNotFound` if partition doesn't exist
/// - Return `IoError` for underlying storage failures
pub trait StorageBackend: Send + Sync {
    /// Retrieves a value by key from the specified partition.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Stores a key-value pair in the specified partition.
    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()>;

    /// Deletes a key from the specified partition.
    ///
    /// Returns `Ok(())` even if the key doesn't exist (idempotent).
    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()>;

    /// Executes multiple operations atomically in a batch.
    ///
    /// Either all operations succeed or none are applied.
    fn batch(&self, operations: Vec<Operation>) -> Result<()>;

    /// Scans keys in a partition, optionally filtered by prefix and limit.
    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<KvIterator<'_>>;

    /// Checks if a partition exists.
    fn partition_exists(&self, partition: &Partition) -> bool;

    /// Creates a new partition.
    ///
    /// Returns `Ok(())` if the partition already exists (idempotent).
    fn create_partition(&self, partition: &Partition) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_creation() {
        let p1 = Partition::new("live_queries");
        assert_eq!(p1.name(), "live_queries");

        let p2 = Partition::from("catalog");
        assert_eq!(p2.name(), "catalog");
    }

    #[test]
    fn test_operation_accessors() {
        let op = Operation::Delete {
            partition: Partition::new("test"),
            key: b"key1".to_vec(),
        };
        assert_eq!(op.partition().name(), "test");
        assert_eq!(op.key(), b"key1");
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::PartitionNotFound("live_queries".to_string());
        assert_eq!(err.to_string(), "Partition not found: live_queries");

        let err = StorageError::IoError("disk full".to_string());
        assert_eq!(err.to_string(), "I/O error: disk full");
    }
}
