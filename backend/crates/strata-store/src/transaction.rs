//! Write transactions over a [`StorageBackend`].
//!
//! A transaction buffers its writes and applies them through a single
//! [`StorageBackend::batch`] call on commit, so either every queued operation
//! lands or none does. Reads observe the transaction's own pending writes.
//!
//! `commit` and `cancel` take `self` by value: a transaction can be finished
//! exactly once.
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_store::{InMemoryBackend, Partition, StorageBackend, StorageTransaction};
//!
//! let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
//! let partition = Partition::new("live_queries");
//! backend.create_partition(&partition).unwrap();
//!
//! let mut txn = StorageTransaction::begin(Arc::clone(&backend), true);
//! txn.put(&partition, b"k1", b"v1").unwrap();
//! txn.clr(&partition, b"k0").unwrap();
//! txn.commit().unwrap();
//! ```

use crate::storage_trait::{Operation, Partition, Result, StorageBackend, StorageError};
use log::warn;
use std::sync::Arc;

pub struct StorageTransaction {
    backend: Arc<dyn StorageBackend>,
    writable: bool,
    pending: Vec<Operation>,
    finished: bool,
}

impl StorageTransaction {
    /// Open a transaction. Read-only transactions reject `put`/`clr`.
    pub fn begin(backend: Arc<dyn StorageBackend>, writable: bool) -> Self {
        Self {
            backend,
            writable,
            pending: Vec::new(),
            finished: false,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Read a key, preferring the latest pending write to it.
    pub fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let pending = self
            .pending
            .iter()
            .rev()
            .find(|op| op.partition() == partition && op.key() == key);

        match pending {
            Some(Operation::Put { value, .. }) => Ok(Some(value.clone())),
            Some(Operation::Delete { .. }) => Ok(None),
            None => self.backend.get(partition, key),
        }
    }

    pub fn put(&mut self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_writable()?;
        self.pending.push(Operation::Put {
            partition: partition.clone(),
            key: key.to_vec(),
            value: value.to_vec(),
        });
        Ok(())
    }

    /// Queue the deletion of a key.
    pub fn clr(&mut self, partition: &Partition, key: &[u8]) -> Result<()> {
        self.ensure_writable()?;
        self.pending.push(Operation::Delete {
            partition: partition.clone(),
            key: key.to_vec(),
        });
        Ok(())
    }

    /// Apply every queued operation atomically.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        if self.pending.is_empty() {
            return Ok(());
        }
        let operations = std::mem::take(&mut self.pending);
        self.backend.batch(operations)
    }

    /// Discard every queued operation.
    pub fn cancel(mut self) {
        self.finished = true;
        self.pending.clear();
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.is_writable() {
            Ok(())
        } else {
            Err(StorageError::ReadOnlyTransaction)
        }
    }
}

impl Drop for StorageTransaction {
    fn drop(&mut self) {
        if !self.finished && !self.pending.is_empty() {
            warn!(
                "Transaction dropped without commit or cancel; {} operation(s) discarded",
                self.pending.len()
            );
        }
    }
}
