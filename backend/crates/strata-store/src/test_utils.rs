//! Test utilities for strata-store.
//!
//! [`FaultyBackend`] wraps an [`InMemoryBackend`] and fails selected
//! operations on demand, so storage failure paths can be exercised in
//! dependent crates.

use crate::in_memory::InMemoryBackend;
use crate::storage_trait::{KvIterator, Operation, Partition, Result, StorageBackend, StorageError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct FaultyBackend {
    inner: InMemoryBackend,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
    fail_batches: AtomicBool,
    batch_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl FaultyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryBackend {
        &self.inner
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn injected(op: &str) -> StorageError {
        StorageError::IoError(format!("injected {} failure", op))
    }
}

impl StorageBackend for FaultyBackend {
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(partition, key)
    }

    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Self::injected("put"));
        }
        self.inner.put(partition, key, value)
    }

    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::injected("delete"));
        }
        self.inner.delete(partition, key)
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<()> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(Self::injected("batch"));
        }
        self.inner.batch(operations)
    }

    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<KvIterator<'_>> {
        self.inner.scan(partition, prefix, limit)
    }

    fn partition_exists(&self, partition: &Partition) -> bool {
        self.inner.partition_exists(partition)
    }

    fn create_partition(&self, partition: &Partition) -> Result<()> {
        self.inner.create_partition(partition)
    }
}
