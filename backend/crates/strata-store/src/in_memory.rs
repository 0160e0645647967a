//! In-memory `StorageBackend`.
//!
//! Partitions map to ordered `BTreeMap`s so prefix scans return keys in the
//! same order an LSM engine would. Batches are applied under a single write
//! lock, which makes them atomic with respect to every other operation.

use crate::storage_trait::{KvIterator, Operation, Partition, Result, StorageBackend, StorageError};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

type PartitionData = BTreeMap<Vec<u8>, Vec<u8>>;

#[derive(Default)]
pub struct InMemoryBackend {
    partitions: RwLock<HashMap<String, PartitionData>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored in a partition (0 when the partition is missing).
    pub fn len(&self, partition: &Partition) -> usize {
        self.partitions
            .read()
            .get(partition.name())
            .map(|data| data.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, partition: &Partition) -> bool {
        self.len(partition) == 0
    }
}

fn missing(partition: &Partition) -> StorageError {
    StorageError::PartitionNotFound(partition.name().to_string())
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, partition: &Partition, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let partitions = self.partitions.read();
        let data = partitions.get(partition.name()).ok_or_else(|| missing(partition))?;
        Ok(data.get(key).cloned())
    }

    fn put(&self, partition: &Partition, key: &[u8], value: &[u8]) -> Result<()> {
        let mut partitions = self.partitions.write();
        let data = partitions
            .get_mut(partition.name())
            .ok_or_else(|| missing(partition))?;
        data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, partition: &Partition, key: &[u8]) -> Result<()> {
        let mut partitions = self.partitions.write();
        let data = partitions
            .get_mut(partition.name())
            .ok_or_else(|| missing(partition))?;
        data.remove(key);
        Ok(())
    }

    fn batch(&self, operations: Vec<Operation>) -> Result<()> {
        let mut partitions = self.partitions.write();

        // Validate first so a bad partition leaves nothing half-applied
        for op in &operations {
            if !partitions.contains_key(op.partition().name()) {
                return Err(missing(op.partition()));
            }
        }

        for op in operations {
            match op {
                Operation::Put {
                    partition,
                    key,
                    value,
                } => {
                    if let Some(data) = partitions.get_mut(partition.name()) {
                        data.insert(key, value);
                    }
                }
                Operation::Delete { partition, key } => {
                    if let Some(data) = partitions.get_mut(partition.name()) {
                        data.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    fn scan(
        &self,
        partition: &Partition,
        prefix: Option<&[u8]>,
        limit: Option<usize>,
    ) -> Result<KvIterator<'_>> {
        let partitions = self.partitions.read();
        let data = partitions.get(partition.name()).ok_or_else(|| missing(partition))?;

        let rows: Vec<(Vec<u8>, Vec<u8>)> = match prefix {
            Some(prefix) => data
                .range(prefix.to_vec()..)
                .take_while(|(k, _)| k.starts_with(prefix))
                .take(limit.unwrap_or(usize::MAX))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => data
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        Ok(Box::new(rows.into_iter()))
    }

    fn partition_exists(&self, partition: &Partition) -> bool {
        self.partitions.read().contains_key(partition.name())
    }

    fn create_partition(&self, partition: &Partition) -> Result<()> {
        self.partitions
            .write()
            .entry(partition.name().to_string())
            .or_default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with(name: &str) -> (InMemoryBackend, Partition) {
        let backend = InMemoryBackend::new();
        let partition = Partition::new(name);
        backend.create_partition(&partition).unwrap();
        (backend, partition)
    }

    #[test]
    fn test_missing_partition() {
        let backend = InMemoryBackend::new();
        let err = backend.get(&Partition::new("nope"), b"k").unwrap_err();
        assert_eq!(err, StorageError::PartitionNotFound("nope".to_string()));
    }

    #[test]
    fn test_put_get_delete() {
        let (backend, p) = backend_with("t");
        backend.put(&p, b"a", b"1").unwrap();
        assert_eq!(backend.get(&p, b"a").unwrap(), Some(b"1".to_vec()));
        backend.delete(&p, b"a").unwrap();
        assert_eq!(backend.get(&p, b"a").unwrap(), None);
        // idempotent
        backend.delete(&p, b"a").unwrap();
    }

    #[test]
    fn test_scan_prefix_and_limit() {
        let (backend, p) = backend_with("t");
        backend.put(&p, b"a:1", b"x").unwrap();
        backend.put(&p, b"a:2", b"y").unwrap();
        backend.put(&p, b"b:1", b"z").unwrap();

        let keys: Vec<Vec<u8>> = backend
            .scan(&p, Some(b"a:".as_slice()), None)
            .unwrap()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec![b"a:1".to_vec(), b"a:2".to_vec()]);

        let limited = backend.scan(&p, None, Some(1)).unwrap().count();
        assert_eq!(limited, 1);
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let (backend, p) = backend_with("t");
        let ops = vec![
            Operation::Put {
                partition: p.clone(),
                key: b"a".to_vec(),
                value: b"1".to_vec(),
            },
            Operation::Put {
                partition: Partition::new("missing"),
                key: b"b".to_vec(),
                value: b"2".to_vec(),
            },
        ];
        assert!(backend.batch(ops).is_err());
        assert!(backend.is_empty(&p));
    }
}
