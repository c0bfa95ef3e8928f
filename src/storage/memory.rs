//! In-memory backend
//!
//! BTreeMap-based ordered store with RwLock for concurrency. Nothing
//! survives the handle being closed.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::namespace::ScanRange;

use super::{Backend, Direction, RawEntry, RawIter, RawOp};

/// Volatile backend, mostly useful for tests and scratch stores
#[derive(Default)]
pub struct MemoryBackend {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    #[cfg(test)]
    fn len(&self) -> usize {
        self.data.read().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn write_batch(&self, ops: Vec<RawOp>) -> Result<()> {
        // Single write guard: readers see all of the batch or none of it
        let mut data = self.data.write();
        for op in ops {
            match op {
                RawOp::Put { key, value } => {
                    data.insert(key, value);
                }
                RawOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn scan(&self, range: &ScanRange, direction: Direction) -> Result<RawIter> {
        // Copy the range out under the read lock so the cursor sees a snapshot
        let mut entries: Vec<RawEntry> = self
            .data
            .read()
            .range::<[u8], _>(range.as_slices())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if direction == Direction::Reverse {
            entries.reverse();
        }

        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn persist(&self) -> Result<()> {
        Ok(())
    }
}
