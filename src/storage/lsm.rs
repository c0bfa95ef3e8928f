//! LSM-tree backend
//!
//! Persistent backend built on the fjall engine. One keyspace per data
//! directory, one partition holding every namespace.

use std::fmt::Display;
use std::ops::Deref;

use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};

use crate::config::{Config, SyncStrategy};
use crate::error::{Result, StrandError};
use crate::namespace::ScanRange;

use super::{Backend, Direction, RawEntry, RawIter, RawOp};

/// fjall-backed persistent store
pub struct LsmBackend {
    keyspace: Keyspace,
    partition: PartitionHandle,
    sync_every_write: bool,
}

impl LsmBackend {
    /// Open or create the engine rooted at `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        let fsync_ms = match config.sync_strategy {
            SyncStrategy::Periodic { interval_ms } => Some(interval_ms),
            SyncStrategy::EveryWrite | SyncStrategy::Manual => None,
        };

        let keyspace = fjall::Config::new(&config.data_dir)
            .cache_size(config.cache_size_bytes)
            .fsync_ms(fsync_ms)
            .open()
            .map_err(|e| {
                StrandError::Open(format!("{}: {}", config.data_dir.display(), e))
            })?;

        let partition = keyspace
            .open_partition(&config.partition, PartitionCreateOptions::default())
            .map_err(|e| {
                StrandError::Open(format!("partition {:?}: {}", config.partition, e))
            })?;

        Ok(Self {
            keyspace,
            partition,
            sync_every_write: config.sync_strategy == SyncStrategy::EveryWrite,
        })
    }

    /// Sync after a write when configured to
    fn after_write(&self) -> Result<()> {
        if self.sync_every_write {
            self.persist()
                .map_err(|e| StrandError::Write(format!("sync after write: {}", e)))?;
        }
        Ok(())
    }
}

fn write_error(e: fjall::Error) -> StrandError {
    StrandError::Write(e.to_string())
}

fn engine_error(e: fjall::Error) -> StrandError {
    StrandError::Engine(e.to_string())
}

fn to_raw_entry<K, V, E>(item: std::result::Result<(K, V), E>) -> Result<RawEntry>
where
    K: Deref<Target = [u8]>,
    V: Deref<Target = [u8]>,
    E: Display,
{
    item.map(|(key, value)| (key.to_vec(), value.to_vec()))
        .map_err(|e| StrandError::Engine(e.to_string()))
}

impl Backend for LsmBackend {
    fn name(&self) -> &'static str {
        "fjall"
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self.partition.get(key).map_err(engine_error)?;
        Ok(value.map(|slice| slice.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.partition.insert(key, value).map_err(write_error)?;
        self.after_write()
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.partition.remove(key).map_err(write_error)?;
        self.after_write()
    }

    fn write_batch(&self, ops: Vec<RawOp>) -> Result<()> {
        let mut batch = self.keyspace.batch();
        for op in ops {
            match op {
                RawOp::Put { key, value } => {
                    batch.insert(&self.partition, key, value);
                }
                RawOp::Delete { key } => {
                    batch.remove(&self.partition, key);
                }
            }
        }
        batch.commit().map_err(write_error)?;
        self.after_write()
    }

    fn scan(&self, range: &ScanRange, direction: Direction) -> Result<RawIter> {
        // Pinned to the visible seqno, which only moves once a batch is fully applied
        let snapshot = self.partition.snapshot_at(self.keyspace.instant());
        let bounds = (range.start.clone(), range.end.clone());
        let items = snapshot.range(bounds);

        let iter: RawIter = match direction {
            Direction::Forward => Box::new(SnapshotIter {
                _snapshot: snapshot,
                inner: items.map(to_raw_entry),
            }),
            Direction::Reverse => Box::new(SnapshotIter {
                _snapshot: snapshot,
                inner: items.rev().map(to_raw_entry),
            }),
        };
        Ok(iter)
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(engine_error)
    }
}

/// Keeps the snapshot registered for as long as its iterator is alive
struct SnapshotIter<I> {
    _snapshot: fjall::Snapshot,
    inner: I,
}

impl<I: Iterator> Iterator for SnapshotIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
