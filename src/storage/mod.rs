//! Storage Module
//!
//! Raw, byte-oriented access to the embedded storage engine.
//!
//! ## Responsibilities
//! - Own exactly one open engine connection per data directory
//! - Point lookups, writes and deletes on physical keys
//! - Atomic, ordered batches
//! - Snapshot range scans through forward-only cursors
//! - Fail fast with `Closed` once the handle is released
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ StorageHandle                            │
//! │  - closed flag (shared with cursors)     │
//! │  - PathLease (one handle per directory)  │
//! └─────────────────────┬────────────────────┘
//!                       │ dyn Backend
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ LsmBackend  │          │MemoryBackend│
//!   │   (fjall)   │          │ (BTreeMap)  │
//!   └─────────────┘          └─────────────┘
//! ```

mod cursor;
mod handle;
mod lsm;
mod memory;
mod registry;

use std::collections::HashMap;

use crate::error::{Result, StrandError};
use crate::namespace::ScanRange;

pub use cursor::RawCursor;
pub use handle::StorageHandle;
pub use lsm::LsmBackend;
pub use memory::MemoryBackend;

/// A physical (key, value) pair
pub type RawEntry = (Vec<u8>, Vec<u8>);

/// Iterator produced by a backend scan
pub type RawIter = Box<dyn Iterator<Item = Result<RawEntry>>>;

/// A single physical write inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl RawOp {
    pub fn key(&self) -> &[u8] {
        match self {
            RawOp::Put { key, .. } | RawOp::Delete { key } => key,
        }
    }
}

/// Scan order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Ascending byte-lexicographic order
    #[default]
    Forward,

    /// Descending byte-lexicographic order
    Reverse,
}

/// The engine surface consumed by a [`StorageHandle`]
///
/// Opening is backend construction, closing is dropping the backend.
pub trait Backend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Removing an absent key is not an error
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Applies every op or none of them
    fn write_batch(&self, ops: Vec<RawOp>) -> Result<()>;

    /// Iterates a point-in-time view of `range`
    fn scan(&self, range: &ScanRange, direction: Direction) -> Result<RawIter>;

    /// Syncs written data to durable storage
    fn persist(&self) -> Result<()>;
}

/// Collapses a batch to the last op per key
///
/// Applying the result atomically is equivalent to applying `ops` one by one
/// in order. Ops are kept in the position of their last occurrence.
pub(crate) fn coalesce(ops: Vec<RawOp>) -> Vec<RawOp> {
    let mut last_index: HashMap<&[u8], usize> = HashMap::with_capacity(ops.len());
    for (index, op) in ops.iter().enumerate() {
        last_index.insert(op.key(), index);
    }

    if last_index.len() == ops.len() {
        return ops;
    }

    let keep: Vec<bool> = ops
        .iter()
        .enumerate()
        .map(|(index, op)| last_index.get(op.key()) == Some(&index))
        .collect();

    ops.into_iter()
        .zip(keep)
        .filter_map(|(op, keep)| keep.then_some(op))
        .collect()
}

/// Longest physical key the engine stores
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Checks that a physical key can be stored
///
/// Keys must be 1..=`MAX_KEY_LEN` bytes, on every backend.
pub(crate) fn check_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(StrandError::InvalidKey("physical key is empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StrandError::InvalidKey(format!(
            "physical key is {} bytes, limit is {}",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    Ok(())
}
