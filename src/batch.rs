//! Batch operations
//!
//! Logical put/delete operations applied atomically by
//! [`Database::batch`](crate::Database::batch).

use std::fmt;

use crate::codec::Encode;
use crate::error::{Result, StrandError};
use crate::namespace::Namespace;
use crate::storage::RawOp;

/// One logical operation inside a batch
///
/// Values are encoded when the batch is submitted, not when the op is built.
pub enum BatchOp<'a> {
    /// Insert or overwrite a key
    Put { key: Vec<u8>, value: &'a dyn Encode },

    /// Remove a key (absent keys are fine)
    Delete { key: Vec<u8> },
}

impl<'a> BatchOp<'a> {
    pub fn put<V: Encode>(key: impl AsRef<[u8]>, value: &'a V) -> Self {
        BatchOp::Put {
            key: key.as_ref().to_vec(),
            value,
        }
    }

    pub fn delete(key: impl AsRef<[u8]>) -> Self {
        BatchOp::Delete {
            key: key.as_ref().to_vec(),
        }
    }

    /// The logical key this op targets
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }

    /// Translate to a physical op under `namespace`
    pub(crate) fn into_raw(self, namespace: &Namespace) -> Result<RawOp> {
        match self {
            BatchOp::Put { key, value } => Ok(RawOp::Put {
                key: namespace.physical_key(&key),
                value: value.encode().map_err(StrandError::Encode)?,
            }),
            BatchOp::Delete { key } => Ok(RawOp::Delete {
                key: namespace.physical_key(&key),
            }),
        }
    }
}

impl fmt::Debug for BatchOp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOp::Put { key, .. } => f.debug_struct("Put").field("key", key).finish_non_exhaustive(),
            BatchOp::Delete { key } => f.debug_struct("Delete").field("key", key).finish(),
        }
    }
}

/// Builder collecting batch operations in order
#[derive(Debug, Default)]
pub struct WriteBatch<'a> {
    ops: Vec<BatchOp<'a>>,
}

impl<'a> WriteBatch<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<V: Encode>(mut self, key: impl AsRef<[u8]>, value: &'a V) -> Self {
        self.ops.push(BatchOp::put(key, value));
        self
    }

    pub fn delete(mut self, key: impl AsRef<[u8]>) -> Self {
        self.ops.push(BatchOp::delete(key));
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<'a> IntoIterator for WriteBatch<'a> {
    type Item = BatchOp<'a>;
    type IntoIter = std::vec::IntoIter<BatchOp<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
