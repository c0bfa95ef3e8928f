//! Database Module
//!
//! The public facade: typed values, namespaced keys, atomic batches and
//! ordered iteration on top of a [`StorageHandle`].
//!
//! ## Request Flow
//! ```text
//! logical key ──► Namespace ──► physical key ─┐
//!                                             ├──► StorageHandle ──► engine
//! typed value ──► Encode ──► bytes ───────────┘
//! ```
//! Reads run the same pipeline backwards through [`Decode`].

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::batch::BatchOp;
use crate::codec::{Decode, Encode};
use crate::config::Config;
use crate::error::{Result, StrandError};
use crate::iter::{Iter, IterOptions};
use crate::namespace::Namespace;
use crate::storage::{RawOp, StorageHandle};

/// A namespaced, typed view of one store
///
/// Several `Database` values may share a handle (see
/// [`with_namespace`](Self::with_namespace)); each one only ever reads and
/// writes keys under its own namespace. The handle is closed by
/// [`close`](Self::close) or when the last `Database` sharing it is dropped.
#[derive(Clone)]
pub struct Database {
    handle: Arc<StorageHandle>,
    namespace: Namespace,
}

impl Database {
    /// Open the root keyspace of the store at `path`
    ///
    /// The root namespace has an empty prefix, so it addresses physical keys
    /// directly. Keys written through namespaced views are physical keys too:
    /// a root `get("ns/k")` or an unbounded root [`iterate`](Self::iterate)
    /// also sees what `with_namespace("ns/")` stored under `"k"`. Keep root
    /// keys and namespace prefixes disjoint when that matters.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(Config::with_path(path.as_ref()), Namespace::root())
    }

    /// Open the keyspace under `namespace` of the store at `path`
    pub fn open_with_namespace(path: impl AsRef<Path>, namespace: impl AsRef<[u8]>) -> Result<Self> {
        Self::open_with_config(Config::with_path(path.as_ref()), Namespace::new(namespace))
    }

    /// Open with a full config
    pub fn open_with_config(config: Config, namespace: Namespace) -> Result<Self> {
        let handle = StorageHandle::open(&config)?;
        Ok(Self {
            handle: Arc::new(handle),
            namespace,
        })
    }

    /// Another view of the same open store under a different namespace
    pub fn with_namespace(&self, namespace: impl AsRef<[u8]>) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            namespace: Namespace::new(namespace),
        }
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Get a value by key
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key found and decoded
    /// - `Ok(None)`: no value stored under this key
    /// - `Err(StrandError::Decode)`: a value exists but is malformed for `V`
    pub fn get<V: Decode>(&self, key: impl AsRef<[u8]>) -> Result<Option<V>> {
        let physical = self.namespace.physical_key(key.as_ref());
        match self.handle.get(&physical)? {
            Some(bytes) => V::decode(&bytes).map(Some).map_err(StrandError::Decode),
            None => Ok(None),
        }
    }

    /// Returns true if a value is stored under `key`
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> Result<bool> {
        let physical = self.namespace.physical_key(key.as_ref());
        Ok(self.handle.get(&physical)?.is_some())
    }

    /// Put a value, overwriting any previous one
    ///
    /// The value is encoded before anything reaches the engine, so an
    /// encode failure has no side effect.
    pub fn put<V: Encode + ?Sized>(&self, key: impl AsRef<[u8]>, value: &V) -> Result<()> {
        let bytes = value.encode().map_err(StrandError::Encode)?;
        let physical = self.namespace.physical_key(key.as_ref());
        self.handle.put(&physical, &bytes)
    }

    /// Delete a key; deleting an absent key succeeds
    pub fn delete(&self, key: impl AsRef<[u8]>) -> Result<()> {
        let physical = self.namespace.physical_key(key.as_ref());
        self.handle.delete(&physical)
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Apply a sequence of puts and deletes atomically, in order
    ///
    /// Every op is translated first; a single encode failure aborts the
    /// batch before any write is attempted.
    pub fn batch<'a, I>(&self, ops: I) -> Result<()>
    where
        I: IntoIterator<Item = BatchOp<'a>>,
    {
        let raw = ops
            .into_iter()
            .map(|op| op.into_raw(&self.namespace))
            .collect::<Result<Vec<RawOp>>>()?;

        debug!(ops = raw.len(), "Submitting batch");
        self.handle.write_batch(raw)
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Iterate entries of this namespace within inclusive bounds
    ///
    /// Keys come back with the namespace stripped and decoded as `K`. The
    /// iterator reads a snapshot taken when this method is called.
    pub fn iterate<K: Decode, V: Decode>(&self, options: IterOptions) -> Result<Iter<K, V>> {
        let range = self
            .namespace
            .scan_range(options.lower_bound(), options.upper_bound());
        let cursor = self.handle.scan(&range, options.direction())?;
        Ok(Iter::new(cursor, self.namespace.clone()))
    }

    /// Iterate every entry of this namespace in ascending key order
    pub fn iter<K: Decode, V: Decode>(&self) -> Result<Iter<K, V>> {
        self.iterate(IterOptions::new())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Sync written data to durable storage
    pub fn persist(&self) -> Result<()> {
        self.handle.persist()
    }

    /// Close the underlying handle
    ///
    /// Closes it for every `Database` sharing the handle. Idempotent.
    pub fn close(&self) -> Result<()> {
        self.handle.close()
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Get the data directory path
    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    /// Get the underlying storage handle
    pub fn handle(&self) -> &StorageHandle {
        &self.handle
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.handle.path())
            .field("backend", &self.handle.backend_name())
            .field("namespace", &self.namespace)
            .finish()
    }
}
