//! Storage Handle
//!
//! Owns one open engine connection and guards it against use after close.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{BackendKind, Config};
use crate::error::{Result, StrandError};
use crate::namespace::ScanRange;

use super::registry::PathLease;
use super::{
    check_key, coalesce, Backend, Direction, LsmBackend, MemoryBackend, RawCursor, RawOp,
    MAX_KEY_LEN,
};

/// A live engine connection plus its claim on the data directory
struct OpenBackend {
    // Declared before the lease so the engine is dropped first
    backend: Box<dyn Backend>,
    _lease: Option<PathLease>,
}

/// Raw byte-level access to one open store
///
/// ## Concurrency:
/// - Operations take a shared lock on the backend slot (many concurrent callers)
/// - `close()` takes the exclusive lock, so it waits for in-flight operations
/// - Cursors share the `closed` flag and fail on their next pull after close
/// - All methods use `&self`; share the handle with `Arc`
pub struct StorageHandle {
    /// Canonical data directory (as configured for the memory backend)
    path: PathBuf,

    backend_name: &'static str,

    /// `None` once closed
    inner: RwLock<Option<OpenBackend>>,

    closed: Arc<AtomicBool>,
}

impl StorageHandle {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Create the data directory and resolve its canonical path
    /// 3. Claim the path (one live handle per directory)
    /// 4. Open the engine
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let (path, open) = match config.backend {
            BackendKind::Fjall => {
                fs::create_dir_all(&config.data_dir).map_err(|e| {
                    StrandError::Open(format!("cannot create {}: {}", config.data_dir.display(), e))
                })?;
                let path = fs::canonicalize(&config.data_dir).map_err(|e| {
                    StrandError::Open(format!("cannot resolve {}: {}", config.data_dir.display(), e))
                })?;

                // Lease is released again if the engine fails to open
                let lease = PathLease::acquire(&path)?;
                let backend = LsmBackend::open(config)?;
                (
                    path,
                    OpenBackend {
                        backend: Box::new(backend),
                        _lease: Some(lease),
                    },
                )
            }
            BackendKind::Memory => (
                config.data_dir.clone(),
                OpenBackend {
                    backend: Box::new(MemoryBackend::new()),
                    _lease: None,
                },
            ),
        };

        let backend_name = open.backend.name();
        info!(path = %path.display(), backend = backend_name, "Opened storage handle");

        Ok(Self {
            path,
            backend_name,
            inner: RwLock::new(Some(open)),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(&Config::with_path(path))
    }

    /// Get a value by physical key
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key found
    /// - `Ok(None)`: key absent or deleted
    ///
    /// A key that could never be stored (see [`MAX_KEY_LEN`](super::MAX_KEY_LEN))
    /// reads as absent.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.with_backend(|backend| {
            if check_key(key).is_err() {
                return Ok(None);
            }
            backend.get(key)
        })
    }

    /// Put a key-value pair, overwriting any previous value
    ///
    /// Fails with [`StrandError::InvalidKey`] for an empty or oversized key.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.with_backend(|backend| {
            check_key(key)?;
            backend.put(key, value)
        })
    }

    /// Delete a key (absent keys are fine, including ones that cannot be stored)
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.with_backend(|backend| {
            if check_key(key).is_err() {
                return Ok(());
            }
            backend.delete(key)
        })
    }

    /// Apply a batch atomically
    ///
    /// Ops apply in the given order, so the last op on a key decides whether
    /// it exists afterwards. A put on an unstorable key fails the whole batch
    /// with [`StrandError::InvalidKey`] before anything is written; deletes of
    /// such keys are dropped.
    pub fn write_batch(&self, ops: Vec<RawOp>) -> Result<()> {
        self.with_backend(|backend| {
            let submitted = ops.len();
            let mut ops = coalesce(ops);
            for op in &ops {
                if let RawOp::Put { key, .. } = op {
                    check_key(key)?;
                }
            }
            ops.retain(|op| check_key(op.key()).is_ok());
            debug!(submitted, applied = ops.len(), "Writing batch");

            if ops.is_empty() {
                return Ok(());
            }
            backend.write_batch(ops)
        })
    }

    /// Scan a physical key range
    ///
    /// Every call returns an independent cursor reading a snapshot taken
    /// now; later writes are not visible through it.
    pub fn scan(&self, range: &ScanRange, direction: Direction) -> Result<RawCursor> {
        self.with_backend(|backend| {
            let Some(range) = storable_range(range).filter(|r| !range_is_empty(r)) else {
                return Ok(RawCursor::empty(Arc::clone(&self.closed)));
            };
            debug!(?direction, "Opening scan cursor");
            let iter = backend.scan(&range, direction)?;
            Ok(RawCursor::new(iter, Arc::clone(&self.closed)))
        })
    }

    /// Sync written data to durable storage
    pub fn persist(&self) -> Result<()> {
        self.with_backend(|backend| backend.persist())
    }

    /// Close the handle
    ///
    /// Persists outstanding writes and releases the engine and the path.
    /// Calling it again is a no-op. Every other operation afterwards fails
    /// with [`StrandError::Closed`].
    pub fn close(&self) -> Result<()> {
        let mut slot = self.inner.write();
        let Some(open) = slot.take() else {
            return Ok(());
        };
        self.closed.store(true, Ordering::Release);

        let result = open.backend.persist();
        drop(open);

        match &result {
            Ok(()) => info!(path = %self.path.display(), "Closed storage handle"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Closed storage handle with unsynced data"),
        }
        result
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the data directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the backend serving this handle
    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn with_backend<T>(&self, f: impl FnOnce(&dyn Backend) -> Result<T>) -> Result<T> {
        let slot = self.inner.read();
        match slot.as_ref() {
            Some(open) => f(open.backend.as_ref()),
            None => Err(StrandError::Closed),
        }
    }
}

impl Drop for StorageHandle {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        debug!(path = %self.path.display(), "Closing storage handle on drop");
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "Failed to close storage handle on drop");
        }
    }
}

/// Rewrites bounds the engine cannot seek to into equivalent storable ones
///
/// Only keys of 1..=`MAX_KEY_LEN` bytes exist, so a longer bound can be cut to
/// `MAX_KEY_LEN` bytes without changing which stored keys fall inside it.
/// Returns `None` when no storable key is in range.
fn storable_range(range: &ScanRange) -> Option<ScanRange> {
    use std::ops::Bound::{Excluded, Included, Unbounded};

    let start = match &range.start {
        Included(key) | Excluded(key) if key.len() > MAX_KEY_LEN => {
            Excluded(key[..MAX_KEY_LEN].to_vec())
        }
        Included(key) | Excluded(key) if key.is_empty() => Unbounded,
        bound => bound.clone(),
    };
    let end = match &range.end {
        Included(key) | Excluded(key) if key.len() > MAX_KEY_LEN => {
            Included(key[..MAX_KEY_LEN].to_vec())
        }
        Included(key) | Excluded(key) if key.is_empty() => return None,
        bound => bound.clone(),
    };
    Some(ScanRange { start, end })
}

/// Returns true if no key can satisfy both bounds
fn range_is_empty(range: &ScanRange) -> bool {
    use std::ops::Bound::{Excluded, Included};

    match (&range.start, &range.end) {
        (Included(start), Included(end)) => start > end,
        (Included(start), Excluded(end))
        | (Excluded(start), Included(end))
        | (Excluded(start), Excluded(end)) => start >= end,
        _ => false,
    }
}
