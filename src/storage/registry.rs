//! Open path registry
//!
//! Tracks which data directories currently have a live handle in this
//! process. A second handle on the same directory is refused.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::{Result, StrandError};

static OPEN_PATHS: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Exclusive claim on a canonical data directory, released on drop
#[derive(Debug)]
pub(crate) struct PathLease {
    path: PathBuf,
}

impl PathLease {
    /// Claims `path`, which must already be canonical
    pub(crate) fn acquire(path: &Path) -> Result<Self> {
        let mut open = OPEN_PATHS.lock();
        if !open.insert(path.to_path_buf()) {
            return Err(StrandError::Open(format!(
                "{} is already open in this process",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for PathLease {
    fn drop(&mut self) {
        OPEN_PATHS.lock().remove(&self.path);
    }
}
