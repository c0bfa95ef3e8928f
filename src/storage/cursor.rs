//! Raw scan cursor
//!
//! Forward-only, single-pass iteration over a backend scan.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, StrandError};

use super::{RawEntry, RawIter};

/// Cursor over `(physical key, value bytes)` pairs
///
/// The underlying engine iterator is released as soon as the cursor is
/// exhausted, hits an error, or observes that its handle was closed. After
/// any of those the cursor only yields `None`.
pub struct RawCursor {
    inner: Option<RawIter>,
    closed: Arc<AtomicBool>,
}

impl RawCursor {
    pub(super) fn new(inner: RawIter, closed: Arc<AtomicBool>) -> Self {
        Self {
            inner: Some(inner),
            closed,
        }
    }

    /// Cursor that yields nothing
    pub(super) fn empty(closed: Arc<AtomicBool>) -> Self {
        Self {
            inner: None,
            closed,
        }
    }

    /// Returns true once the engine iterator has been released
    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.inner.is_none()
    }
}

impl Iterator for RawCursor {
    type Item = Result<RawEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;

        if self.closed.load(Ordering::Acquire) {
            self.inner = None;
            return Some(Err(StrandError::Closed));
        }

        match inner.next() {
            Some(Ok(entry)) => Some(Ok(entry)),
            Some(Err(e)) => {
                self.inner = None;
                Some(Err(e))
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}
