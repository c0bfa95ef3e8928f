//! Key Namespacing
//!
//! Maps logical keys to the physical keys stored in the engine.
//!
//! ```text
//! Physical Key: | namespace (bytes) | logical key (bytes) |
//! ```
//!
//! No separator is written between the two parts. For a fixed namespace,
//! prefix concatenation preserves byte-lexicographic order, so a logical
//! range maps to a contiguous physical range.

use std::ops::Bound;

use bytes::Bytes;

use crate::error::{Result, StrandError};

/// Physical key bounds for a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRange {
    pub start: Bound<Vec<u8>>,
    pub end: Bound<Vec<u8>>,
}

impl ScanRange {
    /// The whole physical keyspace
    pub fn full() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Borrowed bounds, usable wherever `RangeBounds<[u8]>` is expected
    pub fn as_slices(&self) -> (Bound<&[u8]>, Bound<&[u8]>) {
        (as_slice_bound(&self.start), as_slice_bound(&self.end))
    }

    /// Returns true if `key` falls inside the range
    pub fn contains(&self, key: &[u8]) -> bool {
        let after_start = match &self.start {
            Bound::Included(start) => key >= start.as_slice(),
            Bound::Excluded(start) => key > start.as_slice(),
            Bound::Unbounded => true,
        };
        let before_end = match &self.end {
            Bound::Included(end) => key <= end.as_slice(),
            Bound::Excluded(end) => key < end.as_slice(),
            Bound::Unbounded => true,
        };
        after_start && before_end
    }
}

fn as_slice_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(key) => Bound::Included(key.as_slice()),
        Bound::Excluded(key) => Bound::Excluded(key.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// A key prefix scoping one logical keyspace inside a shared store
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Namespace {
    prefix: Bytes,
}

impl Namespace {
    /// Namespace with the given raw prefix
    pub fn new(prefix: impl AsRef<[u8]>) -> Self {
        Self {
            prefix: Bytes::copy_from_slice(prefix.as_ref()),
        }
    }

    /// The root (unprefixed) keyspace
    pub fn root() -> Self {
        Self::default()
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Builds the physical key for a logical key
    pub fn physical_key(&self, logical: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + logical.len());
        key.extend_from_slice(&self.prefix);
        key.extend_from_slice(logical);
        key
    }

    /// Returns true if `physical` was written under this namespace
    pub fn contains(&self, physical: &[u8]) -> bool {
        physical.starts_with(&self.prefix[..])
    }

    /// Strips the namespace prefix from a physical key
    pub fn logical_key<'a>(&self, physical: &'a [u8]) -> Result<&'a [u8]> {
        physical.strip_prefix(&self.prefix[..]).ok_or_else(|| {
            StrandError::Internal(format!(
                "key of {} bytes is outside namespace {:?}",
                physical.len(),
                self
            ))
        })
    }

    /// Physical bounds for an inclusive logical range
    ///
    /// A missing lower bound starts at the bare prefix. A missing upper bound
    /// stops before the first key greater than every key carrying the prefix.
    pub fn scan_range(&self, gte: Option<&[u8]>, lte: Option<&[u8]>) -> ScanRange {
        let start = match gte {
            Some(key) => Bound::Included(self.physical_key(key)),
            None if self.is_root() => Bound::Unbounded,
            None => Bound::Included(self.prefix.to_vec()),
        };

        let end = match lte {
            Some(key) => Bound::Included(self.physical_key(key)),
            None => match prefix_successor(&self.prefix) {
                Some(next) => Bound::Excluded(next),
                None => Bound::Unbounded,
            },
        };

        ScanRange { start, end }
    }
}

/// Smallest key greater than every key starting with `prefix`
///
/// `None` when no such key exists (empty prefix, or all bytes are 0xFF).
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut next = prefix.to_vec();
    while let Some(last) = next.pop() {
        if last < u8::MAX {
            next.push(last + 1);
            return Some(next);
        }
    }
    None
}
