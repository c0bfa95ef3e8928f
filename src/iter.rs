//! Typed range iteration
//!
//! Turns a raw cursor over physical keys back into decoded
//! `(key, value)` pairs of one namespace.

use std::marker::PhantomData;

use crate::codec::Decode;
use crate::error::{Result, StrandError};
use crate::namespace::Namespace;
use crate::storage::{Direction, RawCursor};

/// Bounds and order for [`Database::iterate`](crate::Database::iterate)
///
/// Both bounds are inclusive logical keys; either may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterOptions {
    gte: Option<Vec<u8>>,
    lte: Option<Vec<u8>>,
    direction: Direction,
}

impl IterOptions {
    /// Unbounded ascending iteration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `key` (inclusive)
    pub fn gte(mut self, key: impl AsRef<[u8]>) -> Self {
        self.gte = Some(key.as_ref().to_vec());
        self
    }

    /// Stop at `key` (inclusive)
    pub fn lte(mut self, key: impl AsRef<[u8]>) -> Self {
        self.lte = Some(key.as_ref().to_vec());
        self
    }

    /// Walk the range from the upper bound down
    pub fn reverse(mut self) -> Self {
        self.direction = Direction::Reverse;
        self
    }

    pub fn lower_bound(&self) -> Option<&[u8]> {
        self.gte.as_deref()
    }

    pub fn upper_bound(&self) -> Option<&[u8]> {
        self.lte.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Lazy iterator over decoded entries of one namespace
///
/// Yields `Err` at most once: a malformed entry or an engine failure ends
/// the iteration instead of being skipped.
pub struct Iter<K, V> {
    cursor: RawCursor,
    namespace: Namespace,
    done: bool,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K: Decode, V: Decode> Iter<K, V> {
    pub(crate) fn new(cursor: RawCursor, namespace: Namespace) -> Self {
        Self {
            cursor,
            namespace,
            done: false,
            _marker: PhantomData,
        }
    }

    fn decode_entry(&self, physical: &[u8], bytes: &[u8]) -> Result<(K, V)> {
        let logical = self.namespace.logical_key(physical)?;
        let key = K::decode(logical).map_err(StrandError::Decode)?;
        let value = V::decode(bytes).map_err(StrandError::Decode)?;
        Ok((key, value))
    }
}

impl<K: Decode, V: Decode> Iterator for Iter<K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = match self.cursor.next()? {
            Ok((physical, bytes)) => self.decode_entry(&physical, &bytes),
            Err(e) => Err(e),
        };

        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}
