//! Generation-stamped memoization for derived CPT data.
//!
//! Every mutation of a conditional preference table bumps its [`Generation`].
//! Cached values remember the generation they were computed at and are only
//! served while it is still current, so invalidation needs no call-site
//! bookkeeping: a stale entry is simply never read again.
//!
//! Caches use interior mutability so read-only queries (`&self`) can fill
//! them. The engine is single-threaded; none of these types are `Sync`.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Monotonically increasing mutation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Advances to the next generation.
    #[inline]
    pub fn bump(&mut self) {
        self.0 += 1;
    }
}

/// A single memoized value.
#[derive(Debug)]
pub struct Memo<T> {
    slot: RefCell<Option<(Generation, Rc<T>)>>,
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    /// Returns the value cached for `generation`, computing it on a miss.
    pub fn get_or_compute(&self, generation: Generation, compute: impl FnOnce() -> T) -> Rc<T> {
        if let Some(value) = self.peek(generation) {
            tracing::trace!(generation = generation.as_u64(), "memo hit");
            return value;
        }
        tracing::trace!(generation = generation.as_u64(), "memo miss");
        let value = Rc::new(compute());
        *self.slot.borrow_mut() = Some((generation, Rc::clone(&value)));
        value
    }

    /// Returns the cached value only if it was computed at `generation`.
    pub fn peek(&self, generation: Generation) -> Option<Rc<T>> {
        match &*self.slot.borrow() {
            Some((stamp, value)) if *stamp == generation => Some(Rc::clone(value)),
            _ => None,
        }
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            slot: RefCell::new(self.slot.borrow().clone()),
        }
    }
}

/// Per-key memo table sharing one generation stamp.
///
/// Writing at a newer generation discards every older entry.
#[derive(Debug, Clone)]
pub struct VerdictCache<V> {
    table: RefCell<(Generation, BTreeMap<usize, V>)>,
}

impl<V: Copy> VerdictCache<V> {
    pub fn new() -> Self {
        Self {
            table: RefCell::new((Generation::default(), BTreeMap::new())),
        }
    }

    /// Cached value for `key`, if recorded at `generation`.
    pub fn get(&self, generation: Generation, key: usize) -> Option<V> {
        let table = self.table.borrow();
        if table.0 != generation {
            return None;
        }
        table.1.get(&key).copied()
    }

    /// Records `value` for `key` at `generation`.
    pub fn insert(&self, generation: Generation, key: usize, value: V) {
        let mut table = self.table.borrow_mut();
        if table.0 != generation {
            table.0 = generation;
            table.1.clear();
        }
        table.1.insert(key, value);
    }
}

impl<V: Copy> Default for VerdictCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
