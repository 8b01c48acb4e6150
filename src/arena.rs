//! Arena allocation for CP-net variables.
//!
//! Provides `VariableId` (a dense, total-orderable identifier) and
//! `VariableArena` (contiguous storage with free-list reuse). Parent/child
//! relations are stored as `VariableId` lists, so no variable ever owns
//! another one.
//!
//! # Determinism
//! - `VariableId` ordering is by its inner `u32`.
//! - Free-list reuse is LIFO, so the same sequence of allocations and
//!   deallocations always yields the same ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a variable inside a [`crate::CpNet`].
///
/// `VariableId(u32)` is `Copy`, `Eq`, `Ord`, `Hash`. The inner value is an
/// index into the arena's slot array. A handle stays valid until the variable
/// is destroyed; afterwards the slot may be reused by a new variable.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(u32);

impl VariableId {
    /// Creates a `VariableId` from a raw slot index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw slot index.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableId({})", self.0)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    data: Option<T>,
    next_free: Option<u32>,
}

/// Contiguous storage for variables with free-list reuse.
#[derive(Debug, Clone)]
pub struct VariableArena<T> {
    slots: Vec<Slot<T>>,
    free_list_head: Option<u32>,
}

impl<T> VariableArena<T> {
    /// Creates a new empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list_head: None,
        }
    }

    /// Stores `data` in a free slot (most recently freed first) or a new one.
    pub fn allocate(&mut self, data: T) -> VariableId {
        if let Some(idx) = self.free_list_head {
            let slot = &mut self.slots[idx as usize];
            debug_assert!(slot.data.is_none(), "free slot should have no data");
            self.free_list_head = slot.next_free;
            slot.data = Some(data);
            slot.next_free = None;
            VariableId(idx)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                data: Some(data),
                next_free: None,
            });
            VariableId(idx)
        }
    }

    /// Removes and returns the data stored at `id`.
    ///
    /// The slot joins the free list. Returns `None` if `id` was not live.
    pub fn deallocate(&mut self, id: VariableId) -> Option<T> {
        let idx = id.as_u32();
        let slot = self.slots.get_mut(idx as usize)?;
        let data = slot.data.take()?;
        slot.next_free = self.free_list_head;
        self.free_list_head = Some(idx);
        Some(data)
    }

    /// Returns a reference to the data stored at `id`, if live.
    pub fn get(&self, id: VariableId) -> Option<&T> {
        self.slots
            .get(id.as_u32() as usize)
            .and_then(|slot| slot.data.as_ref())
    }

    /// Returns a mutable reference to the data stored at `id`, if live.
    pub fn get_mut(&mut self, id: VariableId) -> Option<&mut T> {
        self.slots
            .get_mut(id.as_u32() as usize)
            .and_then(|slot| slot.data.as_mut())
    }

    /// Returns `true` if `id` refers to a live slot.
    pub fn contains(&self, id: VariableId) -> bool {
        self.get(id).is_some()
    }
}

impl<T> Default for VariableArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
