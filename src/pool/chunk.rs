//! Fixed-capacity slot block, the unit of growth of an object pool.

use alloc::vec::Vec;
use core::mem;

use crate::constants::EMPTY;
use crate::error::{MemError, Result};

/// One object slot plus its intrusive list links.
///
/// # Memory Layout
/// - `value`: the object, `None` once it has been freed
/// - `next`: global slot index of the next live object, or `EMPTY`
/// - `prev`: global slot index of the previous live object, or `EMPTY`
#[derive(Debug)]
pub(crate) struct Slot<T> {
    pub(crate) value: Option<T>,
    pub(crate) next: u32,
    pub(crate) prev: u32,
}

impl<T> Slot<T> {
    /// Create an occupied slot linked after `prev`.
    #[inline(always)]
    pub(crate) fn occupied(value: T, prev: u32) -> Self {
        Slot {
            value: Some(value),
            next: EMPTY,
            prev,
        }
    }
}

/// Fixed-capacity, non-resizable array of `K` object slots.
///
/// Slots are filled contiguously from index 0 and never move, so a slot's
/// address is stable for the chunk's lifetime. The storage for all `K` slots
/// is reserved up front; pushing never reallocates.
///
/// # Type Parameters
/// * `T` - Object type
/// * `K` - Number of slots
///
/// # Performance
/// - Push: O(1), no allocation
/// - Reset: O(filled slots) to drop remaining objects
#[derive(Debug)]
pub(crate) struct Chunk<T, const K: usize> {
    /// Slot storage, `capacity() == K` for the chunk's lifetime.
    slots: Vec<Slot<T>>,
}

impl<T, const K: usize> Chunk<T, K> {
    /// Allocate an empty chunk with room for `K` slots.
    ///
    /// # Errors
    /// `MemError::AllocationFailed` if the slot storage cannot be allocated.
    pub(crate) fn try_new() -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(K)
            .map_err(|_| MemError::AllocationFailed {
                size: K.saturating_mul(mem::size_of::<Slot<T>>()),
                align: mem::align_of::<Slot<T>>(),
            })?;
        Ok(Chunk { slots })
    }

    /// Number of slots filled so far (live or freed).
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if every slot has been filled.
    ///
    /// # Returns
    /// `true` exactly when all `K` slots are filled
    #[inline(always)]
    pub(crate) fn has_overflowed(&self) -> bool {
        self.slots.len() == K
    }

    /// Fill the next slot.
    ///
    /// # Returns
    /// Local index of the filled slot
    ///
    /// # Note
    /// Caller must check `has_overflowed()` first.
    #[inline(always)]
    pub(crate) fn push(&mut self, slot: Slot<T>) -> usize {
        debug_assert!(!self.has_overflowed(), "push into a full chunk");
        let index = self.slots.len();
        self.slots.push(slot);
        index
    }

    #[inline(always)]
    pub(crate) fn slot(&self, index: usize) -> Option<&Slot<T>> {
        self.slots.get(index)
    }

    #[inline(always)]
    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Slot<T>> {
        self.slots.get_mut(index)
    }

    /// Drop every object and mark all slots empty, keeping the storage.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.slots.clear();
    }
}
