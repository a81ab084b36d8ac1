//! Unbounded object pool built from a chain of fixed-size chunks.

use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::constants::{DEFAULT_CHUNK_CAPACITY, EMPTY};
use crate::error::{MemError, Result};
use crate::pool::chunk::{Chunk, Slot};
use crate::pool::iter::{Ids, Iter};

/// Source of pool identities stamped into every handle.
static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

/// Stable handle to an object allocated from an [`ObjectPool`].
///
/// The handle names the issuing pool, a slot (global index across all
/// chunks) and the pool epoch it was issued in. `reset()` bumps the epoch,
/// so handles issued before a reset are detected as stale instead of
/// aliasing new objects. A handle presented to another pool is unknown there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    pool: u32,
    slot: u32,
    epoch: u64,
}

impl ObjectId {
    #[inline(always)]
    pub(crate) fn new(pool: u32, slot: u32, epoch: u64) -> Self {
        ObjectId { pool, slot, epoch }
    }

    /// Identity of the pool that issued the handle.
    #[inline(always)]
    pub fn pool(&self) -> u32 {
        self.pool
    }

    /// Global slot index of the object.
    #[inline(always)]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Pool epoch the handle was issued in.
    #[inline(always)]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Unbounded pool of `T` built from a chain of `K`-slot chunks.
///
/// Objects are constructed into the next free slot of the active chunk; a
/// new chunk is appended when the active one has overflowed. Chunks are never
/// resized or moved, so an object stays at the same address until it is
/// freed or the pool is reset.
///
/// Live objects form a doubly linked list threaded through each slot's
/// `next`/`prev` links (global slot indices, `EMPTY` terminated):
/// - `first`: oldest live object (`begin`)
/// - `last`: most recently appended live object
/// - `next_free`: the next slot to construct into (`end`, never live)
///
/// Freeing unlinks the object in O(1) but does not recycle its slot; slot
/// storage is only reclaimed by `reset()`, which keeps the chunks for reuse.
///
/// # Type Parameters
/// * `T` - Object type
/// * `K` - Slots per chunk (must be non-zero)
///
/// # Performance
/// - `new_object`: O(1) amortized (chunk append every `K` objects)
/// - `free`: O(1) relink of the neighbours
/// - Iteration: O(1) per live object, insertion order
/// - `len`: O(1)
///
/// # Example
/// ```rust
/// use hotpath_containers::ObjectPool;
///
/// let mut pool = ObjectPool::<u32, 4>::new();
/// let _a = pool.new_object(42).unwrap();
/// let b = pool.new_object(7).unwrap();
/// let _c = pool.new_object(13).unwrap();
///
/// assert_eq!(pool.free(b).unwrap(), 7);
///
/// let live: Vec<u32> = pool.iter().copied().collect();
/// assert_eq!(live, vec![42, 13]);
/// assert_eq!(pool.len(), 2);
/// ```
pub struct ObjectPool<T, const K: usize = DEFAULT_CHUNK_CAPACITY> {
    /// Chunk chain; append-only between resets.
    chunks: Vec<Chunk<T, K>>,

    /// Index of the chunk receiving new objects.
    active: usize,

    /// Slot of the oldest live object (EMPTY if none).
    first: u32,

    /// Slot of the most recently appended live object (EMPTY if none).
    last: u32,

    /// Number of live objects.
    len: usize,

    /// Process-wide identity, kept across resets.
    id: u32,

    /// Incremented by every `reset()`.
    epoch: u64,
}

impl<T, const K: usize> ObjectPool<T, K> {
    /// Create an empty pool.
    ///
    /// The first chunk is allocated by the first `new_object` call. Each
    /// pool draws a fresh identity, so its handles are not accepted by other
    /// pools (identities repeat only after 2^32 pools).
    ///
    /// # Performance
    /// O(1) - no allocation
    #[inline]
    pub fn new() -> Self {
        const { assert!(K > 0, "chunk capacity must be non-zero") };
        ObjectPool {
            chunks: Vec::new(),
            active: 0,
            first: EMPTY,
            last: EMPTY,
            len: 0,
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
        }
    }

    /// Construct `value` in the next free slot.
    ///
    /// # Arguments
    /// * `value` - Object to store
    ///
    /// # Returns
    /// Handle that stays valid until the object is freed or the pool is reset
    ///
    /// # Errors
    /// * `MemError::AllocationFailed` if a new chunk cannot be allocated
    /// * `MemError::CapacityOverflow` if the slot index space is exhausted
    ///
    /// # Performance
    /// O(1) amortized
    pub fn new_object(&mut self, value: T) -> Result<ObjectId> {
        if self.chunks.is_empty() || self.chunks[self.active].has_overflowed() {
            self.advance_chunk()?;
        }

        let chunk = &mut self.chunks[self.active];
        let global = self.active * K + chunk.len();
        let slot = match u32::try_from(global) {
            Ok(slot) if slot != EMPTY => slot,
            _ => return Err(MemError::CapacityOverflow),
        };

        chunk.push(Slot::occupied(value, self.last));
        match self.slot_mut(self.last) {
            Some(prev) => prev.next = slot,
            None => self.first = slot,
        }
        self.last = slot;
        self.len += 1;

        Ok(ObjectId::new(self.id, slot, self.epoch))
    }

    /// Move the active marker to the next chunk, appending one if needed.
    fn advance_chunk(&mut self) -> Result<()> {
        if self.chunks.is_empty() {
            self.push_chunk()?;
            self.active = 0;
            return Ok(());
        }

        if self.active + 1 == self.chunks.len() {
            self.push_chunk()?;
        }
        self.active += 1;
        Ok(())
    }

    fn push_chunk(&mut self) -> Result<()> {
        let chunk = Chunk::try_new()?;
        self.chunks
            .try_reserve(1)
            .map_err(|_| MemError::CapacityOverflow)?;
        self.chunks.push(chunk);
        log::trace!(
            "object pool grew to {} chunks ({} slots each)",
            self.chunks.len(),
            K
        );
        Ok(())
    }

    /// Free the object behind `id`, returning it.
    ///
    /// The object is unlinked from the live list by relinking its
    /// neighbours. Its slot is not reused until the pool is reset.
    ///
    /// # Errors
    /// * `MemError::UnknownHandle` if `id` was issued by another pool or
    ///   names a slot never constructed
    /// * `MemError::StaleHandle` if `id` predates the last `reset()`
    /// * `MemError::DoubleFree` if the object was already freed
    ///
    /// # Performance
    /// O(1)
    pub fn free(&mut self, id: ObjectId) -> Result<T> {
        let slot = self.live_slot_mut(id)?;
        let (prev, next) = (slot.prev, slot.next);
        let value = slot.value.take().ok_or(MemError::DoubleFree { slot: id.slot })?;
        self.unlink(prev, next);
        Ok(value)
    }

    /// Relink the neighbours of a removed object.
    #[inline(always)]
    fn unlink(&mut self, prev: u32, next: u32) {
        match self.slot_mut(prev) {
            Some(slot) => slot.next = next,
            None => self.first = next,
        }
        match self.slot_mut(next) {
            Some(slot) => slot.prev = prev,
            None => self.last = prev,
        }
        self.len -= 1;
    }

    /// Get the object behind `id`, if it is still live.
    #[inline]
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        if id.pool != self.id || id.epoch != self.epoch {
            return None;
        }
        self.slot(id.slot)?.value.as_ref()
    }

    /// Get the object behind `id` mutably, if it is still live.
    #[inline]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        if id.pool != self.id || id.epoch != self.epoch {
            return None;
        }
        self.slot_mut(id.slot)?.value.as_mut()
    }

    /// Check if `id` names a live object of this pool.
    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Oldest live object.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.slot(self.first)?.value.as_ref()
    }

    /// Most recently appended live object.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.slot(self.last)?.value.as_ref()
    }

    /// Number of live objects.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the pool has no live objects.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of chunks allocated (kept across resets).
    #[inline(always)]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of slots consumed since the last reset, live or freed.
    ///
    /// This is the position of `next_free`.
    #[inline]
    pub fn slot_count(&self) -> usize {
        match self.chunks.get(self.active) {
            Some(chunk) => self.active * K + chunk.len(),
            None => 0,
        }
    }

    /// Current epoch (number of resets performed).
    #[inline(always)]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline(always)]
    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    /// Iterate live objects in insertion order.
    ///
    /// # Performance
    /// O(1) per element - follows the `next` links
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, K> {
        Iter::new(self, self.first, self.len)
    }

    /// Iterate handles of live objects in insertion order.
    #[inline]
    pub fn ids(&self) -> Ids<'_, T, K> {
        Ids::new(self, self.first, self.len)
    }

    /// Apply `f` to every live object in insertion order.
    pub fn for_each_mut<F: FnMut(&mut T)>(&mut self, mut f: F) {
        let mut cursor = self.first;
        while let Some(slot) = self.slot_mut(cursor) {
            cursor = slot.next;
            if let Some(value) = slot.value.as_mut() {
                f(value);
            }
        }
    }

    /// Free every live object for which `keep` returns `false`.
    ///
    /// This is the way to free objects while walking the pool: the walk
    /// fetches the successor before the visited object is unlinked.
    ///
    /// # Returns
    /// Number of objects freed
    pub fn retain<F: FnMut(&mut T) -> bool>(&mut self, mut keep: F) -> usize {
        let mut freed = 0;
        let mut cursor = self.first;
        while let Some(slot) = self.slot_mut(cursor) {
            let (prev, next) = (slot.prev, slot.next);
            let remove = match slot.value.as_mut() {
                Some(value) => !keep(value),
                None => false,
            };
            if remove {
                slot.value = None;
                self.unlink(prev, next);
                freed += 1;
            }
            cursor = next;
        }
        freed
    }

    /// Drop every object and return the pool to its initial state.
    ///
    /// Chunks are emptied but kept, so refilling the pool does not allocate
    /// again. Every handle issued so far becomes stale.
    ///
    /// # Performance
    /// O(slots consumed) to drop remaining objects
    pub fn reset(&mut self) {
        for chunk in self.chunks.iter_mut() {
            chunk.reset();
        }
        self.active = 0;
        self.first = EMPTY;
        self.last = EMPTY;
        self.len = 0;
        self.epoch += 1;
    }

    /// Slot at a global index; `None` for `EMPTY` or unconstructed slots.
    #[inline(always)]
    pub(crate) fn slot(&self, index: u32) -> Option<&Slot<T>> {
        let index = index as usize;
        self.chunks.get(index / K)?.slot(index % K)
    }

    #[inline(always)]
    fn slot_mut(&mut self, index: u32) -> Option<&mut Slot<T>> {
        let index = index as usize;
        self.chunks.get_mut(index / K)?.slot_mut(index % K)
    }

    /// Validate `id` and return its slot.
    fn live_slot_mut(&mut self, id: ObjectId) -> Result<&mut Slot<T>> {
        if id.pool != self.id {
            return Err(MemError::UnknownHandle { slot: id.slot });
        }
        if id.epoch != self.epoch {
            return Err(MemError::StaleHandle {
                slot: id.slot,
                epoch: id.epoch,
                current: self.epoch,
            });
        }
        self.slot_mut(id.slot)
            .ok_or(MemError::UnknownHandle { slot: id.slot })
    }
}

impl<T, const K: usize> Default for ObjectPool<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, const K: usize> IntoIterator for &'a ObjectPool<T, K> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug, const K: usize> fmt::Debug for ObjectPool<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
