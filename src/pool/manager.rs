//! Bounded recycling cache of emptied object pools.

use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::constants::{DEFAULT_CHUNK_CAPACITY, DEFAULT_RECLAIM_CAPACITY};
use crate::pool::handle::ScopedPool;
use crate::pool::object_pool::ObjectPool;

/// Pool manager that recycles reset pools across usage cycles.
///
/// Keeps up to `capacity` idle pools. A pool is either checked out (owned by
/// the caller or a [`ScopedPool`]) or resident in the manager, never both.
/// Resident pools are always empty but keep their chunks, so checking one out
/// again skips chunk allocation.
///
/// # Type Parameters
/// * `T` - Object type of the managed pools
/// * `K` - Chunk capacity of the managed pools
///
/// # Architecture
/// - free: LIFO stack of resident pools (most recently returned is reused first)
/// - capacity: reclamation bound; pools returned beyond it are dropped
///
/// The manager is not synchronized. Methods take `&self` so several scoped
/// handles can be live at once on one thread; sharing a manager across
/// threads requires external locking.
///
/// # Example
/// ```rust
/// use hotpath_containers::PoolManager;
///
/// let manager = PoolManager::<String>::with_capacity(2);
/// {
///     let mut pool = manager.scoped();
///     pool.new_object("frame".to_string()).unwrap();
/// }
/// assert_eq!(manager.resident(), 1);
/// assert!(manager.get_pool().is_empty());
/// ```
pub struct PoolManager<T, const K: usize = DEFAULT_CHUNK_CAPACITY> {
    /// Resident pools, all reset.
    free: RefCell<Vec<ObjectPool<T, K>>>,

    /// Maximum number of resident pools.
    capacity: usize,
}

impl<T, const K: usize> PoolManager<T, K> {
    /// Create a manager retaining up to `DEFAULT_RECLAIM_CAPACITY` pools.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RECLAIM_CAPACITY)
    }

    /// Create a manager retaining up to `capacity` pools.
    ///
    /// A capacity of zero disables recycling: every returned pool is dropped.
    pub fn with_capacity(capacity: usize) -> Self {
        PoolManager {
            free: RefCell::new(Vec::new()),
            capacity,
        }
    }

    /// Check out a pool.
    ///
    /// # Returns
    /// The most recently returned resident pool, or a new empty pool if
    /// none is resident
    ///
    /// # Performance
    /// O(1), no allocation when a resident pool is reused
    pub fn get_pool(&self) -> ObjectPool<T, K> {
        match self.free.borrow_mut().pop() {
            Some(pool) => pool,
            None => ObjectPool::new(),
        }
    }

    /// Reset `pool` and keep it for reuse if there is room.
    ///
    /// # Returns
    /// `true` if the pool became resident, `false` if it was dropped
    /// because the manager is at capacity
    pub fn return_pool(&self, mut pool: ObjectPool<T, K>) -> bool {
        // Object destructors run here, outside the borrow of `free`
        pool.reset();

        let mut free = self.free.borrow_mut();
        if free.len() < self.capacity {
            free.push(pool);
            log::trace!("pool recycled ({} resident)", free.len());
            true
        } else {
            drop(free);
            log::trace!(
                "pool discarded ({} chunks), manager at capacity {}",
                pool.chunk_count(),
                self.capacity
            );
            false
        }
    }

    /// Check out a pool that is returned automatically when the handle drops.
    #[inline]
    pub fn scoped(&self) -> ScopedPool<'_, T, K> {
        ScopedPool::new(self, self.get_pool())
    }

    /// Number of resident (idle) pools.
    pub fn resident(&self) -> usize {
        self.free.borrow().len()
    }

    /// Maximum number of resident pools.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every resident pool and its chunks.
    pub fn clear(&self) {
        let drained = core::mem::take(&mut *self.free.borrow_mut());
        drop(drained);
    }
}

impl<T, const K: usize> Default for PoolManager<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const K: usize> fmt::Debug for PoolManager<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManager")
            .field("resident", &self.resident())
            .field("capacity", &self.capacity)
            .finish()
    }
}
