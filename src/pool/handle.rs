//! Scoped checkout of a pool from a [`PoolManager`].

use core::fmt;
use core::mem;
use core::ops::{Deref, DerefMut};

use crate::pool::manager::PoolManager;
use crate::pool::object_pool::ObjectPool;

/// Pool checked out of a [`PoolManager`] for the lifetime of the handle.
///
/// Dereferences to the [`ObjectPool`]. When the handle drops, on normal exit,
/// early return or unwinding, the pool is handed back through
/// [`PoolManager::return_pool`] exactly once.
pub struct ScopedPool<'m, T, const K: usize> {
    manager: &'m PoolManager<T, K>,
    pool: ObjectPool<T, K>,
}

impl<'m, T, const K: usize> ScopedPool<'m, T, K> {
    #[inline]
    pub(crate) fn new(manager: &'m PoolManager<T, K>, pool: ObjectPool<T, K>) -> Self {
        ScopedPool { manager, pool }
    }

    /// Manager the pool is returned to.
    #[inline(always)]
    pub fn manager(&self) -> &'m PoolManager<T, K> {
        self.manager
    }
}

impl<T, const K: usize> Deref for ScopedPool<'_, T, K> {
    type Target = ObjectPool<T, K>;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

impl<T, const K: usize> DerefMut for ScopedPool<'_, T, K> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pool
    }
}

impl<T, const K: usize> Drop for ScopedPool<'_, T, K> {
    fn drop(&mut self) {
        // An empty pool without chunks is left behind and never allocates
        let pool = mem::take(&mut self.pool);
        self.manager.return_pool(pool);
    }
}

impl<T: fmt::Debug, const K: usize> fmt::Debug for ScopedPool<'_, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopedPool").field(&self.pool).finish()
    }
}
