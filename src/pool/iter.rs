//! Insertion-order iterators over the live objects of an [`ObjectPool`].

use core::iter::FusedIterator;

use crate::constants::EMPTY;
use crate::pool::chunk::Slot;
use crate::pool::object_pool::{ObjectId, ObjectPool};

/// Shared cursor over the live list.
///
/// Yields `(slot index, slot)` and stops at the `EMPTY` terminator.
struct Cursor<'a, T, const K: usize> {
    pool: &'a ObjectPool<T, K>,
    next: u32,
    remaining: usize,
}

impl<'a, T, const K: usize> Cursor<'a, T, K> {
    #[inline(always)]
    fn advance(&mut self) -> Option<(u32, &'a Slot<T>)> {
        if self.next == EMPTY {
            return None;
        }
        let index = self.next;
        let slot = self.pool.slot(index)?;
        self.next = slot.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((index, slot))
    }
}

impl<T, const K: usize> Clone for Cursor<'_, T, K> {
    fn clone(&self) -> Self {
        Cursor {
            pool: self.pool,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

/// Iterator over live objects, oldest first.
///
/// Created by [`ObjectPool::iter`].
pub struct Iter<'a, T, const K: usize> {
    cursor: Cursor<'a, T, K>,
}

impl<'a, T, const K: usize> Iter<'a, T, K> {
    #[inline]
    pub(crate) fn new(pool: &'a ObjectPool<T, K>, first: u32, len: usize) -> Self {
        Iter {
            cursor: Cursor {
                pool,
                next: first,
                remaining: len,
            },
        }
    }
}

impl<'a, T, const K: usize> Iterator for Iter<'a, T, K> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (_, slot) = self.cursor.advance()?;
            // Linked slots are always occupied
            if let Some(value) = slot.value.as_ref() {
                return Some(value);
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<T, const K: usize> ExactSizeIterator for Iter<'_, T, K> {}
impl<T, const K: usize> FusedIterator for Iter<'_, T, K> {}

impl<T, const K: usize> Clone for Iter<'_, T, K> {
    fn clone(&self) -> Self {
        Iter {
            cursor: self.cursor.clone(),
        }
    }
}

/// Iterator over handles of live objects, oldest first.
///
/// Created by [`ObjectPool::ids`].
pub struct Ids<'a, T, const K: usize> {
    cursor: Cursor<'a, T, K>,
}

impl<'a, T, const K: usize> Ids<'a, T, K> {
    #[inline]
    pub(crate) fn new(pool: &'a ObjectPool<T, K>, first: u32, len: usize) -> Self {
        Ids {
            cursor: Cursor {
                pool,
                next: first,
                remaining: len,
            },
        }
    }
}

impl<T, const K: usize> Iterator for Ids<'_, T, K> {
    type Item = ObjectId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (pool, epoch) = (self.cursor.pool.id(), self.cursor.pool.epoch());
        loop {
            let (index, slot) = self.cursor.advance()?;
            if slot.value.is_some() {
                return Some(ObjectId::new(pool, index, epoch));
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<T, const K: usize> ExactSizeIterator for Ids<'_, T, K> {}
impl<T, const K: usize> FusedIterator for Ids<'_, T, K> {}
