//! Iterators over sparse containers.
//!
//! Each iterator wraps whichever storage iterator the container was in when
//! the iterator was created. `fold` (and everything built on it, such as
//! `for_each` and `sum`) selects the storage iterator once and then runs the
//! inner loop without re-dispatching per element.

use core::iter::FusedIterator;
use core::slice;

use hashbrown::{hash_map, hash_set};

use crate::sparse::ptr_list::ByAddress;

enum IterRepr<'a, T> {
    Array(slice::Iter<'a, T>),
    Map(hash_map::Values<'a, u32, T>),
}

/// Iterator over the entries of a [`SparseVec`](crate::sparse::SparseVec).
pub struct Iter<'a, T> {
    inner: IterRepr<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    #[inline]
    pub(crate) fn array(iter: slice::Iter<'a, T>) -> Self {
        Iter {
            inner: IterRepr::Array(iter),
        }
    }

    #[inline]
    pub(crate) fn map(iter: hash_map::Values<'a, u32, T>) -> Self {
        Iter {
            inner: IterRepr::Map(iter),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterRepr::Array(iter) => iter.next(),
            IterRepr::Map(iter) => iter.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            IterRepr::Array(iter) => iter.size_hint(),
            IterRepr::Map(iter) => iter.size_hint(),
        }
    }

    #[inline]
    fn fold<B, F: FnMut(B, Self::Item) -> B>(self, init: B, f: F) -> B {
        match self.inner {
            IterRepr::Array(iter) => iter.fold(init, f),
            IterRepr::Map(iter) => iter.fold(init, f),
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

enum IterMutRepr<'a, T> {
    Array(slice::IterMut<'a, T>),
    Map(hash_map::ValuesMut<'a, u32, T>),
}

/// Mutable iterator over the entries of a
/// [`SparseVec`](crate::sparse::SparseVec).
pub struct IterMut<'a, T> {
    inner: IterMutRepr<'a, T>,
}

impl<'a, T> IterMut<'a, T> {
    #[inline]
    pub(crate) fn array(iter: slice::IterMut<'a, T>) -> Self {
        IterMut {
            inner: IterMutRepr::Array(iter),
        }
    }

    #[inline]
    pub(crate) fn map(iter: hash_map::ValuesMut<'a, u32, T>) -> Self {
        IterMut {
            inner: IterMutRepr::Map(iter),
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterMutRepr::Array(iter) => iter.next(),
            IterMutRepr::Map(iter) => iter.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            IterMutRepr::Array(iter) => iter.size_hint(),
            IterMutRepr::Map(iter) => iter.size_hint(),
        }
    }

    #[inline]
    fn fold<B, F: FnMut(B, Self::Item) -> B>(self, init: B, f: F) -> B {
        match self.inner {
            IterMutRepr::Array(iter) => iter.fold(init, f),
            IterMutRepr::Map(iter) => iter.fold(init, f),
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

enum PtrIterRepr<'s, 'a, T: ?Sized> {
    Array(slice::Iter<'s, &'a T>),
    Set(hash_set::Iter<'s, ByAddress<'a, T>>),
}

/// Iterator over the members of a [`PtrList`](crate::sparse::PtrList).
///
/// Yields the stored references themselves, so items outlive the borrow of
/// the list.
pub struct PtrListIter<'s, 'a, T: ?Sized> {
    inner: PtrIterRepr<'s, 'a, T>,
}

impl<'s, 'a, T: ?Sized> PtrListIter<'s, 'a, T> {
    #[inline]
    pub(crate) fn array(iter: slice::Iter<'s, &'a T>) -> Self {
        PtrListIter {
            inner: PtrIterRepr::Array(iter),
        }
    }

    #[inline]
    pub(crate) fn set(iter: hash_set::Iter<'s, ByAddress<'a, T>>) -> Self {
        PtrListIter {
            inner: PtrIterRepr::Set(iter),
        }
    }
}

impl<'a, T: ?Sized> Iterator for PtrListIter<'_, 'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            PtrIterRepr::Array(iter) => iter.next().copied(),
            PtrIterRepr::Set(iter) => iter.next().map(ByAddress::get),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            PtrIterRepr::Array(iter) => iter.size_hint(),
            PtrIterRepr::Set(iter) => iter.size_hint(),
        }
    }

    #[inline]
    fn fold<B, F: FnMut(B, Self::Item) -> B>(self, init: B, f: F) -> B {
        match self.inner {
            PtrIterRepr::Array(iter) => iter.copied().fold(init, f),
            PtrIterRepr::Set(iter) => iter.map(ByAddress::get).fold(init, f),
        }
    }
}

impl<T: ?Sized> ExactSizeIterator for PtrListIter<'_, '_, T> {}
impl<T: ?Sized> FusedIterator for PtrListIter<'_, '_, T> {}
