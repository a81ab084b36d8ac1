//! Identity-keyed set of borrowed objects with the array/map cutover.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::ptr;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::constants::{DEFAULT_CUTOVER, MAP_RESERVE_FACTOR};
use crate::sparse::iter::PtrListIter;

/// Reference compared and hashed by address instead of by value.
pub(crate) struct ByAddress<'a, T: ?Sized>(&'a T);

impl<'a, T: ?Sized> ByAddress<'a, T> {
    #[inline(always)]
    pub(crate) fn get(&self) -> &'a T {
        self.0
    }
}

impl<T: ?Sized> Clone for ByAddress<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ByAddress<'_, T> {}

impl<T: ?Sized> PartialEq for ByAddress<'_, T> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.0, other.0)
    }
}

impl<T: ?Sized> Eq for ByAddress<'_, T> {}

impl<T: ?Sized> Hash for ByAddress<'_, T> {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.0, state)
    }
}

enum Repr<'a, T: ?Sized, const C: usize> {
    Array(SmallVec<[&'a T; C]>),
    Set(HashSet<ByAddress<'a, T>>),
}

impl<T: ?Sized, const C: usize> Clone for Repr<'_, T, C> {
    fn clone(&self) -> Self {
        match self {
            Repr::Array(items) => Repr::Array(items.clone()),
            Repr::Set(set) => Repr::Set(set.clone()),
        }
    }
}

/// Set of references to externally owned objects, keyed by identity.
///
/// Two references are the same member only if they point at the same object;
/// equal values at different addresses are distinct members. Storage follows
/// the same one-way cutover as [`SparseVec`](crate::sparse::SparseVec): an
/// inline array of up to `C` references, then a hash set.
///
/// # Example
/// ```rust
/// use hotpath_containers::sparse::PtrList;
///
/// let (a, b) = (String::from("x"), String::from("x"));
/// let mut list = PtrList::<String, 4>::new();
///
/// assert!(list.insert(&a));
/// assert!(list.insert(&b));
/// assert!(!list.insert(&a));
/// assert_eq!(list.len(), 2);
/// ```
pub struct PtrList<'a, T: ?Sized, const C: usize = DEFAULT_CUTOVER> {
    repr: Repr<'a, T, C>,
}

impl<'a, T: ?Sized, const C: usize> PtrList<'a, T, C> {
    /// Create an empty list in array state.
    #[inline]
    pub fn new() -> Self {
        PtrList {
            repr: Repr::Array(SmallVec::new()),
        }
    }

    /// Add `item` to the set.
    ///
    /// # Returns
    /// `false` if the same object was already a member
    pub fn insert(&mut self, item: &'a T) -> bool {
        if self.contains(item) {
            return false;
        }

        if let Repr::Array(items) = &self.repr {
            if items.len() >= C {
                self.promote();
            }
        }

        match &mut self.repr {
            Repr::Array(items) => items.push(item),
            Repr::Set(set) => {
                set.insert(ByAddress(item));
            }
        }
        true
    }

    #[cold]
    fn promote(&mut self) {
        let Repr::Array(items) = &self.repr else {
            return;
        };

        let mut set = HashSet::with_capacity(C.saturating_mul(MAP_RESERVE_FACTOR));
        set.extend(items.iter().map(|item| ByAddress(*item)));
        log::debug!("pointer list promoted to set at {} members", set.len());

        self.repr = Repr::Set(set);
    }

    /// Remove `item` from the set.
    ///
    /// # Returns
    /// `true` if the object was a member
    pub fn remove(&mut self, item: &'a T) -> bool {
        match &mut self.repr {
            Repr::Array(items) => match items.iter().position(|p| ptr::eq(*p, item)) {
                Some(pos) => {
                    items.swap_remove(pos);
                    true
                }
                None => false,
            },
            Repr::Set(set) => set.remove(&ByAddress(item)),
        }
    }

    /// Check if the same object is a member.
    pub fn contains(&self, item: &T) -> bool {
        match &self.repr {
            Repr::Array(items) => items.iter().any(|p| ptr::eq(*p, item)),
            Repr::Set(set) => set.contains(&ByAddress(item)),
        }
    }

    /// Iterate members.
    ///
    /// Array order in array state, unspecified in set state.
    #[inline]
    pub fn iter(&self) -> PtrListIter<'_, 'a, T> {
        match &self.repr {
            Repr::Array(items) => PtrListIter::array(items.iter()),
            Repr::Set(set) => PtrListIter::set(set.iter()),
        }
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Array(items) => items.len(),
            Repr::Set(set) => set.len(),
        }
    }

    /// Check if the list has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the list has been promoted to set state.
    #[inline(always)]
    pub fn is_promoted(&self) -> bool {
        matches!(self.repr, Repr::Set(_))
    }

    /// Remove every member, keeping the current representation.
    pub fn clear(&mut self) {
        match &mut self.repr {
            Repr::Array(items) => items.clear(),
            Repr::Set(set) => set.clear(),
        }
    }
}

impl<T: ?Sized, const C: usize> Clone for PtrList<'_, T, C> {
    fn clone(&self) -> Self {
        PtrList {
            repr: self.repr.clone(),
        }
    }
}

impl<T: ?Sized, const C: usize> Default for PtrList<'_, T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s, 'a, T: ?Sized, const C: usize> IntoIterator for &'s PtrList<'a, T, C> {
    type Item = &'a T;
    type IntoIter = PtrListIter<'s, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: ?Sized + fmt::Debug, const C: usize> fmt::Debug for PtrList<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
