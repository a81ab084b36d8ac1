//! Array/map hybrid keyed by small integer indices.

use core::fmt;
use core::ops::{Index, IndexMut};

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::constants::{DEFAULT_CUTOVER, MAP_RESERVE_FACTOR};
use crate::sparse::entry::SparseEntry;
use crate::sparse::iter::{Iter, IterMut};

/// Storage state. `Map` is terminal.
#[derive(Clone)]
pub(crate) enum Repr<T, const C: usize> {
    /// Up to `C` entries, scanned linearly, insertion ordered until an erase.
    Array(SmallVec<[T; C]>),

    /// Promoted storage, keyed by entry index.
    Map(HashMap<u32, T>),
}

/// Sparse container of index-carrying entries.
///
/// Starts as an inline array of at most `C` entries searched linearly. The
/// first insertion of a new index into a full array promotes the container to
/// a hash map; promotion moves every existing entry into the map and is never
/// undone, not even by `clear()`.
///
/// Erasing in array state swaps the last entry into the hole, so iteration
/// order after an erase is not insertion order. Map state iteration order is
/// unspecified.
///
/// # Type Parameters
/// * `T` - Entry type, see [`SparseEntry`]
/// * `C` - Cutover size (array capacity)
///
/// # Performance
/// - Array state: O(C) lookup, no heap allocation
/// - Map state: O(1) expected lookup
/// - Promotion: O(C), happens at most once
///
/// # Example
/// ```rust
/// use hotpath_containers::sparse::{Indexed, SparseVec};
///
/// let mut sparse = SparseVec::<Indexed<&str>, 2>::new();
/// sparse.find_or_add(4).value = "four";
/// sparse.find_or_add(9).value = "nine";
/// assert!(!sparse.is_promoted());
///
/// sparse.find_or_add(1).value = "one";
/// assert!(sparse.is_promoted());
/// assert_eq!(sparse[4].value, "four");
/// ```
#[derive(Clone)]
pub struct SparseVec<T: SparseEntry, const C: usize = DEFAULT_CUTOVER> {
    repr: Repr<T, C>,
}

impl<T: SparseEntry, const C: usize> SparseVec<T, C> {
    /// Create an empty container in array state.
    #[inline]
    pub fn new() -> Self {
        SparseVec {
            repr: Repr::Array(SmallVec::new()),
        }
    }

    /// Get the entry for `index`, creating it with `T::from_index` if absent.
    ///
    /// Promotes the container to map state when `index` is new and the
    /// array already holds `C` entries.
    pub fn find_or_add(&mut self, index: u32) -> &mut T {
        // One scan of the array decides both lookup and promotion
        let (found, full) = match &self.repr {
            Repr::Array(entries) => (
                entries.iter().position(|e| e.index() == index),
                entries.len() >= C,
            ),
            Repr::Map(_) => (None, false),
        };
        if found.is_none() && full {
            self.promote();
        }

        match &mut self.repr {
            Repr::Array(entries) => {
                let pos = match found {
                    Some(pos) => pos,
                    None => {
                        entries.push(T::from_index(index));
                        entries.len() - 1
                    }
                };
                &mut entries[pos]
            }
            Repr::Map(map) => map.entry(index).or_insert_with(|| T::from_index(index)),
        }
    }

    /// Move every array entry into a freshly reserved map.
    #[cold]
    fn promote(&mut self) {
        let Repr::Array(entries) = &mut self.repr else {
            return;
        };

        let mut map = HashMap::with_capacity(C.saturating_mul(MAP_RESERVE_FACTOR));
        map.extend(entries.drain(..).map(|e| (e.index(), e)));
        log::debug!("sparse container promoted to map at {} entries", map.len());

        self.repr = Repr::Map(map);
    }

    /// Get the entry for `index`.
    pub fn get(&self, index: u32) -> Option<&T> {
        match &self.repr {
            Repr::Array(entries) => entries.iter().find(|e| e.index() == index),
            Repr::Map(map) => map.get(&index),
        }
    }

    /// Get the entry for `index` mutably.
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        match &mut self.repr {
            Repr::Array(entries) => entries.iter_mut().find(|e| e.index() == index),
            Repr::Map(map) => map.get_mut(&index),
        }
    }

    /// Check if an entry exists for `index`.
    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    /// Remove and return the entry for `index`.
    ///
    /// In array state the last entry is moved into the vacated position.
    pub fn erase(&mut self, index: u32) -> Option<T> {
        match &mut self.repr {
            Repr::Array(entries) => {
                let pos = entries.iter().position(|e| e.index() == index)?;
                Some(entries.swap_remove(pos))
            }
            Repr::Map(map) => map.remove(&index),
        }
    }

    /// Apply `action` to every entry.
    ///
    /// Order is the array order in array state and unspecified in map state.
    pub fn for_each<F: FnMut(&mut T)>(&mut self, action: F) {
        match &mut self.repr {
            Repr::Array(entries) => entries.iter_mut().for_each(action),
            Repr::Map(map) => map.values_mut().for_each(action),
        }
    }

    /// Iterate entries, same order as [`for_each`](Self::for_each).
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        match &self.repr {
            Repr::Array(entries) => Iter::array(entries.iter()),
            Repr::Map(map) => Iter::map(map.values()),
        }
    }

    /// Iterate entries mutably.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        match &mut self.repr {
            Repr::Array(entries) => IterMut::array(entries.iter_mut()),
            Repr::Map(map) => IterMut::map(map.values_mut()),
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Array(entries) => entries.len(),
            Repr::Map(map) => map.len(),
        }
    }

    /// Check if the container has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the container has been promoted to map state.
    #[inline(always)]
    pub fn is_promoted(&self) -> bool {
        matches!(self.repr, Repr::Map(_))
    }

    /// Cutover size.
    #[inline(always)]
    pub const fn cutover(&self) -> usize {
        C
    }

    /// Remove every entry, keeping the current representation.
    pub fn clear(&mut self) {
        match &mut self.repr {
            Repr::Array(entries) => entries.clear(),
            Repr::Map(map) => map.clear(),
        }
    }
}

impl<T: SparseEntry, const C: usize> Default for SparseVec<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SparseEntry, const C: usize> Index<u32> for SparseVec<T, C> {
    type Output = T;

    /// # Panics
    /// If no entry exists for `index`.
    fn index(&self, index: u32) -> &T {
        match self.get(index) {
            Some(entry) => entry,
            None => panic!("no sparse entry for index {index}"),
        }
    }
}

impl<T: SparseEntry, const C: usize> IndexMut<u32> for SparseVec<T, C> {
    fn index_mut(&mut self, index: u32) -> &mut T {
        match self.get_mut(index) {
            Some(entry) => entry,
            None => panic!("no sparse entry for index {index}"),
        }
    }
}

impl<'a, T: SparseEntry, const C: usize> IntoIterator for &'a SparseVec<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: SparseEntry, const C: usize> IntoIterator for &'a mut SparseVec<T, C> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: SparseEntry + fmt::Debug, const C: usize> fmt::Debug for SparseVec<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseVec")
            .field("promoted", &self.is_promoted())
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, T: SparseEntry, const C: usize>(&'a SparseVec<T, C>);

impl<T: SparseEntry + fmt::Debug, const C: usize> fmt::Debug for DebugEntries<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::Indexed;
    use alloc::vec::Vec;

    type Counts<const C: usize> = SparseVec<Indexed<u32>, C>;

    fn sorted_indices<const C: usize>(sparse: &Counts<C>) -> Vec<u32> {
        let mut indices: Vec<u32> = sparse.iter().map(|e| e.index()).collect();
        indices.sort_unstable();
        indices
    }

    #[test]
    fn test_find_or_add_creates_once() {
        let mut sparse = Counts::<4>::new();
        sparse.find_or_add(3).value = 30;
        sparse.find_or_add(3).value += 1;

        assert_eq!(sparse.len(), 1);
        assert_eq!(sparse[3].value, 31);
    }

    #[test]
    fn test_stays_array_up_to_cutover() {
        let mut sparse = Counts::<10>::new();
        for i in 0..10 {
            sparse.find_or_add(i * 100).value = i;
        }

        assert!(!sparse.is_promoted());
        assert_eq!(sparse.len(), 10);

        // Existing index on a full array does not promote
        let entry = sparse.find_or_add(500);
        assert_eq!(entry.value, 5);
        entry.value = 55;
        assert!(!sparse.is_promoted());
        assert_eq!(sparse.len(), 10);
        assert_eq!(sparse[500].value, 55);
    }

    #[test]
    fn test_promotes_on_cutover_plus_one() {
        let mut sparse = Counts::<10>::new();
        for i in 0..10 {
            sparse.find_or_add(i * 100).value = i;
        }
        sparse.find_or_add(7).value = 77;

        assert!(sparse.is_promoted());
        assert_eq!(sparse.len(), 11);
        for i in 0..10 {
            assert_eq!(sparse[i * 100].value, i);
        }
        assert_eq!(sparse[7].value, 77);
    }

    #[test]
    fn test_promotion_is_one_way() {
        let mut sparse = Counts::<2>::new();
        for i in 0..3 {
            sparse.find_or_add(i);
        }
        assert!(sparse.is_promoted());

        sparse.erase(0);
        sparse.erase(1);
        assert!(sparse.is_promoted());

        sparse.clear();
        assert!(sparse.is_empty());
        assert!(sparse.is_promoted());
    }

    #[test]
    fn test_erase_swaps_last_into_hole() {
        let mut sparse = Counts::<8>::new();
        for i in 1..=4 {
            sparse.find_or_add(i);
        }

        assert_eq!(sparse.erase(2).map(|e| e.index()), Some(2));
        let order: Vec<u32> = sparse.iter().map(|e| e.index()).collect();
        assert_eq!(order, [1, 4, 3]);
    }

    #[test]
    fn test_erase_then_reinsert_no_duplicate() {
        let mut sparse = Counts::<4>::new();
        sparse.find_or_add(5).value = 1;
        sparse.find_or_add(6);

        sparse.erase(5);
        sparse.find_or_add(5).value = 2;
        sparse.find_or_add(5);

        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse[5].value, 2);
        assert_eq!(sorted_indices(&sparse), [5, 6]);
    }

    #[test]
    fn test_erase_missing() {
        let mut sparse = Counts::<4>::new();
        sparse.find_or_add(1);
        assert!(sparse.erase(2).is_none());
        assert_eq!(sparse.len(), 1);
    }

    #[test]
    fn test_erase_in_map_state() {
        let mut sparse = Counts::<1>::new();
        sparse.find_or_add(1);
        sparse.find_or_add(2);

        assert!(sparse.erase(1).is_some());
        assert!(!sparse.contains(1));
        assert!(sparse.contains(2));
    }

    #[test]
    fn test_for_each_visits_all() {
        let mut sparse = Counts::<3>::new();
        for i in 0..6 {
            sparse.find_or_add(i).value = i;
        }

        sparse.for_each(|e| e.value *= 10);

        let mut total = 0;
        for entry in &sparse {
            total += entry.value;
        }
        assert_eq!(total, 150);
    }

    #[test]
    fn test_iter_mut_in_both_states() {
        let mut sparse = Counts::<2>::new();
        sparse.find_or_add(1);
        for entry in sparse.iter_mut() {
            entry.value = 5;
        }
        assert_eq!(sparse[1].value, 5);

        sparse.find_or_add(2);
        sparse.find_or_add(3);
        for entry in &mut sparse {
            entry.value += 1;
        }
        assert_eq!(sparse[1].value, 6);
        assert_eq!(sparse[3].value, 1);
    }

    #[test]
    fn test_zero_cutover_starts_promoted_on_first_insert() {
        let mut sparse = Counts::<0>::new();
        sparse.find_or_add(1).value = 1;
        assert!(sparse.is_promoted());
        assert_eq!(sparse[1].value, 1);
    }

    #[test]
    fn test_get_missing() {
        let sparse = Counts::<4>::new();
        assert!(sparse.get(0).is_none());
        assert!(sparse.is_empty());
    }

    #[test]
    #[should_panic(expected = "no sparse entry for index 42")]
    fn test_index_missing_panics() {
        let sparse = Counts::<4>::new();
        let _ = &sparse[42];
    }
}
