//! Growable sequence that lives in an inline arena until it outgrows it.

use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;

use crate::arena::inline::{Block, InlineArena};
use crate::constants::MIN_VEC_CAPACITY;
use crate::error::{MemError, Result};

/// Small-buffer vector backed by an `N`-byte [`InlineArena`].
///
/// Behaves like an ordinary growable sequence. Its storage is drawn from the
/// inline arena it owns, so a vector whose contents fit in `N` bytes never
/// touches the heap. Once the contents outgrow the arena, storage moves to
/// the general allocator transparently and every element keeps its value.
///
/// The vector only grows and shrinks at its tail, which is exactly the
/// stack discipline the arena supports: growth extends the top inline block
/// in place, and a spill to the heap hands the inline block back.
///
/// # Type Parameters
/// * `T` - Element type
/// * `N` - Inline capacity in bytes
///
/// # Performance
/// - Push: O(1) amortized, no allocator traffic while inline
/// - Spill: one allocation plus a copy of the current contents
///
/// # Example
/// ```rust
/// use hotpath_containers::ShortVec;
///
/// let mut v = ShortVec::<u32, 64>::new();
/// for i in 0..16 {
///     v.push(i);
/// }
/// assert!(v.is_inline());
/// assert_eq!(v.arena().spill_count(), 0);
///
/// v.push(16);
/// assert!(!v.is_inline());
/// assert_eq!(v[16], 16);
/// assert_eq!(v.iter().sum::<u32>(), (0..17).sum());
/// ```
pub struct ShortVec<T, const N: usize> {
    /// Inline storage the vector draws from first.
    arena: InlineArena<N>,

    /// Current storage block, `None` until the first growth.
    block: Option<Block>,

    /// Number of initialized elements.
    len: usize,

    /// Number of elements the current block can hold.
    cap: usize,

    _marker: PhantomData<T>,
}

// SAFETY: the vector exclusively owns its elements and storage; heap blocks
// are not shared with anything else.
unsafe impl<T: Send, const N: usize> Send for ShortVec<T, N> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, const N: usize> Sync for ShortVec<T, N> {}

impl<T, const N: usize> ShortVec<T, N> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Create an empty vector.
    ///
    /// # Performance
    /// O(1) - no allocation
    #[inline]
    pub const fn new() -> Self {
        Self {
            arena: InlineArena::new(),
            block: None,
            len: 0,
            cap: if Self::IS_ZST { usize::MAX } else { 0 },
            _marker: PhantomData,
        }
    }

    /// Number of elements that fit in the inline arena.
    #[inline(always)]
    pub const fn inline_capacity() -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            N / mem::size_of::<T>()
        }
    }

    /// Number of elements in the vector.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the vector holds no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current storage can hold without growing.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Check if the contents still live in the inline arena.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.block.as_ref().map_or(true, Block::is_inline)
    }

    /// The arena backing this vector.
    #[inline]
    pub fn arena(&self) -> &InlineArena<N> {
        &self.arena
    }

    /// Append an element at the tail.
    ///
    /// # Panics
    /// Panics on capacity overflow. Allocation failure is reported through
    /// `handle_alloc_error`, like the standard collections.
    ///
    /// # Performance
    /// O(1) amortized
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.len == self.cap {
            if let Err(err) = self.grow(self.len + 1) {
                self.grow_failed(err, self.len + 1);
            }
        }
        // SAFETY: len < cap after growing, so the slot is inside the block.
        unsafe { self.as_mut_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Reserve room for at least `additional` more elements.
    ///
    /// # Errors
    /// * `MemError::CapacityOverflow` if the new capacity overflows
    /// * `MemError::AllocationFailed` if spilling to the heap fails
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(MemError::CapacityOverflow)?;
        if required <= self.cap {
            return Ok(());
        }
        self.grow(required)
    }

    /// Remove and return the last element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at `len` was initialized and is now logically
        // outside the vector, so it is read exactly once.
        Some(unsafe { self.as_ptr().add(self.len).read() })
    }

    /// Shorten the vector to `len` elements, dropping the rest.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        self.len = len;
        // SAFETY: the tail elements are initialized and no longer reachable.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.as_mut_ptr().add(len),
                tail,
            ));
        }
    }

    /// Drop every element, keeping the current storage.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// View the contents as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` elements are initialized.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// View the contents as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` elements are initialized.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    #[inline(always)]
    fn as_ptr(&self) -> *const T {
        match &self.block {
            Some(block) => self.arena.block_ptr(block).cast::<T>(),
            None => NonNull::<T>::dangling().as_ptr().cast_const(),
        }
    }

    #[inline(always)]
    fn as_mut_ptr(&mut self) -> *mut T {
        match &self.block {
            Some(block) => self.arena.block_ptr_mut(block).cast::<T>(),
            None => NonNull::dangling().as_ptr(),
        }
    }

    /// Next capacity for a request of `required` elements.
    fn next_capacity(&self, required: usize) -> usize {
        let inline_cap = Self::inline_capacity();
        let doubled = if self.cap == 0 {
            MIN_VEC_CAPACITY.min(inline_cap).max(1)
        } else {
            self.cap.saturating_mul(2)
        };
        let new_cap = doubled.max(required);

        // Fill the arena completely before spilling.
        if new_cap > inline_cap && required <= inline_cap && self.is_inline() {
            inline_cap
        } else {
            new_cap
        }
    }

    /// Move storage to a block of at least `required` elements.
    fn grow(&mut self, required: usize) -> Result<()> {
        if Self::IS_ZST {
            return Err(MemError::CapacityOverflow);
        }
        let new_cap = self.next_capacity(required);
        let layout = Layout::array::<T>(new_cap).map_err(|_| MemError::CapacityOverflow)?;

        // Top inline block: extend in place, nothing moves.
        if let Some(block) = self.block.as_mut() {
            if self.arena.try_extend(block, layout.size()) {
                self.cap = new_cap;
                return Ok(());
            }
        }

        let new_block = self.arena.allocate(layout)?;
        let old_block = self.block.replace(new_block);
        self.cap = new_cap;

        if let Some(old) = old_block {
            if let Some(new) = self.block.as_ref() {
                // SAFETY: `old` holds `len` initialized elements, `new` holds
                // room for `new_cap >= len` elements, and both are live
                // blocks of `self.arena`.
                unsafe {
                    self.arena
                        .copy_block(&old, new, self.len * mem::size_of::<T>());
                }
            }
            self.arena.deallocate(old)?;
        }
        Ok(())
    }

    #[cold]
    fn grow_failed(&self, err: MemError, required: usize) -> ! {
        match err {
            MemError::AllocationFailed { size, align } => match Layout::from_size_align(size, align) {
                Ok(layout) => handle_alloc_error(layout),
                Err(_) => panic!("allocation of {} elements failed", required),
            },
            other => panic!("ShortVec growth failed: {}", other),
        }
    }
}

impl<T, const N: usize> Drop for ShortVec<T, N> {
    fn drop(&mut self) {
        self.clear();
        if let Some(block) = self.block.take() {
            // Own block of the arena: can only be reclaimed or freed.
            let _ = self.arena.deallocate(block);
        }
    }
}

impl<T, const N: usize> Default for ShortVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for ShortVec<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for ShortVec<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone, const N: usize> Clone for ShortVec<T, N> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for ShortVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, const N: usize> PartialEq for ShortVec<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for ShortVec<T, N> {}

impl<T, const N: usize> Extend<T> for ShortVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, const N: usize> FromIterator<T> for ShortVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a ShortVec<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut ShortVec<T, N> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    #[test]
    fn test_new_vec() {
        let v = ShortVec::<u32, 32>::new();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 0);
        assert!(v.is_inline());
        assert_eq!(v.as_slice(), &[] as &[u32]);
    }

    #[test]
    fn test_inline_capacity() {
        assert_eq!(ShortVec::<u32, 64>::inline_capacity(), 16);
        assert_eq!(ShortVec::<u64, 20>::inline_capacity(), 2);
        assert_eq!(ShortVec::<(), 0>::inline_capacity(), usize::MAX);
    }

    #[test]
    fn test_stays_inline_within_capacity() {
        let mut v = ShortVec::<u32, 64>::new();
        for i in 0..16 {
            v.push(i * 2);
        }

        assert!(v.is_inline());
        assert_eq!(v.arena().spill_count(), 0);
        assert_eq!(v.capacity(), 16);
        assert_eq!(v.arena().used(), 64);
    }

    #[test]
    fn test_odd_inline_capacity_is_filled() {
        // 40 bytes = 5 u64: growth 4 -> 5 instead of spilling at 8
        let mut v = ShortVec::<u64, 40>::new();
        for i in 0..5 {
            v.push(i);
        }
        assert!(v.is_inline());
        assert_eq!(v.capacity(), 5);
        assert_eq!(v.arena().spill_count(), 0);
    }

    #[test]
    fn test_spill_preserves_values() {
        let mut v = ShortVec::<u32, 16>::new();
        for i in 0..100 {
            v.push(i);
        }

        assert!(!v.is_inline());
        assert_eq!(v.len(), 100);
        for (i, value) in v.iter().enumerate() {
            assert_eq!(*value, i as u32);
        }
        // Inline block handed back on spill
        assert_eq!(v.arena().used(), 0);
    }

    #[test]
    fn test_pop() {
        let mut v = ShortVec::<u16, 16>::new();
        v.push(1);
        v.push(2);

        assert_eq!(v.pop(), Some(2));
        assert_eq!(v.pop(), Some(1));
        assert_eq!(v.pop(), None);
    }

    #[test]
    fn test_truncate_and_clear_drop_elements() {
        let marker = Rc::new(());
        let mut v = ShortVec::<Rc<()>, 64>::new();
        for _ in 0..6 {
            v.push(Rc::clone(&marker));
        }
        assert_eq!(Rc::strong_count(&marker), 7);

        v.truncate(2);
        assert_eq!(v.len(), 2);
        assert_eq!(Rc::strong_count(&marker), 3);

        v.clear();
        assert!(v.is_empty());
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn test_drop_releases_elements() {
        let marker = Rc::new(());
        {
            let mut v = ShortVec::<Rc<()>, 16>::new();
            for _ in 0..10 {
                v.push(Rc::clone(&marker));
            }
            assert!(!v.is_inline());
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn test_owned_strings_across_spill() {
        let mut v = ShortVec::<String, 48>::new();
        for i in 0..8 {
            v.push(i.to_string());
        }
        let collected: Vec<&str> = v.iter().map(String::as_str).collect();
        assert_eq!(collected, ["0", "1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut v = ShortVec::<(), 0>::new();
        for _ in 0..1000 {
            v.push(());
        }
        assert_eq!(v.len(), 1000);
        assert!(v.is_inline());
        assert_eq!(v.pop(), Some(()));
    }

    #[test]
    fn test_zero_byte_arena_spills_immediately() {
        let mut v = ShortVec::<u8, 0>::new();
        v.push(7);
        assert!(!v.is_inline());
        assert_eq!(v.arena().spill_count(), 1);
        assert_eq!(v[0], 7);
    }

    #[test]
    fn test_try_reserve() {
        let mut v = ShortVec::<u32, 16>::new();
        v.try_reserve(4).unwrap();
        assert_eq!(v.capacity(), 4);
        assert!(v.is_inline());

        assert_eq!(v.try_reserve(usize::MAX), Err(MemError::CapacityOverflow));
    }

    #[test]
    fn test_deref_mut_and_collect() {
        let mut v: ShortVec<i32, 32> = (1..=5).collect();
        for value in v.iter_mut() {
            *value *= 10;
        }
        v.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(v.as_slice(), &[50, 40, 30, 20, 10]);
    }

    #[test]
    fn test_clone_and_eq() {
        let v: ShortVec<u8, 8> = (0..20).collect();
        let cloned = v.clone();
        assert_eq!(v, cloned);
    }

    #[test]
    fn test_move_keeps_inline_contents() {
        let mut v = ShortVec::<u64, 64>::new();
        v.extend([1, 2, 3]);
        let moved = v;
        let boxed = alloc::boxed::Box::new(moved);
        assert_eq!(boxed.as_slice(), &[1, 2, 3]);
    }
}
