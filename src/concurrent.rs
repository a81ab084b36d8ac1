//! Growable sequence with a thread-safe append.

use alloc::vec::Vec;
use core::fmt;

use spin::{Mutex, MutexGuard};

/// Vector that several threads may append to at once.
///
/// Each append takes a short spin lock around the push, including any
/// reallocation it triggers. This is a minimal mutual-exclusion wrapper for
/// short critical sections, not a lock-free structure.
///
/// Appends return the position of the new element rather than a reference:
/// a later append may reallocate and move it. Use
/// [`emplace_back_with`](Self::emplace_back_with) to act on the element while
/// the lock is still held, or [`lock`](Self::lock) for serialized reads.
///
/// # Example
/// ```rust
/// use hotpath_containers::AppendVec;
///
/// let log = AppendVec::new();
/// std::thread::scope(|s| {
///     for id in 0..4u32 {
///         let log = &log;
///         s.spawn(move || log.emplace_back(id));
///     }
/// });
///
/// let mut ids = log.into_inner();
/// ids.sort_unstable();
/// assert_eq!(ids, [0, 1, 2, 3]);
/// ```
pub struct AppendVec<T> {
    items: Mutex<Vec<T>>,
}

impl<T> AppendVec<T> {
    /// Create an empty sequence.
    #[inline]
    pub const fn new() -> Self {
        AppendVec {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Create an empty sequence with room for `capacity` elements.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        AppendVec {
            items: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Append `value`.
    ///
    /// # Returns
    /// Position of the new element
    #[inline]
    pub fn emplace_back(&self, value: T) -> usize {
        let mut items = self.items.lock();
        items.push(value);
        items.len() - 1
    }

    /// Append `value` and run `f` on it before the lock is released.
    ///
    /// # Returns
    /// Position of the new element and the result of `f`
    pub fn emplace_back_with<R, F: FnOnce(&mut T) -> R>(&self, value: T, f: F) -> (usize, R) {
        let mut items = self.items.lock();
        items.push(value);
        let index = items.len() - 1;
        let result = f(&mut items[index]);
        (index, result)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Check if the sequence has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lock the sequence for reading or in-place edits.
    ///
    /// Appends from other threads spin until the guard drops, so keep the
    /// guard short-lived.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock()
    }

    /// Access the elements without locking.
    #[inline]
    pub fn get_mut(&mut self) -> &mut Vec<T> {
        self.items.get_mut()
    }

    /// Consume the sequence and return its elements.
    #[inline]
    pub fn into_inner(self) -> Vec<T> {
        self.items.into_inner()
    }
}

impl<T> Default for AppendVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for AppendVec<T> {
    fn from(items: Vec<T>) -> Self {
        AppendVec {
            items: Mutex::new(items),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AppendVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.lock().iter()).finish()
    }
}
