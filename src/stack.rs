//! LIFO work stack for traversal loops.

use alloc::vec::Vec;

/// Growable stack of `Copy` values with a two-element headroom.
///
/// Storage always holds at least `limit + 2` slots and the stack grows as
/// soon as its length reaches `limit`, so `push` and `push2` never reallocate
/// in the middle of writing. Growth doubles `limit`.
///
/// # Example
/// ```rust
/// use hotpath_containers::FastStack;
///
/// let mut stack = FastStack::with_capacity(2);
/// stack.push2(1u32, 2);
/// stack.push(3);
/// assert_eq!(stack.pop(), Some(3));
/// assert_eq!(stack.pop(), Some(2));
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct FastStack<T: Copy> {
    items: Vec<T>,
    limit: usize,
}

impl<T: Copy> FastStack<T> {
    /// Create a stack that grows once `capacity` elements are pushed.
    pub fn with_capacity(capacity: usize) -> Self {
        let limit = capacity.max(1);
        FastStack {
            items: Vec::with_capacity(limit + 2),
            limit,
        }
    }

    /// Push one element.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
        if self.items.len() >= self.limit {
            self.grow();
        }
    }

    /// Push two elements with a single growth check.
    #[inline]
    pub fn push2(&mut self, first: T, second: T) {
        self.items.push(first);
        self.items.push(second);
        if self.items.len() >= self.limit {
            self.grow();
        }
    }

    /// Pop the most recently pushed element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Most recently pushed element.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Length at which the next growth happens.
    #[inline(always)]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Remove every element, keeping the storage.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[cold]
    fn grow(&mut self) {
        while self.items.len() >= self.limit {
            self.limit = self.limit.saturating_mul(2);
        }
        let headroom = (self.limit + 2).saturating_sub(self.items.len());
        self.items.reserve_exact(headroom);
        log::debug!("work stack grew to limit {}", self.limit);
    }
}

impl<T: Copy> Default for FastStack<T> {
    fn default() -> Self {
        Self::with_capacity(crate::constants::MIN_VEC_CAPACITY)
    }
}
