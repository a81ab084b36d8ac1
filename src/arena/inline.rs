//! Fixed-capacity bump arena with heap fallback.

use alloc::alloc::{alloc, dealloc};
use core::alloc::Layout;
use core::fmt;
use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};

use crate::constants::ARENA_ALIGN;
use crate::error::{MemError, Result};

/// Inline byte buffer aligned to `ARENA_ALIGN`.
#[repr(C, align(16))]
struct AlignedBuf<const N: usize>([MaybeUninit<u8>; N]);

/// Where a block handed out by an [`InlineArena`] lives.
#[derive(Debug, PartialEq, Eq)]
enum Repr {
    /// Byte range `[offset, offset + len)` of the inline buffer, valid only
    /// while the arena is still at `generation`.
    Inline {
        offset: usize,
        len: usize,
        generation: u32,
    },
    /// Memory obtained from the general allocator.
    Heap { ptr: NonNull<u8>, layout: Layout },
}

/// A block of memory handed out by [`InlineArena::allocate`].
///
/// Inline blocks are stored as offsets rather than pointers, so the arena
/// (and whatever owns it) may be moved while blocks are outstanding.
///
/// A block is not `Clone`: it must be handed back through
/// [`InlineArena::deallocate`] exactly once. Dropping a heap block without
/// deallocating it leaks the memory.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "blocks must be returned through `InlineArena::deallocate`"]
pub struct Block(Repr);

impl Block {
    /// Size of the block in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        match self.0 {
            Repr::Inline { len, .. } => len,
            Repr::Heap { layout, .. } => layout.size(),
        }
    }

    /// Check if the block has zero size.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the block lives inside the arena's inline buffer.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.0, Repr::Inline { .. })
    }

    /// Offset of an inline block within the buffer, `None` for heap blocks.
    #[inline]
    pub fn offset(&self) -> Option<usize> {
        match self.0 {
            Repr::Inline { offset, .. } => Some(offset),
            Repr::Heap { .. } => None,
        }
    }

    /// Resolve the block's start address against an inline buffer base.
    #[inline(always)]
    fn resolve(&self, base: *mut u8) -> *mut u8 {
        match self.0 {
            Repr::Inline { offset, .. } => base.wrapping_add(offset),
            Repr::Heap { ptr, .. } => ptr.as_ptr(),
        }
    }
}

/// Outcome of [`InlineArena::deallocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deallocation {
    /// The block was on top of the stack; the cursor retreated over it.
    Reclaimed,
    /// The block was inline but not on top; its bytes stay consumed until
    /// the next `reset()`.
    Leaked,
    /// The block came from the general allocator and was freed there.
    Freed,
}

/// Fixed-capacity bump arena of `N` inline bytes.
///
/// Requests are served by advancing a cursor through the inline buffer.
/// When the buffer cannot satisfy a request, the general allocator is used
/// instead. Only the most recently allocated inline block can be given back
/// (stack discipline); any other inline block stays consumed until `reset()`.
///
/// # Memory Layout
/// - `buf`: `N` bytes, aligned to `ARENA_ALIGN` (16)
/// - `cursor`: first free byte of `buf` (0 ≤ cursor ≤ N)
/// - `spills`: number of requests that fell back to the general allocator
/// - `generation`: bumped by `reset()`; inline blocks carry the generation
///   they were issued in
///
/// # Performance
/// - Inline allocate/deallocate: O(1), no allocator traffic
/// - Fallback allocate/deallocate: one general allocator call
///
/// # Example
/// ```rust
/// use core::alloc::Layout;
/// use hotpath_containers::arena::{Deallocation, InlineArena};
///
/// let mut arena = InlineArena::<64>::new();
/// let block = arena.allocate(Layout::new::<[u32; 4]>()).unwrap();
/// assert!(block.is_inline());
/// assert_eq!(arena.used(), 16);
/// assert_eq!(arena.deallocate(block).unwrap(), Deallocation::Reclaimed);
/// assert_eq!(arena.used(), 0);
/// ```
pub struct InlineArena<const N: usize> {
    /// Inline storage.
    buf: AlignedBuf<N>,

    /// First free byte of `buf`.
    cursor: usize,

    /// Number of fallback allocations performed.
    spills: usize,

    /// Reset counter stamped into inline blocks.
    generation: u32,
}

impl<const N: usize> InlineArena<N> {
    /// Create an empty arena.
    ///
    /// # Performance
    /// O(1) - the buffer is left uninitialized
    #[inline]
    pub const fn new() -> Self {
        Self {
            buf: AlignedBuf([MaybeUninit::uninit(); N]),
            cursor: 0,
            spills: 0,
            generation: 0,
        }
    }

    /// Inline capacity in bytes.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of inline bytes consumed (including alignment padding).
    #[inline(always)]
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Number of inline bytes still available.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        N - self.cursor
    }

    /// Number of requests that were passed on to the general allocator.
    #[inline(always)]
    pub fn spill_count(&self) -> usize {
        self.spills
    }

    /// Allocate a block for `layout`.
    ///
    /// Served from the inline buffer when the aligned request fits in the
    /// remaining capacity, otherwise from the general allocator. No memory
    /// is initialized.
    ///
    /// # Arguments
    /// * `layout` - Size and alignment of the request
    ///
    /// # Returns
    /// The allocated block
    ///
    /// # Errors
    /// `MemError::AllocationFailed` if the fallback allocation fails.
    ///
    /// # Performance
    /// O(1) - cursor bump, or one allocator call on fallback
    pub fn allocate(&mut self, layout: Layout) -> Result<Block> {
        if layout.align() <= ARENA_ALIGN {
            let start = align_up(self.cursor, layout.align());
            if let Some(end) = start.checked_add(layout.size()) {
                if end <= N {
                    self.cursor = end;
                    return Ok(Block(Repr::Inline {
                        offset: start,
                        len: layout.size(),
                        generation: self.generation,
                    }));
                }
            }
        }

        self.allocate_heap(layout)
    }

    /// Fallback path: hand the request to the general allocator.
    #[cold]
    fn allocate_heap(&mut self, layout: Layout) -> Result<Block> {
        if layout.size() == 0 {
            // Zero-sized: a well-aligned dangling pointer, never freed.
            let ptr = NonNull::new(ptr::null_mut::<u8>().wrapping_add(layout.align()))
                .ok_or(MemError::CapacityOverflow)?;
            return Ok(Block(Repr::Heap { ptr, layout }));
        }

        log::debug!(
            "inline arena of {} bytes exhausted ({} used), spilling {} bytes to the heap",
            N,
            self.cursor,
            layout.size()
        );

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc(layout) };
        let ptr = NonNull::new(raw).ok_or(MemError::AllocationFailed {
            size: layout.size(),
            align: layout.align(),
        })?;
        self.spills += 1;
        Ok(Block(Repr::Heap { ptr, layout }))
    }

    /// Return a block to the arena.
    ///
    /// # Arguments
    /// * `block` - Block previously returned by `allocate` on this arena
    ///
    /// # Returns
    /// * `Reclaimed` if the block was the top of the inline stack
    /// * `Leaked` if it was inline but not on top
    /// * `Freed` if it came from the general allocator
    ///
    /// # Errors
    /// `MemError::StaleBlock` if an inline block was issued before the last
    /// `reset()` or extends past the cursor (already reclaimed).
    ///
    /// # Performance
    /// O(1)
    pub fn deallocate(&mut self, block: Block) -> Result<Deallocation> {
        match block.0 {
            Repr::Inline {
                offset,
                len,
                generation,
            } => {
                let end = offset + len;
                if generation != self.generation || end > self.cursor {
                    return Err(MemError::StaleBlock { offset, len });
                }
                if end == self.cursor {
                    self.cursor = offset;
                    Ok(Deallocation::Reclaimed)
                } else {
                    Ok(Deallocation::Leaked)
                }
            }
            Repr::Heap { ptr, layout } => {
                if layout.size() != 0 {
                    // SAFETY: heap blocks are only created by `allocate_heap`
                    // with this exact layout, and `Block` is not `Clone`, so
                    // each one is freed at most once.
                    unsafe { dealloc(ptr.as_ptr(), layout) };
                }
                Ok(Deallocation::Freed)
            }
        }
    }

    /// Grow (or shrink) the top-of-stack inline block in place.
    ///
    /// # Arguments
    /// * `block` - Block to resize; updated on success
    /// * `new_len` - Requested size in bytes
    ///
    /// # Returns
    /// `true` if the block was resized, `false` if it is not the top inline
    /// block or the new size does not fit
    #[inline]
    pub fn try_extend(&mut self, block: &mut Block, new_len: usize) -> bool {
        let Repr::Inline {
            offset,
            len,
            generation,
        } = &mut block.0
        else {
            return false;
        };
        if *generation != self.generation || *offset + *len != self.cursor {
            return false;
        }
        match offset.checked_add(new_len) {
            Some(end) if end <= N => {
                self.cursor = end;
                *len = new_len;
                true
            }
            _ => false,
        }
    }

    /// Rewind the cursor to the start of the buffer.
    ///
    /// Every inline block issued so far is invalidated; deallocating one of
    /// them afterwards reports `StaleBlock` and `try_extend` refuses it.
    /// Heap blocks are unaffected and must still be deallocated.
    ///
    /// The generation counter wraps after 2^32 resets.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Start address of `block` for reading.
    ///
    /// The pointer is only dereferenceable while the block is live and the
    /// arena is neither moved nor mutably borrowed.
    #[inline]
    pub fn block_ptr(&self, block: &Block) -> *const u8 {
        block.resolve(self.buf.0.as_ptr().cast::<u8>().cast_mut())
    }

    /// Start address of `block` for writing.
    #[inline]
    pub fn block_ptr_mut(&mut self, block: &Block) -> *mut u8 {
        block.resolve(self.buf.0.as_mut_ptr().cast::<u8>())
    }

    /// Copy `bytes` bytes from `src` to `dst`.
    ///
    /// # Safety
    /// Both blocks must be live blocks of this arena holding at least
    /// `bytes` bytes, and the first `bytes` bytes of `src` must be
    /// initialized.
    pub(crate) unsafe fn copy_block(&mut self, src: &Block, dst: &Block, bytes: usize) {
        let base = self.buf.0.as_mut_ptr().cast::<u8>();
        // SAFETY: both addresses are derived from the same base pointer and
        // lie within live blocks, per the caller's contract.
        unsafe { ptr::copy(src.resolve(base), dst.resolve(base), bytes) };
    }
}

impl<const N: usize> Default for InlineArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for InlineArena<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineArena")
            .field("capacity", &N)
            .field("used", &self.cursor)
            .field("spills", &self.spills)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Round `val` up to the next multiple of `align` (a power of two).
#[inline(always)]
const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_arena() {
        let arena = InlineArena::<32>::new();
        assert_eq!(arena.capacity(), 32);
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.remaining(), 32);
        assert_eq!(arena.spill_count(), 0);
    }

    #[test]
    fn test_buffer_alignment() {
        assert_eq!(core::mem::align_of::<AlignedBuf<1>>(), ARENA_ALIGN);
        let arena = InlineArena::<8>::new();
        assert_eq!(arena.buf.0.as_ptr() as usize % ARENA_ALIGN, 0);
    }

    #[test]
    fn test_bump_allocation() {
        let mut arena = InlineArena::<64>::new();

        let a = arena.allocate(Layout::from_size_align(8, 8).unwrap()).unwrap();
        let b = arena.allocate(Layout::from_size_align(8, 8).unwrap()).unwrap();

        assert_eq!(a.offset(), Some(0));
        assert_eq!(b.offset(), Some(8));
        assert_eq!(arena.used(), 16);

        arena.deallocate(b).unwrap();
        arena.deallocate(a).unwrap();
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_alignment_padding() {
        let mut arena = InlineArena::<64>::new();

        let a = arena.allocate(Layout::from_size_align(3, 1).unwrap()).unwrap();
        let b = arena.allocate(Layout::from_size_align(8, 8).unwrap()).unwrap();

        assert_eq!(a.offset(), Some(0));
        assert_eq!(b.offset(), Some(8));
        assert_eq!(arena.block_ptr(&b) as usize % 8, 0);

        arena.deallocate(b).unwrap();
        arena.deallocate(a).unwrap();
    }

    #[test]
    fn test_deallocate_top_reclaims() {
        let mut arena = InlineArena::<32>::new();
        let block = arena.allocate(Layout::new::<u64>()).unwrap();

        assert_eq!(arena.deallocate(block).unwrap(), Deallocation::Reclaimed);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_deallocate_non_top_leaks() {
        let mut arena = InlineArena::<32>::new();
        let a = arena.allocate(Layout::new::<u64>()).unwrap();
        let b = arena.allocate(Layout::new::<u64>()).unwrap();

        // `a` is buried under `b`: the space stays consumed
        assert_eq!(arena.deallocate(a).unwrap(), Deallocation::Leaked);
        assert_eq!(arena.used(), 16);

        // Popping `b` only retreats to `b`'s start
        assert_eq!(arena.deallocate(b).unwrap(), Deallocation::Reclaimed);
        assert_eq!(arena.used(), 8);
    }

    #[test]
    fn test_fallback_to_heap() {
        let mut arena = InlineArena::<16>::new();
        let inline = arena.allocate(Layout::new::<[u8; 12]>()).unwrap();
        let heap = arena.allocate(Layout::new::<[u8; 12]>()).unwrap();

        assert!(inline.is_inline());
        assert!(!heap.is_inline());
        assert_eq!(heap.len(), 12);
        assert_eq!(arena.spill_count(), 1);
        assert_eq!(arena.used(), 12);

        assert_eq!(arena.deallocate(heap).unwrap(), Deallocation::Freed);
        assert_eq!(arena.deallocate(inline).unwrap(), Deallocation::Reclaimed);
    }

    #[test]
    fn test_over_aligned_goes_to_heap() {
        let mut arena = InlineArena::<256>::new();
        let block = arena.allocate(Layout::from_size_align(32, 64).unwrap()).unwrap();

        assert!(!block.is_inline());
        assert_eq!(arena.block_ptr(&block) as usize % 64, 0);
        assert_eq!(arena.used(), 0);
        arena.deallocate(block).unwrap();
    }

    #[test]
    fn test_heap_block_is_writable() {
        let mut arena = InlineArena::<4>::new();
        let block = arena.allocate(Layout::new::<[u32; 8]>()).unwrap();

        let ptr = arena.block_ptr_mut(&block).cast::<u32>();
        unsafe {
            for i in 0..8 {
                ptr.add(i).write(i as u32 * 3);
            }
            assert_eq!(ptr.add(7).read(), 21);
        }
        arena.deallocate(block).unwrap();
    }

    #[test]
    fn test_zero_sized_allocation() {
        let mut arena = InlineArena::<8>::new();
        let block = arena.allocate(Layout::new::<()>()).unwrap();

        assert!(block.is_empty());
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.deallocate(block).unwrap(), Deallocation::Reclaimed);
    }

    #[test]
    fn test_reset_invalidates_blocks() {
        let mut arena = InlineArena::<32>::new();
        let block = arena.allocate(Layout::new::<u64>()).unwrap();

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(
            arena.deallocate(block),
            Err(MemError::StaleBlock { offset: 0, len: 8 })
        );
    }

    #[test]
    fn test_block_from_before_reset_is_stale_after_reuse() {
        let mut arena = InlineArena::<32>::new();
        let old = arena.allocate(Layout::new::<u64>()).unwrap();

        arena.reset();
        let live = arena.allocate(Layout::new::<u64>()).unwrap();
        assert_eq!(live.offset(), old.offset());

        // Same bytes, older generation: must not pop `live`
        assert_eq!(
            arena.deallocate(old),
            Err(MemError::StaleBlock { offset: 0, len: 8 })
        );
        assert_eq!(arena.used(), 8);

        let next = arena.allocate(Layout::new::<u64>()).unwrap();
        assert_eq!(next.offset(), Some(8));

        arena.deallocate(next).unwrap();
        assert_eq!(arena.deallocate(live).unwrap(), Deallocation::Reclaimed);
    }

    #[test]
    fn test_try_extend_refuses_stale_block() {
        let mut arena = InlineArena::<32>::new();
        let mut old = arena.allocate(Layout::new::<[u8; 8]>()).unwrap();

        arena.reset();
        let live = arena.allocate(Layout::new::<[u8; 8]>()).unwrap();

        assert!(!arena.try_extend(&mut old, 16));
        assert_eq!(old.len(), 8);
        assert_eq!(arena.used(), 8);
        arena.deallocate(live).unwrap();
    }

    #[test]
    fn test_try_extend_top_block() {
        let mut arena = InlineArena::<32>::new();
        let mut block = arena.allocate(Layout::new::<[u8; 8]>()).unwrap();

        assert!(arena.try_extend(&mut block, 24));
        assert_eq!(block.len(), 24);
        assert_eq!(arena.used(), 24);

        // Past capacity
        assert!(!arena.try_extend(&mut block, 40));
        assert_eq!(block.len(), 24);

        arena.deallocate(block).unwrap();
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_try_extend_buried_block() {
        let mut arena = InlineArena::<64>::new();
        let mut a = arena.allocate(Layout::new::<[u8; 8]>()).unwrap();
        let b = arena.allocate(Layout::new::<[u8; 8]>()).unwrap();

        assert!(!arena.try_extend(&mut a, 16));

        arena.deallocate(b).unwrap();
        assert!(arena.try_extend(&mut a, 16));
        arena.deallocate(a).unwrap();
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 16), 16);
    }
}
