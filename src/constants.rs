//! Core constants shared by the pool, arena and sparse containers.

/// Sentinel value for an empty/null slot index.
///
/// Used to indicate:
/// - End of the live-object list in `ObjectPool` (`next`/`prev` links)
/// - Empty `first`/`last` markers of an empty pool
pub const EMPTY: u32 = u32::MAX;

/// Alignment of every inline arena buffer (bytes).
///
/// Requests with a stricter alignment bypass the inline buffer and go
/// straight to the general allocator.
pub const ARENA_ALIGN: usize = 16;

/// Default cutover size of a `SparseVec` / `PtrList`.
///
/// Up to this many entries are kept in the linearly scanned array.
pub const DEFAULT_CUTOVER: usize = 10;

/// Multiplier applied to the cutover size when reserving the map a sparse
/// container promotes into.
pub const MAP_RESERVE_FACTOR: usize = 4;

/// Default number of object slots per pool chunk.
pub const DEFAULT_CHUNK_CAPACITY: usize = 64;

/// Default number of idle pools a `PoolManager` keeps for reuse.
pub const DEFAULT_RECLAIM_CAPACITY: usize = 8;

/// First non-zero capacity a `ShortVec` grows to.
pub const MIN_VEC_CAPACITY: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_align_is_power_of_two() {
        assert!(ARENA_ALIGN.is_power_of_two());
    }

    #[test]
    fn test_empty_sentinel() {
        assert_eq!(EMPTY, u32::MAX);
    }
}
