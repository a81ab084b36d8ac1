//! Error type shared by every container in the crate.

use thiserror::Error;

/// Failures reported by arenas, pools and their handles.
///
/// Allocation failures are fatal to the operation that hit them and are
/// propagated to the caller unchanged. The remaining variants turn misuse of
/// a handle (double free, use after reset) into a checkable error instead of
/// silently corrupting the container.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemError {
    #[error("allocation of {size} bytes (align {align}) failed")]
    AllocationFailed { size: usize, align: usize },

    #[error("requested capacity exceeds the addressable range")]
    CapacityOverflow,

    #[error("object in slot {slot} was already freed")]
    DoubleFree { slot: u32 },

    #[error("handle for slot {slot} is from epoch {epoch}, pool is at epoch {current}")]
    StaleHandle { slot: u32, epoch: u64, current: u64 },

    #[error("handle for slot {slot} was not issued by this pool")]
    UnknownHandle { slot: u32 },

    #[error("arena block at offset {offset} (len {len}) predates a reset or was already reclaimed")]
    StaleBlock { offset: usize, len: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, MemError>;
