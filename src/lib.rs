//! # hotpath-containers
//!
//! Allocation-aware containers for hot paths where the typical collection is
//! small, short-lived or recycled every cycle.
//!
//! ## Features
//! - `ShortVec`: vector whose storage comes from an inline bump arena first
//! - `ObjectPool`: chunked pool with O(1) free and insertion-order iteration
//! - `PoolManager` / `ScopedPool`: bounded recycling of emptied pools
//! - `SparseVec` / `PtrList`: linear array promoted once to a hash map
//! - `AppendVec`: vector with a spin-locked concurrent append
//! - `FastStack`: LIFO work stack with push headroom
//! - no_std compatible (requires alloc)

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod arena;
pub mod concurrent;
pub mod constants;
pub mod error;
pub mod pool;
pub mod sparse;
pub mod stack;

pub use arena::{Block, Deallocation, InlineArena, ShortVec};
pub use concurrent::AppendVec;
pub use error::{MemError, Result};
pub use pool::{ObjectId, ObjectPool, PoolManager, ScopedPool};
pub use sparse::{Indexed, PtrList, SparseEntry, SparseVec};
pub use stack::FastStack;
