//! Chunked object pools and their recycling manager
//!
//! An [`ObjectPool`] grows by whole fixed-size chunks and threads its live
//! objects through a doubly linked list kept inside the slots themselves, so
//! allocation, freeing and in-order iteration never touch a separate index.
//! A [`PoolManager`] keeps emptied pools around so that per-request or
//! per-frame work does not pay for chunk allocation every cycle, and a
//! [`ScopedPool`] hands a pool back to its manager when it goes out of scope.

mod chunk;
pub mod handle;
pub mod iter;
pub mod manager;
pub mod object_pool;

// Re-exports
pub use handle::ScopedPool;
pub use iter::{Ids, Iter};
pub use manager::PoolManager;
pub use object_pool::{ObjectId, ObjectPool};
