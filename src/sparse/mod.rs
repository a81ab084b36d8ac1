//! Containers keyed by small integer indices or object identity
//!
//! Both containers start as a linearly scanned inline array and are promoted
//! once, on the first insertion past their cutover size, to a hash-backed
//! representation. The typical population is small enough that the scan
//! beats hashing; the map only exists for the occasional large instance.

pub mod entry;
pub mod iter;
pub mod ptr_list;
pub mod sparse_vec;

// Re-exports
pub use entry::{Indexed, SparseEntry};
pub use iter::{Iter, IterMut, PtrListIter};
pub use ptr_list::PtrList;
pub use sparse_vec::SparseVec;
