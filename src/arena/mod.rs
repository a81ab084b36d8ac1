//! Inline bump arenas and the small-buffer vector built on top of them
//!
//! This module provides the stack-discipline arena used to keep short-lived
//! sequences off the heap, and the vector that draws its storage from it.

pub mod inline;
pub mod short_vec;

// Re-exports
pub use inline::{Block, Deallocation, InlineArena};
pub use short_vec::ShortVec;
