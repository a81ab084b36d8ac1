//! Entry contract for [`SparseVec`](crate::sparse::SparseVec).

/// Value stored in a sparse container, carrying its own index.
///
/// Entries are created on demand by `find_or_add` from the index alone, so
/// every entry type must be constructible from its index.
pub trait SparseEntry {
    /// Create a fresh entry for `index`.
    fn from_index(index: u32) -> Self;

    /// Index this entry is stored under.
    fn index(&self) -> u32;
}

/// Ready-made entry pairing an index with a default-constructed payload.
///
/// # Example
/// ```rust
/// use hotpath_containers::sparse::{Indexed, SparseVec};
///
/// let mut counts = SparseVec::<Indexed<u64>>::new();
/// counts.find_or_add(7).value += 1;
/// counts.find_or_add(7).value += 1;
/// assert_eq!(counts[7].value, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Indexed<V> {
    index: u32,

    /// Payload, `V::default()` when the entry is created.
    pub value: V,
}

impl<V> Indexed<V> {
    /// Create an entry with an explicit payload.
    #[inline]
    pub fn new(index: u32, value: V) -> Self {
        Indexed { index, value }
    }

    /// Consume the entry and return its payload.
    #[inline]
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V: Default> SparseEntry for Indexed<V> {
    #[inline]
    fn from_index(index: u32) -> Self {
        Indexed {
            index,
            value: V::default(),
        }
    }

    #[inline(always)]
    fn index(&self) -> u32 {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_defaults_payload() {
        let entry = Indexed::<u32>::from_index(9);
        assert_eq!(entry.index(), 9);
        assert_eq!(entry.value, 0);
    }

    #[test]
    fn test_into_value() {
        let entry = Indexed::new(3, "payload");
        assert_eq!(entry.index(), 3);
        assert_eq!(entry.into_value(), "payload");
    }
}
