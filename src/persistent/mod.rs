//! Persistent (immutable) vector.
//!
//! This module provides [`PersistentVector`], a 32-way bit-partitioned trie
//! that uses structural sharing to minimize copying:
//!
//! - every operation returns a new version and leaves the receiver intact;
//! - only the nodes on the path to a changed key are copied, all other
//!   subtrees are shared between versions by reference counting;
//! - the vector tracks the key of its first element, so dropping a prefix or
//!   prepending never rewrites surviving leaves.
//!
//! # Examples
//!
//! ```rust
//! use trie_vector::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Ok(&50));
//!
//! // Structural sharing: the original vector is preserved
//! let updated = vector.set(50, 999).unwrap();
//! assert_eq!(vector.get(50), Ok(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Ok(&999));   // New version
//!
//! // Removal from both ends
//! let middle = updated.shift().pop();
//! assert_eq!(middle.len(), 98);
//! assert_eq!(middle.first(), Some(&1));
//! assert_eq!(middle.last(), Some(&98));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod error;
mod node;
mod vector;

pub use error::OutOfBounds;
pub use vector::PersistentVector;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_clone() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(*reference_counter, *reference_counter_clone);
    }

    #[rstest]
    fn test_reference_counter_make_mut_copies_shared_value() {
        let original: ReferenceCounter<i32> = ReferenceCounter::new(42);
        let mut copy = original.clone();
        *ReferenceCounter::make_mut(&mut copy) += 1;

        assert_eq!(*original, 42);
        assert_eq!(*copy, 43);
        assert!(!ReferenceCounter::ptr_eq(&original, &copy));
    }
}
