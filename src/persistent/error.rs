//! Error types for the persistent vector.
//!
//! Every positional operation either succeeds or reports [`OutOfBounds`]
//! with the offending key. There is no partial-mutation failure: copies made
//! before the error are discarded without ever being linked into a tree.

use thiserror::Error;

/// Represents an access to a key that the vector does not hold.
///
/// Returned by [`PersistentVector::get`](crate::persistent::PersistentVector::get)
/// when `key >= len()` and by
/// [`PersistentVector::set`](crate::persistent::PersistentVector::set)
/// when `key > len()`.
///
/// # Examples
///
/// ```rust
/// use trie_vector::persistent::{OutOfBounds, PersistentVector};
///
/// let vector: PersistentVector<i32> = (0..3).collect();
/// assert_eq!(vector.get(3), Err(OutOfBounds { key: 3 }));
/// assert_eq!(format!("{}", OutOfBounds { key: 3 }), "key 3 out of bounds");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("key {key} out of bounds")]
pub struct OutOfBounds {
    /// The key that could not be resolved.
    pub key: usize,
}

impl OutOfBounds {
    /// Creates an error for the given key.
    #[inline]
    #[must_use]
    pub const fn new(key: usize) -> Self {
        Self { key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "key 0 out of bounds")]
    #[case(33, "key 33 out of bounds")]
    fn test_out_of_bounds_display(#[case] key: usize, #[case] expected: &str) {
        assert_eq!(OutOfBounds::new(key).to_string(), expected);
    }

    #[rstest]
    fn test_out_of_bounds_is_std_error() {
        fn takes_error(error: &dyn std::error::Error) -> String {
            error.to_string()
        }
        assert!(takes_error(&OutOfBounds::new(7)).contains("out of bounds"));
    }
}
