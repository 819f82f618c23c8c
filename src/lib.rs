//! # trie-vector
//!
//! A persistent (immutable, structurally-shared) indexed vector.
//!
//! ## Overview
//!
//! [`PersistentVector`](persistent::PersistentVector) is a 32-way
//! bit-partitioned trie supporting O(log32 N) random access, update, append,
//! prepend, and removal from either end. Every "mutating" operation returns a
//! new version; the original stays valid and shares every untouched subtree
//! with the new one.
//!
//! ## Feature Flags
//!
//! - `persistent` (default): the persistent vector
//! - `arc`: share nodes through `Arc` so vectors are `Send + Sync`
//! - `serde`: `Serialize` / `Deserialize` as a sequence
//!
//! ## Example
//!
//! ```rust
//! use trie_vector::prelude::*;
//!
//! let vector = persistent_vector![1, 2, 3];
//! let longer = vector.append(4).prepend(0);
//!
//! assert_eq!(vector.len(), 3);
//! assert_eq!(longer.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
//! assert_eq!(longer.get(5), Err(OutOfBounds { key: 5 }));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the vector, its iterators, its error type and the
/// [`persistent_vector!`] macro.
///
/// # Usage
///
/// ```rust
/// use trie_vector::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;

    #[cfg(feature = "persistent")]
    pub use crate::persistent_vector;
}

#[cfg(feature = "persistent")]
pub mod persistent;
