//! Persistent (immutable) vector based on a bit-partitioned trie.
//!
//! This module provides [`PersistentVector`], an immutable indexed sequence
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `PersistentVector` is a 32-way branching trie. Besides the root node and
//! the number of elements it tracks a logical `offset`: the key of its first
//! element. Removing a prefix only erases keys and moves the offset, and
//! prepending writes to the key just before the offset. When no room is left
//! on the left, the root grows one level with the old tree in its right half.
//!
//! - O(log32 N) `get`, `set`, `append` and `prepend`
//! - O(log32 N) `truncate`, `drop_first`, `pop` and `shift`
//! - O(1) `len`, `is_empty` and `clone`
//!
//! All operations return new vectors without modifying the original,
//! and untouched subtrees are shared between versions.
//!
//! # Examples
//!
//! ```rust
//! use trie_vector::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .append(1)
//!     .append(2)
//!     .append(3);
//!
//! assert_eq!(vector.get(0), Ok(&1));
//! assert_eq!(vector.get(2), Ok(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let extended = vector.prepend(0);
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4);   // New vector
//! assert_eq!(extended.get(0), Ok(&0));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use super::ReferenceCounter;
use super::error::OutOfBounds;
use super::node::{MASK, Node};

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a bit-partitioned trie.
///
/// # Time Complexity
///
/// | Operation     | Complexity  |
/// |---------------|-------------|
/// | `new`         | O(1)        |
/// | `get`         | O(log32 N)  |
/// | `set`         | O(log32 N)  |
/// | `append`      | O(log32 N)  |
/// | `prepend`     | O(log32 N)  |
/// | `truncate`    | O(log32 N)  |
/// | `drop_first`  | O(log32 N)  |
/// | `len`         | O(1)        |
/// | `iter`        | O(1) to create, O(N) to iterate |
///
/// # Examples
///
/// ```rust
/// use trie_vector::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Ok(&50));
/// ```
pub struct PersistentVector<T> {
    /// Root node of the trie
    root: ReferenceCounter<Node<T>>,
    /// Total number of elements
    length: usize,
    /// Key of the first element
    offset: usize,
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty(0)),
            length: 0,
            offset: 0,
        }
    }

    /// Returns the number of elements in the vector.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] carrying `index` when `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::{OutOfBounds, PersistentVector};
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Ok(&1));
    /// assert_eq!(vector.get(5), Err(OutOfBounds { key: 5 }));
    /// ```
    pub fn get(&self, index: usize) -> Result<&T, OutOfBounds> {
        if index >= self.length {
            return Err(OutOfBounds::new(index));
        }

        self.root
            .get(self.offset + index)
            .map_err(|_| OutOfBounds::new(index))
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns a reference to the last element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.length.checked_sub(1).and_then(|index| self.get(index).ok())
    }

    /// Returns an iterator over references to the elements.
    ///
    /// The iterator caches the current leaf, so a full pass visits each leaf
    /// once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator::new(self)
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Creates a vector containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Ok(&42));
    /// ```
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().append(element)
    }

    /// Sets the element at `index`, returning a new vector.
    ///
    /// `index == len()` appends. The receiver is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] carrying `index` when `index > len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::{OutOfBounds, PersistentVector};
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let updated = vector.set(1, 20).unwrap();
    /// let appended = updated.set(3, 4).unwrap();
    ///
    /// assert_eq!(updated.get(1), Ok(&20));
    /// assert_eq!(vector.get(1), Ok(&2)); // Original unchanged
    /// assert_eq!(appended.len(), 4);
    /// assert_eq!(vector.set(4, 0).err(), Some(OutOfBounds { key: 4 }));
    /// ```
    pub fn set(&self, index: usize, element: T) -> Result<Self, OutOfBounds> {
        if index > self.length {
            return Err(OutOfBounds::new(index));
        }

        let root = self
            .root
            .set(self.offset + index, element)
            .map_err(|_| OutOfBounds::new(index))?;

        let length = if index == self.length {
            self.length + 1
        } else {
            self.length
        };

        Ok(Self {
            root: ReferenceCounter::new(root),
            length,
            offset: self.offset,
        })
    }

    /// Appends an element to the back of the vector.
    ///
    /// # Panics
    ///
    /// Panics only if the trie rejects the append key, which means the
    /// vector's bookkeeping is corrupt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new().append(1).append(2);
    /// assert_eq!(vector.get(1), Ok(&2));
    /// ```
    #[must_use]
    pub fn append(&self, element: T) -> Self {
        match self.set(self.length, element) {
            Ok(vector) => vector,
            Err(error) => unreachable!("append at the end of the vector was rejected: {error}"),
        }
    }

    /// Prepends an element to the front of the vector.
    ///
    /// Writes to the key just before the first element. When the offset is
    /// exhausted the root first grows one level with the existing tree in
    /// its right half, which leaves room for many more prepends.
    ///
    /// # Panics
    ///
    /// Panics if no room is left before the first element and the root can
    /// grow no further within `usize` keys, or if the trie rejects the key
    /// before the first element, which means the vector's bookkeeping is
    /// corrupt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .prepend(42)
    ///     .prepend(21)
    ///     .prepend(17);
    ///
    /// let collected: Vec<i32> = vector.iter().copied().collect();
    /// assert_eq!(collected, vec![17, 21, 42]);
    /// ```
    #[must_use]
    pub fn prepend(&self, element: T) -> Self {
        if self.is_empty() {
            return Self::singleton(element);
        }

        let (root, offset) = if self.offset == 0 {
            let Some((grown, prefix)) = Node::alloc_left(&self.root) else {
                panic!("prepend exceeds the addressable key space");
            };
            (ReferenceCounter::new(grown), prefix)
        } else {
            (ReferenceCounter::clone(&self.root), self.offset)
        };

        let key = offset - 1;
        match root.set(key, element) {
            Ok(root) => Self {
                root: ReferenceCounter::new(root),
                length: self.length + 1,
                offset: key,
            },
            Err(error) => unreachable!("prepend before the first element was rejected: {error}"),
        }
    }

    /// Keeps the first `length` elements.
    ///
    /// Truncating to a length `>= len()` returns the vector unchanged. The
    /// tree loses any levels the shorter vector no longer needs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..100).collect();
    /// let truncated = vector.truncate(10);
    ///
    /// assert_eq!(truncated.len(), 10);
    /// assert!(truncated.get(10).is_err());
    /// assert_eq!(vector.truncate(200).len(), 100);
    /// ```
    #[must_use]
    pub fn truncate(&self, length: usize) -> Self {
        if length >= self.length {
            return self.clone();
        }
        if length == 0 {
            return Self::new();
        }

        let (root, prefix) = self.root.truncate(self.offset + length).flatten();

        Self {
            root: ReferenceCounter::new(root),
            length,
            offset: self.offset - prefix,
        }
    }

    /// Removes the first `count` elements.
    ///
    /// Dropping `count >= len()` elements returns an empty vector. Surviving
    /// elements stay where they are in the trie; only the offset moves.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let dropped = vector.drop_first(2);
    ///
    /// assert_eq!(dropped.get(0), Ok(&3));
    /// assert_eq!(dropped.len(), 3);
    /// assert!(vector.drop_first(10).is_empty());
    /// ```
    #[must_use]
    pub fn drop_first(&self, count: usize) -> Self {
        if count >= self.length {
            return Self::new();
        }
        if count == 0 {
            return self.clone();
        }

        let (root, prefix) = self.root.erase_to(self.offset + count).flatten();

        Self {
            root: ReferenceCounter::new(root),
            length: self.length - count,
            offset: self.offset + count - prefix,
        }
    }

    /// Removes the last element. An empty vector is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// assert_eq!(vector.pop().len(), 2);
    /// assert!(PersistentVector::<i32>::new().pop().is_empty());
    /// ```
    #[must_use]
    pub fn pop(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        self.truncate(self.length - 1)
    }

    /// Removes the first element. An empty vector is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trie_vector::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// assert_eq!(vector.shift().first(), Some(&2));
    /// ```
    #[must_use]
    pub fn shift(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        self.drop_first(1)
    }
}

// =============================================================================
// Construction Macro
// =============================================================================

/// Creates a [`PersistentVector`] containing the given elements.
///
/// Elements are appended in order.
///
/// # Examples
///
/// ```rust
/// use trie_vector::persistent_vector;
/// use trie_vector::persistent::PersistentVector;
///
/// let vector = persistent_vector![42, 7, 19];
/// assert_eq!(vector.len(), 3);
/// assert_eq!(vector.get(1), Ok(&7));
///
/// let empty: PersistentVector<i32> = persistent_vector![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! persistent_vector {
    () => {
        $crate::persistent::PersistentVector::new()
    };

    ($($element:expr),+ $(,)?) => {
        $crate::persistent::PersistentVector::new()$(.append($element))+
    };
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over references to elements of a [`PersistentVector`].
///
/// Front iteration keeps the leaf holding the next element and only descends
/// from the root when it crosses into another leaf.
pub struct PersistentVectorIterator<'a, T> {
    vector: &'a PersistentVector<T>,
    /// Next index yielded from the front
    front: usize,
    /// One past the next index yielded from the back
    back: usize,
    /// Cached leaf and the first key it covers
    leaf: Option<(&'a Node<T>, usize)>,
}

impl<'a, T> PersistentVectorIterator<'a, T> {
    const fn new(vector: &'a PersistentVector<T>) -> Self {
        Self {
            vector,
            front: 0,
            back: vector.length,
            leaf: None,
        }
    }
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }

        let vector: &'a PersistentVector<T> = self.vector;
        let key = vector.offset + self.front;
        let base = key & !MASK;
        self.front += 1;

        let leaf = match self.leaf.filter(|&(_, cached_base)| cached_base == base) {
            Some((leaf, _)) => leaf,
            None => {
                let leaf = vector.root.leaf_at(key)?;
                self.leaf = Some((leaf, base));
                leaf
            }
        };
        leaf.value_at(key & MASK)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for PersistentVectorIterator<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let vector: &'a PersistentVector<T> = self.vector;
        vector.get(self.back).ok()
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {}

impl<T> FusedIterator for PersistentVectorIterator<'_, T> {}

/// An owning iterator over elements of a [`PersistentVector`].
///
/// Elements are cloned out of the trie, since its nodes may be shared with
/// other vectors.
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    front: usize,
    back: usize,
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let element = self.vector.get(self.front).ok().cloned();
        self.front += 1;
        element
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for PersistentVectorIntoIterator<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.vector.get(self.back).ok().cloned()
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {}

impl<T: Clone> FusedIterator for PersistentVectorIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentVector<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            root: ReferenceCounter::clone(&self.root),
            length: self.length,
            offset: self.offset,
        }
    }
}

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |vector, element| vector.append(element))
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let back = self.length;
        PersistentVectorIntoIterator {
            vector: self,
            front: 0,
            back,
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if ReferenceCounter::ptr_eq(&self.root, &other.root) && self.offset == other.offset {
            return true;
        }
        self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

/// Hashes the length, then each element in order.
///
/// Equal vectors hash equally regardless of their internal layout: a vector
/// built by prepending and one built by appending the same elements share
/// a hash.
impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentVector<i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentVector<i32>: Send, Sync);

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentVectorVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentVectorVisitor<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentVector<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut vector = PersistentVector::new();
        while let Some(element) = seq.next_element()? {
            vector = vector.append(element);
        }
        Ok(vector)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentVector<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentVectorVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Thread Safety Tests (arc feature only)
// =============================================================================
