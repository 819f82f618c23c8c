//! Bit-partitioned trie nodes backing [`PersistentVector`](super::PersistentVector).
//!
//! A [`Node`] owns `SIZE` slots and a `shift`. At shift `S` it is responsible
//! for `2^(S + BITS)` keys, and a key selects the local slot
//! `(key >> S) & MASK`. Leaves sit at shift 0.
//!
//! The node engine knows nothing about the logical length of a vector: it
//! resolves, writes, truncates and erases raw keys. Every operation here
//! takes `&self` and returns a new node that shares every untouched subtree
//! with the receiver. The only in-place writes happen on nodes that were
//! copied within the same call and have not escaped yet (`copy_sub_key`,
//! `set_sub_key`).

use std::cmp::Ordering;

use super::ReferenceCounter;
use super::error::OutOfBounds;

// =============================================================================
// Constants
// =============================================================================

/// Bits consumed per trie level.
pub(crate) const BITS: usize = 5;

/// Slots per node (2^5 = 32).
pub(crate) const SIZE: usize = 1 << BITS;

/// Bit mask for extracting a slot index.
pub(crate) const MASK: usize = SIZE - 1;

/// Width of a key in bits.
const KEY_BITS: usize = usize::BITS as usize;

static_assertions::const_assert_eq!(SIZE, 32);
static_assertions::const_assert_eq!(MASK & SIZE, 0);

/// Number of keys a node at `shift` can address.
///
/// Saturates at `usize::MAX` once the capacity no longer fits in a key.
#[inline]
const fn capacity_at(shift: usize) -> usize {
    if shift + BITS >= KEY_BITS {
        usize::MAX
    } else {
        1 << (shift + BITS)
    }
}

// =============================================================================
// Slot Definition
// =============================================================================

/// A single slot of a [`Node`].
#[derive(Clone)]
pub(crate) enum Slot<T> {
    /// Nothing stored here
    Unset,
    /// A stored element (leaf level only)
    Value(T),
    /// A shared child node (branch levels only)
    Branch(ReferenceCounter<Node<T>>),
}

impl<T> Slot<T> {
    #[inline]
    const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// A trie node: `SIZE` slots plus the number of key bits stripped above it.
#[derive(Clone)]
pub(crate) struct Node<T> {
    slots: [Slot<T>; SIZE],
    shift: usize,
}

impl<T> Node<T> {
    /// Creates a node with every slot unset.
    pub(crate) fn empty(shift: usize) -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::Unset),
            shift,
        }
    }

    #[inline]
    pub(crate) const fn is_leaf(&self) -> bool {
        self.shift == 0
    }

    /// Number of keys addressable through this node.
    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        capacity_at(self.shift)
    }

    #[inline]
    const fn index_of(&self, key: usize) -> usize {
        (key >> self.shift) & MASK
    }

    /// Mask selecting the part of a key handled below this node.
    #[inline]
    const fn child_mask(&self) -> usize {
        (1 << self.shift) - 1
    }

    /// Index of the highest occupied slot plus one.
    pub(crate) fn width(&self) -> usize {
        self.slots
            .iter()
            .rposition(|slot| !slot.is_unset())
            .map_or(0, |index| index + 1)
    }

    /// Whether the unset slot `index` may be filled.
    ///
    /// The slot must extend the occupied run by one on either side or sit
    /// inside it. Any slot of an empty node qualifies.
    fn can_fill(&self, index: usize) -> bool {
        self.slots
            .iter()
            .position(|slot| !slot.is_unset())
            .is_none_or(|first| index + 1 >= first && index <= self.width())
    }

    /// Number of occupied slots.
    pub(crate) fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_unset()).count()
    }

    /// Returns the element stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] when the key lies outside this node's capacity,
    /// passes through a missing branch, or lands on an unset slot.
    pub(crate) fn get(&self, key: usize) -> Result<&T, OutOfBounds> {
        self.leaf_at(key)
            .and_then(|leaf| leaf.value_at(key & MASK))
            .ok_or(OutOfBounds::new(key))
    }

    /// Descends to the leaf responsible for `key`.
    pub(crate) fn leaf_at(&self, key: usize) -> Option<&Self> {
        if key >= self.capacity() {
            return None;
        }

        let mut node = self;
        while !node.is_leaf() {
            match &node.slots[node.index_of(key)] {
                Slot::Branch(child) => node = child.as_ref(),
                Slot::Unset | Slot::Value(_) => return None,
            }
        }
        Some(node)
    }

    /// Returns the element in slot `index` of a leaf.
    #[inline]
    pub(crate) fn value_at(&self, index: usize) -> Option<&T> {
        match self.slots.get(index)? {
            Slot::Value(value) => Some(value),
            Slot::Unset | Slot::Branch(_) => None,
        }
    }

    /// Collapses redundant single-child roots.
    ///
    /// Returns the new root together with the number of keys that preceded
    /// the surviving child; callers subtract it from their key offset.
    pub(crate) fn flatten(self) -> (Self, usize)
    where
        T: Clone,
    {
        let mut root = self;
        let mut prefix = 0;
        let mut collapsed = 0;

        while !root.is_leaf() && root.occupied() == 1 {
            let Some(index) = root.slots.iter().position(|slot| !slot.is_unset()) else {
                break;
            };
            let child_capacity = capacity_at(root.shift - BITS);

            match std::mem::replace(&mut root.slots[index], Slot::Unset) {
                Slot::Branch(child) => {
                    prefix += index * child_capacity;
                    collapsed += 1;
                    root = ReferenceCounter::unwrap_or_clone(child);
                }
                other => {
                    root.slots[index] = other;
                    break;
                }
            }
        }

        if collapsed > 0 {
            tracing::trace!(shift = root.shift, prefix, collapsed, "flattened root");
        }
        (root, prefix)
    }
}

impl<T: Clone> Node<T> {
    /// Writes `value` under `key`, returning the new root.
    ///
    /// The root grows as many levels as `key` requires. Along the path every
    /// node is copied; an unset slot may be filled when it borders or lies
    /// within the occupied run of its node (append, prepend or a hole).
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] when the key skips past the next unused slot
    /// at some level.
    pub(crate) fn set(&self, key: usize, value: T) -> Result<Self, OutOfBounds> {
        let mut root = self.new_root(key);
        if key >= root.capacity() {
            return Err(OutOfBounds::new(key));
        }

        let mut node = &mut root;
        while !node.is_leaf() {
            node = node.copy_sub_key(key)?;
        }
        node.set_sub_key(key, value)?;

        Ok(root)
    }

    /// Returns a copy of this root, grown until `key` fits.
    ///
    /// Each growth step wraps the current root as slot 0 of a parent one
    /// level taller, so existing keys keep their meaning.
    pub(crate) fn new_root(&self, key: usize) -> Self {
        let mut root = self.clone();

        while key >= root.capacity() && root.shift + BITS < KEY_BITS {
            let mut parent = Self::empty(root.shift + BITS);
            parent.slots[0] = Slot::Branch(ReferenceCounter::new(root));
            root = parent;
            tracing::trace!(shift = root.shift, key, "grew root");
        }

        root
    }

    /// Replaces the child on `key`'s path with an exclusive copy and returns it.
    ///
    /// A fillable unset slot receives a new empty child one level lower.
    /// Must only be called on a node that was copied within the current
    /// operation.
    fn copy_sub_key(&mut self, key: usize) -> Result<&mut Self, OutOfBounds> {
        let index = self.index_of(key);

        if self.slots[index].is_unset() {
            if !self.can_fill(index) {
                return Err(OutOfBounds::new(key));
            }
            self.slots[index] =
                Slot::Branch(ReferenceCounter::new(Self::empty(self.shift - BITS)));
        }

        match &mut self.slots[index] {
            Slot::Branch(child) => Ok(ReferenceCounter::make_mut(child)),
            Slot::Unset | Slot::Value(_) => Err(OutOfBounds::new(key)),
        }
    }

    /// Stores `value` in the leaf slot for `key`.
    ///
    /// Must only be called on a leaf that was copied within the current
    /// operation.
    fn set_sub_key(&mut self, key: usize, value: T) -> Result<(), OutOfBounds> {
        let index = key & MASK;

        match &self.slots[index] {
            Slot::Branch(_) => return Err(OutOfBounds::new(key)),
            Slot::Unset if !self.can_fill(index) => return Err(OutOfBounds::new(key)),
            Slot::Unset | Slot::Value(_) => {}
        }

        self.slots[index] = Slot::Value(value);
        Ok(())
    }

    /// Discards every key `>= length`.
    ///
    /// Slots right of the boundary are unset at every level; the boundary
    /// child is truncated recursively, or unset when the boundary falls on
    /// its first key.
    pub(crate) fn truncate(&self, length: usize) -> Self {
        if length >= self.capacity() {
            return self.clone();
        }

        let boundary = self.index_of(length);
        let remainder = length & self.child_mask();

        let slots = std::array::from_fn(|index| match index.cmp(&boundary) {
            Ordering::Less => self.slots[index].clone(),
            Ordering::Equal => match &self.slots[index] {
                Slot::Branch(child) if remainder > 0 => {
                    Slot::Branch(ReferenceCounter::new(child.truncate(remainder)))
                }
                _ => Slot::Unset,
            },
            Ordering::Greater => Slot::Unset,
        });

        Self {
            slots,
            shift: self.shift,
        }
    }

    /// Discards every key `< length`, leaving survivors at their keys.
    pub(crate) fn erase_to(&self, length: usize) -> Self {
        if length >= self.capacity() {
            return Self::empty(self.shift);
        }

        let boundary = self.index_of(length);
        let remainder = length & self.child_mask();

        let slots = std::array::from_fn(|index| match index.cmp(&boundary) {
            Ordering::Less => Slot::Unset,
            Ordering::Equal => match &self.slots[index] {
                Slot::Branch(child) if remainder > 0 => {
                    Slot::Branch(ReferenceCounter::new(child.erase_to(remainder)))
                }
                other => other.clone(),
            },
            Ordering::Greater => self.slots[index].clone(),
        });

        Self {
            slots,
            shift: self.shift,
        }
    }

    /// Grows `root` one level with the old tree in the right half.
    ///
    /// Returns the new root and the distance every existing key moved right,
    /// which becomes free capacity for prepends. Returns `None` when the
    /// taller root could no longer address all of its keys in a `usize`.
    pub(crate) fn alloc_left(root: &ReferenceCounter<Self>) -> Option<(Self, usize)> {
        let shift = root.shift + BITS;
        if shift + BITS >= KEY_BITS {
            return None;
        }
        let prefix = (SIZE / 2).checked_mul(root.capacity())?;

        let mut parent = Self::empty(shift);
        parent.slots[SIZE / 2] = Slot::Branch(ReferenceCounter::clone(root));

        tracing::trace!(shift, prefix, "allocated left capacity");
        Some((parent, prefix))
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

#[cfg(test)]
impl<T> Node<T> {
    pub(crate) const fn shift(&self) -> usize {
        self.shift
    }

    /// Builds a leaf holding `values` from slot 0.
    pub(crate) fn leaf<I: IntoIterator<Item = T>>(values: I) -> Self {
        let mut node = Self::empty(0);
        for (index, value) in values.into_iter().enumerate() {
            node.slots[index] = Slot::Value(value);
        }
        node
    }

    /// Builds a leaf holding `(index, value)` pairs; all other slots unset.
    pub(crate) fn sparse_leaf<I: IntoIterator<Item = (usize, T)>>(entries: I) -> Self {
        let mut node = Self::empty(0);
        for (index, value) in entries {
            node.slots[index] = Slot::Value(value);
        }
        node
    }

    /// Builds a branch at `shift` holding `(index, child)` pairs.
    pub(crate) fn branch<I: IntoIterator<Item = (usize, Self)>>(shift: usize, children: I) -> Self {
        let mut node = Self::empty(shift);
        for (index, child) in children {
            node.slots[index] = Slot::Branch(ReferenceCounter::new(child));
        }
        node
    }

    /// Returns the child in slot `index`, if it is a branch.
    pub(crate) fn child(&self, index: usize) -> Option<&ReferenceCounter<Self>> {
        match &self.slots[index] {
            Slot::Branch(child) => Some(child),
            Slot::Unset | Slot::Value(_) => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
