//! Filepath: src/list.rs
//!
//! Sorted singly linked list used as an ordered set of integer keys.
//!
//! [`SortedList`] knows nothing about threads. Shared access goes through
//! one of the wrappers in [`crate::sync`], which decide how the three
//! operations are serialized.
//!
//! # Invariants
//! - Keys strictly increase from head to tail (no duplicates).
//! - `len` equals the number of reachable nodes.
//! - A node is freed exactly when `delete` unlinks it, or when the whole
//!   list is cleared or dropped.
//!
//! ```rust
//! use rwlist::SortedList;
//!
//! let mut list = SortedList::new();
//! assert!(list.insert(7));
//! assert!(list.insert(3));
//! assert!(!list.insert(7));
//!
//! assert!(list.member(3));
//! assert!(list.delete(3));
//! assert_eq!(list.iter().collect::<Vec<_>>(), vec![7]);
//! ```

use std::fmt as StdFmt;
use std::iter::FusedIterator;

// ============================================================================
//  Node
// ============================================================================

/// Exclusive link to the next node (or the end of the list).
type Link = Option<Box<Node>>;

/// One key and the link to its successor.
///
/// No `Drop` impl: `delete` moves `next` out of an unlinked box, and
/// [`SortedList::clear`] unlinks iteratively so long chains never recurse.
#[derive(Debug)]
struct Node {
    key: u32,
    next: Link,
}

// ============================================================================
//  SortedList
// ============================================================================

/// Ordered, duplicate-free set of `u32` keys stored as a linked chain.
///
/// All operations are O(n) in the number of keys; there is no auxiliary
/// index. Mutation requires `&mut self`, so the borrow checker already
/// rules out unsynchronized writers.
#[derive(Default)]
pub struct SortedList {
    head: Link,
    len: usize,
}

impl SortedList {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Number of keys in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns `true` iff `key` is present.
    ///
    /// Stops at the first key `>= key`.
    #[must_use]
    pub fn member(&self, key: u32) -> bool {
        self.iter().find(|&k| k >= key) == Some(key)
    }

    /// Insert `key`, keeping the list sorted.
    ///
    /// Returns `true` if a new node was linked in, `false` (and no mutation)
    /// if the key was already present.
    pub fn insert(&mut self, key: u32) -> bool {
        let slot = self.seek_mut(key);

        if slot.as_ref().is_some_and(|node| node.key == key) {
            return false;
        }

        let next = slot.take();
        *slot = Some(Box::new(Node { key, next }));
        self.len += 1;
        true
    }

    /// Remove `key`.
    ///
    /// Returns `true` if a node was unlinked and released, `false` (and no
    /// mutation) if the key was absent.
    pub fn delete(&mut self, key: u32) -> bool {
        let slot = self.seek_mut(key);

        if slot.as_ref().is_none_or(|node| node.key != key) {
            return false;
        }

        if let Some(node) = slot.take() {
            *slot = node.next;
        }
        self.len -= 1;
        true
    }

    /// Release every node.
    pub fn clear(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
        self.len = 0;
    }

    /// Iterate over the keys in ascending order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len,
        }
    }

    /// Returns `true` if keys strictly increase from head to tail.
    ///
    /// Always holds for lists built through the public API; exposed so
    /// concurrent tests can check that no link was corrupted.
    #[must_use]
    pub fn is_strictly_ascending(&self) -> bool {
        self.iter().zip(self.iter().skip(1)).all(|(a, b)| a < b)
    }

    /// Return the link that holds the first node with key `>= key`.
    ///
    /// The head link and a predecessor's `next` are the same type, so
    /// insert/delete at the head need no special case.
    fn seek_mut(&mut self, key: u32) -> &mut Link {
        let mut cursor = &mut self.head;

        while cursor.as_ref().is_some_and(|node| node.key < key) {
            let Some(node) = cursor else {
                unreachable!("loop condition checked the link is occupied");
            };
            cursor = &mut node.next;
        }

        cursor
    }
}

impl Drop for SortedList {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Clone for SortedList {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        let mut tail = &mut out.head;

        for key in self {
            let node = tail.insert(Box::new(Node { key, next: None }));
            tail = &mut node.next;
        }

        out.len = self.len;
        out
    }
}

impl PartialEq for SortedList {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for SortedList {}

impl StdFmt::Debug for SortedList {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Extend<u32> for SortedList {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl FromIterator<u32> for SortedList {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<'a> IntoIterator for &'a SortedList {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
//  Iter
// ============================================================================

/// Ascending iterator over the keys of a [`SortedList`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    next: Option<&'a Node>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        self.remaining -= 1;
        Some(node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

// ============================================================================
//  Tests
// ============================================================================
