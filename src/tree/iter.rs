//! In-order iterators over a [`BalancedTree`](super::BalancedTree).
//!
//! Borrowing iterators walk the tree lazily with an explicit stack holding at
//! most one root-to-leaf path, so creating one is O(log N) and each step is
//! amortised O(1). Nothing is cached on the tree itself; every call to
//! [`BalancedTree::iter`](super::BalancedTree::iter) starts a fresh walk.

use std::iter::FusedIterator;

use super::node::{Link, Node};

// =============================================================================
// Node Walk
// =============================================================================

/// Lazy in-order walk over the nodes of a subtree.
struct InOrder<'a, R> {
    stack: Vec<&'a Node<R>>,
    remaining: usize,
}

impl<'a, R> InOrder<'a, R> {
    fn new(root: &'a Link<R>, length: usize) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            remaining: length,
        };
        walk.push_left_spine(root.as_deref());
        walk
    }

    fn push_left_spine(&mut self, mut current: Option<&'a Node<R>>) {
        while let Some(node) = current {
            self.stack.push(node);
            current = node.left.as_deref();
        }
    }

    fn next_node(&mut self) -> Option<&'a Node<R>> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(node)
    }
}

impl<R> Clone for InOrder<'_, R> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

// =============================================================================
// Record Iterator
// =============================================================================

/// An iterator over the records of a [`BalancedTree`](super::BalancedTree) in
/// ascending order.
pub struct BalancedTreeIterator<'a, R> {
    walk: InOrder<'a, R>,
}

impl<'a, R> BalancedTreeIterator<'a, R> {
    pub(super) fn new(root: &'a Link<R>, length: usize) -> Self {
        Self {
            walk: InOrder::new(root, length),
        }
    }
}

impl<'a, R> Iterator for BalancedTreeIterator<'a, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next_node().map(|node| &node.record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<R> ExactSizeIterator for BalancedTreeIterator<'_, R> {
    fn len(&self) -> usize {
        self.walk.remaining
    }
}

impl<R> FusedIterator for BalancedTreeIterator<'_, R> {}

impl<R> Clone for BalancedTreeIterator<'_, R> {
    fn clone(&self) -> Self {
        Self {
            walk: self.walk.clone(),
        }
    }
}

// =============================================================================
// Entry Iterator
// =============================================================================

/// A stored record together with its provenance number.
#[derive(Debug, PartialEq, Eq)]
pub struct Entry<'a, R> {
    /// The stored record.
    pub record: &'a R,
    /// Insertion sequence number of the record.
    pub provenance: u64,
}

impl<R> Clone for Entry<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Entry<'_, R> {}

/// An iterator over [`Entry`] values in ascending record order.
pub struct BalancedTreeEntries<'a, R> {
    walk: InOrder<'a, R>,
}

impl<'a, R> BalancedTreeEntries<'a, R> {
    pub(super) fn new(root: &'a Link<R>, length: usize) -> Self {
        Self {
            walk: InOrder::new(root, length),
        }
    }
}

impl<'a, R> Iterator for BalancedTreeEntries<'a, R> {
    type Item = Entry<'a, R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next_node().map(|node| Entry {
            record: &node.record,
            provenance: node.provenance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<R> ExactSizeIterator for BalancedTreeEntries<'_, R> {
    fn len(&self) -> usize {
        self.walk.remaining
    }
}

impl<R> FusedIterator for BalancedTreeEntries<'_, R> {}

// =============================================================================
// Owning Iterator
// =============================================================================

/// An owning iterator over the records of a
/// [`BalancedTree`](super::BalancedTree) in ascending order.
pub struct BalancedTreeIntoIterator<R> {
    records: std::vec::IntoIter<R>,
}

impl<R> BalancedTreeIntoIterator<R> {
    pub(super) fn new(root: Link<R>, length: usize) -> Self {
        let mut records = Vec::with_capacity(length);
        super::node::drain_in_order(root, &mut records);
        Self {
            records: records.into_iter(),
        }
    }
}

impl<R> Iterator for BalancedTreeIntoIterator<R> {
    type Item = R;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<R> DoubleEndedIterator for BalancedTreeIntoIterator<R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.records.next_back()
    }
}

impl<R> ExactSizeIterator for BalancedTreeIntoIterator<R> {
    fn len(&self) -> usize {
        self.records.len()
    }
}

impl<R> FusedIterator for BalancedTreeIntoIterator<R> {}
