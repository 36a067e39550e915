//! Structural self-checks for [`BalancedTree`](super::BalancedTree).

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;

use super::node::{Link, height};
use crate::key::{Comparator, OrderedKey};

/// A broken tree invariant, reported by
/// [`BalancedTree::validate`](super::BalancedTree::validate) and by
/// snapshot decoding.
///
/// Positions count records in traversal order, starting at 0.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A node caches a height that does not match its children.
    #[error("node at position {position} caches height {cached} but its children give {computed}")]
    StaleHeight {
        /// Traversal position of the node.
        position: usize,
        /// Height stored in the node.
        cached: usize,
        /// Height derived from the children.
        computed: usize,
    },

    /// A node's balance factor is outside `-1..=1`.
    #[error("node at position {position} has balance factor {balance}")]
    Unbalanced {
        /// Traversal position of the node.
        position: usize,
        /// Left height minus right height.
        balance: isize,
    },

    /// A record orders before its in-order predecessor.
    #[error("record at position {position} orders before its predecessor")]
    OutOfOrder {
        /// Traversal position of the misplaced record.
        position: usize,
    },

    /// Two records share the same identity.
    #[error("record at position {position} repeats an identity seen earlier")]
    DuplicateIdentity {
        /// Traversal position of the second occurrence.
        position: usize,
    },

    /// Two records share the same provenance number.
    #[error("record at position {position} repeats a provenance number seen earlier")]
    DuplicateProvenance {
        /// Traversal position of the second occurrence.
        position: usize,
    },

    /// A record's provenance number has not been issued by the tree's counter.
    #[error("record at position {position} holds a provenance number not yet issued")]
    UnissuedProvenance {
        /// Traversal position of the record.
        position: usize,
    },

    /// A record holds the largest provenance number, so the counter cannot
    /// advance past it.
    #[error("record at position {position} exhausts the provenance counter")]
    ProvenanceExhausted {
        /// Traversal position of the record.
        position: usize,
    },

    /// The identity index and the node graph disagree.
    #[error("record at position {position} is not indexed under its order key")]
    IndexMismatch {
        /// Traversal position of the record.
        position: usize,
    },

    /// The identity index holds a different number of entries than the tree.
    #[error("identity index holds {indexed} entries but the tree holds {stored}")]
    IndexSize {
        /// Number of entries in the identity index.
        indexed: usize,
        /// Number of nodes in the tree.
        stored: usize,
    },
}

/// Checks the height cache and balance factor of every node.
///
/// Returns the number of nodes in the subtree. `offset` is the traversal
/// position of the subtree's first node.
pub(super) fn check_shape<R>(link: &Link<R>, offset: usize) -> Result<usize, InvariantViolation> {
    let Some(node) = link.as_deref() else {
        return Ok(0);
    };
    let left_count = check_shape(&node.left, offset)?;
    let position = offset + left_count;
    let right_count = check_shape(&node.right, position + 1)?;

    let computed = 1 + height(&node.left).max(height(&node.right));
    if node.height != computed {
        return Err(InvariantViolation::StaleHeight {
            position,
            cached: node.height,
            computed,
        });
    }
    let balance = node.balance_factor();
    if !(-1..=1).contains(&balance) {
        return Err(InvariantViolation::Unbalanced { position, balance });
    }
    Ok(left_count + 1 + right_count)
}

/// Checks that `records` is non-decreasing under `comparator`.
pub(super) fn check_sorted<'a, R, C, I>(
    records: I,
    comparator: &C,
) -> Result<(), InvariantViolation>
where
    R: OrderedKey + 'a,
    C: Comparator<R::Order>,
    I: IntoIterator<Item = &'a R>,
{
    let mut previous: Option<&R> = None;
    for (position, record) in records.into_iter().enumerate() {
        if let Some(previous) = previous
            && comparator.compare(previous.order_key(), record.order_key()) == Ordering::Greater
        {
            return Err(InvariantViolation::OutOfOrder { position });
        }
        previous = Some(record);
    }
    Ok(())
}

/// Checks that no provenance number repeats and that the counter can still
/// advance past every one of them.
///
/// Returns the counter value following the largest number seen.
pub(super) fn check_provenance<I>(provenances: I) -> Result<u64, InvariantViolation>
where
    I: IntoIterator<Item = u64>,
{
    let mut seen = HashSet::new();
    let mut next = 0;
    for (position, provenance) in provenances.into_iter().enumerate() {
        if !seen.insert(provenance) {
            return Err(InvariantViolation::DuplicateProvenance { position });
        }
        let following = provenance
            .checked_add(1)
            .ok_or(InvariantViolation::ProvenanceExhausted { position })?;
        next = next.max(following);
    }
    Ok(next)
}
