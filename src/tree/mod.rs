//! Self-balancing (AVL) ordered collection.
//!
//! This module provides [`BalancedTree`], an ordered collection of records
//! that are placed by an order key and looked up by an identity (see
//! [`OrderedKey`](crate::key::OrderedKey)).
//!
//! # Overview
//!
//! - O(log N) insert, with replace-on-same-identity
//! - O(log N) remove by identity (plus the number of records tied on the
//!   target's order key)
//! - Lazy, restartable in-order traversal
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use eventree::event::Event;
//! use eventree::tree::BalancedTree;
//!
//! let mut tree = BalancedTree::new();
//! for (title, date) in [
//!     ("New year", "2024-01-01"),
//!     ("Midsummer", "2024-06-15"),
//!     ("Eve", "2023-12-31"),
//!     ("Next year", "2025-01-01"),
//! ] {
//!     tree.insert(Event::new(title, date, "").unwrap());
//! }
//!
//! let dates: Vec<String> = tree.iter().map(|event| event.date().to_string()).collect();
//! assert_eq!(dates, vec!["2023-12-31", "2024-01-01", "2024-06-15", "2025-01-01"]);
//! ```
//!
//! # Internal Structure
//!
//! The AVL tree maintains the following invariants after every public
//! operation:
//! 1. Every node caches `height = 1 + max(height(left), height(right))`
//!    (absent children count as 0)
//! 2. Every node's balance factor `height(left) - height(right)` is in `{-1, 0, 1}`
//! 3. An in-order walk visits order keys in non-decreasing comparator order
//!
//! These invariants bound the tree height by `1.45 * log2(N + 2)`.
//!
//! Children are exclusively owned (`Option<Box<_>>`) and there are no parent
//! links; rebalancing happens bottom-up as the recursion unwinds.

mod balanced_tree;
mod config;
mod iter;
mod node;
#[cfg(feature = "serde")]
mod serialization;
mod validate;

pub use balanced_tree::BalancedTree;
pub use config::{ParseProvenanceError, Provenance, TreeConfig};
pub use iter::{BalancedTreeEntries, BalancedTreeIntoIterator, BalancedTreeIterator, Entry};
pub use validate::InvariantViolation;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fmt;

    use crate::key::OrderedKey;

    /// Minimal record for unit tests: identified by `name`, ordered by `rank`.
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub(crate) struct Item {
        pub(crate) name: String,
        pub(crate) rank: i32,
    }

    impl Item {
        pub(crate) fn new(name: &str, rank: i32) -> Self {
            Self {
                name: name.to_string(),
                rank,
            }
        }
    }

    impl OrderedKey for Item {
        type Identity = String;
        type Order = i32;

        fn identity(&self) -> &String {
            &self.name
        }

        fn order_key(&self) -> &i32 {
            &self.rank
        }
    }

    impl fmt::Display for Item {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "{}@{}", self.name, self.rank)
        }
    }
}
