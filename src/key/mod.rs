//! Ordering and identity contracts for records stored in a
//! [`BalancedTree`](crate::tree::BalancedTree).
//!
//! # Overview
//!
//! A record answers two independent questions:
//!
//! - **Where does it go?** Answered by its order key ([`OrderedKey::order_key`])
//!   compared through a [`Comparator`].
//! - **Which record is it?** Answered by its identity ([`OrderedKey::identity`])
//!   compared with `Eq`.
//!
//! The two are never mixed. Two records with equal order keys are still two
//! different records when their identities differ, and a record whose order
//! key changes keeps its identity.
//!
//! # Examples
//!
//! ```rust
//! use eventree::key::{Comparator, NaturalOrder, OrderedKey, ReverseOrder};
//! use std::cmp::Ordering;
//!
//! struct Task {
//!     name: String,
//!     priority: u8,
//! }
//!
//! impl OrderedKey for Task {
//!     type Identity = String;
//!     type Order = u8;
//!
//!     fn identity(&self) -> &String {
//!         &self.name
//!     }
//!
//!     fn order_key(&self) -> &u8 {
//!         &self.priority
//!     }
//! }
//!
//! let urgent = Task { name: "deploy".to_string(), priority: 1 };
//! let later = Task { name: "refactor".to_string(), priority: 5 };
//!
//! assert_eq!(NaturalOrder.compare(urgent.order_key(), later.order_key()), Ordering::Less);
//! assert_eq!(ReverseOrder.compare(urgent.order_key(), later.order_key()), Ordering::Greater);
//! ```

use std::cmp::Ordering;
use std::hash::Hash;

// =============================================================================
// OrderedKey
// =============================================================================

/// A record that can be placed in a [`BalancedTree`](crate::tree::BalancedTree).
///
/// Implementors must keep [`order_key`](Self::order_key) stable for as long as
/// the record lives inside a tree. To change a record's position, insert a new
/// record with the same identity; the tree removes the old one first.
pub trait OrderedKey {
    /// The fields that make two records "the same record".
    type Identity: Eq + Hash + Clone;

    /// The fields that decide where the record sits in the tree.
    type Order: Clone;

    /// Returns the identity used for lookup, replacement and removal.
    fn identity(&self) -> &Self::Identity;

    /// Returns the order key used for placement and traversal.
    fn order_key(&self) -> &Self::Order;
}

// =============================================================================
// Comparator
// =============================================================================

/// A total order over order keys.
///
/// Every tree carries its own comparator, so the same record type can be kept
/// in ascending order in one tree and descending order in another.
///
/// Closures of type `Fn(&K, &K) -> Ordering` are comparators too.
///
/// # Examples
///
/// ```rust
/// use eventree::key::Comparator;
/// use std::cmp::Ordering;
///
/// let by_length = |left: &String, right: &String| left.len().cmp(&right.len());
/// assert_eq!(
///     by_length.compare(&"ab".to_string(), &"abc".to_string()),
///     Ordering::Less
/// );
/// ```
pub trait Comparator<K: ?Sized> {
    /// Three-way comparison of two order keys.
    fn compare(&self, left: &K, right: &K) -> Ordering;
}

/// Orders keys by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Orders keys by the reverse of their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

impl<K: Ord + ?Sized> Comparator<K> for ReverseOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        right.cmp(left)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self(left, right)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Labelled {
        label: &'static str,
        rank: i32,
    }

    impl OrderedKey for Labelled {
        type Identity = &'static str;
        type Order = i32;

        fn identity(&self) -> &&'static str {
            &self.label
        }

        fn order_key(&self) -> &i32 {
            &self.rank
        }
    }

    #[rstest]
    #[case(1, 2, Ordering::Less)]
    #[case(2, 2, Ordering::Equal)]
    #[case(3, 2, Ordering::Greater)]
    fn test_natural_order(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(NaturalOrder.compare(&left, &right), expected);
    }

    #[rstest]
    #[case(1, 2, Ordering::Greater)]
    #[case(2, 2, Ordering::Equal)]
    #[case(3, 2, Ordering::Less)]
    fn test_reverse_order(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(ReverseOrder.compare(&left, &right), expected);
    }

    #[rstest]
    fn test_closure_is_comparator() {
        let by_abs = |left: &i32, right: &i32| left.abs().cmp(&right.abs());
        assert_eq!(by_abs.compare(&-5, &3), Ordering::Greater);
    }

    #[rstest]
    fn test_identity_and_order_are_independent() {
        let first = Labelled {
            label: "same",
            rank: 1,
        };
        let second = Labelled {
            label: "same",
            rank: 9,
        };

        assert_eq!(first.identity(), second.identity());
        assert_eq!(
            NaturalOrder.compare(first.order_key(), second.order_key()),
            Ordering::Less
        );
    }
}
