//! Node storage and the recursive AVL primitives behind
//! [`BalancedTree`](super::BalancedTree).
//!
//! Every function here works on an owned [`Link`] (or a mutable borrow of
//! one) and restores the AVL invariants on the way back up the recursion:
//!
//! 1. `height = 1 + max(height(left), height(right))`
//! 2. `balance = height(left) - height(right)` stays within `-1..=1`
//!
//! Ties in the order key are placed to the right on insertion. Rotations keep
//! the in-order sequence intact, so after rebalancing a record with an equal
//! order key may sit on either side of a node; the identity-aware search
//! below looks into both subtrees when it reaches such a tie.

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::key::{Comparator, OrderedKey};

// =============================================================================
// Node Definition
// =============================================================================

/// An owned, possibly absent subtree.
pub(super) type Link<R> = Option<Box<Node<R>>>;

/// A record detached from the tree together with its provenance.
pub(super) type Detached<R> = (R, u64);

/// Internal node structure for the AVL tree.
#[derive(Clone)]
pub(super) struct Node<R> {
    pub(super) record: R,
    /// Insertion sequence number, see [`Provenance`](super::Provenance).
    pub(super) provenance: u64,
    /// Cached subtree height; a leaf has height 1.
    pub(super) height: usize,
    pub(super) left: Link<R>,
    pub(super) right: Link<R>,
}

impl<R> Node<R> {
    /// Creates a detached leaf.
    pub(super) fn leaf(record: R, provenance: u64) -> Box<Self> {
        Box::new(Self {
            record,
            provenance,
            height: 1,
            left: None,
            right: None,
        })
    }

    /// Recomputes the cached height from the children.
    pub(super) fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// Left height minus right height.
    pub(super) fn balance_factor(&self) -> isize {
        signed(height(&self.left)) - signed(height(&self.right))
    }
}

/// Height of an optional subtree; absent subtrees have height 0.
pub(super) fn height<R>(link: &Link<R>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance_factor<R>(link: &Link<R>) -> isize {
    link.as_ref().map_or(0, |node| node.balance_factor())
}

#[allow(clippy::cast_possible_wrap)]
const fn signed(height: usize) -> isize {
    // AVL height is logarithmic in the node count, far below isize::MAX.
    height as isize
}

// =============================================================================
// Rotations
// =============================================================================

/// Rotates the subtree to the right around `node`.
///
/// The left child becomes the new subtree root and `node` becomes its right
/// child. Heights are recomputed child first, then the new root.
pub(super) fn rotate_right<R>(mut node: Box<Node<R>>) -> Box<Node<R>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

/// Rotates the subtree to the left around `node`. Mirror of [`rotate_right`].
pub(super) fn rotate_left<R>(mut node: Box<Node<R>>) -> Box<Node<R>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

/// Restores the height cache and the balance factor of `node`.
///
/// Both children must already be valid AVL trees whose heights differ by at
/// most 2.
pub(super) fn rebalance<R>(mut node: Box<Node<R>>) -> Box<Node<R>> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        // Left-Right: straighten the left child first.
        if balance_factor(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if balance < -1 {
        // Right-Left: straighten the right child first.
        if balance_factor(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

fn rebalance_link<R>(link: &mut Link<R>) {
    if let Some(node) = link.take() {
        *link = Some(rebalance(node));
    }
}

// =============================================================================
// Insertion
// =============================================================================

/// Inserts `record` below `link` and returns the rebalanced subtree root.
pub(super) fn insert<R, C>(
    link: Link<R>,
    record: R,
    provenance: u64,
    comparator: &C,
) -> Box<Node<R>>
where
    R: OrderedKey,
    C: Comparator<R::Order>,
{
    match link {
        None => Node::leaf(record, provenance),
        Some(mut node) => {
            if comparator.compare(record.order_key(), node.record.order_key()) == Ordering::Less {
                node.left = Some(insert(node.left.take(), record, provenance, comparator));
            } else {
                node.right = Some(insert(node.right.take(), record, provenance, comparator));
            }
            rebalance(node)
        }
    }
}

// =============================================================================
// Lookup
// =============================================================================

fn same_identity<R, Q>(record: &R, identity: &Q) -> bool
where
    R: OrderedKey,
    R::Identity: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let candidate: &Q = record.identity().borrow();
    candidate == identity
}

/// Finds the node holding `identity`, which is known to be stored under `order`.
pub(super) fn find<'a, R, C, Q>(
    link: &'a Link<R>,
    order: &R::Order,
    identity: &Q,
    comparator: &C,
) -> Option<&'a Node<R>>
where
    R: OrderedKey,
    C: Comparator<R::Order>,
    R::Identity: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let node = link.as_deref()?;
    match comparator.compare(order, node.record.order_key()) {
        Ordering::Less => find(&node.left, order, identity, comparator),
        Ordering::Greater => find(&node.right, order, identity, comparator),
        Ordering::Equal if same_identity(&node.record, identity) => Some(node),
        Ordering::Equal => find(&node.left, order, identity, comparator)
            .or_else(|| find(&node.right, order, identity, comparator)),
    }
}

/// Leftmost node of the subtree.
pub(super) fn first<R>(link: &Link<R>) -> Option<&Node<R>> {
    let mut current = link.as_deref()?;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    Some(current)
}

/// Rightmost node of the subtree.
pub(super) fn last<R>(link: &Link<R>) -> Option<&Node<R>> {
    let mut current = link.as_deref()?;
    while let Some(right) = current.right.as_deref() {
        current = right;
    }
    Some(current)
}

// =============================================================================
// Removal
// =============================================================================

/// Removes the node holding `identity`, stored under `order`, and rebalances
/// every subtree on the path back to `link`.
///
/// Returns `None` and leaves the subtree untouched when no such node exists.
pub(super) fn remove<R, C, Q>(
    link: &mut Link<R>,
    order: &R::Order,
    identity: &Q,
    comparator: &C,
) -> Option<Detached<R>>
where
    R: OrderedKey,
    C: Comparator<R::Order>,
    R::Identity: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let node = link.as_mut()?;
    let removed = match comparator.compare(order, node.record.order_key()) {
        Ordering::Less => remove(&mut node.left, order, identity, comparator),
        Ordering::Greater => remove(&mut node.right, order, identity, comparator),
        Ordering::Equal if same_identity(&node.record, identity) => return unlink(link),
        Ordering::Equal => remove(&mut node.left, order, identity, comparator)
            .or_else(|| remove(&mut node.right, order, identity, comparator)),
    };

    if removed.is_some() {
        rebalance_link(link);
    }
    removed
}

/// Detaches the root of `link`, handling the three deletion cases.
fn unlink<R>(link: &mut Link<R>) -> Option<Detached<R>> {
    let mut node = link.take()?;
    match (node.left.take(), node.right.take()) {
        (None, None) => {}
        (Some(child), None) | (None, Some(child)) => *link = Some(child),
        (Some(left), Some(right)) => {
            let mut right = Some(right);
            let successor = take_first(&mut right)?;
            let record = std::mem::replace(&mut node.record, successor.record);
            let provenance = std::mem::replace(&mut node.provenance, successor.provenance);
            node.left = Some(left);
            node.right = right;
            *link = Some(rebalance(node));
            return Some((record, provenance));
        }
    }
    Some((node.record, node.provenance))
}

/// Detaches the leftmost node of `link`, rebalancing the path above it.
fn take_first<R>(link: &mut Link<R>) -> Option<Box<Node<R>>> {
    let node = link.as_mut()?;
    if node.left.is_some() {
        let first = take_first(&mut node.left);
        rebalance_link(link);
        first
    } else {
        let mut first = link.take()?;
        *link = first.right.take();
        Some(first)
    }
}

// =============================================================================
// Bulk Construction
// =============================================================================

/// Builds a height-balanced subtree from the next `size` entries, which must
/// already be in order.
pub(super) fn build_balanced<R, I>(size: usize, entries: &mut I) -> Link<R>
where
    I: Iterator<Item = Detached<R>>,
{
    if size == 0 {
        return None;
    }
    let left_size = size / 2;
    let left = build_balanced(left_size, entries);
    let (record, provenance) = entries.next()?;
    let right = build_balanced(size - left_size - 1, entries);

    let mut node = Node::leaf(record, provenance);
    node.left = left;
    node.right = right;
    node.update_height();
    Some(node)
}

/// Hands every provenance number of the subtree to `visit`, in order.
pub(super) fn for_each_provenance_mut<R, F>(link: &mut Link<R>, visit: &mut F)
where
    F: FnMut(&mut u64),
{
    if let Some(node) = link {
        for_each_provenance_mut(&mut node.left, visit);
        visit(&mut node.provenance);
        for_each_provenance_mut(&mut node.right, visit);
    }
}

/// Moves every record out of the subtree in order.
pub(super) fn drain_in_order<R>(link: Link<R>, output: &mut Vec<R>) {
    if let Some(node) = link {
        let Node {
            record,
            left,
            right,
            ..
        } = *node;
        drain_in_order(left, output);
        output.push(record);
        drain_in_order(right, output);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::NaturalOrder;
    use crate::tree::fixtures::Item;
    use rstest::rstest;

    fn build(ranks: &[i32]) -> Link<Item> {
        let mut root = None;
        for (position, &rank) in ranks.iter().enumerate() {
            let item = Item::new(&format!("item-{position}"), rank);
            root = Some(insert(root, item, position as u64, &NaturalOrder));
        }
        root
    }

    fn ranks_in_order(link: &Link<Item>) -> Vec<i32> {
        let mut records = Vec::new();
        drain_in_order(link.clone(), &mut records);
        records.into_iter().map(|item| item.rank).collect()
    }

    #[rstest]
    fn test_leaf_has_height_one() {
        let leaf = Node::leaf(Item::new("a", 1), 0);
        assert_eq!(leaf.height, 1);
        assert_eq!(leaf.balance_factor(), 0);
    }

    #[rstest]
    fn test_rotate_right_promotes_left_child() {
        let mut root = Node::leaf(Item::new("c", 3), 0);
        let mut left = Node::leaf(Item::new("b", 2), 1);
        left.left = Some(Node::leaf(Item::new("a", 1), 2));
        left.update_height();
        root.left = Some(left);
        root.update_height();

        let rotated = rotate_right(root);

        assert_eq!(rotated.record.rank, 2);
        assert_eq!(rotated.height, 2);
        assert_eq!(rotated.left.as_ref().map(|node| node.record.rank), Some(1));
        assert_eq!(rotated.right.as_ref().map(|node| node.record.rank), Some(3));
        assert_eq!(rotated.right.as_ref().map(|node| node.height), Some(1));
    }

    #[rstest]
    fn test_rotate_left_promotes_right_child() {
        let mut root = Node::leaf(Item::new("a", 1), 0);
        let mut right = Node::leaf(Item::new("b", 2), 1);
        right.right = Some(Node::leaf(Item::new("c", 3), 2));
        right.update_height();
        root.right = Some(right);
        root.update_height();

        let rotated = rotate_left(root);

        assert_eq!(rotated.record.rank, 2);
        assert_eq!(rotated.height, 2);
        assert_eq!(rotated.left.as_ref().map(|node| node.record.rank), Some(1));
    }

    #[rstest]
    fn test_rotation_without_pivot_is_identity() {
        let leaf = Node::leaf(Item::new("a", 1), 0);
        assert_eq!(rotate_right(leaf).record.rank, 1);
    }

    #[rstest]
    #[case::left_left(&[3, 2, 1])]
    #[case::left_right(&[3, 1, 2])]
    #[case::right_right(&[1, 2, 3])]
    #[case::right_left(&[1, 3, 2])]
    fn test_insert_rebalances_every_case(#[case] ranks: &[i32]) {
        let root = build(ranks);
        let root_node = root.as_ref().map(|node| (node.record.rank, node.height));
        assert_eq!(root_node, Some((2, 2)));
        assert_eq!(ranks_in_order(&root), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_equal_order_keys_go_right() {
        let root = build(&[5, 5]);
        let root = root.as_ref().map(|node| node.right.is_some());
        assert_eq!(root, Some(true));
    }

    #[rstest]
    fn test_remove_leaf_one_child_and_two_children() {
        let mut root = build(&[4, 2, 6, 1, 3, 5]);

        // item-3 (rank 1) is a leaf.
        let removed = remove(&mut root, &1, "item-3", &NaturalOrder);
        assert_eq!(removed.map(|(item, _)| item.rank), Some(1));

        // item-2 (rank 6) now has exactly one child.
        let removed = remove(&mut root, &6, "item-2", &NaturalOrder);
        assert_eq!(removed.map(|(item, provenance)| (item.rank, provenance)), Some((6, 2)));

        // item-0 (rank 4) is the root with two children.
        let removed = remove(&mut root, &4, "item-0", &NaturalOrder);
        assert_eq!(removed.map(|(item, _)| item.rank), Some(4));

        assert_eq!(ranks_in_order(&root), vec![2, 3, 5]);
    }

    #[rstest]
    fn test_remove_missing_leaves_tree_untouched() {
        let mut root = build(&[1, 2, 3]);
        assert!(remove(&mut root, &2, "nobody", &NaturalOrder).is_none());
        assert_eq!(ranks_in_order(&root), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_find_among_ties_searches_both_sides() {
        let root = build(&[7, 7, 7, 7, 7, 7, 7]);
        for position in 0..7 {
            let identity = format!("item-{position}");
            let found = find(&root, &7, identity.as_str(), &NaturalOrder);
            assert_eq!(found.map(|node| node.provenance), Some(position));
        }
        assert!(find(&root, &7, "item-7", &NaturalOrder).is_none());
    }

    #[rstest]
    fn test_first_and_last() {
        let root = build(&[5, 3, 8, 1, 9]);
        assert_eq!(first(&root).map(|node| node.record.rank), Some(1));
        assert_eq!(last(&root).map(|node| node.record.rank), Some(9));
        assert!(first::<Item>(&None).is_none());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(7, 3)]
    #[case(8, 4)]
    fn test_build_balanced_heights(#[case] size: usize, #[case] expected_height: usize) {
        let mut entries = (0..size).map(|rank| {
            let rank = i32::try_from(rank).unwrap_or_default();
            (Item::new(&rank.to_string(), rank), 0)
        });
        let root = build_balanced(size, &mut entries);
        assert_eq!(height(&root), expected_height);
        assert_eq!(ranks_in_order(&root), (0..).take(size).collect::<Vec<i32>>());
    }
}
