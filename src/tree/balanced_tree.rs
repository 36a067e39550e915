//! The [`BalancedTree`] collection type.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

use super::config::{Provenance, TreeConfig};
use super::iter::{BalancedTreeEntries, BalancedTreeIntoIterator, BalancedTreeIterator};
use super::node::{self, Detached, Link};
use super::validate::{self, InvariantViolation};
use crate::key::{Comparator, NaturalOrder, OrderedKey};

// =============================================================================
// BalancedTree Definition
// =============================================================================

/// An ordered collection of uniquely identified records, backed by an AVL
/// tree.
///
/// Records are placed by their order key under the tree's [`Comparator`] and
/// looked up by their identity. Inserting a record whose identity is already
/// stored removes the old record first and places the new one fresh, so a
/// changed order key always lands in the right position.
///
/// # Time Complexity
///
/// | Operation            | Complexity          |
/// |----------------------|---------------------|
/// | `new`                | O(1)                |
/// | `insert`             | O(log N)            |
/// | `remove` / `take`    | O(log N + T)        |
/// | `get` / `contains`   | O(log N + T) / O(1) |
/// | `first` / `last`     | O(log N)            |
/// | `iter`               | O(log N) + O(1) per step |
/// | `len` / `is_empty`   | O(1)                |
///
/// T is the number of records sharing the target's order key.
///
/// # Examples
///
/// ```rust
/// use eventree::event::Event;
/// use eventree::tree::BalancedTree;
///
/// let mut events = BalancedTree::new();
/// events.insert(Event::new("Launch", "2024-06-15", "").unwrap());
/// events.insert(Event::new("Kickoff", "2024-01-01", "").unwrap());
///
/// let titles: Vec<&str> = events.iter().map(|event| event.title()).collect();
/// assert_eq!(titles, vec!["Kickoff", "Launch"]);
///
/// assert!(events.remove("Kickoff"));
/// assert!(!events.remove("Kickoff"));
/// assert_eq!(events.len(), 1);
/// ```
pub struct BalancedTree<R: OrderedKey, C = NaturalOrder> {
    /// Root node of the tree
    root: Link<R>,
    /// Identity to order key, used to steer identity-based lookups
    index: HashMap<R::Identity, R::Order>,
    comparator: C,
    config: TreeConfig,
    /// Provenance handed to the next fresh insertion
    next_provenance: u64,
}

impl<R: OrderedKey> BalancedTree<R, NaturalOrder> {
    /// Creates an empty tree ordered by the natural order of `R::Order`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventree::event::Event;
    /// use eventree::tree::BalancedTree;
    ///
    /// let tree: BalancedTree<Event> = BalancedTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates an empty, naturally ordered tree with the given configuration.
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        Self::with_comparator_and_config(NaturalOrder, config)
    }
}

impl<R: OrderedKey, C> BalancedTree<R, C> {
    /// Creates an empty tree ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventree::event::Event;
    /// use eventree::key::ReverseOrder;
    /// use eventree::tree::BalancedTree;
    ///
    /// let mut latest_first = BalancedTree::with_comparator(ReverseOrder);
    /// latest_first.insert(Event::new("Old", "2020-01-01", "").unwrap());
    /// latest_first.insert(Event::new("New", "2025-01-01", "").unwrap());
    ///
    /// assert_eq!(latest_first.first().map(|event| event.title()), Some("New"));
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_comparator_and_config(comparator, TreeConfig::default())
    }

    /// Creates an empty tree with an explicit comparator and configuration.
    #[must_use]
    pub fn with_comparator_and_config(comparator: C, config: TreeConfig) -> Self {
        Self {
            root: None,
            index: HashMap::new(),
            comparator,
            config,
            next_provenance: 0,
        }
    }

    /// Returns the number of records in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the tree holds no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the tree; an empty tree has height 0.
    ///
    /// The height never exceeds `1.45 * log2(len + 2)`.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        node::height(&self.root)
    }

    /// Returns the comparator that orders this tree.
    #[inline]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the tree's configuration.
    #[inline]
    pub const fn config(&self) -> TreeConfig {
        self.config
    }

    /// Replaces the configuration. Stored records are left as they are; the
    /// new policy applies to later insertions.
    pub const fn set_config(&mut self, config: TreeConfig) {
        self.config = config;
    }

    /// Returns `true` if a record with the given identity is stored.
    ///
    /// # Complexity
    ///
    /// O(1) expected
    pub fn contains<Q>(&self, identity: &Q) -> bool
    where
        R::Identity: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(identity)
    }

    /// Returns the record that orders first, if any.
    #[must_use]
    pub fn first(&self) -> Option<&R> {
        node::first(&self.root).map(|node| &node.record)
    }

    /// Returns the record that orders last, if any.
    #[must_use]
    pub fn last(&self) -> Option<&R> {
        node::last(&self.root).map(|node| &node.record)
    }

    /// Returns a lazy iterator over the records in ascending order.
    ///
    /// The walk borrows the tree and never modifies it; calling `iter` again
    /// starts over from the smallest record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventree::event::Event;
    /// use eventree::tree::BalancedTree;
    ///
    /// let tree: BalancedTree<Event> = [
    ///     Event::new("b", "2024-06-15", "").unwrap(),
    ///     Event::new("a", "2023-12-31", "").unwrap(),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let dates: Vec<String> = tree.iter().map(|event| event.date().to_string()).collect();
    /// assert_eq!(dates, vec!["2023-12-31", "2024-06-15"]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> BalancedTreeIterator<'_, R> {
        BalancedTreeIterator::new(&self.root, self.len())
    }

    /// Alias of [`iter`](Self::iter).
    #[must_use]
    pub fn traverse(&self) -> BalancedTreeIterator<'_, R> {
        self.iter()
    }

    /// Returns a lazy iterator over records and their provenance numbers in
    /// ascending record order.
    #[must_use]
    pub fn entries(&self) -> BalancedTreeEntries<'_, R> {
        BalancedTreeEntries::new(&self.root, self.len())
    }

    /// Removes every record. Provenance numbering continues where it was.
    pub fn clear(&mut self) {
        self.root = None;
        self.index.clear();
    }

    fn issue_provenance(&mut self) -> u64 {
        if self.next_provenance == u64::MAX {
            self.renumber_provenance();
        }
        let provenance = self.next_provenance;
        self.next_provenance = provenance.saturating_add(1);
        provenance
    }

    /// Compacts the stored provenance numbers to `0..len`, keeping their
    /// relative order, and resets the counter to `len`.
    fn renumber_provenance(&mut self) {
        let mut issued: Vec<u64> = self.entries().map(|entry| entry.provenance).collect();
        issued.sort_unstable();
        node::for_each_provenance_mut(&mut self.root, &mut |provenance: &mut u64| {
            let rank = issued.binary_search(provenance).unwrap_or_else(|rank| rank);
            *provenance = u64::try_from(rank).unwrap_or(u64::MAX);
        });
        self.next_provenance = u64::try_from(issued.len()).unwrap_or(u64::MAX);
    }
}

impl<R, C> BalancedTree<R, C>
where
    R: OrderedKey,
    C: Comparator<R::Order>,
{
    /// Inserts `record`, returning the record it replaced.
    ///
    /// A stored record with the same identity is removed from its current
    /// position first, and `record` is then placed by its own order key. The
    /// tree is rebalanced along the insertion path.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventree::event::Event;
    /// use eventree::tree::BalancedTree;
    ///
    /// let mut tree = BalancedTree::new();
    /// tree.insert(Event::new("Meeting", "2024-01-01", "").unwrap());
    /// let replaced = tree.insert(Event::new("Meeting", "2024-05-01", "").unwrap());
    ///
    /// assert_eq!(replaced.map(|event| event.date().to_string()), Some("2024-01-01".to_string()));
    /// assert_eq!(tree.len(), 1);
    /// let moved = tree.get("Meeting").map(|event| event.date().to_string());
    /// assert_eq!(moved, Some("2024-05-01".to_string()));
    /// ```
    pub fn insert(&mut self, record: R) -> Option<R> {
        let replaced = self.detach(record.identity());
        let provenance = match (&replaced, self.config.reinsert) {
            (Some((_, provenance)), Provenance::Preserve) => *provenance,
            _ => self.issue_provenance(),
        };

        self.index
            .insert(record.identity().clone(), record.order_key().clone());
        let root = self.root.take();
        self.root = Some(node::insert(root, record, provenance, &self.comparator));

        replaced.map(|(record, _)| record)
    }

    /// Removes the record with the given identity.
    ///
    /// Returns `false` when no such record is stored; the tree is then left
    /// exactly as it was.
    ///
    /// # Complexity
    ///
    /// O(log N + T), T being the number of records sharing the target's
    /// order key
    pub fn remove<Q>(&mut self, identity: &Q) -> bool
    where
        R::Identity: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.detach(identity).is_some()
    }

    /// Removes the record with the given identity and returns it.
    pub fn take<Q>(&mut self, identity: &Q) -> Option<R>
    where
        R::Identity: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.detach(identity).map(|(record, _)| record)
    }

    /// Returns the record with the given identity.
    pub fn get<Q>(&self, identity: &Q) -> Option<&R>
    where
        R::Identity: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let order = self.index.get(identity)?;
        node::find(&self.root, order, identity, &self.comparator).map(|node| &node.record)
    }

    /// Returns the provenance number of the record with the given identity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventree::event::Event;
    /// use eventree::tree::{BalancedTree, Provenance, TreeConfig};
    ///
    /// let mut tree = BalancedTree::with_config(TreeConfig::with_reinsert(Provenance::Preserve));
    /// tree.insert(Event::new("Standup", "2024-01-01", "").unwrap());
    /// tree.insert(Event::new("Retro", "2024-01-02", "").unwrap());
    /// tree.insert(Event::new("Standup", "2024-03-01", "moved").unwrap());
    ///
    /// assert_eq!(tree.provenance("Standup"), Some(0));
    /// assert_eq!(tree.provenance("Retro"), Some(1));
    /// ```
    pub fn provenance<Q>(&self, identity: &Q) -> Option<u64>
    where
        R::Identity: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let order = self.index.get(identity)?;
        node::find(&self.root, order, identity, &self.comparator).map(|node| node.provenance)
    }

    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found. A tree only mutated
    /// through its public API always validates.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let stored = validate::check_shape(&self.root, 0)?;
        if stored != self.index.len() {
            return Err(InvariantViolation::IndexSize {
                indexed: self.index.len(),
                stored,
            });
        }
        validate::check_sorted(self.iter(), &self.comparator)?;
        for (position, record) in self.iter().enumerate() {
            let indexed = self
                .index
                .get(record.identity())
                .is_some_and(|order| {
                    self.comparator.compare(order, record.order_key()) == Ordering::Equal
                });
            if !indexed {
                return Err(InvariantViolation::IndexMismatch { position });
            }
        }
        validate::check_provenance(self.entries().map(|entry| entry.provenance))?;
        if let Some(position) = self
            .entries()
            .position(|entry| entry.provenance >= self.next_provenance)
        {
            return Err(InvariantViolation::UnissuedProvenance { position });
        }
        Ok(())
    }

    /// Builds a tree from entries already in ascending order.
    ///
    /// The result is height-balanced by construction, in O(N).
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::OutOfOrder`],
    /// [`InvariantViolation::DuplicateIdentity`],
    /// [`InvariantViolation::DuplicateProvenance`] or
    /// [`InvariantViolation::ProvenanceExhausted`] if the entries cannot form
    /// a valid tree.
    pub(crate) fn from_sorted_entries(
        entries: Vec<Detached<R>>,
        comparator: C,
        config: TreeConfig,
    ) -> Result<Self, InvariantViolation> {
        validate::check_sorted(entries.iter().map(|(record, _)| record), &comparator)?;

        let mut index = HashMap::with_capacity(entries.len());
        for (position, (record, _)) in entries.iter().enumerate() {
            let previous = index.insert(record.identity().clone(), record.order_key().clone());
            if previous.is_some() {
                return Err(InvariantViolation::DuplicateIdentity { position });
            }
        }

        let next_provenance =
            validate::check_provenance(entries.iter().map(|(_, provenance)| *provenance))?;
        let size = entries.len();
        let root = node::build_balanced(size, &mut entries.into_iter());

        Ok(Self {
            root,
            index,
            comparator,
            config,
            next_provenance,
        })
    }

    fn detach<Q>(&mut self, identity: &Q) -> Option<Detached<R>>
    where
        R::Identity: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let order = self.index.get(identity)?;
        let detached = node::remove(&mut self.root, order, identity, &self.comparator)?;
        self.index.remove(identity);
        Some(detached)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<R: OrderedKey, C: Default> Default for BalancedTree<R, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<R, C> Clone for BalancedTree<R, C>
where
    R: OrderedKey + Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            index: self.index.clone(),
            comparator: self.comparator.clone(),
            config: self.config,
            next_provenance: self.next_provenance,
        }
    }
}

impl<R, C> FromIterator<R> for BalancedTree<R, C>
where
    R: OrderedKey,
    C: Comparator<R::Order> + Default,
{
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<R, C> Extend<R> for BalancedTree<R, C>
where
    R: OrderedKey,
    C: Comparator<R::Order>,
{
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl<'a, R: OrderedKey, C> IntoIterator for &'a BalancedTree<R, C> {
    type Item = &'a R;
    type IntoIter = BalancedTreeIterator<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<R: OrderedKey, C> IntoIterator for BalancedTree<R, C> {
    type Item = R;
    type IntoIter = BalancedTreeIntoIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        let length = self.len();
        BalancedTreeIntoIterator::new(self.root, length)
    }
}

/// Two trees are equal when they traverse to equal record sequences,
/// regardless of shape, comparator state or provenance.
impl<R: OrderedKey + PartialEq, C> PartialEq for BalancedTree<R, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<R: OrderedKey + Eq, C> Eq for BalancedTree<R, C> {}

impl<R: OrderedKey + fmt::Debug, C> fmt::Debug for BalancedTree<R, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<R: OrderedKey + fmt::Display, C> fmt::Display for BalancedTree<R, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for record in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{record}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Tests
// =============================================================================
