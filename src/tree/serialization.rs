//! Serde support for [`BalancedTree`].
//!
//! A tree serializes as a sequence of `{ "record": .., "provenance": .. }`
//! entries in traversal order. Decoding checks the order and the uniqueness
//! of identities, then rebuilds a height-balanced tree in a single pass.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{BalancedTree, TreeConfig};
use crate::key::{Comparator, OrderedKey};

/// Upper bound on the capacity reserved from an untrusted length hint.
const MAXIMUM_PREALLOCATION: usize = 4096;

#[derive(Serialize)]
struct EntryRef<'a, R> {
    record: &'a R,
    provenance: u64,
}

#[derive(Deserialize)]
struct OwnedEntry<R> {
    record: R,
    provenance: u64,
}

impl<R, C> Serialize for BalancedTree<R, C>
where
    R: OrderedKey + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for entry in self.entries() {
            sequence.serialize_element(&EntryRef {
                record: entry.record,
                provenance: entry.provenance,
            })?;
        }
        sequence.end()
    }
}

struct BalancedTreeVisitor<R, C> {
    marker: PhantomData<fn() -> (R, C)>,
}

impl<R, C> BalancedTreeVisitor<R, C> {
    const fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }
}

impl<'de, R, C> Visitor<'de> for BalancedTreeVisitor<R, C>
where
    R: OrderedKey + Deserialize<'de>,
    C: Comparator<R::Order> + Default,
{
    type Value = BalancedTree<R, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of tree entries in ascending order")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let capacity = access.size_hint().unwrap_or(0).min(MAXIMUM_PREALLOCATION);
        let mut entries = Vec::with_capacity(capacity);
        while let Some(OwnedEntry { record, provenance }) =
            access.next_element::<OwnedEntry<R>>()?
        {
            entries.push((record, provenance));
        }
        BalancedTree::from_sorted_entries(entries, C::default(), TreeConfig::default())
            .map_err(de::Error::custom)
    }
}

impl<'de, R, C> Deserialize<'de> for BalancedTree<R, C>
where
    R: OrderedKey + Deserialize<'de>,
    C: Comparator<R::Order> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(BalancedTreeVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
