//! # eventree
//!
//! An ordered collection of uniquely identified records backed by a
//! self-balancing (AVL) binary search tree, and a calendar event scheduler
//! built on top of it.
//!
//! ## Overview
//!
//! - **Keys**: [`OrderedKey`](key::OrderedKey) separates a record's identity
//!   (what it *is*) from its order key (where it *goes*); a
//!   [`Comparator`](key::Comparator) orders the keys.
//! - **Tree**: [`BalancedTree`](tree::BalancedTree) with insert
//!   (replace-on-same-identity), remove by identity and lazy in-order
//!   traversal.
//! - **Events**: [`Event`](event::Event), identified by title and ordered by a
//!   validated [`EventDate`](event::EventDate).
//! - **Snapshots**: [`SnapshotStore`](snapshot::SnapshotStore) saves and
//!   restores any serde value as JSON, falling back to an empty value when
//!   loading fails.
//! - **Scheduler**: [`EventScheduler`](scheduler::EventScheduler) ties the
//!   pieces together.
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for trees, events and configuration
//! - `snapshot`: the `snapshot` and `scheduler` modules (implies `serde`)
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use eventree::prelude::*;
//!
//! let mut events = BalancedTree::new();
//! events.insert(Event::new("Meeting", "2024-01-01", "").unwrap());
//! events.insert(Event::new("Meeting", "2024-05-01", "rescheduled").unwrap());
//!
//! assert_eq!(events.len(), 1);
//! assert_eq!(events.get("Meeting").map(|event| event.date().month()), Some(5));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use eventree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::event::{Event, EventDate, EventError};
    pub use crate::key::{Comparator, NaturalOrder, OrderedKey, ReverseOrder};
    pub use crate::tree::{BalancedTree, Provenance, TreeConfig};

    #[cfg(feature = "snapshot")]
    pub use crate::scheduler::{EventScheduler, SchedulerConfig};

    #[cfg(feature = "snapshot")]
    pub use crate::snapshot::{LoadOutcome, SnapshotError, SnapshotStore};
}

pub mod event;
pub mod key;
pub mod tree;

#[cfg(feature = "snapshot")]
pub mod scheduler;

#[cfg(feature = "snapshot")]
pub mod snapshot;
