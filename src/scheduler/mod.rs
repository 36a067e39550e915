//! Event scheduler: keeps [`Event`]s in date order and persists them between
//! runs.
//!
//! The scheduler owns one [`BalancedTree`] and one [`SnapshotStore`]. It does
//! no console I/O; callers collect input, report outcomes and decide when to
//! [`save`](EventScheduler::save).
//!
//! # Examples
//!
//! ```rust
//! use eventree::scheduler::{EventScheduler, SchedulerConfig};
//!
//! let directory = tempfile::tempdir().unwrap();
//! let config = SchedulerConfig::new(directory.path().join("events.json"));
//!
//! let mut scheduler = EventScheduler::open(&config);
//! scheduler.add_event("Launch", "2025-01-01", "v1").unwrap();
//! scheduler.add_event("Beta", "2024-09-01", "").unwrap();
//! assert!(scheduler.add_event("Broken", "2024-02-30", "").is_err());
//! scheduler.save().unwrap();
//!
//! let reopened = EventScheduler::open(&config);
//! let titles: Vec<&str> = reopened.list_events().map(|event| event.title()).collect();
//! assert_eq!(titles, vec!["Beta", "Launch"]);
//! ```

mod config;

pub use config::{
    ConfigError, DEFAULT_STORAGE_FILE, REINSERT_VARIABLE, STORAGE_FILE_VARIABLE, SchedulerConfig,
};

use crate::event::{Event, EventError};
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::tree::{BalancedTree, BalancedTreeIterator};

/// Date-ordered event book backed by a snapshot file.
#[derive(Debug)]
pub struct EventScheduler {
    events: BalancedTree<Event>,
    store: SnapshotStore,
}

impl EventScheduler {
    /// Opens the scheduler, restoring events from the configured snapshot.
    ///
    /// A missing, empty or unusable snapshot yields an empty scheduler; the
    /// reason is logged.
    pub fn open(config: &SchedulerConfig) -> Self {
        let store = SnapshotStore::new(&config.storage_file);
        let mut events: BalancedTree<Event> = store.load_or_empty();
        events.set_config(config.tree);
        tracing::info!(
            path = %store.path().display(),
            events = events.len(),
            "scheduler opened"
        );
        Self { events, store }
    }

    /// Adds an event, replacing any event with the same title.
    ///
    /// Returns the replaced event, if there was one.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MalformedKey`] if `date` is not a `YYYY-MM-DD`
    /// calendar day. The scheduler is unchanged in that case.
    pub fn add_event(
        &mut self,
        title: &str,
        date: &str,
        description: &str,
    ) -> Result<Option<Event>, EventError> {
        let event = Event::new(title, date, description)?;
        let replaced = self.events.insert(event);
        tracing::debug!(title, date, replaced = replaced.is_some(), "event added");
        Ok(replaced)
    }

    /// Removes the event with the given title. Returns `false` if there is
    /// none.
    pub fn remove_event(&mut self, title: &str) -> bool {
        let removed = self.events.remove(title);
        tracing::debug!(title, removed, "event removal requested");
        removed
    }

    /// Returns the event with the given title.
    pub fn event(&self, title: &str) -> Option<&Event> {
        self.events.get(title)
    }

    /// Iterates over the events in date order.
    pub fn list_events(&self) -> BalancedTreeIterator<'_, Event> {
        self.events.iter()
    }

    /// The underlying tree.
    pub const fn events(&self) -> &BalancedTree<Event> {
        &self.events
    }

    /// Number of scheduled events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no events are scheduled.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Writes every event to the snapshot file.
    ///
    /// # Errors
    ///
    /// Returns the [`SnapshotError`] that prevented the write. The previous
    /// snapshot stays in place.
    pub fn save(&self) -> Result<(), SnapshotError> {
        self.store.save(&self.events)?;
        tracing::info!(
            path = %self.store.path().display(),
            events = self.events.len(),
            "events saved"
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
