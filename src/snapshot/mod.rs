//! File snapshots of a collection.
//!
//! [`SnapshotStore`] persists any serde value, typically a
//! [`BalancedTree`](crate::tree::BalancedTree), as JSON in a single file.
//!
//! # Load and Save Semantics
//!
//! - [`SnapshotStore::load`] reports exactly what it found: a restored value,
//!   an empty file, no file at all, or an error.
//! - [`SnapshotStore::load_or_empty`] never fails. Anything other than a
//!   restored value yields `T::default()`, and the cause is logged so an
//!   operator can tell a fresh start from a discarded snapshot.
//! - [`SnapshotStore::save`] writes to a sibling staging file and renames it
//!   over the target, so a failed save leaves the previous snapshot intact.
//!   Failures are returned to the caller.
//!
//! # Examples
//!
//! ```rust
//! use eventree::event::Event;
//! use eventree::snapshot::{LoadOutcome, SnapshotStore};
//! use eventree::tree::BalancedTree;
//!
//! let directory = tempfile::tempdir().unwrap();
//! let store = SnapshotStore::new(directory.path().join("events.json"));
//!
//! let absent = store.load::<BalancedTree<Event>>().unwrap();
//! assert!(matches!(absent, LoadOutcome::Absent));
//!
//! let mut events = BalancedTree::new();
//! events.insert(Event::new("Launch", "2025-01-01", "").unwrap());
//! store.save(&events).unwrap();
//!
//! let restored: BalancedTree<Event> = store.load_or_empty();
//! assert_eq!(restored, events);
//! ```

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file exists but could not be read.
    #[error("failed to read snapshot {}", .path.display())]
    Read {
        /// Snapshot location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The snapshot could not be written.
    #[error("failed to write snapshot {}", .path.display())]
    Write {
        /// Snapshot location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The snapshot file does not hold a valid value.
    #[error("snapshot {} is corrupt", .path.display())]
    Decode {
        /// Snapshot location.
        path: PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be encoded.
    #[error("failed to encode snapshot")]
    Encode(#[source] serde_json::Error),
}

// =============================================================================
// LoadOutcome
// =============================================================================

/// What [`SnapshotStore::load`] found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// A snapshot was decoded.
    Restored(T),
    /// The snapshot file exists but holds nothing.
    Empty,
    /// There is no snapshot file.
    Absent,
}

impl<T: Default> LoadOutcome<T> {
    /// Returns the restored value, or `T::default()` for an empty or absent
    /// snapshot.
    pub fn into_value(self) -> T {
        match self {
            Self::Restored(value) => value,
            Self::Empty | Self::Absent => T::default(),
        }
    }
}

// =============================================================================
// SnapshotStore
// =============================================================================

/// A JSON snapshot stored at a fixed path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store for the snapshot at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes the snapshot.
    ///
    /// A file holding only whitespace counts as [`LoadOutcome::Empty`].
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Read`] if the file exists but cannot be read,
    /// and [`SnapshotError::Decode`] if its content is not a valid `T`.
    pub fn load<T: DeserializeOwned>(&self) -> Result<LoadOutcome<T>, SnapshotError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(LoadOutcome::Absent);
            }
            Err(source) => {
                return Err(SnapshotError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(LoadOutcome::Empty);
        }

        serde_json::from_slice(&bytes)
            .map(LoadOutcome::Restored)
            .map_err(|source| SnapshotError::Decode {
                path: self.path.clone(),
                source,
            })
    }

    /// Loads the snapshot, substituting `T::default()` for anything that is
    /// not a valid snapshot.
    pub fn load_or_empty<T: DeserializeOwned + Default>(&self) -> T {
        let path = self.path.display();
        match self.load() {
            Ok(LoadOutcome::Restored(value)) => {
                tracing::info!(%path, "restored snapshot");
                value
            }
            Ok(LoadOutcome::Empty) => {
                tracing::info!(%path, "snapshot file is empty, starting fresh");
                T::default()
            }
            Ok(LoadOutcome::Absent) => {
                tracing::debug!(%path, "no snapshot found, starting fresh");
                T::default()
            }
            Err(error) => {
                tracing::warn!(%path, %error, "discarding unusable snapshot, starting fresh");
                T::default()
            }
        }
    }

    /// Encodes `value` and replaces the snapshot with it.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encode`] if `value` cannot be encoded and
    /// [`SnapshotError::Write`] if the file cannot be written. The previous
    /// snapshot, if any, is left untouched in both cases.
    pub fn save<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(SnapshotError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }

        let staging = self.staging_path();
        if let Err(source) = fs::write(&staging, &bytes) {
            let _ = fs::remove_file(&staging);
            return Err(self.write_error(source));
        }
        if let Err(source) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(self.write_error(source));
        }

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "saved snapshot");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(OsString::new, ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: io::Error) -> SnapshotError {
        SnapshotError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
