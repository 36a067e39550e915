//! Scheduler configuration.
//!
//! Configuration can be built in code with [`SchedulerConfig::new`] or read
//! from environment variables with [`SchedulerConfig::from_env`]:
//!
//! - `EVENTREE_STORAGE_FILE`: snapshot location (optional, default: `./events.json`)
//! - `EVENTREE_REINSERT_PROVENANCE`: `renew` or `preserve` (optional, default: `renew`)

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::tree::{ParseProvenanceError, Provenance, TreeConfig};

/// Environment variable naming the snapshot file.
pub const STORAGE_FILE_VARIABLE: &str = "EVENTREE_STORAGE_FILE";

/// Environment variable selecting the reinsert [`Provenance`] policy.
pub const REINSERT_VARIABLE: &str = "EVENTREE_REINSERT_PROVENANCE";

/// Snapshot location used when none is configured.
pub const DEFAULT_STORAGE_FILE: &str = "./events.json";

/// Errors raised while reading configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but is not valid Unicode.
    #[error("environment variable {key} is not valid Unicode")]
    NotUnicode {
        /// Name of the variable.
        key: &'static str,
    },

    /// A variable holds a value that cannot be used.
    #[error("invalid value for {key}")]
    InvalidValue {
        /// Name of the variable.
        key: &'static str,
        /// Why the value was rejected.
        #[source]
        source: ParseProvenanceError,
    },
}

/// Settings for an [`EventScheduler`](super::EventScheduler).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Where the event snapshot is read from and written to.
    pub storage_file: PathBuf,
    /// Behaviour of the underlying tree.
    pub tree: TreeConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_FILE)
    }
}

impl SchedulerConfig {
    /// Creates a configuration storing its snapshot at `storage_file`, with
    /// default tree settings.
    pub fn new(storage_file: impl Into<PathBuf>) -> Self {
        Self {
            storage_file: storage_file.into(),
            tree: TreeConfig::default(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotUnicode`] or [`ConfigError::InvalidValue`]
    /// when a variable is set to an unusable value. Unset variables fall back
    /// to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { key }),
        })
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value, if set.
    ///
    /// # Errors
    ///
    /// Propagates errors from `lookup` and returns
    /// [`ConfigError::InvalidValue`] for an unknown provenance policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eventree::scheduler::SchedulerConfig;
    /// use eventree::tree::Provenance;
    ///
    /// let config = SchedulerConfig::from_lookup(|key| {
    ///     Ok(match key {
    ///         "EVENTREE_STORAGE_FILE" => Some("/tmp/calendar.json".to_string()),
    ///         "EVENTREE_REINSERT_PROVENANCE" => Some("preserve".to_string()),
    ///         _ => None,
    ///     })
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(config.storage_file.to_str(), Some("/tmp/calendar.json"));
    /// assert_eq!(config.tree.reinsert, Provenance::Preserve);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, ConfigError>,
    {
        let storage_file = lookup(STORAGE_FILE_VARIABLE)?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_FILE.to_string());

        let reinsert = lookup(REINSERT_VARIABLE)?
            .map(|value| value.parse::<Provenance>())
            .transpose()
            .map_err(|source| ConfigError::InvalidValue {
                key: REINSERT_VARIABLE,
                source,
            })?
            .unwrap_or_default();

        Ok(Self {
            storage_file: PathBuf::from(storage_file),
            tree: TreeConfig::with_reinsert(reinsert),
        })
    }
}
