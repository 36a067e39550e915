//! Behavioural switches for [`BalancedTree`](super::BalancedTree).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// What happens to a record's provenance when a record with the same identity
/// is inserted again.
///
/// Every record receives a provenance number the first time it enters a tree.
/// Numbers increase with each insertion, so they record insertion order. If
/// the counter ever reaches `u64::MAX`, the stored numbers are compacted to
/// `0..len` in their existing order before the next one is issued.
///
/// # Examples
///
/// ```rust
/// use eventree::tree::Provenance;
///
/// let policy: Provenance = "preserve".parse().unwrap();
/// assert_eq!(policy, Provenance::Preserve);
/// assert_eq!(Provenance::default(), Provenance::Renew);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Provenance {
    /// A reinsert counts as a brand-new insertion.
    #[default]
    Renew,
    /// A reinsert keeps the provenance of the record it replaces.
    Preserve,
}

impl fmt::Display for Provenance {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Renew => formatter.write_str("renew"),
            Self::Preserve => formatter.write_str("preserve"),
        }
    }
}

/// Error returned when parsing an unknown [`Provenance`] name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown provenance policy `{0}`, expected `renew` or `preserve`")]
pub struct ParseProvenanceError(pub String);

impl FromStr for Provenance {
    type Err = ParseProvenanceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "renew" => Ok(Self::Renew),
            "preserve" => Ok(Self::Preserve),
            _ => Err(ParseProvenanceError(value.to_string())),
        }
    }
}

/// Configuration of a [`BalancedTree`](super::BalancedTree).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Provenance policy applied when an identity is inserted again.
    pub reinsert: Provenance,
}

impl TreeConfig {
    /// Returns a configuration with the given reinsert policy.
    #[must_use]
    pub const fn with_reinsert(reinsert: Provenance) -> Self {
        Self { reinsert }
    }
}
