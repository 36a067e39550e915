//! Calendar events: the records the scheduler keeps in a
//! [`BalancedTree`](crate::tree::BalancedTree).
//!
//! An [`Event`] is identified by its title and ordered by its [`EventDate`].
//! Dates are validated when the event is built, so a tree never holds an
//! event whose order key is malformed.
//!
//! # Examples
//!
//! ```rust
//! use eventree::event::{Event, EventError};
//!
//! let event = Event::new("Review", "2024-06-15", "quarterly").unwrap();
//! assert_eq!(event.date().year(), 2024);
//! assert_eq!(
//!     event.to_string(),
//!     "Title: Review, Date: 2024-06-15, Description: quarterly"
//! );
//!
//! assert!(matches!(
//!     Event::new("Broken", "2024-13-01", ""),
//!     Err(EventError::MalformedKey { .. })
//! ));
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::key::OrderedKey;

/// Textual format of an [`EventDate`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while building an [`Event`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EventError {
    /// The date does not denote a calendar day in `YYYY-MM-DD` form.
    #[error("malformed date `{input}`, expected YYYY-MM-DD")]
    MalformedKey {
        /// The rejected input.
        input: String,
        /// Why the input was rejected.
        #[source]
        source: chrono::format::ParseError,
    },
}

// =============================================================================
// EventDate
// =============================================================================

/// The order key of an [`Event`]: a calendar day, ordered by year, then
/// month, then day.
///
/// # Examples
///
/// ```rust
/// use eventree::event::EventDate;
///
/// let date: EventDate = "2023-12-31".parse().unwrap();
/// assert_eq!((date.year(), date.month(), date.day()), (2023, 12, 31));
/// assert!(date < "2024-01-01".parse().unwrap());
/// assert!("2023-02-30".parse::<EventDate>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct EventDate(NaiveDate);

impl EventDate {
    /// Creates a date from its numeric parts.
    ///
    /// Returns `None` when the parts do not form a calendar day.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month of the year, 1 to 12.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of the month, starting at 1.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl FromStr for EventDate {
    type Err = EventError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|source| EventError::MalformedKey {
                input: input.to_string(),
                source,
            })
    }
}

impl TryFrom<String> for EventDate {
    type Error = EventError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventDate> for String {
    fn from(date: EventDate) -> Self {
        date.to_string()
    }
}

impl From<NaiveDate> for EventDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.format(DATE_FORMAT))
    }
}

// =============================================================================
// Event
// =============================================================================

/// A calendar event, identified by its title and ordered by its date.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    title: String,
    date: EventDate,
    description: String,
}

impl Event {
    /// Builds an event, parsing `date` as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MalformedKey`] when `date` is not a calendar day.
    pub fn new(
        title: impl Into<String>,
        date: &str,
        description: impl Into<String>,
    ) -> Result<Self, EventError> {
        Ok(Self::on(title, date.parse()?, description))
    }

    /// Builds an event on an already validated date.
    #[must_use]
    pub fn on(title: impl Into<String>, date: EventDate, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date,
            description: description.into(),
        }
    }

    /// The event's title, which is also its identity.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The day the event takes place.
    #[must_use]
    pub const fn date(&self) -> EventDate {
        self.date
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl OrderedKey for Event {
    type Identity = String;
    type Order = EventDate;

    fn identity(&self) -> &String {
        &self.title
    }

    fn order_key(&self) -> &EventDate {
        &self.date
    }
}

impl fmt::Display for Event {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Title: {}, Date: {}, Description: {}",
            self.title, self.date, self.description
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
