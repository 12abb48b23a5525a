//! Calendar month type.
//!
//! Every computation is scoped to a single month of a single year. [`Month`]
//! guarantees the month number is in `1..=12`, so lookups keyed by month can
//! never go out of range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a month number is outside `1..=12`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    /// The number is not a calendar month.
    #[error("month {0} is out of range (expected 1-12)")]
    OutOfRange(i64),
    /// The text could not be parsed as a number.
    #[error("invalid month {0:?}")]
    Invalid(String),
}

/// A calendar month, January = 1 through December = 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Month(u8);

impl Month {
    /// January.
    pub const JANUARY: Self = Self(1);
    /// December.
    pub const DECEMBER: Self = Self(12);

    /// Create a month from its number.
    pub fn new(number: u32) -> Result<Self, MonthError> {
        if (1..=12).contains(&number) {
            Ok(Self(number as u8))
        } else {
            Err(MonthError::OutOfRange(i64::from(number)))
        }
    }

    /// The month number (1-12).
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0 as u32
    }

    /// Zero-based index, for addressing per-month arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The month before this one, or `None` for January.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        if self.0 > 1 {
            Some(Self(self.0 - 1))
        } else {
            None
        }
    }

    /// Whether this is January.
    #[must_use]
    pub const fn is_january(self) -> bool {
        self.0 == 1
    }

    /// English month name ("January", ...).
    #[must_use]
    pub fn name(self) -> &'static str {
        chrono::Month::try_from(self.0).map_or("?", |m| m.name())
    }

    /// All twelve months in calendar order.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (1..=12u8).map(Self)
    }

    /// Months from January up to and including `self`.
    pub fn through(self) -> impl DoubleEndedIterator<Item = Self> {
        (1..=self.0).map(Self)
    }
}

impl TryFrom<u32> for Month {
    type Error = MonthError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Month> for u32 {
    fn from(month: Month) -> Self {
        month.number()
    }
}

impl FromStr for Month {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number: i64 = trimmed
            .parse()
            .map_err(|_| MonthError::Invalid(trimmed.to_string()))?;
        u32::try_from(number)
            .map_err(|_| MonthError::OutOfRange(number))
            .and_then(Self::new)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
