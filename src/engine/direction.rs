//! Move direction and the wrap-around test.

use std::fmt;
use std::str::FromStr;

use crate::error::NavigationError;

/// Direction of a cursor move through the item collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards higher indices (next).
    Ascending,
    /// Towards lower indices (previous).
    Descending,
}

impl Direction {
    /// Whether one more step from `index` leaves a collection of `length`.
    ///
    /// An ascending cursor already past the end (the collection shrank under
    /// it) counts as overflowed as well, so the wrap brings it back in range.
    pub fn is_overflowed(self, index: usize, length: usize) -> bool {
        match self {
            Direction::Ascending => index >= length.saturating_sub(1),
            Direction::Descending => index == 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASCENDING" => Ok(Direction::Ascending),
            "DESCENDING" => Ok(Direction::Descending),
            other => Err(NavigationError::InvalidDirection {
                direction: other.to_string(),
            }),
        }
    }
}
