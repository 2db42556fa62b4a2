//! Byte positions of fields within a fixed-width line

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open `[start, end)` range of a field on a line
///
/// For tuple rows the start is the column index and the range covers one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    /// Create a position; an empty or inverted range widens to one character
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start + 1),
        }
    }

    /// Single character, or a single column of a tuple row
    pub fn at(index: usize) -> Self {
        Self::new(index, index + 1)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the position spans more than one character
    pub fn is_range(&self) -> bool {
        self.len() > 1
    }

    /// Same width, moved right by `offset`
    pub fn shifted(&self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.start, self.end)
    }
}
