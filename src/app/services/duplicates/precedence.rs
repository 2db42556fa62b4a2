//! Duplicate finding strictness

use serde::{Deserialize, Serialize};

/// Duplicate finding levels, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorLevel {
    Duplicate = 0,
    PartialDuplicate = 1,
    None = 2,
}

impl ErrorLevel {
    pub fn is_stricter_than(self, other: ErrorLevel) -> bool {
        self < other
    }
}

/// Tracks the strictest level a bucket has reported
///
/// With precedence enabled a bucket only ever holds findings at its strictest
/// level: a stricter finding replaces everything recorded so far, an equal one
/// is appended and a laxer one is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPrecedence {
    current_max: ErrorLevel,
    ignore: bool,
}

impl ErrorPrecedence {
    pub fn new(ignore: bool) -> Self {
        Self {
            current_max: ErrorLevel::None,
            ignore,
        }
    }

    pub fn current_max(&self) -> ErrorLevel {
        self.current_max
    }

    /// Returns `(has_precedence, is_new_max)` for a finding at `level`
    ///
    /// When `is_new_max` is set the caller must discard the findings it holds
    /// before recording the new one.
    pub fn has_precedence(&mut self, level: ErrorLevel) -> (bool, bool) {
        if self.ignore {
            return (true, false);
        }
        if level.is_stricter_than(self.current_max) {
            self.current_max = level;
            (true, true)
        } else if level == self.current_max {
            (true, false)
        } else {
            (false, false)
        }
    }
}

impl Default for ErrorPrecedence {
    fn default() -> Self {
        Self::new(false)
    }
}
