//! Validator combinator library
//!
//! Validators are small values that can be composed and shared across
//! threads. The library is organized into:
//! - [`base`] - traits, result types, message registers and the leaf wrapper
//! - [`predicates`] - leaf checks over a single value
//! - [`combinators`] - `and`/`or`/`or_priority` over values and
//!   `if_then`/sum checks over records
//! - [`preparsing`] - checks over a whole raw line
//!
//! ## Usage
//!
//! ```rust
//! use tanf_processor::app::services::validators::{combinators, predicates};
//!
//! let disposition = combinators::or(vec![
//!     predicates::is_one_of(&["1", "2"]),
//!     predicates::is_blank(),
//! ]);
//! # let _ = disposition;
//! ```

pub mod base;
pub mod combinators;
pub mod predicates;
pub mod preparsing;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use base::{
    BoxedRecordValidator, BoxedValidator, ErrorFormat, PredicateError, PredicateResult,
    RecordValidationResult, RecordValidator, ValidationErrorArgs, ValidationResult, Validator,
    ValueValidator,
};
pub use combinators::{and, field_check, if_then, or, or_priority, sum_is_equal, sum_is_larger};
pub use predicates::OptionSet;
