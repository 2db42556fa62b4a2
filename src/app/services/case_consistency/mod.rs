//! Cross-record case consistency (tier 4)
//!
//! Records arrive in file order. The validator buffers every record of the
//! current case number and runs the section's rule set when the case number
//! changes, or when the caller finalizes the last case.
//!
//! # Architecture
//!
//! - [`validator`] - case buffer, boundary detection and error generation
//! - [`active`] - head-of-household and dependent rules for active cases
//! - [`closed`] - closure substantiation and benefit code rules for closed cases
//!
//! Rule sets never fail the parse: an internal error while evaluating a case is
//! logged and the case contributes no findings.

pub mod active;
pub mod closed;
pub mod validator;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use validator::{CaseBuffer, CaseConsistencyValidator, CaseEntry, ConsistencyError, Finding};
