//! Exact and partial duplicate detection
//!
//! Records are grouped into buckets by case number and reporting month. Each
//! bucket owns a [`CaseDuplicateDetector`] that remembers the first line of
//! every full-line hash and every partial-identity hash it has seen, so later
//! occurrences are always reported against the first one.
//!
//! # Architecture
//!
//! - [`precedence`] - strictness ranking that keeps only the strictest findings
//! - [`detector`] - per-bucket hash bookkeeping and error generation
//! - [`manager`] - routes records to buckets and collects purge targets
//!
//! # Example Usage
//!
//! ```rust
//! use tanf_processor::app::services::duplicates::{DuplicateManager, ErrorLevel};
//!
//! let manager = DuplicateManager::new(false);
//! assert!(manager.generated_errors().is_empty());
//! assert!(manager.records_to_remove(ErrorLevel::Duplicate).is_empty());
//! ```

pub mod detector;
pub mod manager;
pub mod precedence;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use detector::CaseDuplicateDetector;
pub use manager::{BucketKey, DuplicateManager};
pub use precedence::{ErrorLevel, ErrorPrecedence};
