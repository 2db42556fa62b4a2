//! Parse orchestration for whole submissions
//!
//! The orchestrator owns everything that spans more than one line: decoding,
//! header and trailer prechecks, record-type dispatch, batched persistence,
//! duplicate and case consistency passes, purges and rollback.
//!
//! # Architecture
//!
//! - [`orchestrator`] - `ParseOrchestrator` and the per-parse run state
//! - [`decoder`] - byte decoding collaborator
//! - [`storage`] - record store collaborator and its in-memory backends
//! - [`unsaved`] - record and finding buffers between flushes
//! - [`stats`] - counters reported with every outcome
//!
//! # Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tanf_processor::app::models::{ProgramType, Section, Submission};
//! use tanf_processor::app::services::parse_orchestrator::{InMemoryStore, ParseOrchestrator};
//! use tanf_processor::config::ParserConfig;
//! use tanf_processor::{SchemaCatalog, SummaryStatus};
//!
//! # fn example() -> tanf_processor::Result<()> {
//! let catalog = Arc::new(SchemaCatalog::standard());
//! let mut orchestrator =
//!     ParseOrchestrator::new(catalog, ParserConfig::default(), InMemoryStore::new())?;
//!
//! let submission = Submission::new(ProgramType::Tanf, Section::Active, 2020, 4)?;
//! let outcome = orchestrator.parse(&submission, b"not a header\n")?;
//! assert_eq!(outcome.summary.status, SummaryStatus::Rejected);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod decoder;
pub mod orchestrator;
pub mod stats;
pub mod storage;
pub mod unsaved;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use decoder::{DecodeError, Decoder, DetectingDecoder, Encoding};
pub use orchestrator::{ParseOrchestrator, ParseOutcome};
pub use stats::ParseStats;
pub use storage::{InMemoryStore, RecordFilter, RecordStore, SharedStore};
pub use unsaved::{UnsavedErrors, UnsavedRecords};
