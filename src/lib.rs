//! TANF Processor Library
//!
//! A Rust library for parsing and validating the fixed-width quarterly data
//! files that states, tribes and territories submit for the TANF, SSP-MOE,
//! Tribal TANF and FRA programs.
//!
//! This library provides tools for:
//! - Declarative fixed-width row schemas built from positioned fields
//! - A composable validator library with record, field and line level checks
//! - Exact and partial duplicate detection with error precedence
//! - Cross-record case consistency rules for active and closed case sections
//! - Streaming orchestration with batched persistence, rollback and purges
//! - File-level acceptance status and per-month case aggregates

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod case_consistency;
        pub mod catalog;
        pub mod duplicates;
        pub mod error_generator;
        pub mod file_summary;
        pub mod fixed_width;
        pub mod parse_orchestrator;
        pub mod validators;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    ErrorCategory, ErrorLocation, FieldValue, ParserError, ProgramType, Record, Section,
    Submission,
};
pub use app::services::catalog::SchemaCatalog;
pub use app::services::file_summary::{FileSummary, SummaryStatus};
pub use app::services::parse_orchestrator::{InMemoryStore, ParseOrchestrator, ParseOutcome};
pub use config::Config;

/// Result type alias for the TANF processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for TANF processing operations
///
/// Validation findings about submitted data are not errors in this sense;
/// they are [`ParserError`] values collected during a parse. This enum covers
/// failures of the processor itself and of its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Tuple-row (CSV) parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Input bytes could not be decoded
    #[error("Decoding error: {message}")]
    Decoding { message: String },

    /// No schema could be resolved for a program, section or record type
    #[error("Schema resolution error: {message}")]
    SchemaResolution { message: String },

    /// Storage backend failure
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Report serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// A parse was rolled back
    #[error("Submission {submission} rolled back: {message}")]
    Rollback { submission: String, message: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a decoding error
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Create a schema resolution error
    pub fn schema_resolution(message: impl Into<String>) -> Self {
        Self::SchemaResolution {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a rollback error
    pub fn rollback(submission: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rollback {
            submission: submission.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::io("I/O operation failed", error)
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::csv_parsing("unknown", error.to_string(), Some(error))
    }
}

impl From<app::services::parse_orchestrator::DecodeError> for Error {
    fn from(error: app::services::parse_orchestrator::DecodeError) -> Self {
        Self::decoding(error.to_string())
    }
}

impl From<app::services::catalog::ResolveError> for Error {
    fn from(error: app::services::catalog::ResolveError) -> Self {
        Self::schema_resolution(error.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::configuration(format!("Invalid configuration file: {}", error))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization("JSON serialization failed", error)
    }
}
