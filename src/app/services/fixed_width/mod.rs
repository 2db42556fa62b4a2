//! Fixed-width row parsing
//!
//! This module interprets declarative row schemas: it slices positioned
//! fields out of a line, applies transforms, and runs the validator tiers
//! that belong to a single row.
//!
//! ## Architecture
//!
//! - [`position`] - zero-based half-open slice bounds
//! - [`row`] - raw fixed-width lines and pre-split tuple rows
//! - [`field`] - positioned fields with optional transforms
//! - [`schema`] - `RowSchema`, the per-record-type parse and validate driver
//! - [`manager`] - schemas sharing one record-type token
//!
//! ## Usage
//!
//! ```rust
//! use tanf_processor::app::models::ParseContext;
//! use tanf_processor::app::services::error_generator::ErrorGenerator;
//! use tanf_processor::app::services::fixed_width::{Field, RawRow, RecordShape, Row, RowSchema};
//!
//! let schema = RowSchema::new("T1", RecordShape::Model("TANF_T1".to_string())).with_fields(vec![
//!     Field::alphanumeric("1", "RecordType", "Record Type", 0, 2),
//!     Field::numeric("4", "RPT_MONTH_YEAR", "Reporting Year and Month", 2, 8),
//! ]);
//! let row: Row = RawRow::new("T1202010", 2).into();
//! let generator = ErrorGenerator::new(uuid::Uuid::new_v4());
//!
//! let parsed = schema.parse_and_validate(&row, &ParseContext::default(), &generator);
//! assert!(parsed.is_valid);
//! ```

pub mod field;
pub mod manager;
pub mod position;
pub mod row;
pub mod schema;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use field::{Field, FieldKind, FieldTransform, TransformError};
pub use manager::SchemaManager;
pub use position::Position;
pub use row::{RawRow, Row, TupleRow};
pub use schema::{ParsedLine, PartialDupSkip, QuietPreparser, RecordShape, RowSchema};
