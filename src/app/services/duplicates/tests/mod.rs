//! Fixtures for duplicate detection tests
//!
//! Lines come from the catalog fixtures and are parsed with the real catalog
//! schemas before being fed to a [`DuplicateManager`].

use crate::app::models::{ProgramType, Record, Section};
use crate::app::services::catalog::tests::{context, raw};
use crate::app::services::duplicates::DuplicateManager;
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::fixed_width::{Row, RowSchema, SchemaManager};

// Test modules
mod detector_tests;

/// Parse `line` with `schema` and add the record to `manager`
pub fn feed(
    manager: &mut DuplicateManager,
    schema: &RowSchema,
    line: &str,
    line_number: usize,
    generator: &ErrorGenerator,
) -> Record {
    let row = raw(line, line_number);
    feed_row(manager, schema, &row, ProgramType::Tanf, Section::Active, generator)
}

pub fn feed_row(
    manager: &mut DuplicateManager,
    schema: &RowSchema,
    row: &Row,
    program: ProgramType,
    section: Section,
    generator: &ErrorGenerator,
) -> Record {
    let parsed = schema.parse_and_validate(row, &context(program, section), generator);
    let record = parsed.record.expect("line should parse into a record");
    manager.add_record(&record, schema, row, generator);
    record
}

/// Feed every record a multi-schema line produces
pub fn feed_all(
    manager: &mut DuplicateManager,
    schemas: &SchemaManager,
    line: &str,
    line_number: usize,
    section: Section,
    generator: &ErrorGenerator,
) -> Vec<Record> {
    let row = raw(line, line_number);
    let context = context(ProgramType::Tanf, section);
    schemas
        .parse_and_validate(&row, &context, generator)
        .into_iter()
        .zip(schemas.schemas())
        .filter_map(|(parsed, schema)| {
            let record = parsed.record?;
            manager.add_record(&record, schema, &row, generator);
            Some(record)
        })
        .collect()
}

/// Copy of `line` with `text` written at `start`
pub fn replace_at(line: &str, start: usize, text: &str) -> String {
    let mut chars: Vec<char> = line.chars().collect();
    for (offset, c) in text.chars().enumerate() {
        chars[start + offset] = c;
    }
    chars.into_iter().collect()
}

pub fn record_id(record: &Record) -> uuid::Uuid {
    record.as_typed().expect("typed record").id
}
