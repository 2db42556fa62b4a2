//! Duplicate bookkeeping for one bucket of records

use super::precedence::{ErrorLevel, ErrorPrecedence};
use crate::app::models::{ParserError, Record};
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::fixed_width::{Row, RowSchema};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use uuid::Uuid;

/// Hashes, findings and record ids of one case bucket
#[derive(Debug, Clone)]
pub struct CaseDuplicateDetector {
    precedence: ErrorPrecedence,
    /// Only full-line duplicates are checked
    exact_only: bool,
    line_hashes: HashMap<u64, usize>,
    partial_hashes: HashMap<u64, usize>,
    /// Record ids per physical line, tagged with their model
    records: BTreeMap<usize, Vec<(String, Uuid)>>,
    /// Level each flagged line was reported at
    flagged_lines: BTreeMap<usize, ErrorLevel>,
    errors: Vec<ParserError>,
}

impl CaseDuplicateDetector {
    pub fn new(exact_only: bool, ignore_precedence: bool) -> Self {
        Self {
            precedence: ErrorPrecedence::new(ignore_precedence),
            exact_only,
            line_hashes: HashMap::new(),
            partial_hashes: HashMap::new(),
            records: BTreeMap::new(),
            flagged_lines: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Remember a persisted record produced from `line_number`
    pub fn register(&mut self, line_number: usize, record: &Record) {
        if let Some(typed) = record.as_typed() {
            self.records
                .entry(line_number)
                .or_default()
                .push((typed.model.clone(), typed.id));
        }
    }

    /// Check the first record of a physical line against everything seen before
    pub fn check(
        &mut self,
        record: &Record,
        schema: &RowSchema,
        row: &Row,
        generator: &ErrorGenerator,
    ) {
        let line_number = row.line_number();
        let (line_hash, partial_hash) = schema.generate_hashes(row, record);

        if let Some(&first) = self.line_hashes.get(&line_hash) {
            let message = format!(
                "Duplicate record detected with record type {} at line {}. \
                 Record is a duplicate of the record at line number {}.",
                schema.record_type(),
                line_number,
                first
            );
            let error = generator.case_consistency(line_number, schema, record, message);
            self.record_error(ErrorLevel::Duplicate, line_number, error);
            return;
        }
        self.line_hashes.insert(line_hash, line_number);

        if self.exact_only || schema.should_skip_partial_dup(record) {
            return;
        }
        let Some(partial_hash) = partial_hash else {
            return;
        };
        match self.partial_hashes.get(&partial_hash) {
            Some(&first) => {
                let message = format!(
                    "Partial duplicate record detected with record type {} at line {}. \
                     Record is a partial duplicate of the record at line number {}. \
                     Duplicated fields causing error: {}.",
                    schema.record_type(),
                    line_number,
                    first,
                    duplicated_fields(schema)
                );
                let error = generator.case_consistency(line_number, schema, record, message);
                self.record_error(ErrorLevel::PartialDuplicate, line_number, error);
            }
            None => {
                self.partial_hashes.insert(partial_hash, line_number);
            }
        }
    }

    fn record_error(&mut self, level: ErrorLevel, line_number: usize, error: ParserError) {
        debug!(
            "Line {} flagged as {:?} ({})",
            line_number, level, error.error_message
        );
        self.flagged_lines.insert(line_number, level);

        let (has_precedence, is_new_max) = self.precedence.has_precedence(level);
        if is_new_max {
            self.errors.clear();
        }
        if has_precedence {
            self.errors.push(error);
        }
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    /// Strictest level reported for this bucket
    pub fn worst_level(&self) -> ErrorLevel {
        self.flagged_lines
            .values()
            .copied()
            .min()
            .unwrap_or(ErrorLevel::None)
    }

    pub fn should_remove(&self) -> bool {
        self.worst_level() != ErrorLevel::None
    }

    /// Ids of every record produced from a line flagged at `level`
    pub fn records_to_remove(&self, level: ErrorLevel) -> impl Iterator<Item = &(String, Uuid)> {
        self.flagged_lines
            .iter()
            .filter(move |(_, flagged)| **flagged == level)
            .filter_map(|(line_number, _)| self.records.get(line_number))
            .flatten()
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}

/// `Item a (A), Item b (B), and Item c (C)` over the partial identity fields
fn duplicated_fields(schema: &RowSchema) -> String {
    let described: Vec<String> = schema
        .partial_hash_fields()
        .iter()
        .map(|name| match schema.get_field_by_name(name) {
            Some(field) => format!("Item {} ({})", field.item, field.friendly_name),
            None => name.clone(),
        })
        .collect();

    match described.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}
