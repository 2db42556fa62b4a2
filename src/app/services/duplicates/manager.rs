//! Routes parsed records to per-case duplicate detectors

use super::detector::CaseDuplicateDetector;
use super::precedence::ErrorLevel;
use crate::app::models::{ParserError, Record};
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::fixed_width::{Row, RowSchema};
use crate::constants::record_types::FRA_EXITER;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Bucket identity: one case in one reporting month
///
/// Exact-only record types use the empty key, giving one file-wide bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub case_number: Option<String>,
    pub rpt_month_year: Option<i64>,
}

impl BucketKey {
    fn for_record(record: &Record) -> Self {
        Self {
            case_number: record.case_number(),
            rpt_month_year: record.rpt_month_year(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DuplicateManager {
    detectors: BTreeMap<BucketKey, CaseDuplicateDetector>,
    ignore_precedence: bool,
    /// Physical line being fed and the bucket its first record chose
    current_line: Option<(usize, BucketKey)>,
}

impl DuplicateManager {
    pub fn new(ignore_precedence: bool) -> Self {
        Self {
            ignore_precedence,
            ..Default::default()
        }
    }

    /// Add a parsed record; the first record of each physical line is checked
    ///
    /// Sibling records from the same line join the bucket of the first one so
    /// a flagged line purges every record it produced.
    pub fn add_record(
        &mut self,
        record: &Record,
        schema: &RowSchema,
        row: &Row,
        generator: &ErrorGenerator,
    ) {
        let line_number = row.line_number();
        if let Some((current, key)) = &self.current_line
            && *current == line_number
        {
            if let Some(detector) = self.detectors.get_mut(key) {
                detector.register(line_number, record);
            }
            return;
        }

        let exact_only = schema.record_type() == FRA_EXITER;
        let key = if exact_only {
            BucketKey::default()
        } else {
            BucketKey::for_record(record)
        };
        let ignore_precedence = self.ignore_precedence;
        let detector = self
            .detectors
            .entry(key.clone())
            .or_insert_with(|| CaseDuplicateDetector::new(exact_only, ignore_precedence));
        detector.register(line_number, record);
        detector.check(record, schema, row, generator);
        self.current_line = Some((line_number, key));
    }

    /// Every finding kept by the buckets, in line order
    pub fn generated_errors(&self) -> Vec<ParserError> {
        let mut errors: Vec<ParserError> = self
            .detectors
            .values()
            .flat_map(|detector| detector.errors().iter().cloned())
            .collect();
        errors.sort_by_key(|error| error.row_number);
        errors
    }

    /// Ids of records on lines flagged at `level`, grouped by model
    pub fn records_to_remove(&self, level: ErrorLevel) -> BTreeMap<String, Vec<Uuid>> {
        let mut by_model: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
        for detector in self.detectors.values().filter(|d| d.should_remove()) {
            for (model, id) in detector.records_to_remove(level) {
                by_model.entry(model.clone()).or_default().push(*id);
            }
        }
        debug!(
            "{} {:?} records marked for removal",
            by_model.values().map(Vec::len).sum::<usize>(),
            level
        );
        by_model
    }

    pub fn bucket_count(&self) -> usize {
        self.detectors.len()
    }

    pub fn clear(&mut self) {
        self.detectors.clear();
        self.current_line = None;
    }
}
