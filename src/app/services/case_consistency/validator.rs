//! Case boundary state machine

use super::{active, closed};
use crate::app::models::{CaseKey, ParseContext, ParserError, ProgramType, Record, Section};
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::fixed_width::RowSchema;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, error};

/// Failure to evaluate a rule set over a case
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("Date of birth '{value}' on line {line_number} is not a YYYYMMDD date")]
    InvalidDateOfBirth { value: String, line_number: usize },

    #[error("Reporting month {rpt_month_year} is not a YYYYMM value")]
    InvalidReportingMonth { rpt_month_year: i64 },

    #[error("Record on line {line_number} has no {field}")]
    MissingField { field: String, line_number: usize },
}

/// A buffered record and the schema that produced it
#[derive(Debug, Clone)]
pub struct CaseEntry {
    pub record: Record,
    pub schema: Arc<RowSchema>,
}

impl CaseEntry {
    pub fn line_number(&self) -> usize {
        self.record
            .as_typed()
            .map(|typed| typed.line_number)
            .unwrap_or_default()
    }
}

/// A rule violation against one buffered record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub index: usize,
    pub message: String,
}

impl Finding {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

/// Records of one case number, indexed by reporting month and record type
#[derive(Debug, Clone, Default)]
pub struct CaseBuffer {
    case_number: Option<String>,
    entries: Vec<CaseEntry>,
    by_month: BTreeMap<i64, BTreeMap<String, Vec<usize>>>,
}

impl CaseBuffer {
    pub fn case_number(&self) -> Option<&str> {
        self.case_number.as_deref()
    }

    pub fn entries(&self) -> &[CaseEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, record: Record, schema: Arc<RowSchema>) {
        let index = self.entries.len();
        if let Some(month) = record.rpt_month_year() {
            self.by_month
                .entry(month)
                .or_default()
                .entry(schema.record_type().to_string())
                .or_default()
                .push(index);
        }
        if self.case_number.is_none() {
            self.case_number = record.case_number();
        }
        self.entries.push(CaseEntry { record, schema });
    }

    /// Reporting months present in the case, ascending
    pub fn months(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_month.keys().copied()
    }

    /// `(index, entry)` pairs of one record type in one month, in file order
    pub fn of_type(&self, month: i64, record_type: &str) -> Vec<(usize, &CaseEntry)> {
        self.by_month
            .get(&month)
            .and_then(|types| types.get(record_type))
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&index| self.entries.get(index).map(|entry| (index, entry)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Tier-4 validator for one submission
#[derive(Debug)]
pub struct CaseConsistencyValidator {
    program: ProgramType,
    section: Section,
    context: ParseContext,
    generator: ErrorGenerator,
    case: CaseBuffer,
    case_has_errors: bool,
    has_validated: bool,
    generated_errors: Vec<ParserError>,
    invalid_cases: BTreeSet<CaseKey>,
    pub total_cases_cached: usize,
    pub total_cases_validated: usize,
}

impl CaseConsistencyValidator {
    pub fn new(
        program: ProgramType,
        section: Section,
        context: ParseContext,
        generator: ErrorGenerator,
    ) -> Self {
        Self {
            program,
            section,
            context,
            generator,
            case: CaseBuffer::default(),
            case_has_errors: false,
            has_validated: false,
            generated_errors: Vec::new(),
            invalid_cases: BTreeSet::new(),
            total_cases_cached: 0,
            total_cases_validated: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.section.has_case_consistency()
    }

    /// Buffer a record, validating the previous case when the case number changes
    ///
    /// Returns the number of errors generated by that validation.
    pub fn add_record(
        &mut self,
        record: &Record,
        schema: &Arc<RowSchema>,
        had_lower_tier_errors: bool,
    ) -> usize {
        if !self.is_enabled() {
            return 0;
        }

        let mut generated = 0;
        let case_number = record.case_number();
        if !self.case.is_empty() && case_number.as_deref() != self.case.case_number() {
            generated = self.validate();
            self.clear();
        }

        self.case.push(record.clone(), Arc::clone(schema));
        self.case_has_errors |= had_lower_tier_errors;
        self.has_validated = false;
        generated
    }

    /// Run the section's rules over the buffered case
    ///
    /// Cases whose records already failed a lower tier are not checked.
    pub fn validate(&mut self) -> usize {
        if !self.is_enabled() || self.case.is_empty() || self.has_validated {
            return 0;
        }
        self.has_validated = true;
        self.total_cases_cached += 1;

        if self.case_has_errors {
            debug!(
                "Skipping case {:?}: records have lower tier errors",
                self.case.case_number()
            );
            return 0;
        }

        let result = match self.section {
            Section::Active => active::validate(&self.case, self.program),
            Section::Closed => closed::validate(&self.case, self.program, &self.context),
            _ => Ok(Vec::new()),
        };

        match result {
            Ok(findings) => {
                self.total_cases_validated += 1;
                let count = findings.len();
                for finding in findings {
                    self.commit(finding);
                }
                count
            }
            Err(e) => {
                error!(
                    "Case consistency validation failed for case {:?}: {}",
                    self.case.case_number(),
                    e
                );
                0
            }
        }
    }

    fn commit(&mut self, finding: Finding) {
        let Some(entry) = self.case.entries().get(finding.index) else {
            return;
        };
        if let Some(key) = entry.record.case_key() {
            self.invalid_cases.insert(key);
        }
        let error = self.generator.case_consistency(
            entry.line_number(),
            &entry.schema,
            &entry.record,
            finding.message,
        );
        self.generated_errors.push(error);
    }

    /// Forget the buffered case
    pub fn clear(&mut self) {
        self.case = CaseBuffer::default();
        self.case_has_errors = false;
        self.has_validated = false;
    }

    pub fn generated_errors(&self) -> &[ParserError] {
        &self.generated_errors
    }

    pub fn take_generated_errors(&mut self) -> Vec<ParserError> {
        std::mem::take(&mut self.generated_errors)
    }

    /// Cases (number and month) with at least one finding
    pub fn invalid_cases(&self) -> &BTreeSet<CaseKey> {
        &self.invalid_cases
    }
}
