//! Header and trailer schemas and the header cross-checks
//!
//! Both lines are parsed with the same schema machinery as data lines but
//! produce loose mappings that are inspected and then discarded.

use crate::app::models::{FieldAccess, ProgramType, Record, Section, Submission};
use crate::app::services::fixed_width::{Field, RecordShape, RowSchema};
use crate::app::services::validators::{predicates, preparsing};
use crate::constants::layout::{ENCRYPTED_INDICATOR, HEADER_LENGTH, TRAILER_LENGTH};
use crate::constants::record_types::{HEADER, TRAILER};

pub fn header_schema() -> RowSchema {
    RowSchema::new(HEADER, RecordShape::Mapping)
        .with_preparsing_validators(vec![preparsing::record_has_length(HEADER_LENGTH)])
        .with_fields(vec![
            Field::alphanumeric("2", "title", "Title", 0, 6)
                .with_validators(vec![predicates::is_equal(HEADER)]),
            Field::numeric("4", "year", "Year", 6, 10)
                .with_validators(vec![predicates::is_greater_than(1998, false)]),
            Field::numeric("5", "quarter", "Quarter", 10, 11)
                .with_validators(vec![predicates::is_one_of(&["1-4"])]),
            Field::alphanumeric("6", "type", "Type", 11, 12)
                .with_validators(vec![predicates::is_one_of(&["A", "C", "G", "S"])]),
            Field::numeric("1", "state_fips", "State FIPS", 12, 14)
                .optional()
                .with_validators(vec![predicates::is_between(0, 80, true)]),
            Field::numeric("3", "tribe_code", "Tribe Code", 14, 17)
                .optional()
                .with_validators(vec![predicates::is_between(0, 999, true)]),
            Field::alphanumeric("7", "program_type", "Program Type", 17, 20)
                .with_validators(vec![predicates::is_one_of(&["TAN", "SSP"])]),
            Field::numeric("8", "edit", "Edit Indicator", 20, 21)
                .with_validators(vec![predicates::is_one_of(&["1", "2"])]),
            Field::alphanumeric("9", "encryption", "Encryption Indicator", 21, 22)
                .optional()
                .with_validators(vec![predicates::is_equal(ENCRYPTED_INDICATOR)]),
            Field::alphanumeric("10", "update", "Update Indicator", 22, 23)
                .with_validators(vec![predicates::is_one_of(&["N", "D", "U"])]),
        ])
}

pub fn trailer_schema() -> RowSchema {
    RowSchema::new(TRAILER, RecordShape::Mapping)
        .with_preparsing_validators(vec![preparsing::record_has_length(TRAILER_LENGTH)])
        .with_fields(vec![
            Field::alphanumeric("1", "title", "Title", 0, 7)
                .with_validators(vec![predicates::is_equal(TRAILER)]),
            Field::numeric("2", "record_count", "Record Count", 7, 14)
                .with_validators(vec![predicates::is_greater_than(0, true)]),
            Field::blank(14, 23),
        ])
}

/// Submission facts read from a parsed header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub year: i64,
    pub quarter: i64,
    pub section_code: String,
    pub state_fips: Option<i64>,
    pub tribe_code: Option<i64>,
    pub program_type: String,
    pub is_encrypted: bool,
}

impl HeaderInfo {
    /// `None` when a mandatory header value is missing
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            year: record.field_i64("year")?,
            quarter: record.field_i64("quarter")?,
            section_code: record.field_text("type")?.trim().to_string(),
            state_fips: record.field_i64("state_fips"),
            tribe_code: record.field_i64("tribe_code").filter(|code| *code != 0),
            program_type: record.field_text("program_type")?.trim().to_string(),
            is_encrypted: record
                .field_text("encryption")
                .is_some_and(|indicator| indicator.trim() == ENCRYPTED_INDICATOR),
        })
    }

    pub fn section(&self) -> Option<Section> {
        Section::from_header_code(&self.section_code)
    }

    /// Tribe code, program type and FIPS code must describe the same submitter
    pub fn check_program(&self, submission: &Submission) -> Option<String> {
        if self.program_type != submission.program.header_code() {
            return Some(format!(
                "Submitted program type {} does not match file program type {}.",
                submission.program.header_code(),
                self.program_type
            ));
        }
        match (submission.program, self.tribe_code) {
            (ProgramType::TribalTanf, None) => {
                Some("Tribe Code is missing from a Tribal TANF file.".to_string())
            }
            (ProgramType::TribalTanf, Some(_)) => None,
            (_, Some(code)) => Some(format!(
                "Tribe Code ({}) inconsistency with Program Type ({}).",
                code, self.program_type
            )),
            (_, None) if self.state_fips.unwrap_or(0) == 0 => {
                Some("State FIPS code is missing from the header.".to_string())
            }
            (_, None) => None,
        }
    }

    /// Header section must match the section the file was submitted as
    pub fn check_section(&self, submission: &Submission) -> Option<String> {
        if self.section() == Some(submission.section) {
            return None;
        }
        Some(format!(
            "Data does not match the expected layout for {}.",
            submission.section.name()
        ))
    }

    /// Header year and quarter must match the submission
    pub fn check_reporting_period(&self, submission: &Submission) -> Option<String> {
        if self.year == i64::from(submission.year) && self.quarter == i64::from(submission.quarter)
        {
            return None;
        }
        Some(format!(
            "Submitted reporting year:{}, quarter:Q{} doesn't match file reporting year:{}, quarter:Q{}.",
            submission.year, submission.quarter, self.year, self.quarter
        ))
    }
}
