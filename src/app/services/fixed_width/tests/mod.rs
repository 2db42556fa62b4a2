//! Test fixtures for fixed-width parsing
//!
//! Builders for small schemas and padded lines shared by the field, row and
//! schema test modules.

use crate::app::models::{ParseContext, ProgramType, Section, Submission};
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::fixed_width::{Field, RawRow, RecordShape, Row, RowSchema};
use crate::app::services::validators::{predicates, preparsing};
use uuid::Uuid;


/// Pad a line with spaces to `width` characters
pub fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

pub fn raw(text: &str, line_number: usize) -> Row {
    RawRow::new(text, line_number).into()
}

pub fn generator() -> ErrorGenerator {
    ErrorGenerator::new(Uuid::new_v4())
}

/// Context bound to a TANF Active submission for 2020 Q4
pub fn active_context() -> ParseContext {
    let submission = Submission::new(ProgramType::Tanf, Section::Active, 2020, 4).unwrap();
    ParseContext::for_submission(&submission)
}

/// Small family-style schema: 30 characters, three data fields
pub fn family_schema() -> RowSchema {
    RowSchema::new("T1", RecordShape::Model("TANF_T1".to_string()))
        .with_preparsing_validators(vec![
            preparsing::record_has_length(30),
            preparsing::case_number_not_empty(8, 19),
        ])
        .with_fields(vec![
            Field::alphanumeric("1", "RecordType", "Record Type", 0, 2),
            Field::numeric("4", "RPT_MONTH_YEAR", "Reporting Year and Month", 2, 8),
            Field::alphanumeric("6", "CASE_NUMBER", "Case Number", 8, 19),
            Field::numeric("9", "DISPOSITION", "Disposition", 19, 20)
                .with_validators(vec![predicates::is_one_of(&["1", "2"])]),
            Field::numeric("10", "NBR_MONTHS", "Number of Months", 20, 23)
                .optional()
                .with_validators(vec![predicates::is_greater_than(0, false)]),
            Field::blank(23, 30),
        ])
        .with_partial_hash_fields(&["RecordType", "RPT_MONTH_YEAR", "CASE_NUMBER"])
}

/// `T1` + month + case + disposition + months, padded to 30
pub fn family_line(month: &str, case: &str, disposition: &str, months: &str) -> String {
    pad(
        &format!("T1{}{:<11}{}{:>3}", month, case, disposition, months),
        30,
    )
}
