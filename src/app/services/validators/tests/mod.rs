//! Test utilities for the validator library

use crate::app::models::{FieldValue, ParseContext, ProgramType, Section, Submission};
use crate::app::services::validators::{BoxedValidator, ValidationErrorArgs, ValidationResult};

// Test modules
mod combinators_tests;
mod predicates_tests;
mod preparsing_tests;

/// Run a value validator in the prefix register for record type `T1`
pub fn check(validator: &BoxedValidator, value: FieldValue) -> ValidationResult {
    check_in(validator, value, &ParseContext::default())
}

pub fn check_in(
    validator: &BoxedValidator,
    value: FieldValue,
    context: &ParseContext,
) -> ValidationResult {
    let args = ValidationErrorArgs::new(&value, "T1", "Disposition", "9", context);
    validator.validate(&args)
}

pub fn context_2020_q4() -> ParseContext {
    let submission = Submission::new(ProgramType::Tanf, Section::Active, 2020, 4).unwrap();
    ParseContext::for_submission(&submission)
}

pub fn text(value: &str) -> FieldValue {
    FieldValue::from(value)
}
