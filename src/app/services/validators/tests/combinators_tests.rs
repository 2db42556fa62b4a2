//! Tests for value and record combinators

use super::*;
use crate::app::models::{FieldAccess, ModelRecord, Record};
use crate::app::services::fixed_width::{Field, RecordShape, RowSchema};
use crate::app::services::validators::predicates::{is_blank, is_equal, is_greater_than, is_one_of};
use crate::app::services::validators::{
    and, field_check, if_then, or, or_priority, sum_is_equal, sum_is_larger,
};

fn family_schema() -> RowSchema {
    RowSchema::new("T1", RecordShape::Model("TANF_T1".to_string())).with_fields(vec![
        Field::numeric("9", "DISPOSITION", "Disposition", 30, 31),
        Field::numeric("21", "CASH_AMOUNT", "Cash Amount", 55, 59),
        Field::numeric("22", "NBR_MONTHS", "Number of Months", 59, 62),
        Field::numeric("14", "NUM_APPLICATIONS", "Number of Applications", 7, 11),
        Field::numeric("15", "NUM_APPROVED", "Number Approved", 11, 15),
        Field::numeric("16", "NUM_DENIED", "Number Denied", 15, 19),
    ])
}

fn record(values: &[(&str, i64)]) -> Record {
    let mut record = ModelRecord::new("TANF_T1", "T1", 1);
    for (name, value) in values {
        record.set_field(name, FieldValue::Number(*value));
    }
    Record::Typed(record)
}

#[test]
fn test_or_joins_inline_messages() {
    let validator = or(vec![is_one_of(&["1", "2"]), is_blank()]);

    assert!(check(&validator, FieldValue::Number(2)).is_valid);
    assert!(check(&validator, text(" ")).is_valid);
    let result = check(&validator, FieldValue::Number(3));
    assert_eq!(
        result.message.as_deref(),
        Some("T1: Item 9 (Disposition) 3 is not in [1, 2] or Item 9 (Disposition) 3 is not blank.")
    );
}

#[test]
fn test_and_reports_first_failure() {
    let validator = and(vec![is_greater_than(0, false), is_one_of(&["1", "2"])]);

    assert!(check(&validator, FieldValue::Number(1)).is_valid);
    assert_eq!(
        check(&validator, FieldValue::Number(0)).message.as_deref(),
        Some("T1 Item 9 (Disposition): 0 is not larger than 0.")
    );
    assert_eq!(
        check(&validator, FieldValue::Number(5)).message.as_deref(),
        Some("T1 Item 9 (Disposition): 5 is not in [1, 2].")
    );
}

#[test]
fn test_or_priority_short_circuits() {
    let validator = or_priority(vec![is_greater_than(10, false), is_one_of(&["1"])]);

    let result = check(&validator, FieldValue::Number(5));
    assert_eq!(
        result.message.as_deref(),
        Some("T1 Item 9 (Disposition): 5 is not larger than 10.")
    );
}

#[test]
fn test_if_then_vacuously_true_when_condition_fails() {
    let schema = family_schema();
    let validator = if_then(
        "CASH_AMOUNT",
        is_greater_than(0, false),
        "NBR_MONTHS",
        is_greater_than(0, false),
    );

    let result = validator.validate(
        &record(&[("CASH_AMOUNT", 0), ("NBR_MONTHS", 0)]),
        &schema,
        &ParseContext::default(),
    );

    assert!(result.is_valid);
    assert_eq!(result.fields, vec!["CASH_AMOUNT", "NBR_MONTHS"]);
}

#[test]
fn test_if_then_reports_both_fields() {
    let schema = family_schema();
    let validator = if_then(
        "CASH_AMOUNT",
        is_greater_than(0, false),
        "NBR_MONTHS",
        is_greater_than(0, false),
    );

    let result = validator.validate(
        &record(&[("CASH_AMOUNT", 250), ("NBR_MONTHS", 0)]),
        &schema,
        &ParseContext::default(),
    );

    assert!(!result.is_valid);
    assert_eq!(
        result.message.as_deref(),
        Some("T1: If Item 21 (Cash Amount) is 250, then Item 22 (Number of Months) 0 is not larger than 0.")
    );
    assert_eq!(result.fields, vec!["CASH_AMOUNT", "NBR_MONTHS"]);
}

#[test]
fn test_if_then_absent_result_is_checked_as_blank() {
    let schema = family_schema();
    let validator = if_then("DISPOSITION", is_equal(1), "NBR_MONTHS", is_greater_than(0, false));

    let result = validator.validate(&record(&[("DISPOSITION", 1)]), &schema, &ParseContext::default());

    assert!(!result.is_valid);
}

#[test]
fn test_sum_is_equal() {
    let schema = family_schema();
    let validator = sum_is_equal("NUM_APPLICATIONS", &["NUM_APPROVED", "NUM_DENIED"]);
    let context = ParseContext::default();

    let balanced = record(&[("NUM_APPLICATIONS", 10), ("NUM_APPROVED", 6), ("NUM_DENIED", 4)]);
    assert!(validator.validate(&balanced, &schema, &context).is_valid);

    let unbalanced = record(&[("NUM_APPLICATIONS", 10), ("NUM_APPROVED", 6)]);
    let result = validator.validate(&unbalanced, &schema, &context);
    assert!(!result.is_valid);
    assert_eq!(
        result.message.as_deref(),
        Some("T1: The sum of Item 15 (Number Approved), Item 16 (Number Denied) does not equal Item 14 (Number of Applications).")
    );
    assert_eq!(result.fields.len(), 3);
}

#[test]
fn test_sum_is_larger() {
    let schema = family_schema();
    let validator = sum_is_larger(&["CASH_AMOUNT", "NBR_MONTHS"], 0);
    let context = ParseContext::default();

    assert!(validator.validate(&record(&[("CASH_AMOUNT", 1)]), &schema, &context).is_valid);
    let result = validator.validate(&record(&[]), &schema, &context);
    assert!(!result.is_valid);
    assert_eq!(
        result.message.as_deref(),
        Some("T1: The sum of Item 21 (Cash Amount), Item 22 (Number of Months) is not larger than 0.")
    );
}

#[test]
fn test_field_check_skips_absent_values() {
    let schema = family_schema();
    let validator = field_check("DISPOSITION", is_one_of(&["1", "2"]));
    let context = ParseContext::default();

    assert!(validator.validate(&record(&[]), &schema, &context).is_valid);
    let result = validator.validate(&record(&[("DISPOSITION", 7)]), &schema, &context);
    assert_eq!(
        result.message.as_deref(),
        Some("T1 Item 9 (Disposition): 7 is not in [1, 2].")
    );
}
