//! Tests for line level validators

use super::*;
use crate::app::services::validators::preparsing::*;

fn line(width: usize, content: &str) -> FieldValue {
    FieldValue::from(format!("{:<width$}", content, width = width))
}

#[test]
fn test_record_has_length() {
    let validator = record_has_length(23);

    assert!(check(&validator, line(23, "HEADER")).is_valid);
    let result = check(&validator, line(20, "HEADER"));
    assert_eq!(
        result.message.as_deref(),
        Some("T1: record length is 20 characters but must be 23.")
    );
}

#[test]
fn test_record_has_length_between() {
    let validator = record_has_length_between(60, 101);

    assert!(check(&validator, line(60, "T3")).is_valid);
    assert!(check(&validator, line(101, "T3")).is_valid);
    assert!(!check(&validator, line(102, "T3")).is_valid);
}

#[test]
fn test_case_number_not_empty() {
    let validator = case_number_not_empty(8, 19);

    assert!(check(&validator, line(30, "T1202010CASE")).is_valid);
    let result = check(&validator, line(30, "T1202010"));
    assert_eq!(
        result.message.as_deref(),
        Some("T1: Case number cannot be blank between positions 8 and 19.")
    );
}

#[test]
fn test_rpt_month_year_is_valid() {
    let validator = rpt_month_year_is_valid(2, 8);

    assert!(check(&validator, line(30, "T1202010")).is_valid);
    assert!(!check(&validator, line(30, "T1202013")).is_valid);
    assert!(!check(&validator, line(30, "T1ABCDEF")).is_valid);
}

#[test]
fn test_rpt_month_year_in_file_quarter() {
    let context = context_2020_q4();
    let validator = rpt_month_year_in_file_quarter(2, 8);

    assert!(check_in(&validator, line(30, "T1202012"), &context).is_valid);
    let result = check_in(&validator, line(30, "T1202101"), &context);
    assert_eq!(
        result.message.as_deref(),
        Some("T1: Reporting month year 202101 does not match file reporting year:2020, quarter:Q4.")
    );
}

#[test]
fn test_slice_not_blank() {
    let validator = slice_not_blank(60, 101, "second child");

    assert!(!check(&validator, line(101, "T3")).is_valid);
    assert!(!check(&validator, line(60, "T3")).is_valid);
    let mut content = " ".repeat(60);
    content.replace_range(0..2, "T3");
    content.push('1');
    assert!(check(&validator, line(101, &content)).is_valid);
}
