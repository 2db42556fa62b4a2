//! Tests for leaf predicates

use super::*;
use crate::app::services::validators::OptionSet;
use crate::app::services::validators::predicates::*;

#[test]
fn test_option_set_expands_ranges() {
    let set = OptionSet::parse(&["1-3", "7", "X"]);

    assert!(set.contains(&FieldValue::Number(2)));
    assert!(set.contains(&FieldValue::Number(7)));
    assert!(set.contains(&text("X")));
    assert!(set.contains(&text("03")));
    assert!(!set.contains(&FieldValue::Number(4)));
    assert_eq!(set.to_string(), "[1-3, 7, X]");
}

#[test]
fn test_is_one_of_message() {
    let validator = is_one_of(&["1", "2"]);

    assert!(check(&validator, FieldValue::Number(1)).is_valid);
    let result = check(&validator, FieldValue::Number(3));
    assert!(!result.is_valid);
    assert_eq!(
        result.message.as_deref(),
        Some("T1 Item 9 (Disposition): 3 is not in [1, 2].")
    );
}

#[test]
fn test_is_not_one_of() {
    let validator = is_not_one_of(&["0"]);

    assert!(check(&validator, FieldValue::Number(5)).is_valid);
    assert!(!check(&validator, FieldValue::Number(0)).is_valid);
}

#[test]
fn test_equality_is_numeric_for_number_bounds() {
    assert!(check(&is_equal(1), text("01")).is_valid);
    assert!(!check(&is_equal(1), FieldValue::Number(2)).is_valid);
    assert!(check(&is_not_equal(1), FieldValue::Number(2)).is_valid);
    assert!(check(&is_equal("A"), text("A")).is_valid);
}

#[test]
fn test_non_numeric_comparison_degrades_to_failure() {
    let result = check(&is_greater_than(0, false), text("ABC"));

    assert!(!result.is_valid);
    assert_eq!(
        result.message.as_deref(),
        Some("T1 Item 9 (Disposition): ABC is not larger than 0.")
    );
}

#[test]
fn test_ordering_inclusivity() {
    assert!(check(&is_greater_than(5, true), FieldValue::Number(5)).is_valid);
    assert!(!check(&is_greater_than(5, false), FieldValue::Number(5)).is_valid);
    assert!(check(&is_less_than(5, false), FieldValue::Number(4)).is_valid);
    assert!(!check(&is_less_than(5, true), FieldValue::Number(6)).is_valid);
}

#[test]
fn test_is_between() {
    let inclusive = is_between(1, 10, true);
    let exclusive = is_between(1, 10, false);

    assert!(check(&inclusive, FieldValue::Number(1)).is_valid);
    assert!(!check(&exclusive, FieldValue::Number(1)).is_valid);
    assert!(check(&exclusive, FieldValue::Number(5)).is_valid);
    assert_eq!(
        check(&inclusive, FieldValue::Number(11)).message.as_deref(),
        Some("T1 Item 9 (Disposition): 11 is not in range [1, 10].")
    );
}

#[test]
fn test_text_shape_predicates() {
    assert!(check(&starts_with("T1"), text("T1202010")).is_valid);
    assert!(!check(&contains("99"), text("T1202010")).is_valid);
    assert!(check(&is_number(), text(" 42")).is_valid);
    assert!(!check(&is_number(), text("4A")).is_valid);
    assert!(check(&is_alphanumeric(), text("AB12")).is_valid);
    assert!(!check(&is_alphanumeric(), text("AB-12")).is_valid);
    assert!(check(&is_blank(), text("   ")).is_valid);
}

#[test]
fn test_empty_range_accepts_fill_characters() {
    let validator = is_empty(2, 5);

    assert!(check(&validator, text("AB   CD")).is_valid);
    assert!(check(&validator, text("AB###CD")).is_valid);
    assert!(check(&validator, text("AB___CD")).is_valid);
    assert!(!check(&validator, text("AB1__CD")).is_valid);
    assert!(check(&is_not_empty(2, 5), text("AB123CD")).is_valid);
}

#[test]
fn test_length_predicates() {
    assert!(check(&has_length(3), text("ABC")).is_valid);
    assert!(!check(&has_length_between(4, 6), text("ABC")).is_valid);
    assert!(check(&int_has_length(4), text("0042")).is_valid);
    assert!(!check(&int_has_length(4), text("42")).is_valid);
    assert!(!check(&is_not_zero(), FieldValue::Number(0)).is_valid);
}

#[test]
fn test_ssn_rejects_repeated_digits() {
    let validator = validate_ssn();

    assert!(check(&validator, text("123456789")).is_valid);
    assert!(!check(&validator, text("111111111")).is_valid);
    assert!(!check(&validator, text("12345")).is_valid);
}

#[test]
fn test_date_components() {
    assert!(check(&date_month_is_valid(), text("19991231")).is_valid);
    assert!(!check(&date_month_is_valid(), text("19991331")).is_valid);
    assert!(check(&date_day_is_valid(), text("20000229")).is_valid);
    assert!(!check(&date_day_is_valid(), text("19990200")).is_valid);
    assert!(!check(&date_day_is_valid(), text("19990132")).is_valid);
    assert!(check(&date_year_is_larger_than(1900), text("19800101")).is_valid);
    assert!(!check(&date_year_is_larger_than(1900), text("18990101")).is_valid);
}

#[test]
fn test_date_day_checks_range_not_calendar() {
    assert!(check(&date_day_is_valid(), text("20200431")).is_valid);
    assert!(check(&date_day_is_valid(), text("20200230")).is_valid);
    assert!(check(&date_day_is_valid(), text("20200131")).is_valid);
}

#[test]
fn test_is_older_than_uses_birth_year() {
    assert!(check(&is_older_than(18), text("19800101")).is_valid);
    assert!(!check(&is_older_than(18), text("99990101")).is_valid);
}

#[test]
fn test_year_month_and_quarter_formats() {
    assert!(check(&year_month_is_valid(), text("202010")).is_valid);
    assert!(!check(&year_month_is_valid(), text("202013")).is_valid);
    assert!(!check(&year_month_is_valid(), text("20201")).is_valid);
    assert!(check(&quarter_is_valid(), text("20204")).is_valid);
    assert!(!check(&quarter_is_valid(), text("20205")).is_valid);
}

#[test]
fn test_month_in_submission_quarter() {
    let context = context_2020_q4();
    let validator = month_in_submission_quarter();

    assert!(check_in(&validator, FieldValue::Number(202011), &context).is_valid);
    assert!(!check_in(&validator, FieldValue::Number(202009), &context).is_valid);
    // Without a bound submission there is nothing to compare against
    assert!(check(&validator, FieldValue::Number(202009)).is_valid);
}
