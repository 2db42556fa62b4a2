//! Leaf validators
//!
//! Each constructor returns a ready-to-use [`BoxedValidator`]. Numeric
//! options may be written as inclusive ranges (`"1-16"`), which expand
//! when the option set is built.

use super::base::{BoxedValidator, PredicateError, Validator};
use crate::app::models::{FieldValue, is_blank_text};
use chrono::{Datelike, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;

/// Set of accepted values parsed from option labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    labels: Vec<String>,
    numbers: Vec<RangeInclusive<i64>>,
    texts: Vec<String>,
}

impl OptionSet {
    pub fn parse(options: &[&str]) -> Self {
        let mut numbers = Vec::new();
        let mut texts = Vec::new();

        for option in options {
            if let Some(range) = parse_range(option) {
                numbers.push(range);
            } else if let Ok(n) = option.trim().parse::<i64>() {
                numbers.push(n..=n);
            } else {
                texts.push(option.to_string());
            }
        }

        Self {
            labels: options.iter().map(|o| o.to_string()).collect(),
            numbers,
            texts,
        }
    }

    pub fn contains(&self, value: &FieldValue) -> bool {
        if let Some(n) = value.as_i64() {
            if self.numbers.iter().any(|range| range.contains(&n)) {
                return true;
            }
        }
        let text = value.to_string();
        self.texts
            .iter()
            .any(|option| option == &text || option.trim() == text.trim())
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.labels.join(", "))
    }
}

/// `"1-16"` style inclusive ranges
fn parse_range(option: &str) -> Option<RangeInclusive<i64>> {
    let (low, high) = option.trim().split_once('-')?;
    let low: i64 = low.trim().parse().ok()?;
    let high: i64 = high.trim().parse().ok()?;
    (low <= high).then_some(low..=high)
}

fn numeric(value: &FieldValue) -> Result<i64, PredicateError> {
    value
        .as_i64()
        .ok_or_else(|| PredicateError::NotNumeric(value.to_string()))
}

/// Numbers compare numerically, anything else lexicographically
fn compare(value: &FieldValue, bound: &FieldValue) -> Result<Ordering, PredicateError> {
    match bound {
        FieldValue::Number(n) => Ok(numeric(value)?.cmp(n)),
        FieldValue::Text(s) => Ok(value.to_string().as_str().cmp(s.as_str())),
    }
}

/// Blank, `#` fill or `_` fill
fn is_empty_text(text: &str) -> bool {
    is_blank_text(text) || text.trim().chars().all(|c| c == '_')
}

fn char_slice(text: &str, start: usize, end: usize) -> Option<String> {
    if text.chars().count() < end {
        return None;
    }
    Some(text.chars().skip(start).take(end - start).collect())
}

fn digits(value: &FieldValue, start: usize, end: usize) -> Result<i64, PredicateError> {
    let text = value.to_string();
    let slice = char_slice(&text, start, end).ok_or_else(|| PredicateError::Malformed {
        value: text.clone(),
        reason: format!("shorter than {} characters", end),
    })?;
    if !slice.chars().all(|c| c.is_ascii_digit()) {
        return Err(PredicateError::NotNumeric(slice));
    }
    slice
        .parse()
        .map_err(|_| PredicateError::NotNumeric(slice.clone()))
}

// =============================================================================
// Equality and membership
// =============================================================================

pub fn is_equal(option: impl Into<FieldValue>) -> BoxedValidator {
    let option = option.into();
    let label = option.to_string();
    Validator::new(
        "is_equal",
        move |value, _| Ok(compare(value, &option)? == Ordering::Equal),
        move |args| format!("{} {} does not match {}", args.error_context(), args.value, label),
    )
    .boxed()
}

pub fn is_not_equal(option: impl Into<FieldValue>) -> BoxedValidator {
    let option = option.into();
    let label = option.to_string();
    Validator::new(
        "is_not_equal",
        move |value, _| Ok(compare(value, &option)? != Ordering::Equal),
        move |args| format!("{} {} matches {}", args.error_context(), args.value, label),
    )
    .boxed()
}

pub fn is_one_of(options: &[&str]) -> BoxedValidator {
    let set = OptionSet::parse(options);
    let label = set.to_string();
    Validator::new(
        "is_one_of",
        move |value, _| Ok(set.contains(value)),
        move |args| format!("{} {} is not in {}", args.error_context(), args.value, label),
    )
    .boxed()
}

pub fn is_not_one_of(options: &[&str]) -> BoxedValidator {
    let set = OptionSet::parse(options);
    let label = set.to_string();
    Validator::new(
        "is_not_one_of",
        move |value, _| Ok(!set.contains(value)),
        move |args| format!("{} {} is in {}", args.error_context(), args.value, label),
    )
    .boxed()
}

// =============================================================================
// Ordering
// =============================================================================

pub fn is_greater_than(bound: impl Into<FieldValue>, inclusive: bool) -> BoxedValidator {
    let bound = bound.into();
    let label = if inclusive {
        format!("larger than or equal to {}", bound)
    } else {
        format!("larger than {}", bound)
    };
    Validator::new(
        "is_greater_than",
        move |value, _| {
            let ordering = compare(value, &bound)?;
            Ok(ordering == Ordering::Greater || (inclusive && ordering == Ordering::Equal))
        },
        move |args| format!("{} {} is not {}", args.error_context(), args.value, label),
    )
    .boxed()
}

pub fn is_less_than(bound: impl Into<FieldValue>, inclusive: bool) -> BoxedValidator {
    let bound = bound.into();
    let label = if inclusive {
        format!("smaller than or equal to {}", bound)
    } else {
        format!("smaller than {}", bound)
    };
    Validator::new(
        "is_less_than",
        move |value, _| {
            let ordering = compare(value, &bound)?;
            Ok(ordering == Ordering::Less || (inclusive && ordering == Ordering::Equal))
        },
        move |args| format!("{} {} is not {}", args.error_context(), args.value, label),
    )
    .boxed()
}

pub fn is_between(
    min: impl Into<FieldValue>,
    max: impl Into<FieldValue>,
    inclusive: bool,
) -> BoxedValidator {
    let min = min.into();
    let max = max.into();
    let label = if inclusive {
        format!("[{}, {}]", min, max)
    } else {
        format!("({}, {})", min, max)
    };
    Validator::new(
        "is_between",
        move |value, _| {
            let low = compare(value, &min)?;
            let high = compare(value, &max)?;
            Ok(if inclusive {
                low != Ordering::Less && high != Ordering::Greater
            } else {
                low == Ordering::Greater && high == Ordering::Less
            })
        },
        move |args| {
            format!(
                "{} {} is not in range {}",
                args.error_context(),
                args.value,
                label
            )
        },
    )
    .boxed()
}

// =============================================================================
// Text shape
// =============================================================================

pub fn starts_with(prefix: &str) -> BoxedValidator {
    let prefix = prefix.to_string();
    let label = prefix.clone();
    Validator::new(
        "starts_with",
        move |value, _| Ok(value.to_string().starts_with(&prefix)),
        move |args| {
            format!(
                "{} {} does not start with {}",
                args.error_context(),
                args.value,
                label
            )
        },
    )
    .boxed()
}

pub fn contains(substring: &str) -> BoxedValidator {
    let substring = substring.to_string();
    let label = substring.clone();
    Validator::new(
        "contains",
        move |value, _| Ok(value.to_string().contains(&substring)),
        move |args| {
            format!(
                "{} {} does not contain {}",
                args.error_context(),
                args.value,
                label
            )
        },
    )
    .boxed()
}

pub fn is_number() -> BoxedValidator {
    Validator::new(
        "is_number",
        |value, _| {
            Ok(match value {
                FieldValue::Number(_) => true,
                FieldValue::Text(s) => {
                    let trimmed = s.trim();
                    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
                }
            })
        },
        |args| format!("{} {} is not a number", args.error_context(), args.value),
    )
    .boxed()
}

pub fn is_alphanumeric() -> BoxedValidator {
    Validator::new(
        "is_alphanumeric",
        |value, _| {
            let text = value.to_string();
            let trimmed = text.trim();
            Ok(!trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphanumeric()))
        },
        |args| format!("{} {} is not alphanumeric", args.error_context(), args.value),
    )
    .boxed()
}

pub fn is_blank() -> BoxedValidator {
    Validator::new(
        "is_blank",
        |value, _| Ok(value.to_string().trim().is_empty()),
        |args| format!("{} {} is not blank", args.error_context(), args.value),
    )
    .boxed()
}

/// Characters `start..end` of the value are blank or fill
pub fn is_empty(start: usize, end: usize) -> BoxedValidator {
    Validator::new(
        "is_empty",
        move |value, _| {
            Ok(char_slice(&value.to_string(), start, end)
                .map(|slice| is_empty_text(&slice))
                .unwrap_or(true))
        },
        move |args| {
            format!(
                "{} {} is not blank between positions {} and {}",
                args.error_context(),
                args.value,
                start,
                end
            )
        },
    )
    .boxed()
}

/// Characters `start..end` of the value hold data
pub fn is_not_empty(start: usize, end: usize) -> BoxedValidator {
    Validator::new(
        "is_not_empty",
        move |value, _| {
            Ok(char_slice(&value.to_string(), start, end)
                .map(|slice| !is_empty_text(&slice))
                .unwrap_or(false))
        },
        move |args| {
            format!(
                "{} {} contains blanks between positions {} and {}",
                args.error_context(),
                args.value,
                start,
                end
            )
        },
    )
    .boxed()
}

pub fn has_length(length: usize) -> BoxedValidator {
    Validator::new(
        "has_length",
        move |value, _| Ok(value.to_string().chars().count() == length),
        move |args| {
            format!(
                "{} field length is {} characters but must be {}",
                args.error_context(),
                args.value.to_string().chars().count(),
                length
            )
        },
    )
    .boxed()
}

pub fn has_length_between(min: usize, max: usize) -> BoxedValidator {
    Validator::new(
        "has_length_between",
        move |value, _| Ok((min..=max).contains(&value.to_string().chars().count())),
        move |args| {
            format!(
                "{} field length is {} characters but must be between {} and {}",
                args.error_context(),
                args.value.to_string().chars().count(),
                min,
                max
            )
        },
    )
    .boxed()
}

/// Exactly `length` digits, leading zeros included
pub fn int_has_length(length: usize) -> BoxedValidator {
    Validator::new(
        "int_has_length",
        move |value, _| {
            let text = value.to_string();
            let trimmed = text.trim();
            Ok(trimmed.len() == length && trimmed.chars().all(|c| c.is_ascii_digit()))
        },
        move |args| {
            format!(
                "{} {} does not have exactly {} digits",
                args.error_context(),
                args.value,
                length
            )
        },
    )
    .boxed()
}

pub fn is_not_zero() -> BoxedValidator {
    Validator::new(
        "is_not_zero",
        |value, _| Ok(numeric(value)? != 0),
        |args| format!("{} {} is zero", args.error_context(), args.value),
    )
    .boxed()
}

// =============================================================================
// Identity and dates
// =============================================================================

/// Rejects SSNs made of one repeated digit
pub fn validate_ssn() -> BoxedValidator {
    Validator::new(
        "validate_ssn",
        |value, _| {
            let text = value.to_string();
            let trimmed = text.trim();
            if trimmed.len() != 9 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
                return Ok(false);
            }
            let first = trimmed.chars().next();
            Ok(!trimmed.chars().all(|c| Some(c) == first))
        },
        |args| {
            format!(
                "{} {} is not a valid Social Security Number",
                args.error_context(),
                args.value
            )
        },
    )
    .boxed()
}

/// Birth year (first four digits) is at least `min_age` years before this year
pub fn is_older_than(min_age: i32) -> BoxedValidator {
    Validator::new(
        "is_older_than",
        move |value, _| {
            let year = digits(value, 0, 4)?;
            Ok(year <= i64::from(Utc::now().year() - min_age))
        },
        move |args| {
            let text = args.value.to_string();
            let year = char_slice(&text, 0, 4).unwrap_or(text);
            format!(
                "{} {} must be less than or equal to {} to meet the minimum age requirement",
                args.error_context(),
                year,
                Utc::now().year() - min_age
            )
        },
    )
    .boxed()
}

pub fn date_year_is_larger_than(year: i64) -> BoxedValidator {
    Validator::new(
        "date_year_is_larger_than",
        move |value, _| Ok(digits(value, 0, 4)? > year),
        move |args| {
            let text = args.value.to_string();
            let found = char_slice(&text, 0, 4).unwrap_or(text);
            format!(
                "{} Year {} must be larger than {}",
                args.error_context(),
                found,
                year
            )
        },
    )
    .boxed()
}

/// Month digits (positions 4..6) of a YYYYMM or YYYYMMDD value
pub fn date_month_is_valid() -> BoxedValidator {
    Validator::new(
        "date_month_is_valid",
        |value, _| Ok((1..=12).contains(&digits(value, 4, 6)?)),
        |args| {
            let text = args.value.to_string();
            let month = char_slice(&text, 4, 6).unwrap_or(text);
            format!("{} {} is not a valid month", args.error_context(), month)
        },
    )
    .boxed()
}

/// Day digits (positions 6..8) of a YYYYMMDD value fall in 1-31
pub fn date_day_is_valid() -> BoxedValidator {
    Validator::new(
        "date_day_is_valid",
        |value, _| Ok((1..=31).contains(&digits(value, 6, 8)?)),
        |args| {
            let text = args.value.to_string();
            let day = char_slice(&text, 6, 8).unwrap_or(text);
            format!("{} {} is not a valid day", args.error_context(), day)
        },
    )
    .boxed()
}

/// YYYYMM with a real month
pub fn year_month_is_valid() -> BoxedValidator {
    Validator::new(
        "year_month_is_valid",
        |value, _| {
            let text = value.to_string();
            let trimmed = text.trim();
            if trimmed.len() != 6 {
                return Ok(false);
            }
            Ok(digits(value, 0, 4)? > 1900 && (1..=12).contains(&digits(value, 4, 6)?))
        },
        |args| {
            format!(
                "{} The value: {}, does not follow the YYYYMM format for Reporting Year and Month",
                args.error_context(),
                args.value
            )
        },
    )
    .boxed()
}

/// YYYYQ with a quarter between 1 and 4
pub fn quarter_is_valid() -> BoxedValidator {
    Validator::new(
        "quarter_is_valid",
        |value, _| Ok((1..=4).contains(&digits(value, 4, 5)?)),
        |args| {
            let text = args.value.to_string();
            let quarter = char_slice(&text, 4, 5).unwrap_or(text);
            format!("{} {} is not a valid quarter", args.error_context(), quarter)
        },
    )
    .boxed()
}

/// YYYYMM falls inside the quarter of the submission being parsed
pub fn month_in_submission_quarter() -> BoxedValidator {
    Validator::new(
        "month_in_submission_quarter",
        |value, args| match &args.context.submission {
            Some(submission) => Ok(submission.contains_month(numeric(value)?)),
            None => Ok(true),
        },
        |args| match &args.context.submission {
            Some(submission) => format!(
                "{} {} is not within the submitted reporting year:{}, quarter:Q{}",
                args.error_context(),
                args.value,
                submission.year,
                submission.quarter
            ),
            None => format!("{} {} is outside the reporting quarter", args.error_context(), args.value),
        },
    )
    .boxed()
}
