//! Line level validators run before any field is parsed
//!
//! These receive the whole decoded line as a text value and report with the
//! record type only, since no field has been identified yet.

use super::base::{BoxedValidator, PredicateError, Validator};
use crate::app::models::{FieldValue, is_blank_text};

fn line_length(value: &FieldValue) -> usize {
    value.to_string().chars().count()
}

fn line_slice(value: &FieldValue, start: usize, end: usize) -> Option<String> {
    let text = value.to_string();
    if text.chars().count() < end {
        return None;
    }
    Some(text.chars().skip(start).take(end - start).collect())
}

fn slice_number(value: &FieldValue, start: usize, end: usize) -> Result<i64, PredicateError> {
    let slice = line_slice(value, start, end).ok_or_else(|| PredicateError::Malformed {
        value: value.to_string(),
        reason: format!("line is shorter than {} characters", end),
    })?;
    slice
        .trim()
        .parse()
        .map_err(|_| PredicateError::NotNumeric(slice.clone()))
}

pub fn record_has_length(length: usize) -> BoxedValidator {
    Validator::new(
        "record_has_length",
        move |value, _| Ok(line_length(value) == length),
        move |args| {
            format!(
                "{}: record length is {} characters but must be {}",
                args.record_type,
                line_length(args.value),
                length
            )
        },
    )
    .boxed()
}

pub fn record_has_length_between(min: usize, max: usize) -> BoxedValidator {
    Validator::new(
        "record_has_length_between",
        move |value, _| Ok((min..=max).contains(&line_length(value))),
        move |args| {
            format!(
                "{}: record length of {} characters is not in the range [{}, {}]",
                args.record_type,
                line_length(args.value),
                min,
                max
            )
        },
    )
    .boxed()
}

/// The case number slice holds data
pub fn case_number_not_empty(start: usize, end: usize) -> BoxedValidator {
    Validator::new(
        "case_number_not_empty",
        move |value, _| {
            Ok(line_slice(value, start, end)
                .map(|slice| !is_blank_text(&slice))
                .unwrap_or(false))
        },
        move |args| {
            format!(
                "{}: Case number cannot be blank between positions {} and {}",
                args.record_type, start, end
            )
        },
    )
    .boxed()
}

/// The slice holds data (used to detect an unused second person on a line)
pub fn slice_not_blank(start: usize, end: usize, label: &'static str) -> BoxedValidator {
    Validator::new(
        "slice_not_blank",
        move |value, _| {
            Ok(line_slice(value, start, end)
                .map(|slice| !is_blank_text(&slice))
                .unwrap_or(false))
        },
        move |args| format!("{}: {} is blank", args.record_type, label),
    )
    .boxed()
}

/// RPT_MONTH_YEAR slice is a YYYYMM value
pub fn rpt_month_year_is_valid(start: usize, end: usize) -> BoxedValidator {
    Validator::new(
        "rpt_month_year_is_valid",
        move |value, _| {
            let rpt_month_year = slice_number(value, start, end)?;
            Ok(rpt_month_year / 100 > 1900 && (1..=12).contains(&(rpt_month_year % 100)))
        },
        move |args| {
            format!(
                "{}: The value: {}, does not follow the YYYYMM format for Reporting Year and Month",
                args.record_type,
                line_slice(args.value, start, end).unwrap_or_default().trim()
            )
        },
    )
    .boxed()
}

/// RPT_MONTH_YEAR slice falls within the submission's year and quarter
pub fn rpt_month_year_in_file_quarter(start: usize, end: usize) -> BoxedValidator {
    Validator::new(
        "rpt_month_year_in_file_quarter",
        move |value, args| match &args.context.submission {
            Some(submission) => Ok(submission.contains_month(slice_number(value, start, end)?)),
            None => Ok(true),
        },
        move |args| {
            let found = line_slice(args.value, start, end).unwrap_or_default();
            match &args.context.submission {
                Some(submission) => format!(
                    "{}: Reporting month year {} does not match file reporting year:{}, quarter:Q{}",
                    args.record_type,
                    found.trim(),
                    submission.year,
                    submission.quarter
                ),
                None => format!(
                    "{}: Reporting month year {} is outside the reporting quarter",
                    args.record_type,
                    found.trim()
                ),
            }
        },
    )
    .boxed()
}
