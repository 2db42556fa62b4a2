//! Closed case rules: closures must be substantiated by the people on the case

use super::validator::{CaseBuffer, CaseEntry, ConsistencyError, Finding};
use crate::app::models::{FieldAccess, ParseContext, ProgramType};
use crate::app::services::catalog::tanf::record_type;
use crate::constants::case_codes::{
    AABD_TERRITORY_ONLY, AABD_VALID_CODES, ADULT_AGE, CLOSURE_EMPLOYMENT,
    CLOSURE_FEDERAL_TIME_LIMIT, EMPLOYED, FEDERAL_TIME_LIMIT_MONTHS, HEAD_OR_SPOUSE,
    PRIMARY_FAMILY_MEMBER, SSI_TERRITORY_CODE, SSI_VALID_CODES,
};
use chrono::{Datelike, NaiveDate};

pub fn validate(
    case: &CaseBuffer,
    program: ProgramType,
    context: &ParseContext,
) -> Result<Vec<Finding>, ConsistencyError> {
    let family = record_type(program, 4);
    let person = record_type(program, 5);
    let is_territory = context.is_territory();
    let mut findings = Vec::new();

    for month in case.months() {
        let heads = case.of_type(month, &family);
        let people = case.of_type(month, &person);

        for (index, _) in heads.iter().skip(1) {
            findings.push(Finding::new(
                *index,
                format!(
                    "There should only be one {} record per RPT_MONTH_YEAR and CASE_NUMBER.",
                    family
                ),
            ));
        }

        match heads.first() {
            None => {
                for (index, _) in &people {
                    findings.push(Finding::new(
                        *index,
                        format!(
                            "Every {} record should have at least one corresponding {} record \
                             with the same RPT_MONTH_YEAR and CASE_NUMBER.",
                            person, family
                        ),
                    ));
                }
            }
            Some((_, _)) if people.is_empty() => {
                for (index, _) in &heads {
                    findings.push(Finding::new(
                        *index,
                        format!(
                            "Every {} record should have at least one corresponding {} record \
                             with the same RPT_MONTH_YEAR and CASE_NUMBER.",
                            family, person
                        ),
                    ));
                }
            }
            Some((index, head)) => {
                if let Some(message) = check_closure_reason(head, &people, is_territory) {
                    findings.push(Finding::new(*index, message));
                }
            }
        }

        for (index, entry) in &people {
            for message in check_benefit_codes(entry, month, is_territory)? {
                findings.push(Finding::new(*index, message));
            }
        }
    }

    Ok(findings)
}

/// Employment and time-limit closures need a person that explains them
fn check_closure_reason(
    head: &CaseEntry,
    people: &[(usize, &CaseEntry)],
    is_territory: bool,
) -> Option<String> {
    let closure_reason = head.record.field_i64("CLOSURE_REASON")?;
    let sample = people.first().map(|(_, entry)| *entry)?;

    if closure_reason == CLOSURE_EMPLOYMENT {
        let employed = people
            .iter()
            .any(|(_, entry)| entry.record.field_i64("EMPLOYMENT_STATUS") == Some(EMPLOYED));
        if !employed {
            return Some(format!(
                "At least one person must have {} = {} in the same RPT_MONTH_YEAR \
                 since {} = {}.",
                label(sample, "EMPLOYMENT_STATUS"),
                EMPLOYED,
                label(head, "CLOSURE_REASON"),
                CLOSURE_EMPLOYMENT
            ));
        }
    }

    if closure_reason == CLOSURE_FEDERAL_TIME_LIMIT && !is_territory {
        let at_limit = people.iter().any(|(_, entry)| {
            let record = &entry.record;
            record
                .field_i64("RELATIONSHIP_HOH")
                .is_some_and(|code| HEAD_OR_SPOUSE.contains(&code))
                && record
                    .field_i64("COUNTABLE_MONTH_FED_TIME")
                    .is_some_and(|months| months >= FEDERAL_TIME_LIMIT_MONTHS)
        });
        if !at_limit {
            return Some(format!(
                "At least one person who is head-of-household or spouse of head-of-household \
                 on the case must have {} >= {} since {} = {}.",
                label(sample, "COUNTABLE_MONTH_FED_TIME"),
                FEDERAL_TIME_LIMIT_MONTHS,
                label(head, "CLOSURE_REASON"),
                CLOSURE_FEDERAL_TIME_LIMIT
            ));
        }
    }

    None
}

/// Disability and SSI codes must follow state or territory policy
fn check_benefit_codes(
    entry: &CaseEntry,
    month: i64,
    is_territory: bool,
) -> Result<Vec<String>, ConsistencyError> {
    let record = &entry.record;
    let aabd = record.field_i64("REC_AID_TOTALLY_DISABLED");
    let ssi = record.field_i64("REC_SSI");
    let affiliation = record.field_i64("FAMILY_AFFILIATION");
    let mut messages = Vec::new();

    if is_territory {
        if is_adult(entry, month)? && !aabd.is_some_and(|code| AABD_VALID_CODES.contains(&code)) {
            messages.push(format!(
                "{} must be one of {:?} for adults in a territory.",
                label(entry, "REC_AID_TOTALLY_DISABLED"),
                AABD_VALID_CODES
            ));
        }
        if ssi != Some(SSI_TERRITORY_CODE) {
            messages.push(format!(
                "{} must be {} in a territory.",
                label(entry, "REC_SSI"),
                SSI_TERRITORY_CODE
            ));
        }
    } else {
        if aabd == Some(AABD_TERRITORY_ONLY) {
            messages.push(format!(
                "{} cannot be {} for a state.",
                label(entry, "REC_AID_TOTALLY_DISABLED"),
                AABD_TERRITORY_ONLY
            ));
        }
        if affiliation == Some(PRIMARY_FAMILY_MEMBER)
            && !ssi.is_some_and(|code| SSI_VALID_CODES.contains(&code))
        {
            messages.push(format!(
                "{} must be one of {:?} for a primary family member in a state.",
                label(entry, "REC_SSI"),
                SSI_VALID_CODES
            ));
        }
    }

    Ok(messages)
}

/// Whether the person is an adult in the reporting month
fn is_adult(entry: &CaseEntry, month: i64) -> Result<bool, ConsistencyError> {
    let line_number = entry.line_number();
    let text = entry
        .record
        .field_text("DATE_OF_BIRTH")
        .ok_or_else(|| ConsistencyError::MissingField {
            field: "DATE_OF_BIRTH".to_string(),
            line_number,
        })?;
    let date_of_birth = NaiveDate::parse_from_str(text.trim(), "%Y%m%d").map_err(|_| {
        ConsistencyError::InvalidDateOfBirth {
            value: text.clone(),
            line_number,
        }
    })?;
    let reporting = i32::try_from(month / 100)
        .ok()
        .zip(u32::try_from(month % 100).ok())
        .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
        .ok_or(ConsistencyError::InvalidReportingMonth {
            rpt_month_year: month,
        })?;

    Ok(age_in_years(date_of_birth, reporting) >= i64::from(ADULT_AGE))
}

fn age_in_years(date_of_birth: NaiveDate, on: NaiveDate) -> i64 {
    let mut age = i64::from(on.year()) - i64::from(date_of_birth.year());
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

fn label(entry: &CaseEntry, name: &str) -> String {
    match entry.schema.get_field_by_name(name) {
        Some(field) => format!("Item {} ({})", field.item, field.friendly_name),
        None => name.to_string(),
    }
}
