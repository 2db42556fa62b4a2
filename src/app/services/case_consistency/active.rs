//! Active case rules: every family record needs its members

use super::validator::{CaseBuffer, CaseEntry, ConsistencyError, Finding};
use crate::app::models::{FieldAccess, ProgramType};
use crate::app::services::catalog::tanf::record_type;
use crate::constants::case_codes::PRIMARY_FAMILY_MEMBER;

pub fn validate(case: &CaseBuffer, program: ProgramType) -> Result<Vec<Finding>, ConsistencyError> {
    let family = record_type(program, 1);
    let adult = record_type(program, 2);
    let child = record_type(program, 3);
    let mut findings = Vec::new();

    for month in case.months() {
        let heads = case.of_type(month, &family);
        let members: Vec<(usize, &CaseEntry)> = case
            .of_type(month, &adult)
            .into_iter()
            .chain(case.of_type(month, &child))
            .collect();

        for (index, _) in heads.iter().skip(1) {
            findings.push(Finding::new(
                *index,
                format!(
                    "There should only be one {} record per RPT_MONTH_YEAR and CASE_NUMBER.",
                    family
                ),
            ));
        }

        if heads.is_empty() {
            for (index, entry) in &members {
                findings.push(Finding::new(
                    *index,
                    format!(
                        "Every {} record should have at least one corresponding {} record \
                         with the same RPT_MONTH_YEAR and CASE_NUMBER.",
                        entry.schema.record_type(),
                        family
                    ),
                ));
            }
            continue;
        }

        let missing = format!(
            "Every {} record should have at least one corresponding {} or {} record \
             with the same RPT_MONTH_YEAR and CASE_NUMBER",
            family, adult, child
        );
        let message = if members.is_empty() {
            format!("{}.", missing)
        } else if !members.iter().any(|(_, entry)| is_primary_member(entry)) {
            format!("{}, where FAMILY_AFFILIATION==1.", missing)
        } else {
            continue;
        };
        for (index, _) in &heads {
            findings.push(Finding::new(*index, message.clone()));
        }
    }

    Ok(findings)
}

fn is_primary_member(entry: &CaseEntry) -> bool {
    entry.record.field_i64("FAMILY_AFFILIATION") == Some(PRIMARY_FAMILY_MEMBER)
}
