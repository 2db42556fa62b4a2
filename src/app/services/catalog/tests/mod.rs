//! Line fixtures for catalog layouts
//!
//! Builders here produce valid lines for every built-in layout. Other service
//! tests reuse them to assemble whole submissions.

use crate::app::models::{ParseContext, ProgramType, Section, Submission};
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::fixed_width::{RawRow, Row};
use uuid::Uuid;

mod resolve_tests;

/// Blank line of `width` with each `(start, text)` written in place
pub fn place(width: usize, parts: &[(usize, &str)]) -> String {
    let mut chars = vec![' '; width];
    for (start, text) in parts {
        for (offset, c) in text.chars().enumerate() {
            if let Some(slot) = chars.get_mut(start + offset) {
                *slot = c;
            }
        }
    }
    chars.into_iter().collect()
}

pub fn raw(text: &str, line_number: usize) -> Row {
    RawRow::new(text, line_number).into()
}

pub fn generator() -> ErrorGenerator {
    ErrorGenerator::new(Uuid::new_v4())
}

pub fn submission(program: ProgramType, section: Section) -> Submission {
    Submission::new(program, section, 2020, 4).unwrap()
}

/// Context for a 2020 Q4 state submission (California)
pub fn context(program: ProgramType, section: Section) -> ParseContext {
    ParseContext::for_submission(&submission(program, section)).with_state_fips(Some(6))
}

pub fn header_line(section: &str, program: &str, tribe: &str, encrypted: bool) -> String {
    let encryption = if encrypted { "E" } else { " " };
    format!("HEADER20204{}06{:>3}{}1{}D", section, tribe, program, encryption)
}

pub fn trailer_line(count: usize) -> String {
    format!("TRAILER{:07}         ", count)
}

pub fn family_line(prefix: &str, month: &str, case: &str) -> String {
    let token = format!("{}1", prefix);
    place(
        156,
        &[
            (0, token.as_str()),
            (2, month),
            (8, case),
            (19, "001"),
            (22, "01"),
            (24, "12345"),
            (29, "1"),
            (30, "1"),
            (31, "2"),
            (32, "03"),
            (34, "1"),
            (35, "2"),
            (36, "1"),
            (37, "2"),
            (38, "0000"),
            (42, "2"),
            (43, "0000"),
            (47, "0000"),
            (51, "0000"),
            (55, "0000"),
            (59, "000"),
        ],
    )
}

pub fn adult_line(prefix: &str, month: &str, case: &str, affiliation: &str, ssn: &str) -> String {
    let token = format!("{}2", prefix);
    place(
        156,
        &[
            (0, token.as_str()),
            (2, month),
            (8, case),
            (19, affiliation),
            (20, "2"),
            (21, "19800101"),
            (29, ssn),
            (44, "1"),
            (45, "22222"),
            (50, "1"),
            (51, "01"),
            (53, "2"),
            (54, "2"),
            (55, "12"),
            (57, "1"),
            (58, "1"),
            (59, "000"),
            (62, "00"),
            (64, "2"),
            (65, "1"),
            (66, "01"),
            (68, "01"),
        ],
    )
}

/// Child slice parts relative to the start of the slice
fn child_parts(affiliation: &'static str, ssn: &'static str) -> Vec<(usize, &'static str)> {
    vec![
        (0, affiliation),
        (1, "20150101"),
        (9, ssn),
        (24, "2"),
        (25, "2"),
        (26, "2"),
        (27, "04"),
        (29, "2"),
        (30, "01"),
        (32, "1"),
        (33, "0000"),
        (37, "0000"),
    ]
}

/// Child line holding one child, or two when `second_child` is set
pub fn child_line(prefix: &str, month: &str, case: &str, second_child: bool) -> String {
    let token = format!("{}3", prefix);
    let mut parts: Vec<(usize, &str)> = vec![(0, token.as_str()), (2, month), (8, case)];
    parts.extend(
        child_parts("1", "987654321")
            .into_iter()
            .map(|(offset, text)| (19 + offset, text)),
    );
    let width = if second_child {
        parts.extend(
            child_parts("2", "876543219")
                .into_iter()
                .map(|(offset, text)| (60 + offset, text)),
        );
        101
    } else {
        60
    };
    place(width, &parts)
}

pub fn closed_family_line(prefix: &str, month: &str, case: &str, closure_reason: &str) -> String {
    let token = format!("{}4", prefix);
    place(
        71,
        &[
            (0, token.as_str()),
            (2, month),
            (8, case),
            (19, "001"),
            (22, "01"),
            (24, "12345"),
            (29, "1"),
            (30, closure_reason),
            (32, "2"),
            (33, "1"),
            (34, "2"),
            (35, "2"),
        ],
    )
}

/// Values of a closed person line that case rules look at
#[derive(Debug, Clone)]
pub struct ClosedPerson {
    pub affiliation: &'static str,
    pub date_of_birth: &'static str,
    pub aabd: &'static str,
    pub ssi: &'static str,
    pub relationship: &'static str,
    pub federal_months: &'static str,
    pub employment: &'static str,
}

impl Default for ClosedPerson {
    fn default() -> Self {
        Self {
            affiliation: "1",
            date_of_birth: "19800101",
            aabd: "2",
            ssi: "1",
            relationship: "01",
            federal_months: "000",
            employment: "1",
        }
    }
}

pub fn closed_person_line(prefix: &str, month: &str, case: &str, person: &ClosedPerson) -> String {
    let token = format!("{}5", prefix);
    place(
        71,
        &[
            (0, token.as_str()),
            (2, month),
            (8, case),
            (19, person.affiliation),
            (20, person.date_of_birth),
            (28, "123456789"),
            (43, "1"),
            (44, person.aabd),
            (45, "2"),
            (46, person.ssi),
            (47, "1"),
            (48, person.relationship),
            (50, "2"),
            (51, "2"),
            (52, "12"),
            (54, "1"),
            (55, person.federal_months),
            (58, "00"),
            (60, person.employment),
            (61, "0000"),
            (65, "0000"),
        ],
    )
}

/// Aggregate line with the same counts in each month
pub fn aggregate_line(prefix: &str, quarter: &str, applications: &str, approved: &str, denied: &str) -> String {
    let token = format!("{}6", prefix);
    let mut parts: Vec<(usize, &str)> = vec![(0, token.as_str()), (2, quarter)];
    for month in 0..3 {
        parts.push((7 + month * 4, applications));
        parts.push((19 + month * 4, approved));
        parts.push((31 + month * 4, denied));
        parts.push((43 + month * 12, "000000001000"));
        parts.push((79 + month * 4, "0010"));
        parts.push((91 + month * 4, "0002"));
        parts.push((103 + month * 4, "0007"));
        parts.push((115 + month * 4, "0001"));
    }
    place(379, &parts)
}
