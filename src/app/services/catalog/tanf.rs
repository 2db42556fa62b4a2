//! Case-level layouts shared by TANF, Tribal TANF and SSP-MOE
//!
//! The three programs use the same byte layouts; only the record-type prefix
//! (`T` or `M`) and the persisted model names differ.

use super::transforms::{decrypt, quarter_month};
use crate::app::models::ProgramType;
use crate::app::services::fixed_width::{
    Field, PartialDupSkip, Position, QuietPreparser, RecordShape, Row, RowSchema, SchemaManager,
};
use crate::app::services::validators::{
    BoxedValidator, if_then, or_priority, predicates, preparsing, sum_is_equal,
};
use crate::constants::case_codes::PRIMARY_FAMILY_MEMBER;
use crate::constants::layout::{CASE_NUMBER_RANGE, RPT_MONTH_YEAR_RANGE};

/// Width of one child slice on a child line
const CHILD_WIDTH: usize = 41;
const CHILD_START: usize = 19;
const FAMILY_LENGTH: usize = 156;
const CLOSED_LENGTH: usize = 71;
const AGGREGATE_LENGTH: usize = 379;

/// Identity fields of family-level records
const FAMILY_IDENTITY: &[&str] = &["RecordType", "RPT_MONTH_YEAR", "CASE_NUMBER"];

/// Identity fields of person-level records
const PERSON_IDENTITY: &[&str] = &[
    "RecordType",
    "RPT_MONTH_YEAR",
    "CASE_NUMBER",
    "FAMILY_AFFILIATION",
    "DATE_OF_BIRTH",
    "SSN",
];

/// Record-type token for the nth record of a program (`T1`, `M4`, ...)
pub fn record_type(program: ProgramType, number: u8) -> String {
    format!("{}{}", program.record_prefix(), number)
}

fn model(program: ProgramType, record_type: &str) -> RecordShape {
    RecordShape::Model(format!("{}_{}", program.model_prefix(), record_type))
}

fn numeric(
    item: &str,
    name: &str,
    friendly_name: &str,
    start: usize,
    end: usize,
    validators: Vec<BoxedValidator>,
) -> Field {
    Field::numeric(item, name, friendly_name, start, end).with_validators(validators)
}

fn text(
    item: &str,
    name: &str,
    friendly_name: &str,
    start: usize,
    end: usize,
    validators: Vec<BoxedValidator>,
) -> Field {
    Field::alphanumeric(item, name, friendly_name, start, end).with_validators(validators)
}

/// Record type, reporting month and case number lead every case-level line
fn case_key_fields() -> Vec<Field> {
    let (rpt_start, rpt_end) = RPT_MONTH_YEAR_RANGE;
    let (case_start, case_end) = CASE_NUMBER_RANGE;
    vec![
        text("0", "RecordType", "Record Type", 0, 2, vec![]),
        numeric(
            "4",
            "RPT_MONTH_YEAR",
            "Reporting Year and Month",
            rpt_start,
            rpt_end,
            vec![predicates::year_month_is_valid()],
        ),
        text(
            "6",
            "CASE_NUMBER",
            "Case Number",
            case_start,
            case_end,
            vec![predicates::is_alphanumeric()],
        ),
    ]
}

/// Line checks shared by case-level records
fn case_preparsing(length: BoxedValidator) -> Vec<BoxedValidator> {
    let (rpt_start, rpt_end) = RPT_MONTH_YEAR_RANGE;
    let (case_start, case_end) = CASE_NUMBER_RANGE;
    vec![
        length,
        preparsing::case_number_not_empty(case_start, case_end),
        or_priority(vec![
            preparsing::rpt_month_year_is_valid(rpt_start, rpt_end),
            preparsing::rpt_month_year_in_file_quarter(rpt_start, rpt_end),
        ]),
    ]
}

fn yes_no() -> Vec<BoxedValidator> {
    vec![predicates::is_one_of(&["1", "2"])]
}

fn non_negative() -> Vec<BoxedValidator> {
    vec![predicates::is_greater_than(0, true)]
}

fn date_of_birth() -> Vec<BoxedValidator> {
    vec![
        predicates::date_year_is_larger_than(1900),
        predicates::date_month_is_valid(),
        predicates::date_day_is_valid(),
    ]
}

fn education_level() -> Vec<BoxedValidator> {
    vec![predicates::is_one_of(&["1-16", "98", "99"])]
}

/// Active family record (x1)
pub fn family(program: ProgramType) -> RowSchema {
    let rt = record_type(program, 1);
    let mut fields = case_key_fields();
    fields.extend([
        text("2", "COUNTY_FIPS_CODE", "County FIPS Code", 19, 22, vec![predicates::is_number()]),
        text("5", "STRATUM", "Stratum", 22, 24, vec![predicates::is_number()]).optional(),
        text("7", "ZIP_CODE", "ZIP Code", 24, 29, vec![predicates::is_number()]),
        numeric("8", "FUNDING_STREAM", "Funding Stream", 29, 30, yes_no()),
        numeric("9", "DISPOSITION", "Disposition", 30, 31, yes_no()),
        numeric("10", "NEW_APPLICANT", "New Applicant", 31, 32, yes_no()),
        numeric(
            "11",
            "NBR_FAMILY_MEMBERS",
            "Number of Family Members",
            32,
            34,
            vec![predicates::is_between(1, 99, true)],
        ),
        numeric(
            "12",
            "FAMILY_TYPE",
            "Family Type for Work Participation",
            34,
            35,
            vec![predicates::is_one_of(&["1-3"])],
        ),
        numeric(
            "13",
            "RECEIVES_SUB_HOUSING",
            "Receives Subsidized Housing",
            35,
            36,
            vec![predicates::is_one_of(&["1-3"])],
        )
        .optional(),
        numeric("14", "RECEIVES_MED_ASSISTANCE", "Receives Medical Assistance", 36, 37, yes_no())
            .optional(),
        numeric("15", "RECEIVES_FOOD_STAMPS", "Receives SNAP Assistance", 37, 38, yes_no())
            .optional(),
        numeric(
            "16",
            "AMT_FOOD_STAMP_ASSISTANCE",
            "Amount of SNAP Assistance",
            38,
            42,
            non_negative(),
        )
        .optional(),
        numeric(
            "17",
            "RECEIVES_SUB_CC",
            "Receives Subsidized Child Care",
            42,
            43,
            vec![predicates::is_one_of(&["1-3"])],
        )
        .optional(),
        numeric("18", "AMT_SUB_CC", "Amount of Subsidized Child Care", 43, 47, non_negative())
            .optional(),
        numeric("19", "CHILD_SUPPORT_AMT", "Amount of Child Support", 47, 51, non_negative())
            .optional(),
        numeric("20", "FAMILY_CASH_RESOURCES", "Amount of Family Cash Resources", 51, 55, non_negative())
            .optional(),
        numeric("21A", "CASH_AMOUNT", "Cash Amount", 55, 59, non_negative()).optional(),
        numeric("21B", "NBR_MONTHS", "Cash Number of Months", 59, 62, non_negative()).optional(),
        Field::blank(62, FAMILY_LENGTH),
    ]);

    RowSchema::new(rt.as_str(), model(program, &rt))
        .with_preparsing_validators(case_preparsing(preparsing::record_has_length(FAMILY_LENGTH)))
        .with_fields(fields)
        .with_postparsing_validators(vec![
            if_then(
                "CASH_AMOUNT",
                predicates::is_greater_than(0, false),
                "NBR_MONTHS",
                predicates::is_greater_than(0, false),
            ),
            if_then(
                "RECEIVES_FOOD_STAMPS",
                predicates::is_equal(1),
                "AMT_FOOD_STAMP_ASSISTANCE",
                predicates::is_greater_than(0, false),
            ),
            if_then(
                "RECEIVES_SUB_CC",
                predicates::is_equal(1),
                "AMT_SUB_CC",
                predicates::is_greater_than(0, false),
            ),
        ])
        .with_partial_hash_fields(FAMILY_IDENTITY)
}

/// Active adult record (x2)
pub fn adult(program: ProgramType) -> RowSchema {
    let rt = record_type(program, 2);
    let mut fields = case_key_fields();
    fields.extend([
        numeric(
            "30",
            "FAMILY_AFFILIATION",
            "Family Affiliation",
            19,
            20,
            vec![predicates::is_one_of(&["1-5"])],
        ),
        numeric("31", "NONCUSTODIAL_PARENT", "Noncustodial Parent", 20, 21, yes_no()).optional(),
        text("32", "DATE_OF_BIRTH", "Date of Birth", 21, 29, date_of_birth()).with_transform(decrypt),
        text("33", "SSN", "Social Security Number", 29, 38, vec![predicates::is_number()])
            .with_transform(decrypt),
        text("34", "RACE", "Race and Ethnicity", 38, 44, vec![]).optional(),
        numeric("35", "GENDER", "Gender", 44, 45, vec![predicates::is_one_of(&["1", "2", "9"])]),
        numeric("36A", "FED_OASDI_PROGRAM", "Receives Federal OASDI", 45, 46, yes_no()).optional(),
        numeric("36B", "FED_DISABILITY_STATUS", "Federal Disability Status", 46, 47, yes_no())
            .optional(),
        numeric("36C", "DISABLED_TITLE_XIVAPDT", "Receives Aid to the Disabled", 47, 48, yes_no())
            .optional(),
        numeric("36D", "AID_AGED_BLIND", "Receives Aid to the Aged and Blind", 48, 49, yes_no())
            .optional(),
        numeric("36E", "RECEIVE_SSI", "Receives SSI", 49, 50, yes_no()).optional(),
        numeric(
            "37",
            "MARITAL_STATUS",
            "Marital Status",
            50,
            51,
            vec![predicates::is_one_of(&["1-5"])],
        )
        .optional(),
        numeric(
            "38",
            "RELATIONSHIP_HOH",
            "Relationship to Head of Household",
            51,
            53,
            vec![predicates::is_between(1, 10, true)],
        ),
        numeric(
            "39",
            "PARENT_MINOR_CHILD",
            "Parent with Minor Child",
            53,
            54,
            vec![predicates::is_one_of(&["1-3"])],
        )
        .optional(),
        numeric("40", "NEEDS_PREGNANT_WOMAN", "Needs of a Pregnant Woman", 54, 55, yes_no())
            .optional(),
        numeric("41", "EDUCATION_LEVEL", "Educational Level", 55, 57, education_level()),
        numeric(
            "42",
            "CITIZENSHIP_STATUS",
            "Citizenship Status",
            57,
            58,
            vec![predicates::is_one_of(&["1", "2", "9"])],
        ),
        numeric(
            "43",
            "COOPERATION_CHILD_SUPPORT",
            "Cooperation with Child Support",
            58,
            59,
            vec![predicates::is_one_of(&["1", "2", "9"])],
        )
        .optional(),
        numeric("44", "MONTHS_FED_TIME_LIMIT", "Months Countable Toward Federal Time Limit", 59, 62, non_negative())
            .optional(),
        numeric("45", "MONTHS_STATE_TIME_LIMIT", "Months Countable Toward State Time Limit", 62, 64, non_negative())
            .optional(),
        numeric("46", "CURRENT_MONTH_STATE_EXEMPT", "Current Month State Exempt", 64, 65, yes_no())
            .optional(),
        numeric(
            "47",
            "EMPLOYMENT_STATUS",
            "Employment Status",
            65,
            66,
            vec![predicates::is_one_of(&["1-3"])],
        ),
        numeric(
            "48",
            "WORK_ELIGIBLE_INDICATOR",
            "Work Eligible Individual Indicator",
            66,
            68,
            vec![predicates::is_one_of(&["1-9", "12"])],
        ),
        numeric(
            "49",
            "WORK_PART_STATUS",
            "Work Participation Status",
            68,
            70,
            vec![predicates::is_one_of(&["1-3", "5", "7", "9", "11-19", "99"])],
        )
        .optional(),
        Field::blank(70, FAMILY_LENGTH),
    ]);

    RowSchema::new(rt.as_str(), model(program, &rt))
        .with_preparsing_validators(case_preparsing(preparsing::record_has_length(FAMILY_LENGTH)))
        .with_fields(fields)
        .with_postparsing_validators(vec![
            if_then(
                "FAMILY_AFFILIATION",
                predicates::is_equal(PRIMARY_FAMILY_MEMBER),
                "SSN",
                predicates::validate_ssn(),
            ),
            if_then(
                "FAMILY_AFFILIATION",
                predicates::is_one_of(&["1-3"]),
                "CITIZENSHIP_STATUS",
                predicates::is_one_of(&["1", "2"]),
            ),
        ])
        .with_partial_hash_fields(PERSON_IDENTITY)
        .with_partial_dup_skip(PartialDupSkip::new("FAMILY_AFFILIATION", &[3, 5]))
}

/// Fields of one child slice starting `offset` characters after the first child
fn child_fields(offset: usize) -> Vec<Field> {
    let at = |start: usize| start + offset;
    let mut fields = case_key_fields();
    fields.extend([
        numeric(
            "67",
            "FAMILY_AFFILIATION",
            "Family Affiliation",
            at(19),
            at(20),
            vec![predicates::is_one_of(&["1", "2", "4", "5"])],
        ),
        text("68", "DATE_OF_BIRTH", "Date of Birth", at(20), at(28), date_of_birth())
            .with_transform(decrypt),
        text("69", "SSN", "Social Security Number", at(28), at(37), vec![predicates::is_number()])
            .with_transform(decrypt),
        text("70", "RACE", "Race and Ethnicity", at(37), at(43), vec![]).optional(),
        numeric(
            "71",
            "GENDER",
            "Gender",
            at(43),
            at(44),
            vec![predicates::is_one_of(&["1", "2", "9"])],
        ),
        numeric("72A", "RECEIVE_NONSSA_BENEFITS", "Receives Non-SSA Disability Benefits", at(44), at(45), yes_no())
            .optional(),
        numeric("72B", "RECEIVE_SSI", "Receives SSI", at(45), at(46), yes_no()).optional(),
        numeric(
            "73",
            "RELATIONSHIP_HOH",
            "Relationship to Head of Household",
            at(46),
            at(48),
            vec![predicates::is_between(1, 10, true)],
        ),
        numeric(
            "74",
            "PARENT_MINOR_CHILD",
            "Parent with Minor Child",
            at(48),
            at(49),
            vec![predicates::is_one_of(&["1-3"])],
        )
        .optional(),
        numeric("75", "EDUCATION_LEVEL", "Educational Level", at(49), at(51), education_level()),
        numeric(
            "76",
            "CITIZENSHIP_STATUS",
            "Citizenship Status",
            at(51),
            at(52),
            vec![predicates::is_one_of(&["1", "2", "9"])],
        )
        .optional(),
        numeric("77A", "UNEARNED_SSI", "Amount of Unearned SSI", at(52), at(56), non_negative())
            .optional(),
        numeric("77B", "OTHER_UNEARNED_INCOME", "Amount of Other Unearned Income", at(56), at(60), non_negative())
            .optional(),
    ]);
    fields
}

fn child(program: ProgramType, offset: usize) -> RowSchema {
    let rt = record_type(program, 3);
    RowSchema::new(rt.as_str(), model(program, &rt))
        .with_preparsing_validators(case_preparsing(preparsing::record_has_length_between(
            CHILD_START + CHILD_WIDTH,
            CHILD_START + 2 * CHILD_WIDTH,
        )))
        .with_fields(child_fields(offset))
        .with_postparsing_validators(vec![if_then(
            "FAMILY_AFFILIATION",
            predicates::is_equal(PRIMARY_FAMILY_MEMBER),
            "CITIZENSHIP_STATUS",
            predicates::is_one_of(&["1", "2"]),
        )])
        .with_partial_hash_fields(PERSON_IDENTITY)
        .with_partial_dup_skip(PartialDupSkip::new("FAMILY_AFFILIATION", &[2, 4, 5]))
}

/// Whether the second child slice of a child line is unused
fn second_child_absent(row: &Row) -> bool {
    let start = CHILD_START + CHILD_WIDTH;
    let end = start + CHILD_WIDTH;
    row.len() < end
        || row
            .slice(Position::new(start, end))
            .is_none_or(|slice| slice.trim().is_empty())
}

/// Active child line (x3): two children per line, the second optional
pub fn children(program: ProgramType) -> SchemaManager {
    let first = child(program, 0);
    let start = CHILD_START + CHILD_WIDTH;
    let second = child(program, CHILD_WIDTH);
    let mut second_preparsing = case_preparsing(preparsing::record_has_length_between(
        CHILD_START + CHILD_WIDTH,
        CHILD_START + 2 * CHILD_WIDTH,
    ));
    second_preparsing.push(preparsing::slice_not_blank(start, start + CHILD_WIDTH, "Child 2"));
    let second = second
        .with_preparsing_validators(second_preparsing)
        .with_quiet_preparser_errors(QuietPreparser::when(second_child_absent));

    SchemaManager::new(vec![first, second])
}

/// Closed family record (x4)
pub fn closed_family(program: ProgramType) -> RowSchema {
    let rt = record_type(program, 4);
    let mut fields = case_key_fields();
    fields.extend([
        text("2", "COUNTY_FIPS_CODE", "County FIPS Code", 19, 22, vec![predicates::is_number()]),
        text("5", "STRATUM", "Stratum", 22, 24, vec![predicates::is_number()]).optional(),
        text("7", "ZIP_CODE", "ZIP Code", 24, 29, vec![predicates::is_number()]),
        numeric("8", "DISPOSITION", "Disposition", 29, 30, yes_no()),
        numeric(
            "9",
            "CLOSURE_REASON",
            "Reason for Closure",
            30,
            32,
            vec![predicates::is_one_of(&["1-19", "99"])],
        ),
        numeric(
            "10",
            "REC_SUB_HOUSING",
            "Receives Subsidized Housing",
            32,
            33,
            vec![predicates::is_one_of(&["1-3"])],
        )
        .optional(),
        numeric("11", "REC_MED_ASSIST", "Receives Medical Assistance", 33, 34, yes_no()).optional(),
        numeric("12", "REC_FOOD_STAMPS", "Receives SNAP Assistance", 34, 35, yes_no()).optional(),
        numeric(
            "13",
            "REC_SUB_CC",
            "Receives Subsidized Child Care",
            35,
            36,
            vec![predicates::is_one_of(&["1-3"])],
        )
        .optional(),
        Field::blank(36, CLOSED_LENGTH),
    ]);

    RowSchema::new(rt.as_str(), model(program, &rt))
        .with_preparsing_validators(case_preparsing(preparsing::record_has_length(CLOSED_LENGTH)))
        .with_fields(fields)
        .with_partial_hash_fields(FAMILY_IDENTITY)
}

/// Closed person record (x5)
pub fn closed_person(program: ProgramType) -> RowSchema {
    let rt = record_type(program, 5);
    let mut fields = case_key_fields();
    fields.extend([
        numeric(
            "14",
            "FAMILY_AFFILIATION",
            "Family Affiliation",
            19,
            20,
            vec![predicates::is_one_of(&["1-5"])],
        ),
        text("15", "DATE_OF_BIRTH", "Date of Birth", 20, 28, date_of_birth()).with_transform(decrypt),
        text("16", "SSN", "Social Security Number", 28, 37, vec![predicates::is_number()])
            .with_transform(decrypt),
        text("17", "RACE", "Race and Ethnicity", 37, 43, vec![]).optional(),
        numeric("18", "GENDER", "Gender", 43, 44, vec![predicates::is_one_of(&["1", "2", "9"])]),
        numeric("19A", "REC_AID_TOTALLY_DISABLED", "Receives Aid to the Totally Disabled", 44, 45, vec![])
            .optional(),
        numeric("19B", "REC_AID_AGED_BLIND", "Receives Aid to the Aged and Blind", 45, 46, yes_no())
            .optional(),
        numeric("19C", "REC_SSI", "Receives SSI", 46, 47, vec![]).optional(),
        numeric(
            "20",
            "MARITAL_STATUS",
            "Marital Status",
            47,
            48,
            vec![predicates::is_one_of(&["1-5"])],
        )
        .optional(),
        numeric(
            "21",
            "RELATIONSHIP_HOH",
            "Relationship to Head of Household",
            48,
            50,
            vec![predicates::is_between(1, 10, true)],
        ),
        numeric(
            "22",
            "PARENT_MINOR_CHILD",
            "Parent with Minor Child",
            50,
            51,
            vec![predicates::is_one_of(&["1-3"])],
        )
        .optional(),
        numeric("23", "NEEDS_OF_PREGNANT_WOMAN", "Needs of a Pregnant Woman", 51, 52, yes_no())
            .optional(),
        numeric("24", "EDUCATION_LEVEL", "Educational Level", 52, 54, education_level()),
        numeric(
            "25",
            "CITIZENSHIP_STATUS",
            "Citizenship Status",
            54,
            55,
            vec![predicates::is_one_of(&["1", "2", "9"])],
        )
        .optional(),
        numeric("26", "COUNTABLE_MONTH_FED_TIME", "Countable Months Toward Federal Time Limit", 55, 58, non_negative())
            .optional(),
        numeric("27", "COUNTABLE_MONTHS_STATE_TRIBE", "Countable Months Toward State or Tribe Time Limit", 58, 60, non_negative())
            .optional(),
        numeric(
            "28",
            "EMPLOYMENT_STATUS",
            "Employment Status",
            60,
            61,
            vec![predicates::is_one_of(&["1-3"])],
        ),
        numeric("29A", "AMOUNT_EARNED_INCOME", "Amount of Earned Income", 61, 65, non_negative())
            .optional(),
        numeric("29B", "AMOUNT_UNEARNED_INCOME", "Amount of Unearned Income", 65, 69, non_negative())
            .optional(),
        Field::blank(69, CLOSED_LENGTH),
    ]);

    RowSchema::new(rt.as_str(), model(program, &rt))
        .with_preparsing_validators(case_preparsing(preparsing::record_has_length(CLOSED_LENGTH)))
        .with_fields(fields)
        .with_postparsing_validators(vec![if_then(
            "FAMILY_AFFILIATION",
            predicates::is_equal(PRIMARY_FAMILY_MEMBER),
            "SSN",
            predicates::validate_ssn(),
        )])
        .with_partial_hash_fields(PERSON_IDENTITY)
        .with_partial_dup_skip(PartialDupSkip::new("FAMILY_AFFILIATION", &[3, 4, 5]))
}

/// Monthly counts on an aggregate line: (item, name, friendly name, first start, width)
const AGGREGATE_COUNTS: &[(&str, &str, &str, usize, usize)] = &[
    ("4", "NUM_APPLICATIONS", "Total Number of Applications", 7, 4),
    ("5", "NUM_APPROVED", "Total Number of Approved Applications", 19, 4),
    ("6", "NUM_DENIED", "Total Number of Denied Applications", 31, 4),
    ("7", "ASSISTANCE", "Total Amount of Assistance", 43, 12),
    ("8", "NUM_FAMILIES", "Total Number of Families", 79, 4),
    ("9", "NUM_2_PARENTS", "Total Number of Two-parent Families", 91, 4),
    ("10", "NUM_1_PARENTS", "Total Number of One-parent Families", 103, 4),
    ("11", "NUM_NO_PARENTS", "Total Number of No-parent Families", 115, 4),
];

/// Aggregate month schema for month `index` (0-2) of the quarter
fn aggregate_month(program: ProgramType, index: usize) -> RowSchema {
    let rt = record_type(program, 6);
    let mut fields = vec![
        text("0", "RecordType", "Record Type", 0, 2, vec![]),
        numeric(
            "3",
            "CALENDAR_QUARTER",
            "Calendar Year and Quarter",
            2,
            7,
            vec![predicates::quarter_is_valid()],
        ),
        numeric(
            "3",
            "RPT_MONTH_YEAR",
            "Reporting Year and Month",
            2,
            7,
            vec![predicates::month_in_submission_quarter()],
        )
        .with_transform(quarter_month(index as i64)),
    ];
    for (item, name, friendly_name, start, width) in AGGREGATE_COUNTS {
        let begin = start + index * width;
        fields.push(numeric(item, name, friendly_name, begin, begin + width, non_negative()));
    }
    fields.push(Field::blank(127, AGGREGATE_LENGTH));

    RowSchema::new(rt.as_str(), model(program, &rt))
        .with_preparsing_validators(vec![preparsing::record_has_length(AGGREGATE_LENGTH)])
        .with_fields(fields)
        .with_postparsing_validators(vec![
            sum_is_equal("NUM_APPLICATIONS", &["NUM_APPROVED", "NUM_DENIED"]),
            sum_is_equal("NUM_FAMILIES", &["NUM_2_PARENTS", "NUM_1_PARENTS", "NUM_NO_PARENTS"]),
        ])
        .with_partial_hash_fields(&["RecordType", "RPT_MONTH_YEAR"])
}

/// Aggregate line (x6): one record per month of the quarter
pub fn aggregates(program: ProgramType) -> SchemaManager {
    SchemaManager::new((0..3).map(|index| aggregate_month(program, index)).collect())
}
