//! Core data models for TANF submissions
//!
//! This module contains the submission metadata, the parsed record shapes,
//! and the persisted validation finding (`ParserError`) shared by every
//! service in the processing pipeline.

use crate::constants::TERRITORY_FIPS_CODES;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Welfare program a submission reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProgramType {
    Tanf,
    Ssp,
    TribalTanf,
    Fra,
}

impl ProgramType {
    /// Program code carried in the header line
    pub fn header_code(&self) -> &'static str {
        match self {
            ProgramType::Tanf | ProgramType::TribalTanf => "TAN",
            ProgramType::Ssp => "SSP",
            ProgramType::Fra => "FRA",
        }
    }

    /// Prefix of the record-type tokens used by this program
    pub fn record_prefix(&self) -> &'static str {
        match self {
            ProgramType::Tanf | ProgramType::TribalTanf => "T",
            ProgramType::Ssp => "M",
            ProgramType::Fra => "TE",
        }
    }

    /// Prefix of the persisted model names for this program
    pub fn model_prefix(&self) -> &'static str {
        match self {
            ProgramType::Tanf => "TANF",
            ProgramType::Ssp => "SSP",
            ProgramType::TribalTanf => "TRIBAL",
            ProgramType::Fra => "FRA",
        }
    }

    /// Whether submissions are fixed-width files framed by header and trailer
    pub fn is_fixed_width(&self) -> bool {
        !matches!(self, ProgramType::Fra)
    }

    pub fn all() -> [ProgramType; 4] {
        [
            ProgramType::Tanf,
            ProgramType::Ssp,
            ProgramType::TribalTanf,
            ProgramType::Fra,
        ]
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgramType::Tanf => "TANF",
            ProgramType::Ssp => "SSP",
            ProgramType::TribalTanf => "Tribal TANF",
            ProgramType::Fra => "FRA",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ProgramType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tan" | "tanf" => Ok(ProgramType::Tanf),
            "ssp" | "ssp-moe" => Ok(ProgramType::Ssp),
            "tribal" | "tribal-tanf" | "tribal_tanf" | "tribal tanf" => {
                Ok(ProgramType::TribalTanf)
            }
            "fra" => Ok(ProgramType::Fra),
            other => Err(Error::configuration(format!(
                "Unknown program type '{}'",
                other
            ))),
        }
    }
}

/// Section of a quarterly report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Active,
    Closed,
    Aggregate,
    Stratum,
    WorkOutcomes,
}

impl Section {
    /// Section letter carried in the header line
    pub fn header_code(&self) -> Option<&'static str> {
        match self {
            Section::Active => Some("A"),
            Section::Closed => Some("C"),
            Section::Aggregate => Some("G"),
            Section::Stratum => Some("S"),
            Section::WorkOutcomes => None,
        }
    }

    pub fn from_header_code(code: &str) -> Option<Self> {
        match code.trim() {
            "A" => Some(Section::Active),
            "C" => Some(Section::Closed),
            "G" => Some(Section::Aggregate),
            "S" => Some(Section::Stratum),
            _ => None,
        }
    }

    /// Human readable section name
    pub fn name(&self) -> &'static str {
        match self {
            Section::Active => "Active Case Data",
            Section::Closed => "Closed Case Data",
            Section::Aggregate => "Aggregate Data",
            Section::Stratum => "Stratum Data",
            Section::WorkOutcomes => "Work Outcomes of TANF Exiters",
        }
    }

    /// Sections whose records take part in cross-record case rules
    pub fn has_case_consistency(&self) -> bool {
        matches!(self, Section::Active | Section::Closed)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "active" => Ok(Section::Active),
            "c" | "closed" => Ok(Section::Closed),
            "g" | "aggregate" => Ok(Section::Aggregate),
            "s" | "stratum" => Ok(Section::Stratum),
            "fra" | "work-outcomes" | "work_outcomes" => Ok(Section::WorkOutcomes),
            other => Err(Error::configuration(format!("Unknown section '{}'", other))),
        }
    }
}

/// Metadata of one uploaded data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub program: ProgramType,
    pub section: Section,
    /// Calendar year being reported
    pub year: i32,
    /// Calendar quarter being reported (1-4)
    pub quarter: u8,
}

impl Submission {
    /// Create submission metadata, rejecting impossible combinations
    pub fn new(program: ProgramType, section: Section, year: i32, quarter: u8) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(Error::configuration(format!(
                "Quarter must be between 1 and 4, got {}",
                quarter
            )));
        }
        if (program == ProgramType::Fra) != (section == Section::WorkOutcomes) {
            return Err(Error::configuration(format!(
                "Section '{}' is not available for program {}",
                section.name(),
                program
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            program,
            section,
            year,
            quarter,
        })
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// The three YYYYMM values of the reported quarter
    pub fn quarter_months(&self) -> [i64; 3] {
        let first = (i64::from(self.quarter) - 1) * 3 + 1;
        let year = i64::from(self.year) * 100;
        [year + first, year + first + 1, year + first + 2]
    }

    /// Whether a YYYYMM value falls inside the reported quarter
    pub fn contains_month(&self, rpt_month_year: i64) -> bool {
        self.quarter_months().contains(&rpt_month_year)
    }
}

/// Per-parse binding of a schema to the active submission
///
/// Schemas are shared and immutable; everything that depends on the file
/// being parsed travels alongside them in this context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    pub submission: Option<Submission>,
    pub is_encrypted: bool,
    pub state_fips: Option<i64>,
    pub tribe_code: Option<i64>,
}

impl ParseContext {
    pub fn for_submission(submission: &Submission) -> Self {
        Self {
            submission: Some(submission.clone()),
            ..Default::default()
        }
    }

    pub fn with_encryption(mut self, is_encrypted: bool) -> Self {
        self.is_encrypted = is_encrypted;
        self
    }

    pub fn with_state_fips(mut self, state_fips: Option<i64>) -> Self {
        self.state_fips = state_fips;
        self
    }

    pub fn with_tribe_code(mut self, tribe_code: Option<i64>) -> Self {
        self.tribe_code = tribe_code;
        self
    }

    /// Whether the submitter is a territory rather than a state
    pub fn is_territory(&self) -> bool {
        self.state_fips
            .is_some_and(|fips| TERRITORY_FIPS_CODES.contains(&fips))
    }
}

/// A single parsed field value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, parsing text when needed
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }

    /// Whether the value carries no information (all spaces or fill characters)
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => is_blank_text(s),
        }
    }
}

/// Blank means empty, all spaces, or all `#` fill
pub fn is_blank_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.chars().all(|c| c == '#')
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Uniform field access over every record shape
pub trait FieldAccess {
    fn get_field(&self, name: &str) -> Option<&FieldValue>;

    fn set_field(&mut self, name: &str, value: FieldValue);

    fn field_i64(&self, name: &str) -> Option<i64> {
        self.get_field(name).and_then(FieldValue::as_i64)
    }

    fn field_text(&self, name: &str) -> Option<String> {
        self.get_field(name).map(|value| value.to_string())
    }
}

/// A record destined for persistence under a named model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: Uuid,
    pub model: String,
    pub record_type: String,
    pub line_number: usize,
    pub submission_id: Option<Uuid>,
    pub values: BTreeMap<String, FieldValue>,
}

impl ModelRecord {
    pub fn new(model: impl Into<String>, record_type: impl Into<String>, line_number: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            record_type: record_type.into(),
            line_number,
            submission_id: None,
            values: BTreeMap::new(),
        }
    }

    pub fn case_number(&self) -> Option<String> {
        self.values
            .get("CASE_NUMBER")
            .map(|value| value.to_string().trim().to_string())
            .filter(|case| !case.is_empty())
    }

    pub fn rpt_month_year(&self) -> Option<i64> {
        self.values.get("RPT_MONTH_YEAR").and_then(FieldValue::as_i64)
    }

    pub fn case_key(&self) -> Option<CaseKey> {
        Some(CaseKey {
            case_number: self.case_number()?,
            rpt_month_year: self.rpt_month_year()?,
        })
    }
}

impl FieldAccess for ModelRecord {
    fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    fn set_field(&mut self, name: &str, value: FieldValue) {
        self.values.insert(name.to_string(), value);
    }
}

/// Output shape of a parsed line
///
/// Header and trailer lines produce loose mappings that are inspected and
/// discarded; data lines produce typed model records that are persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Mapping(BTreeMap<String, FieldValue>),
    Typed(ModelRecord),
}

impl Record {
    pub fn as_typed(&self) -> Option<&ModelRecord> {
        match self {
            Record::Typed(record) => Some(record),
            Record::Mapping(_) => None,
        }
    }

    pub fn into_typed(self) -> Option<ModelRecord> {
        match self {
            Record::Typed(record) => Some(record),
            Record::Mapping(_) => None,
        }
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        match self {
            Record::Mapping(values) => values,
            Record::Typed(record) => &record.values,
        }
    }

    pub fn case_number(&self) -> Option<String> {
        self.get_field("CASE_NUMBER")
            .map(|value| value.to_string().trim().to_string())
            .filter(|case| !case.is_empty())
    }

    pub fn rpt_month_year(&self) -> Option<i64> {
        self.field_i64("RPT_MONTH_YEAR")
    }

    pub fn case_key(&self) -> Option<CaseKey> {
        Some(CaseKey {
            case_number: self.case_number()?,
            rpt_month_year: self.rpt_month_year()?,
        })
    }
}

impl FieldAccess for Record {
    fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.values().get(name)
    }

    fn set_field(&mut self, name: &str, value: FieldValue) {
        match self {
            Record::Mapping(values) => {
                values.insert(name.to_string(), value);
            }
            Record::Typed(record) => record.set_field(name, value),
        }
    }
}

/// One case in one reporting month
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseKey {
    pub case_number: String,
    pub rpt_month_year: i64,
}

/// Closed set of validation finding categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// File level structural finding
    PreCheck,
    /// Line level structural finding (length, case number, record type)
    RecordPreCheck,
    /// A single field failed its validators
    FieldValue,
    /// Fields within one record disagree
    ValueConsistency,
    /// Records within one case disagree, including duplicates
    CaseConsistency,
    /// Reserved for cross-section rules
    SectionConsistency,
    /// Reserved for cross-quarter rules
    HistoricalConsistency,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::PreCheck => "PRE_CHECK",
            ErrorCategory::RecordPreCheck => "RECORD_PRE_CHECK",
            ErrorCategory::FieldValue => "FIELD_VALUE",
            ErrorCategory::ValueConsistency => "VALUE_CONSISTENCY",
            ErrorCategory::CaseConsistency => "CASE_CONSISTENCY",
            ErrorCategory::SectionConsistency => "SECTION_CONSISTENCY",
            ErrorCategory::HistoricalConsistency => "HISTORICAL_CONSISTENCY",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where in a file a group of findings was raised
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorLocation {
    Document,
    Header,
    Trailer,
    /// A physical line and the index of the schema that parsed it
    Line { line_number: usize, record_index: usize },
    /// Findings raised across records (case rules and duplicates)
    Cases,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLocation::Document => write!(f, "document"),
            ErrorLocation::Header => write!(f, "header"),
            ErrorLocation::Trailer => write!(f, "trailer"),
            ErrorLocation::Line {
                line_number,
                record_index,
            } => write!(f, "{}_{}", line_number, record_index),
            ErrorLocation::Cases => write!(f, "cases"),
        }
    }
}

/// A persisted validation finding
///
/// Only the error generator builds these; once created they are not modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserError {
    pub id: Uuid,
    pub file_id: Uuid,
    pub row_number: Option<usize>,
    pub column_number: Option<String>,
    pub item_number: Option<String>,
    pub field_name: Option<String>,
    pub rpt_month_year: Option<i64>,
    pub case_number: Option<String>,
    pub error_message: String,
    pub error_type: ErrorCategory,
    /// Model name of the linked record
    pub content_type: Option<String>,
    /// Id of the linked record
    pub object_id: Option<Uuid>,
    pub fields_json: Option<serde_json::Value>,
    pub values_json: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub deprecated: bool,
}

/// Findings of one parse grouped by location
pub type ErrorMap = BTreeMap<ErrorLocation, Vec<ParserError>>;
