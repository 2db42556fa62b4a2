//! Row schemas: parse one row into one record and validate it
//!
//! Validation runs in tiers:
//! 1. Preparsing validators over the raw line (RECORD_PRE_CHECK); a failure
//!    stops here, silently when the schema's quiet predicate holds
//! 2. Field parsing, including transform fields
//! 3. Field validators (FIELD_VALUE), with required fields reported when absent
//! 4. Postparsing validators over the whole record (VALUE_CONSISTENCY)

use super::field::Field;
use super::row::Row;
use crate::app::models::{FieldAccess, FieldValue, ModelRecord, ParseContext, ParserError, Record};
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::validators::{BoxedRecordValidator, BoxedValidator, ValidationErrorArgs};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Shape of the record a schema produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordShape {
    /// Loose mapping, inspected and discarded (header, trailer)
    Mapping,
    /// Persisted record under the named model
    Model(String),
}

/// Whether preparsing failures are reported
#[derive(Clone, Default)]
pub enum QuietPreparser {
    #[default]
    Never,
    Always,
    /// Quiet when the predicate holds for the row
    When(Arc<dyn Fn(&Row) -> bool + Send + Sync>),
}

impl QuietPreparser {
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        QuietPreparser::When(Arc::new(predicate))
    }

    pub fn is_quiet(&self, row: &Row) -> bool {
        match self {
            QuietPreparser::Never => false,
            QuietPreparser::Always => true,
            QuietPreparser::When(predicate) => predicate(row),
        }
    }
}

impl fmt::Debug for QuietPreparser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuietPreparser::Never => write!(f, "Never"),
            QuietPreparser::Always => write!(f, "Always"),
            QuietPreparser::When(_) => write!(f, "When(..)"),
        }
    }
}

/// Records whose field holds one of these values never count as partial duplicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDupSkip {
    pub field: String,
    pub values: Vec<i64>,
}

impl PartialDupSkip {
    pub fn new(field: impl Into<String>, values: &[i64]) -> Self {
        Self {
            field: field.into(),
            values: values.to_vec(),
        }
    }

    pub fn should_skip(&self, record: &Record) -> bool {
        record
            .field_i64(&self.field)
            .is_some_and(|value| self.values.contains(&value))
    }
}

/// Result of running one schema over one row
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub record: Option<Record>,
    pub is_valid: bool,
    pub errors: Vec<ParserError>,
}

impl ParsedLine {
    /// Nothing produced and nothing reported
    pub fn skipped() -> Self {
        Self {
            record: None,
            is_valid: true,
            errors: Vec::new(),
        }
    }
}

/// Declarative layout and validation rules for one record type
#[derive(Clone)]
pub struct RowSchema {
    record_type: String,
    shape: RecordShape,
    fields: Vec<Field>,
    preparsing_validators: Vec<BoxedValidator>,
    postparsing_validators: Vec<BoxedRecordValidator>,
    partial_hash_fields: Vec<String>,
    partial_dup_skip: Option<PartialDupSkip>,
    quiet_preparser_errors: QuietPreparser,
}

impl RowSchema {
    pub fn new(record_type: impl Into<String>, shape: RecordShape) -> Self {
        Self {
            record_type: record_type.into(),
            shape,
            fields: Vec::new(),
            preparsing_validators: Vec::new(),
            postparsing_validators: Vec::new(),
            partial_hash_fields: Vec::new(),
            partial_dup_skip: None,
            quiet_preparser_errors: QuietPreparser::Never,
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_preparsing_validators(mut self, validators: Vec<BoxedValidator>) -> Self {
        self.preparsing_validators = validators;
        self
    }

    pub fn with_postparsing_validators(mut self, validators: Vec<BoxedRecordValidator>) -> Self {
        self.postparsing_validators = validators;
        self
    }

    /// Fields whose values identify a partial duplicate
    pub fn with_partial_hash_fields(mut self, names: &[&str]) -> Self {
        self.partial_hash_fields = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_partial_dup_skip(mut self, skip: PartialDupSkip) -> Self {
        self.partial_dup_skip = Some(skip);
        self
    }

    pub fn with_quiet_preparser_errors(mut self, quiet: QuietPreparser) -> Self {
        self.quiet_preparser_errors = quiet;
        self
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn shape(&self) -> &RecordShape {
        &self.shape
    }

    /// Persisted model name, if the schema produces typed records
    pub fn model_name(&self) -> Option<&str> {
        match &self.shape {
            RecordShape::Model(name) => Some(name),
            RecordShape::Mapping => None,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn partial_hash_fields(&self) -> &[String] {
        &self.partial_hash_fields
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Exact-duplicate hash of the row and partial-duplicate hash of the record
    pub fn generate_hashes(&self, row: &Row, record: &Record) -> (u64, Option<u64>) {
        let line_hash = row.content_hash();
        if self.partial_hash_fields.is_empty() {
            return (line_hash, None);
        }

        let mut hasher = DefaultHasher::new();
        self.record_type.hash(&mut hasher);
        for name in &self.partial_hash_fields {
            record
                .get_field(name)
                .map(|value| value.to_string().trim().to_string())
                .hash(&mut hasher);
        }
        (line_hash, Some(hasher.finish()))
    }

    pub fn should_skip_partial_dup(&self, record: &Record) -> bool {
        self.partial_dup_skip
            .as_ref()
            .is_some_and(|skip| skip.should_skip(record))
    }

    /// Parse a row into a record and run every validator tier over it
    pub fn parse_and_validate(
        &self,
        row: &Row,
        context: &ParseContext,
        generator: &ErrorGenerator,
    ) -> ParsedLine {
        let (preparsing_valid, preparsing_errors) =
            self.run_preparsing_validators(row, context, generator);
        if !preparsing_valid {
            if self.quiet_preparser_errors.is_quiet(row) {
                debug!(
                    "Line {}: {} preparsing failed quietly",
                    row.line_number(),
                    self.record_type
                );
                return ParsedLine::skipped();
            }
            return ParsedLine {
                record: None,
                is_valid: false,
                errors: preparsing_errors,
            };
        }

        let (record, mut errors) = self.parse_row(row, context, generator);
        let mut is_valid = errors.is_empty();

        let (fields_valid, field_errors) =
            self.run_field_validators(&record, row.line_number(), context, generator);
        is_valid &= fields_valid;
        errors.extend(field_errors);

        let (postparsing_valid, postparsing_errors) =
            self.run_postparsing_validators(&record, row.line_number(), context, generator);
        is_valid &= postparsing_valid;
        errors.extend(postparsing_errors);

        ParsedLine {
            record: Some(record),
            is_valid,
            errors,
        }
    }

    fn run_preparsing_validators(
        &self,
        row: &Row,
        context: &ParseContext,
        generator: &ErrorGenerator,
    ) -> (bool, Vec<ParserError>) {
        let line = FieldValue::Text(row.as_text().into_owned());
        let args = ValidationErrorArgs::new(&line, &self.record_type, "Record", "0", context);
        let mut is_valid = true;
        let mut errors = Vec::new();

        for validator in &self.preparsing_validators {
            let result = validator.validate(&args);
            if !result.is_valid {
                is_valid = false;
                if let Some(message) = result.message {
                    errors.push(generator.record_precheck(row.line_number(), self, message));
                }
            }
        }

        (is_valid, errors)
    }

    fn parse_row(
        &self,
        row: &Row,
        context: &ParseContext,
        generator: &ErrorGenerator,
    ) -> (Record, Vec<ParserError>) {
        let mut record = match &self.shape {
            RecordShape::Mapping => Record::Mapping(BTreeMap::new()),
            RecordShape::Model(model) => Record::Typed(ModelRecord::new(
                model.clone(),
                self.record_type.clone(),
                row.line_number(),
            )),
        };
        let mut failures = Vec::new();

        for field in self.fields.iter().filter(|field| !field.discarded) {
            match field.parse_value(row, context) {
                Ok(Some(value)) => record.set_field(&field.name, value),
                Ok(None) => {}
                Err(error) => failures.push((field, error)),
            }
        }

        let errors = failures
            .into_iter()
            .map(|(field, error)| {
                let message = format!(
                    "{} Item {} ({}): {}.",
                    self.record_type, field.item, field.friendly_name, error
                );
                generator.field_value(row.line_number(), self, &record, field, message)
            })
            .collect();

        (record, errors)
    }

    fn run_field_validators(
        &self,
        record: &Record,
        line_number: usize,
        context: &ParseContext,
        generator: &ErrorGenerator,
    ) -> (bool, Vec<ParserError>) {
        let mut is_valid = true;
        let mut errors = Vec::new();

        for field in self.fields.iter().filter(|field| !field.discarded) {
            let value = record.get_field(&field.name).filter(|value| !value.is_blank());

            match value {
                Some(value) => {
                    let args = ValidationErrorArgs::new(
                        value,
                        &self.record_type,
                        &field.friendly_name,
                        &field.item,
                        context,
                    );
                    for validator in &field.validators {
                        let result = validator.validate(&args);
                        if result.is_valid {
                            continue;
                        }
                        if !field.ignore_errors {
                            is_valid = false;
                        }
                        if let Some(message) = result.message {
                            errors.push(generator.field_value(
                                line_number,
                                self,
                                record,
                                field,
                                message,
                            ));
                        }
                    }
                }
                None if field.required => {
                    is_valid = false;
                    let message = format!(
                        "{} Item {} ({}): field is required but a value was not provided.",
                        self.record_type, field.item, field.friendly_name
                    );
                    errors.push(generator.field_value(line_number, self, record, field, message));
                }
                None => {}
            }
        }

        (is_valid, errors)
    }

    fn run_postparsing_validators(
        &self,
        record: &Record,
        line_number: usize,
        context: &ParseContext,
        generator: &ErrorGenerator,
    ) -> (bool, Vec<ParserError>) {
        let mut is_valid = true;
        let mut errors = Vec::new();

        for validator in &self.postparsing_validators {
            let result = validator.validate(record, self, context);
            if result.is_valid {
                continue;
            }
            is_valid = false;
            let fields: Vec<&Field> = result
                .fields
                .iter()
                .filter_map(|name| self.get_field_by_name(name))
                .collect();
            errors.push(generator.value_consistency(
                line_number,
                self,
                record,
                &fields,
                result.message.unwrap_or_default(),
            ));
        }

        (is_valid, errors)
    }
}

impl fmt::Debug for RowSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSchema")
            .field("record_type", &self.record_type)
            .field("shape", &self.shape)
            .field("fields", &self.fields.len())
            .field("preparsing_validators", &self.preparsing_validators.len())
            .field("postparsing_validators", &self.postparsing_validators.len())
            .field("partial_hash_fields", &self.partial_hash_fields)
            .field("quiet_preparser_errors", &self.quiet_preparser_errors)
            .finish()
    }
}
