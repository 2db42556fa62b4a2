//! Validator combinators
//!
//! Value level: [`And`], [`Or`], [`OrPriority`].
//! Record level: [`IfThen`], [`SumIsEqual`], [`SumIsLarger`], [`FieldCheck`].

use super::base::{
    BoxedRecordValidator, BoxedValidator, ErrorFormat, RecordValidationResult, RecordValidator,
    ValidationErrorArgs, ValidationResult, ValueValidator,
};
use crate::app::models::{FieldAccess, FieldValue, ParseContext, Record};
use crate::app::services::fixed_width::RowSchema;
use std::sync::Arc;

/// Valid only if every sub-validator is valid; reports the first failure
pub struct And {
    validators: Vec<BoxedValidator>,
}

impl ValueValidator for And {
    fn validate(&self, args: &ValidationErrorArgs<'_>) -> ValidationResult {
        let results: Vec<ValidationResult> =
            self.validators.iter().map(|v| v.validate(args)).collect();
        results
            .into_iter()
            .find(|result| !result.is_valid)
            .unwrap_or_else(ValidationResult::valid)
    }
}

/// Valid if any sub-validator is valid; joins every failure with " or "
pub struct Or {
    validators: Vec<BoxedValidator>,
}

impl ValueValidator for Or {
    fn validate(&self, args: &ValidationErrorArgs<'_>) -> ValidationResult {
        let inline = args.inline();
        let mut messages = Vec::with_capacity(self.validators.len());

        for validator in &self.validators {
            let result = validator.validate(&inline);
            if result.is_valid {
                return ValidationResult::valid();
            }
            if let Some(message) = result.message {
                messages.push(message);
            }
        }

        let joined = messages.join(" or ");
        match args.format {
            ErrorFormat::Prefix => {
                ValidationResult::invalid(args.finish(&format!("{}: {}", args.record_type, joined)))
            }
            ErrorFormat::Inline => ValidationResult::invalid(joined),
        }
    }
}

/// Evaluates in order and stops at the first failure
pub struct OrPriority {
    validators: Vec<BoxedValidator>,
}

impl ValueValidator for OrPriority {
    fn validate(&self, args: &ValidationErrorArgs<'_>) -> ValidationResult {
        for validator in &self.validators {
            let result = validator.validate(args);
            if !result.is_valid {
                return result;
            }
        }
        ValidationResult::valid()
    }
}

pub fn and(validators: Vec<BoxedValidator>) -> BoxedValidator {
    Arc::new(And { validators })
}

pub fn or(validators: Vec<BoxedValidator>) -> BoxedValidator {
    Arc::new(Or { validators })
}

pub fn or_priority(validators: Vec<BoxedValidator>) -> BoxedValidator {
    Arc::new(OrPriority { validators })
}

/// `Item n (Friendly Name)` for a field of the schema, falling back to the raw name
fn describe_field(schema: &RowSchema, name: &str) -> String {
    match schema.get_field_by_name(name) {
        Some(field) => format!("Item {} ({})", field.item, field.friendly_name),
        None => name.to_string(),
    }
}

fn describe_fields(schema: &RowSchema, names: &[String]) -> String {
    names
        .iter()
        .map(|name| describe_field(schema, name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Field metadata for building validator arguments
fn field_labels<'a>(schema: &'a RowSchema, name: &'a str) -> (&'a str, &'a str) {
    match schema.get_field_by_name(name) {
        Some(field) => (field.friendly_name.as_str(), field.item.as_str()),
        None => (name, "?"),
    }
}

/// When the condition field passes its check, the result field must pass too
///
/// The result validator is only evaluated once the condition holds; an
/// absent condition value counts as not met.
pub struct IfThen {
    condition_field: String,
    condition: BoxedValidator,
    result_field: String,
    result: BoxedValidator,
}

impl RecordValidator for IfThen {
    fn validate(
        &self,
        record: &Record,
        schema: &RowSchema,
        context: &ParseContext,
    ) -> RecordValidationResult {
        let fields = vec![self.condition_field.clone(), self.result_field.clone()];

        let Some(condition_value) = record.get_field(&self.condition_field) else {
            return RecordValidationResult::valid(fields);
        };
        let (friendly_name, item) = field_labels(schema, &self.condition_field);
        let condition_args = ValidationErrorArgs::new(
            condition_value,
            schema.record_type(),
            friendly_name,
            item,
            context,
        )
        .inline();
        if !self.condition.validate(&condition_args).is_valid {
            return RecordValidationResult::valid(fields);
        }

        let blank = FieldValue::Text(String::new());
        let result_value = record.get_field(&self.result_field).unwrap_or(&blank);
        let (friendly_name, item) = field_labels(schema, &self.result_field);
        let result_args = ValidationErrorArgs::new(
            result_value,
            schema.record_type(),
            friendly_name,
            item,
            context,
        )
        .inline();
        let result = self.result.validate(&result_args);
        if result.is_valid {
            return RecordValidationResult::valid(fields);
        }

        let message = format!(
            "{}: If {} is {}, then {}.",
            schema.record_type(),
            condition_args.error_context(),
            condition_value,
            result.message.unwrap_or_default().trim_end_matches('.')
        );
        RecordValidationResult::invalid(message, fields)
    }
}

pub fn if_then(
    condition_field: &str,
    condition: BoxedValidator,
    result_field: &str,
    result: BoxedValidator,
) -> BoxedRecordValidator {
    Arc::new(IfThen {
        condition_field: condition_field.to_string(),
        condition,
        result_field: result_field.to_string(),
        result,
    })
}

fn sum_of(record: &Record, names: &[String]) -> i64 {
    names
        .iter()
        .filter_map(|name| record.field_i64(name))
        .sum()
}

/// The addends must sum to the total field
pub struct SumIsEqual {
    total_field: String,
    addends: Vec<String>,
}

impl RecordValidator for SumIsEqual {
    fn validate(
        &self,
        record: &Record,
        schema: &RowSchema,
        _context: &ParseContext,
    ) -> RecordValidationResult {
        let mut fields = self.addends.clone();
        fields.push(self.total_field.clone());

        let total = record.field_i64(&self.total_field).unwrap_or(0);
        if sum_of(record, &self.addends) == total {
            return RecordValidationResult::valid(fields);
        }

        let message = format!(
            "{}: The sum of {} does not equal {}.",
            schema.record_type(),
            describe_fields(schema, &self.addends),
            describe_field(schema, &self.total_field)
        );
        RecordValidationResult::invalid(message, fields)
    }
}

pub fn sum_is_equal(total_field: &str, addends: &[&str]) -> BoxedRecordValidator {
    Arc::new(SumIsEqual {
        total_field: total_field.to_string(),
        addends: addends.iter().map(|a| a.to_string()).collect(),
    })
}

/// The fields must sum to more than a threshold
pub struct SumIsLarger {
    fields: Vec<String>,
    threshold: i64,
}

impl RecordValidator for SumIsLarger {
    fn validate(
        &self,
        record: &Record,
        schema: &RowSchema,
        _context: &ParseContext,
    ) -> RecordValidationResult {
        if sum_of(record, &self.fields) > self.threshold {
            return RecordValidationResult::valid(self.fields.clone());
        }

        let message = format!(
            "{}: The sum of {} is not larger than {}.",
            schema.record_type(),
            describe_fields(schema, &self.fields),
            self.threshold
        );
        RecordValidationResult::invalid(message, self.fields.clone())
    }
}

pub fn sum_is_larger(fields: &[&str], threshold: i64) -> BoxedRecordValidator {
    Arc::new(SumIsLarger {
        fields: fields.iter().map(|f| f.to_string()).collect(),
        threshold,
    })
}

/// Runs a value validator against one field of the record
///
/// Absent values are skipped; required-ness is the field validator tier's job.
pub struct FieldCheck {
    field: String,
    validator: BoxedValidator,
}

impl RecordValidator for FieldCheck {
    fn validate(
        &self,
        record: &Record,
        schema: &RowSchema,
        context: &ParseContext,
    ) -> RecordValidationResult {
        let fields = vec![self.field.clone()];
        let Some(value) = record.get_field(&self.field) else {
            return RecordValidationResult::valid(fields);
        };
        let (friendly_name, item) = field_labels(schema, &self.field);
        let args = ValidationErrorArgs::new(value, schema.record_type(), friendly_name, item, context);
        let result = self.validator.validate(&args);
        if result.is_valid {
            RecordValidationResult::valid(fields)
        } else {
            RecordValidationResult::invalid(result.message.unwrap_or_default(), fields)
        }
    }
}

pub fn field_check(field: &str, validator: BoxedValidator) -> BoxedRecordValidator {
    Arc::new(FieldCheck {
        field: field.to_string(),
        validator,
    })
}
