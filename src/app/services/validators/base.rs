//! Validator traits, result types and the single leaf wrapper
//!
//! Every check in the library is either a [`ValueValidator`] (one value, or a
//! whole raw line for preparsing checks) or a [`RecordValidator`] (a parsed
//! record as a whole). Leaf checks are plain predicates wrapped by
//! [`Validator`], which turns a failed or unevaluable predicate into a
//! failure message in the caller's register.

use crate::app::models::{FieldValue, ParseContext, Record};
use crate::app::services::fixed_width::RowSchema;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Register a failure message is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorFormat {
    /// Stand-alone sentence: `"T1 Item 9 (Disposition): 3 is not in [1, 2]."`
    #[default]
    Prefix,
    /// Sub-clause for composites: `"Item 9 (Disposition) 3 is not in [1, 2]"`
    Inline,
}

/// Everything a validator may read to build its message
#[derive(Debug, Clone, Copy)]
pub struct ValidationErrorArgs<'a> {
    pub value: &'a FieldValue,
    pub record_type: &'a str,
    pub friendly_name: &'a str,
    pub item: &'a str,
    pub format: ErrorFormat,
    pub context: &'a ParseContext,
}

impl<'a> ValidationErrorArgs<'a> {
    pub fn new(
        value: &'a FieldValue,
        record_type: &'a str,
        friendly_name: &'a str,
        item: &'a str,
        context: &'a ParseContext,
    ) -> Self {
        Self {
            value,
            record_type,
            friendly_name,
            item,
            format: ErrorFormat::Prefix,
            context,
        }
    }

    pub fn inline(self) -> Self {
        self.with_format(ErrorFormat::Inline)
    }

    pub fn with_format(mut self, format: ErrorFormat) -> Self {
        self.format = format;
        self
    }

    /// Leading context naming the field being checked
    pub fn error_context(&self) -> String {
        match self.format {
            ErrorFormat::Prefix => format!(
                "{} Item {} ({}):",
                self.record_type, self.item, self.friendly_name
            ),
            ErrorFormat::Inline => format!("Item {} ({})", self.item, self.friendly_name),
        }
    }

    /// Close a message body according to the register
    pub fn finish(&self, body: &str) -> String {
        let body = body.trim_end_matches('.');
        match self.format {
            ErrorFormat::Prefix => format!("{}.", body),
            ErrorFormat::Inline => body.to_string(),
        }
    }
}

/// Outcome of a value level check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Outcome of a record level check, naming the fields it read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordValidationResult {
    pub is_valid: bool,
    pub message: Option<String>,
    pub fields: Vec<String>,
}

impl RecordValidationResult {
    pub fn valid(fields: Vec<String>) -> Self {
        Self {
            is_valid: true,
            message: None,
            fields,
        }
    }

    pub fn invalid(message: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
            fields,
        }
    }
}

/// Why a predicate could not be evaluated
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    #[error("value '{0}' is not numeric")]
    NotNumeric(String),

    #[error("value '{value}' is malformed: {reason}")]
    Malformed { value: String, reason: String },
}

/// Result of evaluating a leaf predicate
pub type PredicateResult = std::result::Result<bool, PredicateError>;

/// A check over a single value (a field value or a raw line)
pub trait ValueValidator: Send + Sync {
    fn validate(&self, args: &ValidationErrorArgs<'_>) -> ValidationResult;
}

/// A check over a whole parsed record
pub trait RecordValidator: Send + Sync {
    fn validate(
        &self,
        record: &Record,
        schema: &RowSchema,
        context: &ParseContext,
    ) -> RecordValidationResult;
}

pub type BoxedValidator = Arc<dyn ValueValidator>;
pub type BoxedRecordValidator = Arc<dyn RecordValidator>;

type PredicateFn = dyn Fn(&FieldValue, &ValidationErrorArgs<'_>) -> PredicateResult + Send + Sync;
type MessageFn = dyn Fn(&ValidationErrorArgs<'_>) -> String + Send + Sync;

/// Leaf validator built from a predicate and a message builder
///
/// A predicate that returns an error is reported as a plain validation
/// failure; nothing escapes to the caller.
pub struct Validator {
    name: &'static str,
    predicate: Box<PredicateFn>,
    message: Box<MessageFn>,
}

impl Validator {
    pub fn new<P, M>(name: &'static str, predicate: P, message: M) -> Self
    where
        P: Fn(&FieldValue, &ValidationErrorArgs<'_>) -> PredicateResult + Send + Sync + 'static,
        M: Fn(&ValidationErrorArgs<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
            message: Box::new(message),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn boxed(self) -> BoxedValidator {
        Arc::new(self)
    }
}

impl ValueValidator for Validator {
    fn validate(&self, args: &ValidationErrorArgs<'_>) -> ValidationResult {
        match (self.predicate)(args.value, args) {
            Ok(true) => ValidationResult::valid(),
            Ok(false) => ValidationResult::invalid(args.finish(&(self.message)(args))),
            Err(error) => {
                debug!("Validator '{}' could not evaluate: {}", self.name, error);
                ValidationResult::invalid(args.finish(&(self.message)(args)))
            }
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish()
    }
}
