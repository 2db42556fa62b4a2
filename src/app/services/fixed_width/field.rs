//! Field definitions for row schemas
//!
//! A field names a positioned slice of a row, how to interpret it, and the
//! value validators that apply once it has been parsed. Transform fields
//! additionally rewrite the parsed value (decryption, derived dates) using
//! the per-parse context.

use super::position::Position;
use super::row::Row;
use crate::app::models::{FieldValue, ParseContext, is_blank_text};
use crate::app::services::validators::BoxedValidator;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// How the sliced text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Alphanumeric,
}

/// Failure raised while transforming a parsed value
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("value '{value}' could not be transformed: {reason}")]
    Invalid { value: String, reason: String },
}

impl TransformError {
    pub fn invalid(value: impl ToString, reason: impl Into<String>) -> Self {
        Self::Invalid {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Rewrites a parsed value using the per-parse context
pub trait FieldTransform: Send + Sync {
    fn apply(&self, value: FieldValue, context: &ParseContext)
    -> Result<FieldValue, TransformError>;
}

impl<F> FieldTransform for F
where
    F: Fn(FieldValue, &ParseContext) -> Result<FieldValue, TransformError> + Send + Sync,
{
    fn apply(
        &self,
        value: FieldValue,
        context: &ParseContext,
    ) -> Result<FieldValue, TransformError> {
        self(value, context)
    }
}

/// A positioned field of a row schema
#[derive(Clone)]
pub struct Field {
    /// Item number in the published layout (e.g. "21A")
    pub item: String,
    pub name: String,
    pub friendly_name: String,
    pub kind: FieldKind,
    pub position: Position,
    pub required: bool,
    pub validators: Vec<BoxedValidator>,
    /// Validator failures are reported but do not invalidate the record
    pub ignore_errors: bool,
    /// Filler that is sliced but never stored
    pub discarded: bool,
    transform: Option<Arc<dyn FieldTransform>>,
}

impl Field {
    pub fn new(
        item: impl Into<String>,
        name: impl Into<String>,
        friendly_name: impl Into<String>,
        kind: FieldKind,
        position: Position,
    ) -> Self {
        Self {
            item: item.into(),
            name: name.into(),
            friendly_name: friendly_name.into(),
            kind,
            position,
            required: true,
            validators: Vec::new(),
            ignore_errors: false,
            discarded: false,
            transform: None,
        }
    }

    pub fn numeric(
        item: impl Into<String>,
        name: impl Into<String>,
        friendly_name: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self::new(item, name, friendly_name, FieldKind::Numeric, Position::new(start, end))
    }

    pub fn alphanumeric(
        item: impl Into<String>,
        name: impl Into<String>,
        friendly_name: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self::new(
            item,
            name,
            friendly_name,
            FieldKind::Alphanumeric,
            Position::new(start, end),
        )
    }

    /// Unused trailing bytes of a layout
    pub fn blank(start: usize, end: usize) -> Self {
        let mut field = Self::alphanumeric("", "BLANK", "Blank", start, end).optional();
        field.discarded = true;
        field
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_validators(mut self, validators: Vec<BoxedValidator>) -> Self {
        self.validators = validators;
        self
    }

    pub fn ignoring_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }

    pub fn with_transform<T: FieldTransform + 'static>(mut self, transform: T) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn is_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Slice and interpret this field's value from a row
    ///
    /// Returns `Ok(None)` when the slice is missing, blank, or a numeric
    /// field does not hold an integer. Only transform failures are errors.
    pub fn parse_value(
        &self,
        row: &Row,
        context: &ParseContext,
    ) -> Result<Option<FieldValue>, TransformError> {
        let Some(raw) = row.slice(self.position) else {
            return Ok(None);
        };
        if is_blank_text(&raw) {
            return Ok(None);
        }

        let value = match self.kind {
            FieldKind::Numeric => match raw.trim().parse::<i64>() {
                Ok(number) => FieldValue::Number(number),
                Err(_) => {
                    debug!(
                        "Line {}: {} value '{}' is not an integer",
                        row.line_number(),
                        self.name,
                        raw
                    );
                    return Ok(None);
                }
            },
            FieldKind::Alphanumeric => FieldValue::Text(raw.into_owned()),
        };

        match &self.transform {
            Some(transform) => transform.apply(value, context).map(Some),
            None => Ok(Some(value)),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("item", &self.item)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("required", &self.required)
            .field("validators", &self.validators.len())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}
