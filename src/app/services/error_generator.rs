//! Builds `ParserError` values from parse context
//!
//! Each error category has a fixed contract describing which parts of the
//! context it links to. Context outside a category's contract is dropped, so
//! a file precheck never carries record linkage even if the caller had one.

use crate::app::models::{ErrorCategory, FieldAccess, ParserError, Record};
use crate::app::services::fixed_width::{Field, RowSchema};
use chrono::Utc;
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// What a category may link to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Contract {
    record: bool,
    fields: bool,
}

impl Contract {
    fn for_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::PreCheck | ErrorCategory::RecordPreCheck => Self {
                record: false,
                fields: false,
            },
            ErrorCategory::FieldValue | ErrorCategory::ValueConsistency => Self {
                record: true,
                fields: true,
            },
            ErrorCategory::CaseConsistency
            | ErrorCategory::SectionConsistency
            | ErrorCategory::HistoricalConsistency => Self {
                record: true,
                fields: false,
            },
        }
    }
}

/// Context an error may be built from
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorContext<'a> {
    pub row_number: Option<usize>,
    pub schema: Option<&'a RowSchema>,
    pub record: Option<&'a Record>,
    pub fields: &'a [&'a Field],
}

impl<'a> ErrorContext<'a> {
    pub fn row(row_number: usize) -> Self {
        Self {
            row_number: Some(row_number),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: &'a RowSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_record(mut self, record: &'a Record) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_fields(mut self, fields: &'a [&'a Field]) -> Self {
        self.fields = fields;
        self
    }
}

/// Error factory bound to one submitted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorGenerator {
    file_id: Uuid,
    /// Every error is a file precheck (header and trailer parsing)
    file_precheck: bool,
}

impl ErrorGenerator {
    pub fn new(file_id: Uuid) -> Self {
        Self {
            file_id,
            file_precheck: false,
        }
    }

    /// Generator whose errors are all categorized as file prechecks
    pub fn file_precheck(file_id: Uuid) -> Self {
        Self {
            file_id,
            file_precheck: true,
        }
    }

    pub fn file_id(&self) -> Uuid {
        self.file_id
    }

    /// Factory closure for one category
    pub fn maker(
        &self,
        category: ErrorCategory,
    ) -> impl Fn(ErrorContext<'_>, &str) -> ParserError + '_ {
        move |context, message| self.generate(category, context, message)
    }

    pub fn generate(
        &self,
        category: ErrorCategory,
        context: ErrorContext<'_>,
        message: impl Into<String>,
    ) -> ParserError {
        let category = if self.file_precheck {
            ErrorCategory::PreCheck
        } else {
            category
        };
        let contract = Contract::for_category(category);
        let record = context.record.filter(|_| contract.record);
        let fields: &[&Field] = if contract.fields { context.fields } else { &[] };
        let single = match fields {
            [field] => Some(*field),
            _ => None,
        };
        let typed = record.and_then(Record::as_typed);

        ParserError {
            id: Uuid::new_v4(),
            file_id: self.file_id,
            row_number: context.row_number,
            column_number: single.map(|field| field.item.clone()),
            item_number: single.map(|field| field.item.clone()),
            field_name: single.map(|field| field.name.clone()),
            rpt_month_year: record.and_then(Record::rpt_month_year),
            case_number: record.and_then(Record::case_number),
            error_message: message.into(),
            error_type: category,
            content_type: typed.map(|record| record.model.clone()),
            object_id: typed.map(|record| record.id),
            fields_json: fields_json(fields),
            values_json: record.map(|record| values_json(record, fields)),
            created_at: Utc::now(),
            deprecated: false,
        }
    }

    /// File level finding with no linkage
    pub fn precheck(&self, row_number: Option<usize>, message: impl Into<String>) -> ParserError {
        let context = ErrorContext {
            row_number,
            ..Default::default()
        };
        self.generate(ErrorCategory::PreCheck, context, message)
    }

    /// Line level structural finding
    pub fn record_precheck(
        &self,
        row_number: usize,
        schema: &RowSchema,
        message: impl Into<String>,
    ) -> ParserError {
        let context = ErrorContext::row(row_number).with_schema(schema);
        self.generate(ErrorCategory::RecordPreCheck, context, message)
    }

    pub fn field_value(
        &self,
        row_number: usize,
        schema: &RowSchema,
        record: &Record,
        field: &Field,
        message: impl Into<String>,
    ) -> ParserError {
        let fields = [field];
        let context = ErrorContext::row(row_number)
            .with_schema(schema)
            .with_record(record)
            .with_fields(&fields);
        self.generate(ErrorCategory::FieldValue, context, message)
    }

    pub fn value_consistency(
        &self,
        row_number: usize,
        schema: &RowSchema,
        record: &Record,
        fields: &[&Field],
        message: impl Into<String>,
    ) -> ParserError {
        let context = ErrorContext::row(row_number)
            .with_schema(schema)
            .with_record(record)
            .with_fields(fields);
        self.generate(ErrorCategory::ValueConsistency, context, message)
    }

    pub fn case_consistency(
        &self,
        row_number: usize,
        schema: &RowSchema,
        record: &Record,
        message: impl Into<String>,
    ) -> ParserError {
        let context = ErrorContext::row(row_number)
            .with_schema(schema)
            .with_record(record);
        self.generate(ErrorCategory::CaseConsistency, context, message)
    }
}

/// `{"friendly_name": {name: friendly}, "item_numbers": {name: item}}`
fn fields_json(fields: &[&Field]) -> Option<Value> {
    if fields.is_empty() {
        return None;
    }
    let mut friendly_names = Map::new();
    let mut item_numbers = Map::new();
    for field in fields {
        friendly_names.insert(field.name.clone(), Value::from(field.friendly_name.clone()));
        item_numbers.insert(field.name.clone(), Value::from(field.item.clone()));
    }
    Some(json!({
        "friendly_name": friendly_names,
        "item_numbers": item_numbers,
    }))
}

/// Values of the involved fields, or of the whole record when none are named
fn values_json(record: &Record, fields: &[&Field]) -> Value {
    let mut values = Map::new();
    if fields.is_empty() {
        for (name, value) in record.values() {
            values.insert(name.clone(), json!(value));
        }
    } else {
        for field in fields {
            let value = record
                .get_field(&field.name)
                .map(|value| json!(value))
                .unwrap_or(Value::Null);
            values.insert(field.name.clone(), value);
        }
    }
    Value::Object(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{FieldValue, ModelRecord};
    use crate::app::services::fixed_width::RecordShape;

    fn schema_with_fields() -> RowSchema {
        RowSchema::new("T1", RecordShape::Model("TANF_T1".to_string())).with_fields(vec![
            Field::numeric("4", "RPT_MONTH_YEAR", "Reporting Year and Month", 2, 8),
            Field::alphanumeric("6", "CASE_NUMBER", "Case Number", 8, 19),
            Field::numeric("9", "DISPOSITION", "Disposition", 30, 31),
        ])
    }

    fn typed_record() -> Record {
        let mut record = ModelRecord::new("TANF_T1", "T1", 3);
        record.set_field("RPT_MONTH_YEAR", FieldValue::Number(202010));
        record.set_field("CASE_NUMBER", FieldValue::from("11111111112"));
        record.set_field("DISPOSITION", FieldValue::Number(3));
        Record::Typed(record)
    }

    #[test]
    fn test_field_value_error_links_record_and_field() {
        let generator = ErrorGenerator::new(Uuid::new_v4());
        let schema = schema_with_fields();
        let record = typed_record();
        let field = schema.get_field_by_name("DISPOSITION").unwrap();

        let error = generator.field_value(3, &schema, &record, field, "bad disposition");

        assert_eq!(error.error_type, ErrorCategory::FieldValue);
        assert_eq!(error.row_number, Some(3));
        assert_eq!(error.item_number.as_deref(), Some("9"));
        assert_eq!(error.field_name.as_deref(), Some("DISPOSITION"));
        assert_eq!(error.rpt_month_year, Some(202010));
        assert_eq!(error.case_number.as_deref(), Some("11111111112"));
        assert_eq!(error.content_type.as_deref(), Some("TANF_T1"));
        assert_eq!(error.object_id, record.as_typed().map(|r| r.id));

        let fields_json = error.fields_json.unwrap();
        assert_eq!(fields_json["friendly_name"]["DISPOSITION"], "Disposition");
        assert_eq!(fields_json["item_numbers"]["DISPOSITION"], "9");
        assert_eq!(error.values_json.unwrap()["DISPOSITION"], 3);
    }

    #[test]
    fn test_precheck_contract_drops_linkage() {
        let generator = ErrorGenerator::new(Uuid::new_v4());
        let schema = schema_with_fields();
        let record = typed_record();
        let field = schema.get_field_by_name("DISPOSITION").unwrap();
        let fields = [field];
        let context = ErrorContext::row(1)
            .with_schema(&schema)
            .with_record(&record)
            .with_fields(&fields);

        let error = generator.generate(ErrorCategory::PreCheck, context, "No records created.");

        assert_eq!(error.error_type, ErrorCategory::PreCheck);
        assert!(error.object_id.is_none());
        assert!(error.content_type.is_none());
        assert!(error.field_name.is_none());
        assert!(error.fields_json.is_none());
        assert!(error.values_json.is_none());
        assert!(error.case_number.is_none());
    }

    #[test]
    fn test_case_consistency_snapshot_covers_record() {
        let generator = ErrorGenerator::new(Uuid::new_v4());
        let schema = schema_with_fields();
        let record = typed_record();

        let error = generator.case_consistency(3, &schema, &record, "orphan");

        assert_eq!(error.error_type, ErrorCategory::CaseConsistency);
        assert!(error.fields_json.is_none());
        let values = error.values_json.unwrap();
        assert_eq!(values["CASE_NUMBER"], "11111111112");
        assert_eq!(values["RPT_MONTH_YEAR"], 202010);
    }

    #[test]
    fn test_file_precheck_generator_forces_category() {
        let generator = ErrorGenerator::file_precheck(Uuid::new_v4());
        let schema = schema_with_fields();
        let record = typed_record();
        let field = schema.get_field_by_name("DISPOSITION").unwrap();

        let error = generator.field_value(1, &schema, &record, field, "bad header");

        assert_eq!(error.error_type, ErrorCategory::PreCheck);
        assert!(error.object_id.is_none());
    }

    #[test]
    fn test_maker_builds_requested_category() {
        let generator = ErrorGenerator::new(Uuid::new_v4());
        let make = generator.maker(ErrorCategory::RecordPreCheck);

        let error = make(ErrorContext::row(7), "T1: record length is 3 characters but must be 156.");

        assert_eq!(error.error_type, ErrorCategory::RecordPreCheck);
        assert_eq!(error.row_number, Some(7));
        assert_eq!(error.file_id, generator.file_id());
    }
}
