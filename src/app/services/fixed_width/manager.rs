//! Ordered set of schemas sharing one record-type token
//!
//! Most record types map to a single schema. Lines that hold several logical
//! records (two children on one line, three months on one aggregate line) map
//! to one schema per record, each claiming its own slice of the line.

use super::row::Row;
use super::schema::{ParsedLine, RowSchema};
use crate::app::models::ParseContext;
use crate::app::services::error_generator::ErrorGenerator;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SchemaManager {
    schemas: Vec<Arc<RowSchema>>,
}

impl SchemaManager {
    pub fn new(schemas: Vec<RowSchema>) -> Self {
        Self {
            schemas: schemas.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn single(schema: RowSchema) -> Self {
        Self::new(vec![schema])
    }

    pub fn schemas(&self) -> &[Arc<RowSchema>] {
        &self.schemas
    }

    /// First schema, which carries the line-level duplicate identity
    pub fn primary(&self) -> Option<&Arc<RowSchema>> {
        self.schemas.first()
    }

    /// Run every schema over the row, in declaration order
    pub fn parse_and_validate(
        &self,
        row: &Row,
        context: &ParseContext,
        generator: &ErrorGenerator,
    ) -> Vec<ParsedLine> {
        self.schemas
            .iter()
            .map(|schema| schema.parse_and_validate(row, context, generator))
            .collect()
    }
}
