//! Buffers of records and findings awaiting persistence

use crate::app::models::{ErrorLocation, ModelRecord, ParserError};
use std::collections::BTreeMap;

/// Parsed records grouped by model
#[derive(Debug, Clone, Default)]
pub struct UnsavedRecords {
    by_model: BTreeMap<String, Vec<ModelRecord>>,
    len: usize,
}

impl UnsavedRecords {
    pub fn push(&mut self, record: ModelRecord) {
        self.by_model
            .entry(record.model.clone())
            .or_default()
            .push(record);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drain every buffered record, grouped by model
    pub fn take(&mut self) -> BTreeMap<String, Vec<ModelRecord>> {
        self.len = 0;
        std::mem::take(&mut self.by_model)
    }

    pub fn clear(&mut self) {
        self.by_model.clear();
        self.len = 0;
    }
}

/// Findings grouped by where they were raised
#[derive(Debug, Clone, Default)]
pub struct UnsavedErrors {
    by_location: BTreeMap<ErrorLocation, Vec<ParserError>>,
    len: usize,
}

impl UnsavedErrors {
    pub fn extend(&mut self, location: ErrorLocation, errors: Vec<ParserError>) {
        if errors.is_empty() {
            return;
        }
        self.len += errors.len();
        self.by_location.entry(location).or_default().extend(errors);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drain every buffered finding in location order
    pub fn take(&mut self) -> Vec<ParserError> {
        self.len = 0;
        std::mem::take(&mut self.by_location)
            .into_values()
            .flatten()
            .collect()
    }

    pub fn clear(&mut self) {
        self.by_location.clear();
        self.len = 0;
    }
}
