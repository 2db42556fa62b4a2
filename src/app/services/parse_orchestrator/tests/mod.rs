//! Fixtures for orchestrator tests
//!
//! Submissions are assembled from the catalog line fixtures and parsed into an
//! in-memory store, or into one of the faulty stores below.

use crate::app::models::{
    ErrorLocation, ModelRecord, ParserError, ProgramType, Section, Submission,
};
use crate::app::services::catalog::SchemaCatalog;
use crate::app::services::catalog::tests::{header_line, trailer_line};
use crate::app::services::parse_orchestrator::{
    InMemoryStore, ParseOrchestrator, ParseOutcome, RecordFilter, RecordStore,
};
use crate::config::ParserConfig;
use crate::{Error, Result};
use std::sync::Arc;
use uuid::Uuid;


pub const CASE: &str = "11111111111";
pub const OTHER_CASE: &str = "22222222222";

pub fn submission(program: ProgramType, section: Section) -> Submission {
    Submission::new(program, section, 2020, 4).unwrap()
}

pub fn orchestrator() -> ParseOrchestrator<InMemoryStore> {
    orchestrator_with(ParserConfig::default(), InMemoryStore::new())
}

pub fn orchestrator_with<S: RecordStore>(config: ParserConfig, store: S) -> ParseOrchestrator<S> {
    ParseOrchestrator::new(Arc::new(SchemaCatalog::standard()), config, store).unwrap()
}

/// Header, data lines and a trailer counting them
pub fn fixed_width_file(section: &str, data: &[String]) -> Vec<u8> {
    let mut lines = vec![header_line(section, "TAN", "", false)];
    lines.extend(data.iter().cloned());
    lines.push(trailer_line(data.len()));
    lines.join("\n").into_bytes()
}

pub fn lines(lines: &[String]) -> Vec<u8> {
    lines.join("\n").into_bytes()
}

pub fn messages(outcome: &ParseOutcome, location: &ErrorLocation) -> Vec<String> {
    outcome
        .errors
        .get(location)
        .map(|errors| errors.iter().map(|e| e.error_message.clone()).collect())
        .unwrap_or_default()
}

pub fn line(line_number: usize) -> ErrorLocation {
    ErrorLocation::Line {
        line_number,
        record_index: 0,
    }
}

/// Store that silently drops one record of every batch of `model`
#[derive(Debug, Default)]
pub struct LossyStore {
    pub inner: InMemoryStore,
    pub model: String,
}

impl RecordStore for LossyStore {
    fn bulk_create(
        &mut self,
        submission: Uuid,
        model: &str,
        mut records: Vec<ModelRecord>,
    ) -> Result<usize> {
        if model == self.model {
            records.pop();
        }
        self.inner.bulk_create(submission, model, records)
    }

    fn delete_records(
        &mut self,
        submission: Uuid,
        model: &str,
        filter: &RecordFilter,
    ) -> Result<usize> {
        self.inner.delete_records(submission, model, filter)
    }

    fn count(&self, submission: Uuid, model: &str) -> Result<usize> {
        self.inner.count(submission, model)
    }

    fn models(&self, submission: Uuid) -> Result<Vec<String>> {
        self.inner.models(submission)
    }

    fn records(&self, submission: Uuid, model: &str) -> Result<Vec<ModelRecord>> {
        self.inner.records(submission, model)
    }

    fn bulk_create_errors(&mut self, submission: Uuid, errors: Vec<ParserError>) -> Result<usize> {
        self.inner.bulk_create_errors(submission, errors)
    }

    fn delete_errors(&mut self, submission: Uuid) -> Result<usize> {
        self.inner.delete_errors(submission)
    }

    fn errors(&self, submission: Uuid) -> Result<Vec<ParserError>> {
        self.inner.errors(submission)
    }
}

/// Store that cannot persist findings
#[derive(Debug, Default)]
pub struct ErrorlessStore {
    pub inner: InMemoryStore,
}

impl RecordStore for ErrorlessStore {
    fn bulk_create(
        &mut self,
        submission: Uuid,
        model: &str,
        records: Vec<ModelRecord>,
    ) -> Result<usize> {
        self.inner.bulk_create(submission, model, records)
    }

    fn delete_records(
        &mut self,
        submission: Uuid,
        model: &str,
        filter: &RecordFilter,
    ) -> Result<usize> {
        self.inner.delete_records(submission, model, filter)
    }

    fn count(&self, submission: Uuid, model: &str) -> Result<usize> {
        self.inner.count(submission, model)
    }

    fn models(&self, submission: Uuid) -> Result<Vec<String>> {
        self.inner.models(submission)
    }

    fn records(&self, submission: Uuid, model: &str) -> Result<Vec<ModelRecord>> {
        self.inner.records(submission, model)
    }

    fn bulk_create_errors(&mut self, _submission: Uuid, _errors: Vec<ParserError>) -> Result<usize> {
        Err(Error::storage("error table is read-only"))
    }

    fn delete_errors(&mut self, submission: Uuid) -> Result<usize> {
        self.inner.delete_errors(submission)
    }

    fn errors(&self, submission: Uuid) -> Result<Vec<ParserError>> {
        self.inner.errors(submission)
    }
}
