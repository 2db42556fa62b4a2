//! Storage collaborator for parsed records and findings
//!
//! Every operation is scoped to one submission id so concurrent parses never
//! touch each other's rows.

use crate::app::models::{CaseKey, ModelRecord, ParserError};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Which records of a model a delete applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    Ids(Vec<Uuid>),
    /// Every record whose case number and reporting month is listed
    Cases(Vec<CaseKey>),
}

impl RecordFilter {
    pub fn matches(&self, record: &ModelRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Ids(ids) => ids.contains(&record.id),
            RecordFilter::Cases(cases) => record
                .case_key()
                .is_some_and(|key| cases.contains(&key)),
        }
    }
}

/// Backend that persists records and findings in batches
pub trait RecordStore: Send {
    /// Persist records of one model, returning how many were stored
    fn bulk_create(
        &mut self,
        submission: Uuid,
        model: &str,
        records: Vec<ModelRecord>,
    ) -> Result<usize>;

    /// Delete matching records of one model, returning how many were removed
    fn delete_records(
        &mut self,
        submission: Uuid,
        model: &str,
        filter: &RecordFilter,
    ) -> Result<usize>;

    fn count(&self, submission: Uuid, model: &str) -> Result<usize>;

    /// Models holding at least one record of the submission
    fn models(&self, submission: Uuid) -> Result<Vec<String>>;

    fn records(&self, submission: Uuid, model: &str) -> Result<Vec<ModelRecord>>;

    fn bulk_create_errors(&mut self, submission: Uuid, errors: Vec<ParserError>) -> Result<usize>;

    fn delete_errors(&mut self, submission: Uuid) -> Result<usize>;

    fn errors(&self, submission: Uuid) -> Result<Vec<ParserError>>;
}

/// Records and findings held in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: HashMap<Uuid, BTreeMap<String, Vec<ModelRecord>>>,
    errors: HashMap<Uuid, Vec<ParserError>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submissions with stored records or findings
    pub fn submissions(&self) -> BTreeSet<Uuid> {
        self.records
            .keys()
            .chain(self.errors.keys())
            .copied()
            .collect()
    }
}

impl RecordStore for InMemoryStore {
    fn bulk_create(
        &mut self,
        submission: Uuid,
        model: &str,
        records: Vec<ModelRecord>,
    ) -> Result<usize> {
        let created = records.len();
        self.records
            .entry(submission)
            .or_default()
            .entry(model.to_string())
            .or_default()
            .extend(records.into_iter().map(|mut record| {
                record.submission_id = Some(submission);
                record
            }));
        Ok(created)
    }

    fn delete_records(
        &mut self,
        submission: Uuid,
        model: &str,
        filter: &RecordFilter,
    ) -> Result<usize> {
        let Some(records) = self
            .records
            .get_mut(&submission)
            .and_then(|models| models.get_mut(model))
        else {
            return Ok(0);
        };
        let before = records.len();
        records.retain(|record| !filter.matches(record));
        Ok(before - records.len())
    }

    fn count(&self, submission: Uuid, model: &str) -> Result<usize> {
        Ok(self
            .records
            .get(&submission)
            .and_then(|models| models.get(model))
            .map_or(0, Vec::len))
    }

    fn models(&self, submission: Uuid) -> Result<Vec<String>> {
        Ok(self
            .records
            .get(&submission)
            .map(|models| {
                models
                    .iter()
                    .filter(|(_, records)| !records.is_empty())
                    .map(|(model, _)| model.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn records(&self, submission: Uuid, model: &str) -> Result<Vec<ModelRecord>> {
        Ok(self
            .records
            .get(&submission)
            .and_then(|models| models.get(model))
            .cloned()
            .unwrap_or_default())
    }

    fn bulk_create_errors(&mut self, submission: Uuid, errors: Vec<ParserError>) -> Result<usize> {
        let created = errors.len();
        self.errors.entry(submission).or_default().extend(errors);
        Ok(created)
    }

    fn delete_errors(&mut self, submission: Uuid) -> Result<usize> {
        Ok(self.errors.remove(&submission).map_or(0, |errors| errors.len()))
    }

    fn errors(&self, submission: Uuid) -> Result<Vec<ParserError>> {
        Ok(self.errors.get(&submission).cloned().unwrap_or_default())
    }
}

/// Thread-safe handle to one in-memory backend shared by concurrent parses
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<InMemoryStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryStore>> {
        self.inner
            .lock()
            .map_err(|_| Error::storage("record store lock was poisoned"))
    }

    /// Copy of the backend's current contents
    pub fn snapshot(&self) -> Result<InMemoryStore> {
        Ok(self.lock()?.clone())
    }
}

impl RecordStore for SharedStore {
    fn bulk_create(
        &mut self,
        submission: Uuid,
        model: &str,
        records: Vec<ModelRecord>,
    ) -> Result<usize> {
        self.lock()?.bulk_create(submission, model, records)
    }

    fn delete_records(
        &mut self,
        submission: Uuid,
        model: &str,
        filter: &RecordFilter,
    ) -> Result<usize> {
        self.lock()?.delete_records(submission, model, filter)
    }

    fn count(&self, submission: Uuid, model: &str) -> Result<usize> {
        self.lock()?.count(submission, model)
    }

    fn models(&self, submission: Uuid) -> Result<Vec<String>> {
        self.lock()?.models(submission)
    }

    fn records(&self, submission: Uuid, model: &str) -> Result<Vec<ModelRecord>> {
        self.lock()?.records(submission, model)
    }

    fn bulk_create_errors(&mut self, submission: Uuid, errors: Vec<ParserError>) -> Result<usize> {
        self.lock()?.bulk_create_errors(submission, errors)
    }

    fn delete_errors(&mut self, submission: Uuid) -> Result<usize> {
        self.lock()?.delete_errors(submission)
    }

    fn errors(&self, submission: Uuid) -> Result<Vec<ParserError>> {
        self.lock()?.errors(submission)
    }
}
