//! Streaming parse of one submission
//!
//! Lines are parsed in file order. Records and findings are buffered and
//! flushed in batches; duplicates and case consistency are resolved after the
//! last line, followed by the purge passes and the file summary.

use super::decoder::{Decoder, DetectingDecoder, Encoding};
use super::stats::ParseStats;
use super::storage::{RecordFilter, RecordStore};
use super::unsaved::{UnsavedErrors, UnsavedRecords};
use crate::app::models::{
    ErrorLocation, ErrorMap, ModelRecord, ParseContext, ParserError, Section, Submission,
};
use crate::app::services::case_consistency::CaseConsistencyValidator;
use crate::app::services::catalog::{HeaderInfo, SchemaCatalog};
use crate::app::services::duplicates::{DuplicateManager, ErrorLevel};
use crate::app::services::error_generator::ErrorGenerator;
use crate::app::services::file_summary::FileSummary;
use crate::app::services::fixed_width::{RawRow, Row, TupleRow};
use crate::config::ParserConfig;
use crate::constants::messages;
use crate::constants::record_types::{FRA_EXITER, HEADER, TRAILER};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Everything a finished parse produced
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub submission: Submission,
    /// Findings grouped by location, serialized with string keys
    #[serde(serialize_with = "serialize_error_map")]
    pub errors: ErrorMap,
    pub summary: FileSummary,
    pub stats: ParseStats,
    pub encoding: Option<Encoding>,
}

impl ParseOutcome {
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Every finding in location order
    pub fn all_errors(&self) -> impl Iterator<Item = &ParserError> {
        self.errors.values().flatten()
    }
}

fn serialize_error_map<S>(errors: &ErrorMap, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(errors.len()))?;
    for (location, errors) in errors {
        map.serialize_entry(&location.to_string(), errors)?;
    }
    map.end()
}

/// Parses submissions against a shared catalog into a record store
#[derive(Debug)]
pub struct ParseOrchestrator<S: RecordStore> {
    catalog: Arc<SchemaCatalog>,
    config: ParserConfig,
    store: S,
    decoder: Box<dyn Decoder>,
}

impl<S: RecordStore> ParseOrchestrator<S> {
    /// Fails when a batch size is zero
    pub fn new(catalog: Arc<SchemaCatalog>, config: ParserConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            store,
            decoder: Box::new(DetectingDecoder),
        })
    }

    pub fn with_decoder(mut self, decoder: Box<dyn Decoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Parse one submitted file
    ///
    /// Findings about the file are returned in the outcome. An error is only
    /// returned when findings could not be persisted, after the submission's
    /// records have been rolled back.
    pub fn parse(&mut self, submission: &Submission, bytes: &[u8]) -> Result<ParseOutcome> {
        info!(
            "Parsing {} {} submission {} for {}Q{}",
            submission.program, submission.section, submission.id, submission.year, submission.quarter
        );

        let mut run = ParseRun::new(&self.catalog, &self.config, &mut self.store, submission);
        match self.decoder.decode(bytes) {
            Ok((text, encoding)) => {
                debug!("Decoded submission {} as {}", submission.id, encoding);
                run.encoding = Some(encoding);
                if submission.program.is_fixed_width() {
                    run.parse_fixed_width(&text)?;
                } else {
                    run.parse_tuple_rows(&text)?;
                }
            }
            Err(e) => {
                run.precheck(ErrorLocation::Document, None, e.to_string());
                run.stopped = true;
            }
        }
        run.finish()
    }
}

/// Flow control after a structural check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// State of one parse
struct ParseRun<'a, S: RecordStore> {
    catalog: &'a SchemaCatalog,
    config: &'a ParserConfig,
    store: &'a mut S,
    submission: &'a Submission,
    context: ParseContext,
    generator: ErrorGenerator,
    unsaved_records: UnsavedRecords,
    unsaved_errors: UnsavedErrors,
    errors: ErrorMap,
    duplicates: DuplicateManager,
    cases: CaseConsistencyValidator,
    stats: ParseStats,
    encoding: Option<Encoding>,
    /// Parsing ended early; post-parse passes are skipped
    stopped: bool,
}

impl<'a, S: RecordStore> ParseRun<'a, S> {
    fn new(
        catalog: &'a SchemaCatalog,
        config: &'a ParserConfig,
        store: &'a mut S,
        submission: &'a Submission,
    ) -> Self {
        let context = ParseContext::for_submission(submission);
        let generator = ErrorGenerator::new(submission.id);
        let cases = CaseConsistencyValidator::new(
            submission.program,
            submission.section,
            context.clone(),
            generator.clone(),
        );
        Self {
            catalog,
            config,
            store,
            submission,
            context,
            generator,
            unsaved_records: UnsavedRecords::default(),
            unsaved_errors: UnsavedErrors::default(),
            errors: ErrorMap::new(),
            duplicates: DuplicateManager::new(config.ignore_duplicate_error_precedence),
            cases,
            stats: ParseStats::new(),
            encoding: None,
            stopped: false,
        }
    }

    fn push_errors(&mut self, location: ErrorLocation, errors: Vec<ParserError>) {
        if errors.is_empty() {
            return;
        }
        self.stats.errors_generated += errors.len();
        self.errors
            .entry(location.clone())
            .or_default()
            .extend(errors.iter().cloned());
        self.unsaved_errors.extend(location, errors);
    }

    fn precheck(&mut self, location: ErrorLocation, row_number: Option<usize>, message: String) {
        let error = self.generator.precheck(row_number, message);
        self.push_errors(location, vec![error]);
    }

    fn parse_fixed_width(&mut self, text: &str) -> Result<()> {
        let mut lines = text.lines().enumerate().map(|(index, line)| (index + 1, line));
        let (_, header) = lines.next().unwrap_or((1, ""));
        self.stats.total_lines += 1;
        if self.parse_header(header) == Flow::Stop {
            self.stopped = true;
            return Ok(());
        }

        let mut trailer_seen = false;
        let mut last_was_trailer = false;
        for (line_number, line) in lines {
            self.stats.total_lines += 1;
            if line.trim().is_empty() {
                continue;
            }
            let row: Row = RawRow::new(line, line_number).into();
            let token = row.record_type();

            if token == HEADER {
                warn!("Multiple headers in submission {}", self.submission.id);
                self.rollback();
                self.precheck(
                    ErrorLocation::Document,
                    Some(line_number),
                    messages::MULTIPLE_HEADERS.to_string(),
                );
                self.stopped = true;
                return Ok(());
            }

            if token == TRAILER {
                if trailer_seen {
                    self.precheck(
                        ErrorLocation::Trailer,
                        Some(line_number),
                        messages::MULTIPLE_TRAILERS.to_string(),
                    );
                } else {
                    self.parse_trailer(&row);
                }
                trailer_seen = true;
                last_was_trailer = true;
                continue;
            }

            last_was_trailer = false;
            self.parse_data_row(&row);
            self.maybe_flush(line_number)?;
        }

        if !last_was_trailer {
            self.precheck(
                ErrorLocation::Trailer,
                None,
                messages::MISSING_TRAILER.to_string(),
            );
        }
        Ok(())
    }

    /// Validate the header and bind its facts to the parse context
    fn parse_header(&mut self, line: &str) -> Flow {
        let row: Row = RawRow::new(line, 1).into();
        let generator = ErrorGenerator::file_precheck(self.submission.id);
        let parsed = self
            .catalog
            .header()
            .parse_and_validate(&row, &ParseContext::default(), &generator);
        if !parsed.is_valid {
            self.push_errors(ErrorLocation::Header, parsed.errors);
            return Flow::Stop;
        }

        let Some(info) = parsed.record.as_ref().and_then(HeaderInfo::from_record) else {
            self.precheck(
                ErrorLocation::Header,
                Some(1),
                "Header is missing required values.".to_string(),
            );
            return Flow::Stop;
        };

        let checks = [
            (ErrorLocation::Header, info.check_program(self.submission)),
            (ErrorLocation::Document, info.check_section(self.submission)),
            (ErrorLocation::Document, info.check_reporting_period(self.submission)),
        ];
        let mut flow = Flow::Continue;
        for (location, message) in checks {
            if let Some(message) = message {
                self.precheck(location, Some(1), message);
                flow = Flow::Stop;
            }
        }
        if flow == Flow::Stop {
            return flow;
        }

        debug!(
            "Header for submission {}: encrypted={}, fips={:?}, tribe={:?}",
            self.submission.id, info.is_encrypted, info.state_fips, info.tribe_code
        );
        self.context = self
            .context
            .clone()
            .with_encryption(info.is_encrypted)
            .with_state_fips(info.state_fips)
            .with_tribe_code(info.tribe_code);
        self.cases = CaseConsistencyValidator::new(
            self.submission.program,
            self.submission.section,
            self.context.clone(),
            self.generator.clone(),
        );
        Flow::Continue
    }

    fn parse_trailer(&mut self, row: &Row) {
        let generator = ErrorGenerator::file_precheck(self.submission.id);
        let parsed = self
            .catalog
            .trailer()
            .parse_and_validate(row, &self.context, &generator);
        self.push_errors(ErrorLocation::Trailer, parsed.errors);
    }

    /// Comma-separated rows, one record per row
    fn parse_tuple_rows(&mut self, text: &str) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        for (index, result) in reader.records().enumerate() {
            let line_number = result
                .as_ref()
                .ok()
                .and_then(|record| record.position())
                .map_or(index + 1, |position| position.line() as usize);
            self.stats.total_lines += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    self.stats.data_lines += 1;
                    self.stats.lines_failed_precheck += 1;
                    self.precheck(
                        ErrorLocation::Line {
                            line_number,
                            record_index: 0,
                        },
                        Some(line_number),
                        format!("Row could not be read: {}", e),
                    );
                    continue;
                }
            };

            let values: Vec<String> = record.iter().map(str::to_string).collect();
            if values.iter().all(|value| value.is_empty()) {
                continue;
            }
            if index == 0 && is_column_title(&values) {
                debug!("Skipping column title row of submission {}", self.submission.id);
                continue;
            }

            let row: Row = TupleRow::new(values, FRA_EXITER, line_number).into();
            self.parse_data_row(&row);
            self.maybe_flush(line_number)?;
        }
        Ok(())
    }

    /// Resolve, parse and validate one data row and buffer what it produced
    fn parse_data_row(&mut self, row: &Row) {
        let line_number = row.line_number();
        self.stats.data_lines += 1;

        let catalog = self.catalog;
        let managers = match catalog.resolve_row(
            row,
            self.submission.program,
            self.submission.section,
        ) {
            Ok(managers) => managers,
            Err(e) => {
                debug!("Line {}: {}", line_number, e);
                self.stats.lines_failed_precheck += 1;
                let error = self.generator.precheck(Some(line_number), e.to_string());
                self.push_errors(
                    ErrorLocation::Line {
                        line_number,
                        record_index: 0,
                    },
                    vec![error],
                );
                return;
            }
        };

        let parsed = managers.parse_and_validate(row, &self.context, &self.generator);
        let mut produced = false;
        for (record_index, (parsed, schema)) in parsed.into_iter().zip(managers.schemas()).enumerate()
        {
            self.push_errors(
                ErrorLocation::Line {
                    line_number,
                    record_index,
                },
                parsed.errors,
            );
            let Some(record) = parsed.record else {
                continue;
            };
            self.duplicates
                .add_record(&record, schema, row, &self.generator);
            self.cases.add_record(&record, schema, !parsed.is_valid);
            if let Some(mut typed) = record.into_typed() {
                typed.submission_id = Some(self.submission.id);
                self.unsaved_records.push(typed);
                produced = true;
            }
        }
        if !produced {
            self.stats.lines_failed_precheck += 1;
        }
    }

    fn maybe_flush(&mut self, line_number: usize) -> Result<()> {
        if line_number % self.config.record_batch_size == 0 {
            self.flush_records();
        }
        if self.unsaved_errors.len() >= self.config.error_batch_size {
            self.flush_errors()?;
        }
        Ok(())
    }

    /// Persist buffered records; shortfalls are logged and only reduce the count
    fn flush_records(&mut self) {
        for (model, records) in self.unsaved_records.take() {
            let expected = records.len();
            self.stats.records_expected += expected;
            match self.store.bulk_create(self.submission.id, &model, records) {
                Ok(created) => {
                    if created < expected {
                        warn!(
                            "Only {} of {} {} records were created for submission {}",
                            created, expected, model, self.submission.id
                        );
                    }
                    self.stats.records_created += created;
                }
                Err(e) => warn!(
                    "Failed to create {} {} records for submission {}: {}",
                    expected, model, self.submission.id, e
                ),
            }
        }
    }

    fn flush_errors(&mut self) -> Result<()> {
        if self.unsaved_errors.is_empty() {
            return Ok(());
        }
        let errors = self.unsaved_errors.take();
        let count = errors.len();
        if let Err(e) = self.store.bulk_create_errors(self.submission.id, errors) {
            error!(
                "Failed to persist {} findings for submission {}: {}",
                count, self.submission.id, e
            );
            self.rollback();
            return Err(Error::rollback(
                self.submission.id.to_string(),
                format!("findings could not be saved: {}", e),
            ));
        }
        debug!("Persisted {} findings", count);
        Ok(())
    }

    /// Delete everything stored for the submission and forget buffered state
    fn rollback(&mut self) {
        error!("Rolling back submission {}", self.submission.id);
        self.stats.rolled_back = true;
        self.unsaved_records.clear();
        self.unsaved_errors.clear();
        self.errors.clear();
        self.stats.errors_generated = 0;

        match self.store.models(self.submission.id) {
            Ok(models) => {
                for model in models {
                    if let Err(e) =
                        self.store
                            .delete_records(self.submission.id, &model, &RecordFilter::All)
                    {
                        error!("Failed to roll back {} records: {}", model, e);
                    }
                }
            }
            Err(e) => error!("Failed to list models for rollback: {}", e),
        }
        if let Err(e) = self.store.delete_errors(self.submission.id) {
            error!("Failed to roll back findings: {}", e);
        }
        self.stats.records_created = 0;
        self.stats.records_expected = 0;
    }

    /// Delete the listed records, returning how many storage removed
    fn purge(&mut self, targets: impl IntoIterator<Item = (String, RecordFilter)>) -> usize {
        let mut removed = 0;
        for (model, filter) in targets {
            match self.store.delete_records(self.submission.id, &model, &filter) {
                Ok(count) => removed += count,
                Err(e) => warn!("Failed to purge {} records: {}", model, e),
            }
        }
        removed
    }

    fn purge_duplicates(&mut self, level: ErrorLevel) -> usize {
        let targets: Vec<(String, RecordFilter)> = self
            .duplicates
            .records_to_remove(level)
            .into_iter()
            .map(|(model, ids)| (model, RecordFilter::Ids(ids)))
            .collect();
        self.purge(targets)
    }

    fn purge_invalid_cases(&mut self) -> usize {
        let cases: Vec<_> = self.cases.invalid_cases().iter().cloned().collect();
        if cases.is_empty() {
            return 0;
        }
        let targets: Vec<(String, RecordFilter)> = self
            .catalog
            .model_names(self.submission.program, self.submission.section)
            .into_iter()
            .map(|model| (model, RecordFilter::Cases(cases.clone())))
            .collect();
        self.purge(targets)
    }

    /// Post-parse passes, final flushes and the summary
    fn finish(mut self) -> Result<ParseOutcome> {
        if !self.stopped {
            self.cases.validate();
            self.stats.cases_cached = self.cases.total_cases_cached;
            self.stats.cases_validated = self.cases.total_cases_validated;

            let mut cross_record = self.duplicates.generated_errors();
            cross_record.extend(self.cases.take_generated_errors());
            self.push_errors(ErrorLocation::Cases, cross_record);

            self.flush_records();
            if !self.stats.all_records_created() {
                self.rollback();
                self.precheck(
                    ErrorLocation::Document,
                    None,
                    messages::NOT_ALL_RECORDS_CREATED.to_string(),
                );
                self.flush_errors()?;
                return Ok(self.into_outcome(Vec::new()));
            }

            self.stats.duplicates_removed = self.purge_duplicates(ErrorLevel::Duplicate);
            self.stats.partial_duplicates_removed =
                self.purge_duplicates(ErrorLevel::PartialDuplicate);
            self.stats.case_records_removed = self.purge_invalid_cases();
            if self.stats.records_removed() > 0 {
                info!(
                    "Removed {} duplicate, {} partial duplicate and {} inconsistent case records",
                    self.stats.duplicates_removed,
                    self.stats.partial_duplicates_removed,
                    self.stats.case_records_removed
                );
            }

            let may_be_empty = self.submission.section == Section::Closed
                && self.stats.data_lines == self.stats.lines_failed_precheck;
            if self.stats.records_created == 0 && !may_be_empty {
                self.precheck(
                    ErrorLocation::Document,
                    None,
                    messages::NO_RECORDS_CREATED.to_string(),
                );
            }
        }

        self.flush_errors()?;
        let records = self.stored_records();
        info!(
            "Finished submission {}: {}",
            self.submission.id,
            self.stats.summary()
        );
        Ok(self.into_outcome(records))
    }

    fn stored_records(&self) -> Vec<ModelRecord> {
        let models = match self.store.models(self.submission.id) {
            Ok(models) => models,
            Err(e) => {
                warn!("Failed to list stored models: {}", e);
                return Vec::new();
            }
        };
        models
            .iter()
            .filter_map(|model| self.store.records(self.submission.id, model).ok())
            .flatten()
            .collect()
    }

    fn into_outcome(self, records: Vec<ModelRecord>) -> ParseOutcome {
        let summary = FileSummary::compute(self.submission, &self.errors, &records);
        ParseOutcome {
            submission: self.submission.clone(),
            errors: self.errors,
            summary,
            stats: self.stats,
            encoding: self.encoding,
        }
    }
}

/// A first row with no numeric cell is a column title row
fn is_column_title(values: &[String]) -> bool {
    !values
        .iter()
        .any(|value| !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()))
}
