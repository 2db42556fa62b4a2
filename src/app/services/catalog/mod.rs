//! Schema catalog and record-type resolution
//!
//! The catalog maps `(program, section)` to the schemas of every record type
//! that may appear in such a file. It is built once and shared read-only
//! between concurrent parses; everything that varies per file travels in a
//! [`ParseContext`](crate::app::models::ParseContext) instead.
//!
//! - [`header`] - header and trailer schemas plus header cross-checks
//! - [`tanf`] - TANF, Tribal TANF and SSP-MOE case layouts
//! - [`fra`] - FRA work-outcomes tuple layout
//! - [`transforms`] - decryption and derived-month transforms

pub mod fra;
pub mod header;
pub mod tanf;
pub mod transforms;

#[cfg(test)]
pub mod tests;

pub use header::HeaderInfo;

use crate::app::models::{ProgramType, Section};
use crate::app::services::fixed_width::{Row, RowSchema, SchemaManager};
use crate::constants::messages;
use crate::constants::record_types::FRA_EXITER;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Why a row could not be matched to a schema
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{}", messages::MISSING_RECORD_TYPE)]
    MissingRecordType,

    #[error("{}", messages::UNKNOWN_RECORD_TYPE)]
    UnknownRecordType { token: String },

    #[error("No schemas are configured for {program} {section} files.")]
    UnsupportedSection {
        program: ProgramType,
        section: Section,
    },
}

/// Immutable registry of every schema the engine can parse
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    header: Arc<RowSchema>,
    trailer: Arc<RowSchema>,
    sections: HashMap<(ProgramType, Section), BTreeMap<String, SchemaManager>>,
}

impl Default for SchemaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCatalog {
    /// Catalog with header and trailer schemas but no data layouts
    pub fn new() -> Self {
        Self {
            header: Arc::new(header::header_schema()),
            trailer: Arc::new(header::trailer_schema()),
            sections: HashMap::new(),
        }
    }

    /// Built-in layouts for every supported program and section
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        for program in [ProgramType::Tanf, ProgramType::TribalTanf, ProgramType::Ssp] {
            let token = |number| tanf::record_type(program, number);
            let single = SchemaManager::single;

            catalog.register(program, Section::Active, token(1), single(tanf::family(program)));
            catalog.register(program, Section::Active, token(2), single(tanf::adult(program)));
            catalog.register(program, Section::Active, token(3), tanf::children(program));
            catalog.register(
                program,
                Section::Closed,
                token(4),
                single(tanf::closed_family(program)),
            );
            catalog.register(
                program,
                Section::Closed,
                token(5),
                single(tanf::closed_person(program)),
            );
            catalog.register(program, Section::Aggregate, token(6), tanf::aggregates(program));
        }
        catalog.register(
            ProgramType::Fra,
            Section::WorkOutcomes,
            FRA_EXITER,
            SchemaManager::single(fra::exiter()),
        );

        catalog
    }

    pub fn register(
        &mut self,
        program: ProgramType,
        section: Section,
        token: impl Into<String>,
        manager: SchemaManager,
    ) {
        self.sections
            .entry((program, section))
            .or_default()
            .insert(token.into(), manager);
    }

    pub fn header(&self) -> &Arc<RowSchema> {
        &self.header
    }

    pub fn trailer(&self) -> &Arc<RowSchema> {
        &self.trailer
    }

    /// Record-type tokens and their schemas for one kind of file
    pub fn managers(
        &self,
        program: ProgramType,
        section: Section,
    ) -> Option<&BTreeMap<String, SchemaManager>> {
        self.sections.get(&(program, section))
    }

    /// Every configured `(program, section)` pair in a stable order
    pub fn sections(&self) -> Vec<(ProgramType, Section)> {
        let mut keys: Vec<_> = self.sections.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Distinct persisted model names for one kind of file
    pub fn model_names(&self, program: ProgramType, section: Section) -> Vec<String> {
        let mut names: Vec<String> = self
            .managers(program, section)
            .into_iter()
            .flat_map(|managers| managers.values())
            .flat_map(|manager| manager.schemas())
            .filter_map(|schema| schema.model_name().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn resolve(
        &self,
        program: ProgramType,
        section: Section,
        token: &str,
    ) -> Result<&SchemaManager, ResolveError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ResolveError::MissingRecordType);
        }
        let managers = self
            .managers(program, section)
            .ok_or(ResolveError::UnsupportedSection { program, section })?;
        managers
            .get(token)
            .ok_or_else(|| ResolveError::UnknownRecordType {
                token: token.to_string(),
            })
    }

    /// Schemas for a row, keyed by its leading record-type token
    pub fn resolve_row(
        &self,
        row: &Row,
        program: ProgramType,
        section: Section,
    ) -> Result<&SchemaManager, ResolveError> {
        self.resolve(program, section, &row.record_type())
    }
}
