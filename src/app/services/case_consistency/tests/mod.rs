//! Fixtures for case consistency tests
//!
//! A [`Harness`] parses catalog fixture lines with the real schemas and feeds
//! the records to a validator in file order.

use crate::app::models::{ParseContext, ProgramType, Section};
use crate::app::services::case_consistency::CaseConsistencyValidator;
use crate::app::services::catalog::tests::{context, generator, raw};
use crate::app::services::catalog::tanf;
use crate::app::services::fixed_width::RowSchema;
use std::sync::Arc;


pub const CASE: &str = "11111111111";
pub const OTHER_CASE: &str = "22222222222";
pub const TERRITORY_FIPS: i64 = 72;

pub struct Harness {
    pub validator: CaseConsistencyValidator,
    context: ParseContext,
    schemas: Vec<Arc<RowSchema>>,
    next_line: usize,
}

impl Harness {
    pub fn active() -> Self {
        let program = ProgramType::Tanf;
        let schemas = vec![
            Arc::new(tanf::family(program)),
            Arc::new(tanf::adult(program)),
        ];
        Self::new(program, Section::Active, context(program, Section::Active), schemas)
    }

    pub fn closed() -> Self {
        Self::closed_with(context(ProgramType::Tanf, Section::Closed))
    }

    pub fn closed_territory() -> Self {
        Self::closed_with(
            context(ProgramType::Tanf, Section::Closed).with_state_fips(Some(TERRITORY_FIPS)),
        )
    }

    fn closed_with(context: ParseContext) -> Self {
        let program = ProgramType::Tanf;
        let schemas = vec![
            Arc::new(tanf::closed_family(program)),
            Arc::new(tanf::closed_person(program)),
        ];
        Self::new(program, Section::Closed, context, schemas)
    }

    pub fn new(
        program: ProgramType,
        section: Section,
        context: ParseContext,
        schemas: Vec<Arc<RowSchema>>,
    ) -> Self {
        let validator =
            CaseConsistencyValidator::new(program, section, context.clone(), generator());
        Self {
            validator,
            context,
            schemas,
            next_line: 2,
        }
    }

    fn schema_for(&self, line: &str) -> Arc<RowSchema> {
        let token = &line[..2];
        self.schemas
            .iter()
            .find(|schema| schema.record_type() == token)
            .cloned()
            .expect("fixture line should match a harness schema")
    }

    /// Parse and add a line, asserting it passed the lower tiers
    pub fn add(&mut self, line: &str) -> usize {
        let (generated, is_valid) = self.add_flagged(line, None);
        assert!(is_valid, "fixture line should be valid: {}", line);
        generated
    }

    /// Parse and add a line; `lower_tier_errors` overrides the parse outcome
    pub fn add_flagged(&mut self, line: &str, lower_tier_errors: Option<bool>) -> (usize, bool) {
        let schema = self.schema_for(line);
        let row = raw(line, self.next_line);
        self.next_line += 1;
        let parsed = schema.parse_and_validate(&row, &self.context, &generator());
        let record = parsed.record.expect("fixture line should parse");
        let had_errors = lower_tier_errors.unwrap_or(!parsed.is_valid);
        (
            self.validator.add_record(&record, &schema, had_errors),
            parsed.is_valid,
        )
    }

    /// Validate the last case and return every message generated so far
    pub fn finish(&mut self) -> Vec<String> {
        self.validator.validate();
        self.messages()
    }

    pub fn messages(&self) -> Vec<String> {
        self.validator
            .generated_errors()
            .iter()
            .map(|error| error.error_message.clone())
            .collect()
    }
}
