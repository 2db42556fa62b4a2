//! Parse statistics

use serde::{Deserialize, Serialize};

/// Counters collected while parsing one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Physical lines read, including header and trailer
    pub total_lines: usize,

    /// Lines dispatched to a data schema
    pub data_lines: usize,

    /// Data lines that produced no record at all
    pub lines_failed_precheck: usize,

    /// Records handed to storage
    pub records_expected: usize,

    /// Records storage confirmed
    pub records_created: usize,

    /// Records deleted as exact duplicates
    pub duplicates_removed: usize,

    /// Records deleted as partial duplicates
    pub partial_duplicates_removed: usize,

    /// Records deleted because their case failed case consistency
    pub case_records_removed: usize,

    /// Findings generated across all tiers
    pub errors_generated: usize,

    /// Cases buffered by the case consistency validator
    pub cases_cached: usize,

    /// Cases the case consistency rules ran over
    pub cases_validated: usize,

    /// The submission was rolled back
    pub rolled_back: bool,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records left after every purge
    pub fn records_remaining(&self) -> usize {
        self.records_created.saturating_sub(self.records_removed())
    }

    pub fn records_removed(&self) -> usize {
        self.duplicates_removed + self.partial_duplicates_removed + self.case_records_removed
    }

    /// Whether storage accepted every record it was given
    pub fn all_records_created(&self) -> bool {
        self.records_created == self.records_expected
    }

    /// Share of data lines that produced at least one record, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.data_lines == 0 {
            0.0
        } else {
            let parsed = self.data_lines - self.lines_failed_precheck.min(self.data_lines);
            (parsed as f64 / self.data_lines as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} lines, {} records created, {} removed, {} errors",
            self.total_lines,
            self.records_created,
            self.records_removed(),
            self.errors_generated
        )
    }
}
