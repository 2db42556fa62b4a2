//! Acceptance status and per-month case aggregates of a submission

use crate::app::models::{ErrorCategory, ErrorLocation, ErrorMap, ModelRecord, Submission};
use chrono::Month;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryStatus {
    Pending,
    Accepted,
    #[serde(rename = "Accepted with Errors")]
    AcceptedWithErrors,
    Rejected,
}

impl SummaryStatus {
    /// Status implied by a parse's findings
    ///
    /// Any file precheck outside the trailer rejects the file.
    pub fn from_errors(errors: Option<&ErrorMap>) -> Self {
        let Some(errors) = errors else {
            return SummaryStatus::Pending;
        };
        if errors.values().all(Vec::is_empty) {
            return SummaryStatus::Accepted;
        }
        let rejected = errors
            .iter()
            .filter(|(location, _)| **location != ErrorLocation::Trailer)
            .flat_map(|(_, errors)| errors)
            .any(|error| error.error_type == ErrorCategory::PreCheck);
        if rejected {
            SummaryStatus::Rejected
        } else {
            SummaryStatus::AcceptedWithErrors
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Pending => "Pending",
            SummaryStatus::Accepted => "Accepted",
            SummaryStatus::AcceptedWithErrors => "Accepted with Errors",
            SummaryStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case counts for one reporting month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthAggregate {
    pub rpt_month_year: i64,
    pub month: String,
    pub total_cases: usize,
    pub cases_with_errors: usize,
    pub cases_without_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub submission_id: Uuid,
    pub status: SummaryStatus,
    pub case_aggregates: Vec<MonthAggregate>,
}

impl FileSummary {
    pub fn pending(submission_id: Uuid) -> Self {
        Self {
            submission_id,
            status: SummaryStatus::Pending,
            case_aggregates: Vec::new(),
        }
    }

    /// Summarize a finished parse from its findings and surviving records
    pub fn compute(submission: &Submission, errors: &ErrorMap, records: &[ModelRecord]) -> Self {
        Self {
            submission_id: submission.id,
            status: SummaryStatus::from_errors(Some(errors)),
            case_aggregates: case_aggregates(submission, errors, records),
        }
    }
}

/// Distinct cases per month of the quarter, split by whether they own a finding
pub fn case_aggregates(
    submission: &Submission,
    errors: &ErrorMap,
    records: &[ModelRecord],
) -> Vec<MonthAggregate> {
    submission
        .quarter_months()
        .into_iter()
        .map(|rpt_month_year| {
            let cases: BTreeSet<String> = records
                .iter()
                .filter(|record| record.rpt_month_year() == Some(rpt_month_year))
                .filter_map(ModelRecord::case_number)
                .collect();
            let with_errors: BTreeSet<&str> = errors
                .values()
                .flatten()
                .filter(|error| error.rpt_month_year == Some(rpt_month_year))
                .filter_map(|error| error.case_number.as_deref())
                .filter(|case| cases.contains(*case))
                .collect();

            MonthAggregate {
                rpt_month_year,
                month: month_name(rpt_month_year),
                total_cases: cases.len(),
                cases_with_errors: with_errors.len(),
                cases_without_errors: cases.len() - with_errors.len(),
            }
        })
        .collect()
}

fn month_name(rpt_month_year: i64) -> String {
    u8::try_from(rpt_month_year % 100)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map_or_else(|| rpt_month_year.to_string(), |month| month.name().to_string())
}
