//! Command-line argument definitions for the TANF processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::app::models::{ProgramType, Section};
use crate::config::ParserConfig;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the TANF data processor
///
/// Parses fixed-width quarterly submissions, validates them and reports every
/// finding together with the file's acceptance status.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tanf-processor",
    version,
    about = "Parse and validate TANF, SSP-MOE, Tribal TANF and FRA quarterly submissions",
    long_about = "Parses fixed-width TANF, SSP-MOE and Tribal TANF quarterly data files and \
                  comma-separated FRA work-outcome files. Every line is validated against its \
                  record layout, records are checked for duplicates and case consistency, and \
                  each file receives an acceptance status with per-month case counts."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse and validate submission files
    Parse(ParseArgs),
    /// List the record layouts known to the processor
    Schemas(SchemasArgs),
}

/// Program a submission was filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgramArg {
    Tanf,
    Ssp,
    Tribal,
    Fra,
}

impl From<ProgramArg> for ProgramType {
    fn from(program: ProgramArg) -> Self {
        match program {
            ProgramArg::Tanf => ProgramType::Tanf,
            ProgramArg::Ssp => ProgramType::Ssp,
            ProgramArg::Tribal => ProgramType::TribalTanf,
            ProgramArg::Fra => ProgramType::Fra,
        }
    }
}

/// Section a submission was filed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SectionArg {
    Active,
    Closed,
    Aggregate,
    Stratum,
    WorkOutcomes,
}

impl From<SectionArg> for Section {
    fn from(section: SectionArg) -> Self {
        match section {
            SectionArg::Active => Section::Active,
            SectionArg::Closed => Section::Closed,
            SectionArg::Aggregate => Section::Aggregate,
            SectionArg::Stratum => Section::Stratum,
            SectionArg::WorkOutcomes => Section::WorkOutcomes,
        }
    }
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// Submission files, directories searched recursively, or glob patterns
    #[arg(value_name = "INPUTS", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    #[arg(short = 'p', long = "program", value_enum, help = "Program the files were submitted under")]
    pub program: ProgramArg,

    #[arg(short = 's', long = "section", value_enum, help = "Section the files were submitted as")]
    pub section: SectionArg,

    /// Calendar year of the submission
    #[arg(short = 'y', long = "year", value_name = "YEAR")]
    pub year: i32,

    /// Calendar quarter of the submission (1-4)
    #[arg(short = 'Q', long = "quarter", value_name = "QUARTER")]
    pub quarter: u8,

    /// Only parse files whose name matches this glob when an input is a directory
    ///
    /// Without a pattern, files with a .txt, .dat, .csv or .ts extension are parsed.
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Directory receiving one JSON outcome per parsed file
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/tanf-processor/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Lines parsed between record flushes
    #[arg(long = "record-batch-size", value_name = "LINES")]
    pub record_batch_size: Option<usize>,

    /// Buffered findings that trigger a flush
    #[arg(long = "error-batch-size", value_name = "COUNT")]
    pub error_batch_size: Option<usize>,

    /// Report every duplicate finding instead of only the strictest per case
    #[arg(long = "ignore-duplicate-precedence")]
    pub ignore_duplicate_precedence: bool,

    /// Number of files parsed concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        default_value_t = num_cpus::get(),
        help = "Number of files parsed concurrently"
    )]
    pub workers: usize,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the schemas command
#[derive(Debug, Clone, Parser)]
pub struct SchemasArgs {
    /// Only list layouts of this program
    #[arg(short = 'p', long = "program", value_enum)]
    pub program: Option<ProgramArg>,

    /// Only list layouts of this section
    #[arg(short = 's', long = "section", value_enum)]
    pub section: Option<SectionArg>,

    /// Include every field of every layout
    #[arg(long = "detailed")]
    pub detailed: bool,

    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the layout listing"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl ParseArgs {
    /// Validate the parse command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        for input in &self.inputs {
            if !input.exists() && !is_glob(input) {
                return Err(Error::file_not_found(input.display().to_string()));
            }
        }

        if !(1..=4).contains(&self.quarter) {
            return Err(Error::configuration(format!(
                "Quarter must be between 1 and 4, got {}",
                self.quarter
            )));
        }

        if self.workers == 0 {
            return Err(Error::configuration("Number of workers must be greater than 0"));
        }
        if self.workers > 100 {
            return Err(Error::configuration("Number of workers cannot exceed 100"));
        }

        if self.record_batch_size == Some(0) || self.error_batch_size == Some(0) {
            return Err(Error::configuration("Batch sizes must be greater than 0"));
        }

        if let Some(pattern) = &self.pattern {
            glob::Pattern::new(pattern).map_err(|e| {
                Error::configuration(format!("Invalid file pattern '{}': {}", pattern, e))
            })?;
        }

        if let Some(config_file) = &self.config_file
            && !config_file.exists()
        {
            return Err(Error::configuration(format!(
                "Config file does not exist: {}",
                config_file.display()
            )));
        }

        Ok(())
    }

    /// Apply command-line overrides on top of the loaded parser settings
    pub fn apply_overrides(&self, config: &mut ParserConfig) {
        if let Some(size) = self.record_batch_size {
            config.record_batch_size = size;
        }
        if let Some(size) = self.error_batch_size {
            config.error_batch_size = size;
        }
        if self.ignore_duplicate_precedence {
            config.ignore_duplicate_error_precedence = true;
        }
    }

    /// Log level implied by the verbosity flags, if they set one
    pub fn get_log_level(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

/// Whether an input names a glob pattern rather than a path
pub fn is_glob(input: &std::path::Path) -> bool {
    input
        .to_string_lossy()
        .chars()
        .any(|c| matches!(c, '*' | '?' | '['))
}
