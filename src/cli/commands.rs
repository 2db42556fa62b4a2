//! Command implementations for the TANF processor CLI
//!
//! This module contains file discovery, concurrent parse execution, progress
//! reporting and the final report for each command.

use crate::app::models::{ProgramType, Section, Submission};
use crate::app::services::catalog::{ResolveError, SchemaCatalog};
use crate::app::services::file_summary::SummaryStatus;
use crate::app::services::parse_orchestrator::{ParseOrchestrator, ParseOutcome, SharedStore};
use crate::cli::args::{Args, Commands, OutputFormat, ParseArgs, SchemasArgs, is_glob};
use crate::config::{Config, ParserConfig};
use crate::constants::INPUT_FILE_EXTENSIONS;
use crate::{Error, Result};
use colored::Colorize;
use futures::future::join_all;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Totals over every file of a parse command
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub files_found: usize,
    pub files_parsed: usize,
    pub files_failed: usize,
    pub accepted: usize,
    pub accepted_with_errors: usize,
    pub rejected: usize,
    pub records_stored: usize,
    pub findings: usize,
    pub processing_time: Duration,
}

impl RunStats {
    pub fn record(&mut self, report: &FileReport) {
        match &report.outcome {
            Ok(outcome) => {
                self.files_parsed += 1;
                self.records_stored += outcome.stats.records_remaining();
                self.findings += outcome.error_count();
                match outcome.summary.status {
                    SummaryStatus::Accepted => self.accepted += 1,
                    SummaryStatus::AcceptedWithErrors => self.accepted_with_errors += 1,
                    SummaryStatus::Rejected => self.rejected += 1,
                    SummaryStatus::Pending => {}
                }
            }
            Err(_) => self.files_failed += 1,
        }
    }
}

/// Result of parsing one file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Result<ParseOutcome>,
}

/// Everything one parse task needs, cloned per file
#[derive(Debug, Clone)]
struct ParseJob {
    catalog: Arc<SchemaCatalog>,
    config: ParserConfig,
    store: SharedStore,
    program: ProgramType,
    section: Section,
    year: i32,
    quarter: u8,
}

impl ParseJob {
    fn run(self, path: &Path) -> Result<ParseOutcome> {
        let bytes = std::fs::read(path)
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
        let submission = Submission::new(self.program, self.section, self.year, self.quarter)?;
        debug!("Parsing {} as submission {}", path.display(), submission.id);

        let mut orchestrator = ParseOrchestrator::new(self.catalog, self.config, self.store)?;
        orchestrator.parse(&submission, &bytes)
    }
}

/// Main command runner
pub async fn run(args: Args) -> Result<RunStats> {
    match args.command {
        Some(Commands::Parse(parse)) => run_parse(parse).await,
        Some(Commands::Schemas(schemas)) => {
            run_schemas(&schemas)?;
            Ok(RunStats::default())
        }
        None => Ok(RunStats::default()),
    }
}

/// Parse every discovered file, at most `workers` at a time
pub async fn run_parse(args: ParseArgs) -> Result<RunStats> {
    let start_time = Instant::now();
    args.validate()?;

    let mut config = Config::load_layered(args.config_file.as_deref())?;
    args.apply_overrides(&mut config.parsing);
    if let Some(level) = args.get_log_level() {
        config.logging.level = level.to_string();
    }
    config.validate()?;
    setup_logging(&config.logging.level, args.quiet);
    debug!("Loaded configuration: {:?}", config);

    let files = discover_inputs(&args.inputs, args.pattern.as_deref())?;
    info!("Found {} submission files in {} inputs", files.len(), args.inputs.len());
    if files.is_empty() {
        warn!("No submission files found");
    }

    let progress = args.show_progress().then(|| {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Parsing...");
        pb
    });

    let job = ParseJob {
        catalog: Arc::new(SchemaCatalog::standard()),
        config: config.parsing.clone(),
        store: SharedStore::new(),
        program: args.program.into(),
        section: args.section.into(),
        year: args.year,
        quarter: args.quarter,
    };
    let semaphore = Arc::new(Semaphore::new(args.workers));

    let mut stats = RunStats {
        files_found: files.len(),
        ..Default::default()
    };
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let job = job.clone();
            let semaphore = Arc::clone(&semaphore);
            let progress = progress.clone();
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let task_path = path.clone();
                let outcome = match tokio::task::spawn_blocking(move || job.run(&task_path)).await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(Error::processing_interrupted(format!(
                        "Parse task failed: {}",
                        e
                    ))),
                };
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                FileReport { path, outcome }
            })
        })
        .collect();

    let mut reports = Vec::new();
    for joined in join_all(handles).await {
        match joined {
            Ok(report) => {
                if let Err(e) = &report.outcome {
                    error!("Failed to parse {}: {}", report.path.display(), e);
                }
                stats.record(&report);
                reports.push(report);
            }
            Err(e) => error!("Parse task panicked: {}", e),
        }
    }
    if let Some(pb) = &progress {
        pb.finish_with_message("Parsing complete");
    }

    if let Some(output_dir) = &args.output_dir {
        write_outcomes(output_dir, &reports)?;
    }

    stats.processing_time = start_time.elapsed();
    match args.output_format {
        OutputFormat::Human => print_human_report(&reports, &stats),
        OutputFormat::Json => print_json_report(&reports, &stats)?,
    }
    Ok(stats)
}

/// Set up structured logging; `RUST_LOG` wins over the configured level
fn setup_logging(level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tanf_processor={}", level)));
    let layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_timer(fmt::time::uptime()))
            .try_init()
    };
    if result.is_err() {
        debug!("Logging was already initialized");
    }
}

/// Submission files at `input`
///
/// A file is returned as is. Directories are walked recursively and filtered
/// by `pattern` on the file name, or by the known submission extensions.
pub fn discover_files(input: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.exists() {
        return Err(Error::file_not_found(input.display().to_string()));
    }

    let pattern = pattern
        .map(glob::Pattern::new)
        .transpose()
        .map_err(|e| Error::configuration(format!("Invalid file pattern: {}", e)))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(input).follow_links(true) {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(format!("Failed to scan {}", input.display()), e)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        let selected = match &pattern {
            Some(pattern) => pattern.matches(&name),
            None => has_submission_extension(entry.path()),
        };
        if selected {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Submission files named by every input, deduplicated and sorted
///
/// An input that does not exist but contains glob characters is expanded,
/// and each match is discovered like an explicit path.
pub fn discover_inputs(inputs: &[PathBuf], pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for input in inputs {
        if input.exists() || !is_glob(input) {
            files.extend(discover_files(input, pattern)?);
            continue;
        }

        let expression = input.to_string_lossy();
        let matches = glob::glob(&expression).map_err(|e| {
            Error::configuration(format!("Invalid input pattern '{}': {}", expression, e))
        })?;
        for path in matches {
            let path = path.map_err(|e| {
                Error::configuration(format!("Failed to expand '{}': {}", expression, e))
            })?;
            files.extend(discover_files(&path, pattern)?);
        }
    }
    Ok(files.into_iter().collect())
}

fn has_submission_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            INPUT_FILE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

/// Write one pretty-printed JSON outcome per parsed file
fn write_outcomes(output_dir: &Path, reports: &[FileReport]) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        Error::io(
            format!("Failed to create output directory {}", output_dir.display()),
            e,
        )
    })?;

    for report in reports {
        let Ok(outcome) = &report.outcome else {
            continue;
        };
        let json = serde_json::to_string_pretty(outcome)
            .map_err(|e| Error::serialization("Failed to serialize parse outcome", e))?;
        let path = output_dir.join(outcome_file_name(&report.path));
        std::fs::write(&path, json)
            .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;
        debug!("Wrote {}", path.display());
    }
    Ok(())
}

fn outcome_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "submission".to_string());
    format!("{}.json", name)
}

fn colored_status(status: SummaryStatus) -> colored::ColoredString {
    match status {
        SummaryStatus::Accepted => status.as_str().green(),
        SummaryStatus::AcceptedWithErrors => status.as_str().yellow(),
        SummaryStatus::Rejected => status.as_str().red(),
        SummaryStatus::Pending => status.as_str().normal(),
    }
}

fn print_human_report(reports: &[FileReport], stats: &RunStats) {
    println!();
    for report in reports {
        match &report.outcome {
            Ok(outcome) => println!(
                "{} {} ({} findings, {} records)",
                colored_status(outcome.summary.status),
                report.path.display(),
                outcome.error_count(),
                outcome.stats.records_remaining()
            ),
            Err(e) => println!("{} {}: {}", "Failed".red().bold(), report.path.display(), e),
        }
    }

    println!();
    println!("{}", "Parse Summary".bold());
    println!("   Files found: {}", stats.files_found);
    println!("   Accepted: {}", stats.accepted.to_string().green());
    println!(
        "   Accepted with errors: {}",
        stats.accepted_with_errors.to_string().yellow()
    );
    println!("   Rejected: {}", stats.rejected.to_string().red());
    if stats.files_failed > 0 {
        println!("   Failed: {}", stats.files_failed.to_string().red().bold());
    }
    println!("   Records stored: {}", stats.records_stored);
    println!("   Findings: {}", stats.findings);
    println!("   Processing time: {}", HumanDuration(stats.processing_time));
    println!();
}

fn print_json_report(reports: &[FileReport], stats: &RunStats) -> Result<()> {
    let files: Vec<_> = reports
        .iter()
        .map(|report| match &report.outcome {
            Ok(outcome) => serde_json::json!({
                "path": report.path.display().to_string(),
                "submission_id": outcome.submission.id,
                "status": outcome.summary.status,
                "findings": outcome.error_count(),
                "records_stored": outcome.stats.records_remaining(),
                "case_aggregates": outcome.summary.case_aggregates,
            }),
            Err(e) => serde_json::json!({
                "path": report.path.display().to_string(),
                "failure": e.to_string(),
            }),
        })
        .collect();
    let report = serde_json::json!({
        "files": files,
        "files_found": stats.files_found,
        "files_failed": stats.files_failed,
        "accepted": stats.accepted,
        "accepted_with_errors": stats.accepted_with_errors,
        "rejected": stats.rejected,
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
    });

    let text = serde_json::to_string_pretty(&report)
        .map_err(|e| Error::serialization("Failed to serialize report", e))?;
    println!("{}", text);
    Ok(())
}

/// Print the record layouts of the built-in catalog
pub fn run_schemas(args: &SchemasArgs) -> Result<()> {
    let catalog = SchemaCatalog::standard();
    let program = args.program.map(ProgramType::from);
    let section = args.section.map(Section::from);

    if let (Some(program), Some(section)) = (program, section)
        && catalog.managers(program, section).is_none()
    {
        return Err(ResolveError::UnsupportedSection { program, section }.into());
    }

    let mut listing = Vec::new();
    for (each_program, each_section) in catalog.sections() {
        if program.is_some_and(|p| p != each_program) || section.is_some_and(|s| s != each_section)
        {
            continue;
        }
        let Some(managers) = catalog.managers(each_program, each_section) else {
            continue;
        };
        for (token, manager) in managers {
            for schema in manager.schemas() {
                let fields: Vec<_> = schema
                    .fields()
                    .iter()
                    .filter(|field| !field.discarded)
                    .map(|field| {
                        serde_json::json!({
                            "item": field.item,
                            "name": field.name,
                            "friendly_name": field.friendly_name,
                            "start": field.position.start,
                            "end": field.position.end,
                            "kind": format!("{:?}", field.kind),
                        })
                    })
                    .collect();
                let field_count = fields.len();
                let fields = if args.detailed {
                    serde_json::Value::Array(fields)
                } else {
                    serde_json::Value::Null
                };
                listing.push(serde_json::json!({
                    "program": each_program.to_string(),
                    "section": each_section.name(),
                    "record_type": token,
                    "model": schema.model_name(),
                    "field_count": field_count,
                    "fields": fields,
                }));
            }
        }
    }

    match args.output_format {
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(&listing)
                .map_err(|e| Error::serialization("Failed to serialize layouts", e))?;
            println!("{}", text);
        }
        OutputFormat::Human => {
            for layout in &listing {
                println!(
                    "{} {} {} -> {} ({} fields)",
                    layout["program"].as_str().unwrap_or_default().bold(),
                    layout["section"].as_str().unwrap_or_default(),
                    layout["record_type"].as_str().unwrap_or_default().cyan(),
                    layout["model"].as_str().unwrap_or("-"),
                    layout["field_count"]
                );
                if let Some(fields) = layout["fields"].as_array() {
                    for field in fields {
                        println!(
                            "    {:>4} {:<40} {:>3}..{:<3} {}",
                            field["item"].as_str().unwrap_or_default(),
                            field["name"].as_str().unwrap_or_default(),
                            field["start"],
                            field["end"],
                            field["friendly_name"].as_str().unwrap_or_default()
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
