//! End-to-end parsing of submission files written to disk
//!
//! Files are assembled line by line, written to a temporary directory and
//! parsed through the public API the CLI uses.

use std::io::Write;
use std::sync::Arc;
use tanf_processor::app::services::parse_orchestrator::{RecordStore, SharedStore};
use tanf_processor::{
    Config, ErrorLocation, InMemoryStore, ParseOrchestrator, ProgramType, SchemaCatalog, Section,
    Submission, SummaryStatus,
};
use tempfile::{NamedTempFile, TempDir};

const CASE: &str = "11111111111";

fn place(width: usize, parts: &[(usize, &str)]) -> String {
    let mut chars = vec![' '; width];
    for (start, text) in parts {
        for (offset, c) in text.chars().enumerate() {
            chars[start + offset] = c;
        }
    }
    chars.into_iter().collect()
}

fn header(section: &str) -> String {
    format!("HEADER20204{}06   TAN1 D", section)
}

fn trailer(count: usize) -> String {
    format!("TRAILER{:07}         ", count)
}

fn family(case: &str) -> String {
    place(
        156,
        &[
            (0, "T1"),
            (2, "202010"),
            (8, case),
            (19, "001"),
            (22, "01"),
            (24, "12345"),
            (29, "1"),
            (30, "1"),
            (31, "2"),
            (32, "03"),
            (34, "1"),
            (35, "2"),
            (36, "1"),
            (37, "2"),
            (38, "0000"),
            (42, "2"),
            (43, "0000"),
            (47, "0000"),
            (51, "0000"),
            (55, "0000"),
            (59, "000"),
        ],
    )
}

fn adult(case: &str) -> String {
    place(
        156,
        &[
            (0, "T2"),
            (2, "202010"),
            (8, case),
            (19, "1"),
            (20, "2"),
            (21, "19800101"),
            (29, "123456789"),
            (44, "1"),
            (45, "22222"),
            (50, "1"),
            (51, "01"),
            (53, "2"),
            (54, "2"),
            (55, "12"),
            (57, "1"),
            (58, "1"),
            (59, "000"),
            (62, "00"),
            (64, "2"),
            (65, "1"),
            (66, "01"),
            (68, "01"),
        ],
    )
}

fn active_file(lines: &[String]) -> String {
    let mut all = vec![header("A")];
    all.extend(lines.iter().cloned());
    all.push(trailer(lines.len()));
    all.join("\n")
}

fn submission() -> Submission {
    Submission::new(ProgramType::Tanf, Section::Active, 2020, 4).unwrap()
}

#[test]
fn test_parse_active_file_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", active_file(&[family(CASE), adult(CASE)])).unwrap();
    let bytes = std::fs::read(file.path()).unwrap();

    let mut orchestrator = ParseOrchestrator::new(
        Arc::new(SchemaCatalog::standard()),
        Config::default().parsing,
        InMemoryStore::new(),
    )
    .unwrap();
    let submission = submission();
    let outcome = orchestrator.parse(&submission, &bytes).unwrap();

    assert_eq!(outcome.summary.status, SummaryStatus::Accepted);
    assert_eq!(outcome.error_count(), 0);
    assert_eq!(orchestrator.store().count(submission.id, "TANF_T1").unwrap(), 1);
    assert_eq!(orchestrator.store().count(submission.id, "TANF_T2").unwrap(), 1);
}

#[test]
fn test_configuration_file_drives_batching() {
    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "[parsing]\nrecord_batch_size = 1\nerror_batch_size = 1"
    )
    .unwrap();
    let config = Config::from_file(config_file.path()).unwrap();
    assert_eq!(config.parsing.record_batch_size, 1);

    let mut orchestrator = ParseOrchestrator::new(
        Arc::new(SchemaCatalog::standard()),
        config.parsing,
        InMemoryStore::new(),
    )
    .unwrap();
    let submission = submission();
    let file = active_file(&[family(CASE), family("22222222222"), adult("22222222222")]);
    let outcome = orchestrator.parse(&submission, file.as_bytes()).unwrap();

    assert_eq!(outcome.summary.status, SummaryStatus::AcceptedWithErrors);
    assert_eq!(outcome.errors[&ErrorLocation::Cases].len(), 1);
    assert_eq!(outcome.stats.case_records_removed, 1);
    assert_eq!(
        orchestrator.store().errors(submission.id).unwrap().len(),
        outcome.error_count()
    );
}

#[tokio::test]
async fn test_concurrent_parses_share_catalog_and_store() {
    let catalog = Arc::new(SchemaCatalog::standard());
    let store = SharedStore::new();
    let files = vec![
        active_file(&[family(CASE), adult(CASE)]),
        active_file(&[family(CASE)]),
        "not a header".to_string(),
    ];

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let catalog = Arc::clone(&catalog);
            let store = store.clone();
            tokio::task::spawn_blocking(move || {
                let submission = submission();
                let mut orchestrator =
                    ParseOrchestrator::new(catalog, Config::default().parsing, store).unwrap();
                orchestrator.parse(&submission, file.as_bytes()).unwrap()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for outcome in futures::future::join_all(handles).await {
        statuses.push(outcome.unwrap().summary.status);
    }
    assert_eq!(
        statuses,
        vec![
            SummaryStatus::Accepted,
            SummaryStatus::AcceptedWithErrors,
            SummaryStatus::Rejected
        ]
    );

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.submissions().len(), 3);
}

#[test]
fn test_outcome_round_trips_through_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut orchestrator = ParseOrchestrator::new(
        Arc::new(SchemaCatalog::standard()),
        Config::default().parsing,
        InMemoryStore::new(),
    )
    .unwrap();
    let outcome = orchestrator
        .parse(&submission(), active_file(&[family(CASE)]).as_bytes())
        .unwrap();

    let path = temp_dir.path().join("outcome.json");
    std::fs::write(&path, serde_json::to_string_pretty(&outcome).unwrap()).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(json["summary"]["status"], "Accepted with Errors");
    assert_eq!(json["errors"]["cases"].as_array().unwrap().len(), 1);
    assert_eq!(json["stats"]["case_records_removed"], 1);
}
