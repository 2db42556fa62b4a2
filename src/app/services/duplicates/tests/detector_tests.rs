use super::{feed, feed_all, feed_row, record_id, replace_at};
use crate::app::models::{ErrorCategory, ProgramType, Section};
use crate::app::services::catalog::tests::{
    adult_line, aggregate_line, child_line, family_line, generator,
};
use crate::app::services::catalog::{fra, tanf};
use crate::app::services::duplicates::{DuplicateManager, ErrorLevel};
use crate::app::services::fixed_width::{Row, TupleRow};

const CASE: &str = "11111111111";
const OTHER_CASE: &str = "22222222222";

#[test]
fn test_exact_duplicate_references_first_line() {
    let schema = tanf::family(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(false);
    let line = family_line("T", "202010", CASE);

    let first = feed(&mut manager, &schema, &line, 2, &generator);
    feed(&mut manager, &schema, &family_line("T", "202010", OTHER_CASE), 3, &generator);
    let second = feed(&mut manager, &schema, &line, 4, &generator);
    let third = feed(&mut manager, &schema, &line, 5, &generator);

    let errors = manager.generated_errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors[0].error_message,
        "Duplicate record detected with record type T1 at line 4. \
         Record is a duplicate of the record at line number 2."
    );
    assert_eq!(
        errors[1].error_message,
        "Duplicate record detected with record type T1 at line 5. \
         Record is a duplicate of the record at line number 2."
    );
    assert_eq!(errors[0].error_type, ErrorCategory::CaseConsistency);
    assert_eq!(errors[0].object_id, Some(record_id(&second)));
    assert_eq!(errors[0].case_number.as_deref(), Some(CASE));

    let removed = manager.records_to_remove(ErrorLevel::Duplicate);
    assert_eq!(
        removed.get("TANF_T1"),
        Some(&vec![record_id(&second), record_id(&third)])
    );
    assert!(!removed["TANF_T1"].contains(&record_id(&first)));
    assert!(manager.records_to_remove(ErrorLevel::PartialDuplicate).is_empty());
}

#[test]
fn test_partial_duplicate_lists_identity_fields() {
    let schema = tanf::family(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(false);
    let line = family_line("T", "202010", CASE);

    feed(&mut manager, &schema, &line, 2, &generator);
    let partial = feed(&mut manager, &schema, &replace_at(&line, 19, "002"), 3, &generator);

    let errors = manager.generated_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].error_message,
        "Partial duplicate record detected with record type T1 at line 3. \
         Record is a partial duplicate of the record at line number 2. \
         Duplicated fields causing error: Item 0 (Record Type), \
         Item 4 (Reporting Year and Month), and Item 6 (Case Number)."
    );
    assert_eq!(
        manager.records_to_remove(ErrorLevel::PartialDuplicate)["TANF_T1"],
        vec![record_id(&partial)]
    );
    assert!(manager.records_to_remove(ErrorLevel::Duplicate).is_empty());
}

#[test]
fn test_exact_duplicate_replaces_partial_findings() {
    let schema = tanf::family(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(false);
    let line = family_line("T", "202010", CASE);

    feed(&mut manager, &schema, &line, 2, &generator);
    feed(&mut manager, &schema, &replace_at(&line, 19, "002"), 3, &generator);
    feed(&mut manager, &schema, &line, 4, &generator);
    feed(&mut manager, &schema, &replace_at(&line, 19, "003"), 5, &generator);

    let errors = manager.generated_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row_number, Some(4));
    assert!(errors[0].error_message.starts_with("Duplicate record detected"));

    // Flagged lines are still purged at their own level
    assert_eq!(manager.records_to_remove(ErrorLevel::PartialDuplicate)["TANF_T1"].len(), 2);
    assert_eq!(manager.records_to_remove(ErrorLevel::Duplicate)["TANF_T1"].len(), 1);
}

#[test]
fn test_ignored_precedence_keeps_every_finding() {
    let schema = tanf::family(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(true);
    let line = family_line("T", "202010", CASE);

    feed(&mut manager, &schema, &line, 2, &generator);
    feed(&mut manager, &schema, &replace_at(&line, 19, "002"), 3, &generator);
    feed(&mut manager, &schema, &line, 4, &generator);

    let rows: Vec<_> = manager
        .generated_errors()
        .iter()
        .map(|error| error.row_number)
        .collect();
    assert_eq!(rows, vec![Some(3), Some(4)]);
}

#[test]
fn test_buckets_are_per_case_and_month() {
    let schema = tanf::family(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(false);

    feed(&mut manager, &schema, &family_line("T", "202010", CASE), 2, &generator);
    feed(&mut manager, &schema, &family_line("T", "202011", CASE), 3, &generator);
    feed(&mut manager, &schema, &family_line("T", "202010", OTHER_CASE), 4, &generator);

    assert_eq!(manager.bucket_count(), 3);
    assert!(manager.generated_errors().is_empty());
}

#[test]
fn test_absent_member_skips_partial_check() {
    let schema = tanf::adult(ProgramType::Tanf);
    let generator = generator();

    let mut absent = DuplicateManager::new(false);
    let line = adult_line("T", "202010", CASE, "3", "123456789");
    feed(&mut absent, &schema, &line, 2, &generator);
    feed(&mut absent, &schema, &replace_at(&line, 44, "2"), 3, &generator);
    assert!(absent.generated_errors().is_empty());

    let mut present = DuplicateManager::new(false);
    let line = adult_line("T", "202010", CASE, "1", "123456789");
    feed(&mut present, &schema, &line, 2, &generator);
    feed(&mut present, &schema, &replace_at(&line, 44, "2"), 3, &generator);
    let errors = present.generated_errors();
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .error_message
            .ends_with("Item 32 (Date of Birth), and Item 33 (Social Security Number).")
    );
}

#[test]
fn test_sibling_records_share_the_line_finding() {
    let schemas = tanf::children(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(false);
    let line = child_line("T", "202010", CASE, true);

    let first = feed_all(&mut manager, &schemas, &line, 2, Section::Active, &generator);
    let second = feed_all(&mut manager, &schemas, &line, 3, Section::Active, &generator);
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);

    assert_eq!(manager.generated_errors().len(), 1);
    let removed = manager.records_to_remove(ErrorLevel::Duplicate);
    let expected: Vec<_> = second.iter().map(record_id).collect();
    assert_eq!(removed["TANF_T3"], expected);
}

#[test]
fn test_aggregate_line_is_checked_once() {
    let schemas = tanf::aggregates(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(false);
    let line = aggregate_line("T", "20204", "0010", "0006", "0004");

    feed_all(&mut manager, &schemas, &line, 2, Section::Aggregate, &generator);
    let duplicate = feed_all(&mut manager, &schemas, &line, 3, Section::Aggregate, &generator);
    assert_eq!(duplicate.len(), 3);

    assert_eq!(manager.generated_errors().len(), 1);
    assert_eq!(manager.bucket_count(), 1);
    assert_eq!(manager.records_to_remove(ErrorLevel::Duplicate)["TANF_T6"].len(), 3);
}

#[test]
fn test_exiters_share_one_exact_only_bucket() {
    let schema = fra::exiter();
    let generator = generator();
    let mut manager = DuplicateManager::new(false);
    let exiter = |date: &str, ssn: &str, line_number: usize| -> Row {
        TupleRow::new(vec![date.to_string(), ssn.to_string()], "TE1", line_number).into()
    };

    for row in [
        exiter("202010", "123456789", 2),
        exiter("202010", "987654321", 3),
        exiter("202010", "123456789", 4),
        exiter("202011", "123456789", 5),
    ] {
        feed_row(
            &mut manager,
            &schema,
            &row,
            ProgramType::Fra,
            Section::WorkOutcomes,
            &generator,
        );
    }

    let errors = manager.generated_errors();
    assert_eq!(manager.bucket_count(), 1);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].error_message,
        "Duplicate record detected with record type TE1 at line 4. \
         Record is a duplicate of the record at line number 2."
    );
}

#[test]
fn test_clear_forgets_everything() {
    let schema = tanf::family(ProgramType::Tanf);
    let generator = generator();
    let mut manager = DuplicateManager::new(false);
    let line = family_line("T", "202010", CASE);

    feed(&mut manager, &schema, &line, 2, &generator);
    manager.clear();
    feed(&mut manager, &schema, &line, 3, &generator);

    assert!(manager.generated_errors().is_empty());
}
