//! Tests for record-type resolution

use super::*;
use crate::app::services::catalog::{ResolveError, SchemaCatalog};
use crate::app::services::fixed_width::TupleRow;

#[test]
fn test_standard_catalog_resolves_every_active_token() {
    let catalog = SchemaCatalog::standard();

    for token in ["T1", "T2", "T3"] {
        let manager = catalog
            .resolve(ProgramType::Tanf, Section::Active, token)
            .unwrap();
        assert_eq!(manager.schemas()[0].record_type(), token);
    }
    let children = catalog.resolve(ProgramType::Tanf, Section::Active, "T3").unwrap();
    assert_eq!(children.schemas().len(), 2);
}

#[test]
fn test_ssp_and_tribal_models_are_distinct() {
    let catalog = SchemaCatalog::standard();

    let ssp = catalog.resolve(ProgramType::Ssp, Section::Closed, "M4").unwrap();
    assert_eq!(ssp.schemas()[0].model_name(), Some("SSP_M4"));

    let tribal = catalog.resolve(ProgramType::TribalTanf, Section::Closed, "T4").unwrap();
    assert_eq!(tribal.schemas()[0].model_name(), Some("TRIBAL_T4"));
}

#[test]
fn test_unknown_and_missing_tokens() {
    let catalog = SchemaCatalog::standard();

    let unknown = catalog.resolve_row(&raw("T7202010", 2), ProgramType::Tanf, Section::Active);
    assert_eq!(
        unknown.unwrap_err(),
        ResolveError::UnknownRecordType {
            token: "T7".to_string()
        }
    );

    let missing = catalog.resolve_row(&raw("  202010", 3), ProgramType::Tanf, Section::Active);
    assert_eq!(missing.unwrap_err(), ResolveError::MissingRecordType);
    assert_eq!(
        ResolveError::MissingRecordType.to_string(),
        "Record Type is missing from record."
    );
}

#[test]
fn test_record_type_from_another_section_is_unknown() {
    let catalog = SchemaCatalog::standard();

    let result = catalog.resolve(ProgramType::Tanf, Section::Closed, "T1");
    assert!(matches!(result, Err(ResolveError::UnknownRecordType { .. })));
}

#[test]
fn test_stratum_section_is_not_catalogued() {
    let catalog = SchemaCatalog::standard();

    let result = catalog.resolve(ProgramType::Tanf, Section::Stratum, "T7");
    assert!(matches!(result, Err(ResolveError::UnsupportedSection { .. })));
}

#[test]
fn test_fra_tuple_rows_resolve_by_record_type() {
    let catalog = SchemaCatalog::standard();
    let row: Row = TupleRow::new(vec!["202010".to_string(), "123456789".to_string()], "TE1", 1).into();

    let manager = catalog
        .resolve_row(&row, ProgramType::Fra, Section::WorkOutcomes)
        .unwrap();
    assert_eq!(manager.schemas()[0].model_name(), Some("FRA_TE1"));
}

#[test]
fn test_model_names_per_section() {
    let catalog = SchemaCatalog::standard();

    assert_eq!(
        catalog.model_names(ProgramType::Tanf, Section::Active),
        vec!["TANF_T1", "TANF_T2", "TANF_T3"]
    );
    assert_eq!(
        catalog.model_names(ProgramType::Ssp, Section::Aggregate),
        vec!["SSP_M6"]
    );
    assert!(catalog.model_names(ProgramType::Tanf, Section::Stratum).is_empty());
    assert!(catalog.sections().contains(&(ProgramType::Fra, Section::WorkOutcomes)));
}
