//! Reconciliation against the reference table.

use std::collections::BTreeMap;

use cvsub_core::error::IssueKind;
use cvsub_core::reconcile::reconcile;
use cvsub_model::columns;
use cvsub_model::ids::ExtractionDate;
use cvsub_model::record::{RecordType, VariantRecord};
use cvsub_model::reference::ReferenceTable;

fn record(hgvs: &str, edited: &str, scv: &str) -> VariantRecord {
    let mut fields = BTreeMap::new();
    fields.insert(columns::HGVS_C.to_string(), hgvs.to_string());
    fields.insert(columns::CHROMOSOME.to_string(), "1".to_string());
    fields.insert(columns::START.to_string(), "100".to_string());
    fields.insert(columns::STOP.to_string(), "101".to_string());
    fields.insert(columns::REF_ALT.to_string(), "A/T".to_string());
    fields.insert(columns::LAST_EDITED.to_string(), edited.to_string());
    fields.insert(columns::SCV.to_string(), scv.to_string());
    VariantRecord::new(RecordType::Variant, fields)
}

fn reference(rows: &[VariantRecord]) -> ReferenceTable {
    let (table, skipped) = ReferenceTable::from_records(rows);
    assert!(skipped.is_empty());
    table
}

fn date() -> ExtractionDate {
    ExtractionDate::parse("2024-05-01").unwrap()
}

#[test]
fn unknown_row_is_novel() {
    let result = reconcile(vec![record("NM_1:c.1A>T", "2024-04-01", "")], None, &date());
    assert_eq!(result.novel.len(), 1);
    assert!(result.update.is_empty());
    assert!(result.conflicts.is_empty());
}

#[test]
fn edited_known_row_becomes_update_with_accession() {
    let table = reference(&[record("NM_1:c.1A>T", "2024-01-01", "SCV000123")]);
    let result = reconcile(
        vec![record("NM_1:c.1A>T", "2024-04-01", "")],
        Some(&table),
        &date(),
    );
    assert_eq!(result.update.len(), 1);
    let updated = &result.update[0];
    assert_eq!(updated.accession().unwrap().as_str(), "SCV000123");
    // The stamp advances to the extraction date so the next run sees it as
    // unchanged.
    assert_eq!(updated.last_edited(), "2024-05-01");
}

#[test]
fn unedited_known_row_is_withheld() {
    let table = reference(&[record("NM_1:c.1A>T", "2024-04-01", "SCV000123")]);
    let result = reconcile(
        vec![record("NM_1:c.1A>T", "2024-04-01", "")],
        Some(&table),
        &date(),
    );
    assert_eq!(result.unchanged.len(), 1);
    assert!(result.novel.is_empty());
    assert!(result.update.is_empty());
}

#[test]
fn known_row_without_reference_accession_is_a_conflict() {
    let table = reference(&[record("NM_1:c.1A>T", "2024-01-01", "")]);
    let result = reconcile(
        vec![record("NM_1:c.1A>T", "2024-04-01", "")],
        Some(&table),
        &date(),
    );
    assert!(result.novel.is_empty());
    assert!(result.update.is_empty());
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].kind, IssueKind::ReconciliationConflict);
}

#[test]
fn accessioned_row_missing_from_reference_is_an_update() {
    let result = reconcile(
        vec![record("NM_1:c.1A>T", "2024-04-01", "SCV000999")],
        None,
        &date(),
    );
    assert!(result.novel.is_empty());
    assert_eq!(result.update.len(), 1);
    assert_eq!(result.update[0].accession().unwrap().as_str(), "SCV000999");
}

#[test]
fn cleared_hgvs_matches_by_coordinates() {
    let table = reference(&[record("NM_1:c.1A>T", "2024-01-01", "SCV000123")]);
    let result = reconcile(
        vec![record("", "2024-04-01", "")],
        Some(&table),
        &date(),
    );
    assert_eq!(result.update.len(), 1);
    assert_eq!(result.update[0].accession().unwrap().as_str(), "SCV000123");
}
