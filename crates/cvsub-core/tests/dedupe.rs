//! Multi-allelic site collapse scenarios.

use cvsub_core::dedupe::dedupe_sites;
use cvsub_core::error::IssueKind;
use cvsub_core::reconcile::reconcile;
use cvsub_ingest::tsv::parse_tsv_bytes;
use cvsub_model::ids::{ExtractionDate, VariantKey};
use cvsub_model::record::{RecordType, VariantRecord};
use cvsub_model::reference::ReferenceTable;

const HEADER: &str =
    "#Chromosome\tStart\tStop\tRef/Alt\thgvs c.\tGene Names\tClassification\tLast Edited\n";

fn records(raw: &str) -> Vec<VariantRecord> {
    parse_tsv_bytes(raw.as_bytes())
        .unwrap()
        .into_records(RecordType::Variant)
}

#[test]
fn agreeing_group_keeps_smallest_alternate_and_submits_it_as_novel() {
    let rows = records(&format!(
        "{HEADER}\
         1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t2024-04-01\n\
         1\t100\t101\tA/G\tNM_1:c.1A>G\tBRCA1\tPathogenic\t2024-04-01\n"
    ));
    let outcome = dedupe_sites(rows, None);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].locus().unwrap().alternate, "G");
    assert_eq!(
        outcome.discarded,
        vec![VariantKey::Hgvs("NM_1:c.1A>T".to_string())]
    );
    assert!(outcome.issues.is_empty());

    // Without a prior submission the survivor is a fresh record.
    let date = ExtractionDate::parse("2024-05-01").unwrap();
    let reconciled = reconcile(outcome.records, None, &date);
    assert_eq!(reconciled.novel.len(), 1);
    assert!(reconciled.update.is_empty());
    assert!(reconciled.unchanged.is_empty());
}

#[test]
fn previously_submitted_allele_wins_over_the_lexicographic_pick() {
    let reference_rows = records(&format!(
        "{HEADER}1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t2024-01-01\n"
    ));
    let (reference, skipped) = ReferenceTable::from_records(&reference_rows);
    assert!(skipped.is_empty());

    let rows = records(&format!(
        "{HEADER}\
         1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t2024-04-01\n\
         1\t100\t101\tA/G\tNM_1:c.1A>G\tBRCA1\tPathogenic\t2024-04-01\n"
    ));
    let outcome = dedupe_sites(rows, Some(&reference));
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].locus().unwrap().alternate, "T");
    assert_eq!(
        outcome.discarded,
        vec![VariantKey::Hgvs("NM_1:c.1A>G".to_string())]
    );
}

#[test]
fn conflicting_classifications_surface_an_issue_instead_of_a_pick() {
    let rows = records(&format!(
        "{HEADER}\
         1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t2024-04-01\n\
         1\t100\t101\tA/G\tNM_1:c.1A>G\tBRCA1\tBenign\t2024-04-01\n"
    ));
    let outcome = dedupe_sites(rows, None);
    assert!(outcome.records.is_empty());
    assert!(outcome.discarded.is_empty());
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].kind, IssueKind::Validation);
}
