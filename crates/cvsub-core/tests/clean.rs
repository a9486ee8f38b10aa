//! Cleaning scenarios over raw export tables.

use cvsub_core::clean::clean_table;
use cvsub_ingest::tsv::parse_tsv_bytes;
use cvsub_model::columns;

fn table(raw: &str) -> cvsub_ingest::tsv::TsvTable {
    parse_tsv_bytes(raw.as_bytes()).unwrap()
}

const HEADER: &str =
    "#Chromosome\tStart\tStop\tRef/Alt\thgvs c.\tGene Names\tClassification\tNotes\tLast Edited\n";

#[test]
fn exact_duplicate_rows_are_dropped() {
    let row = "1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t\t2024-04-01\n";
    let outcome = clean_table(table(&format!("{HEADER}{row}{row}")), None);
    assert_eq!(outcome.variants.len(), 1);
    assert_eq!(outcome.duplicates_removed, 1);
    assert!(outcome.issues.is_empty());
}

#[test]
fn double_alternate_row_splits_and_normalizes() {
    // A/AAT/AT at a repeat: two candidates, each reduced to minimal alleles.
    // Minimization invalidates the padded-form HGVS, so both lose it and the
    // site collapses to the smaller alternate.
    let outcome = clean_table(
        table(&format!(
            "{HEADER}1\t100\t100\tA/AAT/AT\t\tBRCA1\tPathogenic\t\t2024-04-01\n"
        )),
        None,
    );
    assert_eq!(outcome.variants.len(), 1);
    assert_eq!(outcome.discarded.len(), 1);
    for record in &outcome.variants {
        assert_eq!(record.field(columns::HGVS_C), "");
        let locus = record.locus().unwrap();
        assert_eq!(locus.reference, "-");
    }
}

#[test]
fn impossible_stop_coordinate_is_reported_not_normalized() {
    // Stop 1 cannot absorb the two-base shared suffix of either candidate.
    let raw = format!("{HEADER}1\t0\t1\tCAT/GAT/TAT\t\tBRCA1\tPathogenic\t\t2024-04-01\n");
    let outcome = clean_table(table(&raw), None);
    assert!(outcome.variants.is_empty());
    assert_eq!(outcome.issues.len(), 2);
}

#[test]
fn merge_note_moves_row_to_haplotype_table() {
    let notes = "[MERGE: NM_1:c.1A&gt;T, NM_1:c.2C&gt;G; NM_1:c.[1A&gt;T;2C&gt;G]; p.?; Pathogenic; merged]";
    let raw = format!(
        "{HEADER}\
         1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t{notes}\t2024-04-01\n\
         1\t200\t201\tC/G\tNM_1:c.2C>G\tBRCA1\tPathogenic\t{notes}\t2024-04-01\n"
    );
    let outcome = clean_table(table(&raw), None);
    // Plain merged rows leave the variant table entirely; the haplotype is
    // emitted once even though both member rows carry the note.
    assert!(outcome.variants.is_empty());
    assert_eq!(outcome.haplotypes.len(), 1);
    let haplotype = &outcome.haplotypes[0];
    assert_eq!(haplotype.field(columns::HGVS_C), "NM_1:c.[1A>T;2C>G]");
    assert_eq!(
        haplotype.field(columns::VARIANTS),
        "NM_1:c.1A>T, NM_1:c.2C>G"
    );
    assert_eq!(haplotype.field(columns::CLASSIFICATION), "Pathogenic");
}

#[test]
fn individual_merged_rows_stay_in_both_tables() {
    let notes =
        "[MERGE: NM_1:c.1A&gt;T, NM_1:c.2C&gt;G; NM_1:c.[1A&gt;T;2C&gt;G]; p.?; Pathogenic; individual-merged]";
    let raw = format!(
        "{HEADER}1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t{notes}\t2024-04-01\n"
    );
    let outcome = clean_table(table(&raw), None);
    assert_eq!(outcome.variants.len(), 1);
    assert_eq!(outcome.haplotypes.len(), 1);
}

#[test]
fn malformed_merge_note_is_reported() {
    let raw = format!(
        "{HEADER}1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t[MERGE: broken]\t2024-04-01\n"
    );
    let outcome = clean_table(table(&raw), None);
    assert!(outcome.variants.is_empty());
    assert!(outcome.haplotypes.is_empty());
    assert_eq!(outcome.issues.len(), 1);
}

#[test]
fn multi_hgvs_row_keeps_first_nm_transcript() {
    let raw = format!(
        "{HEADER}1\t100\t101\tA/T\tNR_0001.1:n.5A>T, NM_2:c.1A>T\tLOC1, TP53\tBenign\t\t2024-04-01\n"
    );
    let outcome = clean_table(table(&raw), None);
    assert_eq!(outcome.variants.len(), 1);
    assert_eq!(outcome.variants[0].field(columns::HGVS_C), "NM_2:c.1A>T");
    assert_eq!(outcome.variants[0].field(columns::GENE_NAMES), "TP53");
}

#[test]
fn multi_hgvs_without_nm_transcript_is_reported() {
    let raw = format!(
        "{HEADER}1\t100\t101\tA/T\tNR_0001.1:n.5A>T, NR_0002.1:n.6A>T\tLOC1, LOC2\tBenign\t\t2024-04-01\n"
    );
    let outcome = clean_table(table(&raw), None);
    assert!(outcome.variants.is_empty());
    assert_eq!(outcome.issues.len(), 1);
}
