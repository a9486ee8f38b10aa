//! Annotation folds report accessions back into the cleaned tables.

use std::fs;
use std::path::PathBuf;

use cvsub_core::annotate::{AnnotateOptions, run_annotate};
use cvsub_ingest::artifact::{ArtifactStore, FsArtifactStore};
use cvsub_ingest::tsv::parse_tsv_bytes;
use cvsub_model::columns;
use cvsub_model::ids::ExtractionDate;
use cvsub_model::record::RecordType;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const VARIANT_HEADER: &str =
    "#Chromosome\tStart\tStop\tRef/Alt\thgvs c.\tGene Names\tClassification\tLast Edited\n";

#[test]
fn report_accessions_reach_matching_rows() {
    let dir = tempfile::tempdir().unwrap();
    let cleaned = write_file(
        &dir,
        "cleaned.tsv",
        &format!(
            "{VARIANT_HEADER}\
             1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t2024-04-01\n\
             2\t200\t201\tA/G\t\tTP53\tBenign\t2024-04-02\n"
        ),
    );
    let store = FsArtifactStore::new(dir.path().join("run"));
    // First row was submitted by HGVS, second by coordinates.
    store
        .write(
            "reports/SUB100-summary-report.json",
            br#"{"submissionDate":"2024-05-02","submissions":[
                {"identifiers":{"clinvarLocalKey":"NM_1:c.1A>T|cond","clinvarAccession":"SCV000456"}},
                {"identifiers":{"clinvarLocalKey":"Chr.2_201_201_A_G|cond","clinvarAccession":"SCV000457"}}
            ]}"#,
        )
        .unwrap();
    store
        .append_line(
            "manifests/novel_summaries.txt",
            "reports/SUB100-summary-report.json variants",
        )
        .unwrap();

    let options = AnnotateOptions {
        record_type: RecordType::Variant,
        extraction_date: ExtractionDate::parse("2024-05-01").unwrap(),
        output_key: "annotated/2024-05-01_variants.tsv".to_string(),
    };
    let summary = run_annotate(
        &store,
        "manifests/novel_summaries.txt",
        &cleaned,
        None,
        &options,
    )
    .unwrap();

    assert_eq!(summary.annotated, 2);
    assert!(summary.unmatched.is_empty());

    let table = parse_tsv_bytes(&store.read(&options.output_key).unwrap()).unwrap();
    assert!(table.headers.iter().any(|header| header == columns::SCV));
    let records = table.into_records(RecordType::Variant);
    assert_eq!(records[0].accession().unwrap().as_str(), "SCV000456");
    assert_eq!(records[1].accession().unwrap().as_str(), "SCV000457");
    // Report-resolved rows are stamped with the extraction date.
    assert_eq!(records[0].last_edited(), "2024-05-01");
}

#[test]
fn annotation_is_idempotent_over_the_same_reports() {
    let dir = tempfile::tempdir().unwrap();
    let cleaned = write_file(
        &dir,
        "cleaned.tsv",
        &format!("{VARIANT_HEADER}1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t2024-04-01\n"),
    );
    let store = FsArtifactStore::new(dir.path().join("run"));
    store
        .write(
            "reports/SUB100-summary-report.json",
            br#"{"submissionDate":"2024-05-02","submissions":[
                {"identifiers":{"clinvarLocalKey":"NM_1:c.1A>T|cond","clinvarAccession":"SCV000456"}}
            ]}"#,
        )
        .unwrap();
    store
        .append_line(
            "manifests/novel_summaries.txt",
            "reports/SUB100-summary-report.json variants",
        )
        .unwrap();

    let options = AnnotateOptions {
        record_type: RecordType::Variant,
        extraction_date: ExtractionDate::parse("2024-05-01").unwrap(),
        output_key: "annotated/first.tsv".to_string(),
    };
    run_annotate(&store, "manifests/novel_summaries.txt", &cleaned, None, &options).unwrap();
    let first = store.read("annotated/first.tsv").unwrap();

    // Second pass uses the first output as its reference table.
    let annotated = write_file(
        &dir,
        "annotated.tsv",
        &String::from_utf8(first.clone()).unwrap(),
    );
    let options = AnnotateOptions {
        record_type: RecordType::Variant,
        extraction_date: ExtractionDate::parse("2024-05-01").unwrap(),
        output_key: "annotated/second.tsv".to_string(),
    };
    run_annotate(
        &store,
        "manifests/novel_summaries.txt",
        &annotated,
        Some(&annotated),
        &options,
    )
    .unwrap();
    let second = store.read("annotated/second.tsv").unwrap();

    assert_eq!(first, second);
}

#[test]
fn duplicate_rejection_accession_is_folded_back() {
    let dir = tempfile::tempdir().unwrap();
    let cleaned = write_file(
        &dir,
        "cleaned.tsv",
        &format!("{VARIANT_HEADER}1\t100\t101\tA/T\tNM_1:c.1A>T\tBRCA1\tPathogenic\t2024-04-01\n"),
    );
    let store = FsArtifactStore::new(dir.path().join("run"));
    store
        .write(
            "reports/SUB100-summary-report.json",
            br#"{"submissionDate":"2024-05-02","submissions":[
                {"identifiers":{"clinvarLocalKey":"NM_1:c.1A>T|cond"},
                 "errors":[{"output":{"errors":[{"userMessage":"This record is submitted as novel but it matches the existing record SCV000789. Please submit an update."}]}}]}
            ]}"#,
        )
        .unwrap();
    store
        .append_line(
            "manifests/novel_summaries.txt",
            "reports/SUB100-summary-report.json variants",
        )
        .unwrap();

    let options = AnnotateOptions {
        record_type: RecordType::Variant,
        extraction_date: ExtractionDate::parse("2024-05-01").unwrap(),
        output_key: "annotated/variants.tsv".to_string(),
    };
    let summary = run_annotate(
        &store,
        "manifests/novel_summaries.txt",
        &cleaned,
        None,
        &options,
    )
    .unwrap();

    assert_eq!(summary.annotated, 1);
    let table = parse_tsv_bytes(&store.read(&options.output_key).unwrap()).unwrap();
    let records = table.into_records(RecordType::Variant);
    assert_eq!(records[0].accession().unwrap().as_str(), "SCV000789");
}

#[test]
fn haplotype_rows_carry_forward_from_reference() {
    let dir = tempfile::tempdir().unwrap();
    let header = "hgvs c.\tClassification\tVariants\thgvs p.\tGene Names\tNotes\tLast Edited\tSCV\n";
    let cleaned = write_file(
        &dir,
        "haplotypes.tsv",
        &format!(
            "{header}NM_1:c.[1A>T;2C>G]\tPathogenic\tNM_1:c.1A>T, NM_1:c.2C>G\t\tBRCA1\t\t2024-04-01\t\n"
        ),
    );
    let reference = write_file(
        &dir,
        "reference.tsv",
        &format!(
            "{header}NM_9:c.[5G>A;7T>C]\tBenign\tNM_9:c.5G>A, NM_9:c.7T>C\t\tTP53\t\t2023-11-01\tSCV000900\n"
        ),
    );
    let store = FsArtifactStore::new(dir.path().join("run"));
    store
        .write(
            "reports/SUB100-summary-report.json",
            br#"{"submissionDate":"2024-05-02","submissions":[
                {"identifiers":{"clinvarLocalKey":"NM_1:c.[1A>T;2C>G]|cond","clinvarAccession":"SCV000901"}}
            ]}"#,
        )
        .unwrap();
    store
        .append_line(
            "manifests/novel_summaries.txt",
            "reports/SUB100-summary-report.json haplotypes",
        )
        .unwrap();

    let options = AnnotateOptions {
        record_type: RecordType::Haplotype,
        extraction_date: ExtractionDate::parse("2024-05-01").unwrap(),
        output_key: "annotated/haplotypes.tsv".to_string(),
    };
    let summary = run_annotate(
        &store,
        "manifests/novel_summaries.txt",
        &cleaned,
        Some(&reference),
        &options,
    )
    .unwrap();

    assert_eq!(summary.annotated, 1);
    assert_eq!(summary.carried_forward, 1);
    let table = parse_tsv_bytes(&store.read(&options.output_key).unwrap()).unwrap();
    let records = table.into_records(RecordType::Haplotype);
    assert_eq!(records.len(), 2);
    // Carried row first, fresh row after.
    assert_eq!(records[0].accession().unwrap().as_str(), "SCV000900");
    assert_eq!(records[1].accession().unwrap().as_str(), "SCV000901");
}
