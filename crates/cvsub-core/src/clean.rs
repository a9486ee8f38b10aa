//! Raw export cleaning.
//!
//! Turns the raw exported table into one cleaned variant table and one
//! haplotype table:
//!
//! - exact duplicate rows are dropped;
//! - rows reporting two alternate alleles are split into two candidates and
//!   reduced to minimal allele representation;
//! - rows listing several HGVS expressions keep the first `NM_` transcript
//!   and its gene symbol (the registry links the other strand itself);
//! - rows whose Notes carry a `[MERGE: …]` annotation describe a haplotype
//!   and move to the haplotype table, staying in the variant table only for
//!   the `individual-merged` upload type;
//! - multi-allelic site groups are collapsed by [`crate::dedupe`].
//!
//! Both cleaned tables are persisted by the pipeline for the annotation
//! stage.

use std::collections::BTreeSet;

use tracing::info;

use cvsub_ingest::tsv::TsvTable;
use cvsub_model::columns;
use cvsub_model::ids::VariantKey;
use cvsub_model::record::{RecordType, VariantRecord};
use cvsub_model::reference::ReferenceTable;

use crate::dedupe::dedupe_sites;
use crate::error::RowIssue;
use crate::normalize::minimal_representation;

const MERGE_MARKER: &str = "[MERGE:";
const INDIVIDUAL_MERGED: &str = "individual-merged";

#[derive(Debug, Default)]
pub struct CleanOutcome {
    pub variants: Vec<VariantRecord>,
    pub haplotypes: Vec<VariantRecord>,
    pub duplicates_removed: usize,
    pub discarded: Vec<VariantKey>,
    pub issues: Vec<RowIssue>,
}

pub fn clean_table(table: TsvTable, reference: Option<&ReferenceTable>) -> CleanOutcome {
    let records = table.into_records(RecordType::Variant);
    let input_rows = records.len();
    let mut outcome = CleanOutcome::default();

    let records = remove_duplicate_rows(records, &mut outcome);
    let mut kept: Vec<VariantRecord> = Vec::with_capacity(records.len());
    let mut seen_haplotypes: BTreeSet<String> = BTreeSet::new();

    for record in records {
        let ref_alt_parts = record.field(columns::REF_ALT).split('/').count();
        let notes = record.field(columns::NOTES).to_string();
        if ref_alt_parts == 3 {
            let (first, second) = separate_double_alternate(&record);
            for candidate in [first, second] {
                match normalize_record(candidate) {
                    Ok(normalized) => kept.push(normalized),
                    Err(issue) => outcome.issues.push(issue),
                }
            }
        } else if notes.contains(MERGE_MARKER) {
            match parse_merge_note(&notes) {
                Some(merge) => {
                    if seen_haplotypes.insert(merge.hgvs_c.clone()) {
                        outcome.haplotypes.push(haplotype_record(&record, &merge));
                    }
                    if merge.upload_type == INDIVIDUAL_MERGED {
                        kept.push(record);
                    }
                }
                None => outcome.issues.push(RowIssue::validation(
                    subject_of(&record),
                    "unparsable [MERGE: …] annotation in Notes",
                )),
            }
        } else if record.field(columns::HGVS_C).contains(',') {
            match extract_primary_transcript(&record) {
                Some(extracted) => kept.push(extracted),
                None => outcome.issues.push(RowIssue::validation(
                    subject_of(&record),
                    "no NM_ transcript among listed HGVS expressions",
                )),
            }
        } else {
            kept.push(record);
        }
    }

    let dedup = dedupe_sites(kept, reference);
    outcome.variants = dedup.records;
    outcome.discarded.extend(dedup.discarded);
    outcome.issues.extend(dedup.issues);

    info!(
        input_rows,
        cleaned_rows = outcome.variants.len(),
        haplotypes = outcome.haplotypes.len(),
        duplicates_removed = outcome.duplicates_removed,
        discarded_alleles = outcome.discarded.len(),
        issues = outcome.issues.len(),
        "cleaned raw table"
    );
    outcome
}

fn subject_of(record: &VariantRecord) -> String {
    record
        .key()
        .map(|key| key.to_string())
        .unwrap_or_else(|_| "<no key>".to_string())
}

fn remove_duplicate_rows(
    records: Vec<VariantRecord>,
    outcome: &mut CleanOutcome,
) -> Vec<VariantRecord> {
    let mut seen = BTreeSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        let identity = format!(
            "{}<->{}<->{}<->{}<->{}",
            record.field(columns::HGVS_C),
            record.field(columns::CHROMOSOME),
            record.field(columns::START),
            record.field(columns::STOP),
            record.field(columns::REF_ALT),
        );
        if seen.insert(identity) {
            unique.push(record);
        } else {
            outcome.duplicates_removed += 1;
        }
    }
    unique
}

/// Split a row reporting `ref/alt1/alt2` (common in repetitive regions) into
/// two single-alternate candidates. A comma-separated HGVS pair is divided
/// between them; a single HGVS describes only the first.
fn separate_double_alternate(record: &VariantRecord) -> (VariantRecord, VariantRecord) {
    let parts: Vec<&str> = record.field(columns::REF_ALT).split('/').collect();
    let mut first = record.clone();
    let mut second = record.clone();
    first.set_field(columns::REF_ALT, format!("{}/{}", parts[0], parts[1]));
    second.set_field(columns::REF_ALT, format!("{}/{}", parts[0], parts[2]));
    let hgvs = record.field(columns::HGVS_C);
    if let Some((left, right)) = hgvs.split_once(',') {
        first.set_field(columns::HGVS_C, left.trim());
        second.set_field(columns::HGVS_C, right.trim());
    } else {
        second.set_field(columns::HGVS_C, "");
    }
    (first, second)
}

/// Reduce padded alleles to minimal representation, shifting coordinates.
/// When the alleles change, the HGVS derived from the padded form is stale
/// and cleared. Coordinates that cannot describe the alleles make the row
/// an issue rather than a candidate.
fn normalize_record(mut record: VariantRecord) -> Result<VariantRecord, RowIssue> {
    let Ok(locus) = record.locus() else {
        return Ok(record);
    };
    let minimal =
        minimal_representation(&locus.reference, &locus.alternate, locus.start, locus.stop)
            .map_err(|error| RowIssue::validation(subject_of(&record), error.to_string()))?;
    if minimal.changed {
        record.set_field(
            columns::REF_ALT,
            format!("{}/{}", minimal.reference, minimal.alternate),
        );
        record.set_field(columns::START, minimal.start.to_string());
        record.set_field(columns::STOP, minimal.stop.to_string());
        record.set_field(columns::HGVS_C, "");
    }
    Ok(record)
}

/// Keep the first `NM_` transcript and its gene symbol from a row listing
/// several HGVS expressions.
fn extract_primary_transcript(record: &VariantRecord) -> Option<VariantRecord> {
    let expressions: Vec<&str> = record
        .field(columns::HGVS_C)
        .split(',')
        .map(str::trim)
        .collect();
    let genes: Vec<&str> = record
        .field(columns::GENE_NAMES)
        .split(',')
        .map(str::trim)
        .collect();
    let idx = expressions
        .iter()
        .position(|expression| expression.starts_with("NM"))?;
    let mut extracted = record.clone();
    extracted.set_field(columns::HGVS_C, expressions[idx]);
    if let Some(gene) = genes.get(idx) {
        extracted.set_field(columns::GENE_NAMES, *gene);
    }
    Some(extracted)
}

struct MergeNote {
    variants: String,
    hgvs_c: String,
    hgvs_p: String,
    classification: String,
    upload_type: String,
}

/// Parse `[MERGE: variants; hgvs c.; hgvs p.; classification; upload-type]`.
/// The export HTML-escapes `>` inside the annotation.
fn parse_merge_note(notes: &str) -> Option<MergeNote> {
    let start = notes.find(MERGE_MARKER)? + MERGE_MARKER.len();
    let end = notes.rfind(']')?;
    if end <= start {
        return None;
    }
    let body = notes[start..end].replace("&gt;", ">");
    let parts: Vec<&str> = body.trim().split("; ").collect();
    if parts.len() != 5 {
        return None;
    }
    Some(MergeNote {
        variants: parts[0].to_string(),
        hgvs_c: parts[1].to_string(),
        hgvs_p: parts[2].to_string(),
        classification: parts[3].to_string(),
        upload_type: parts[4].to_string(),
    })
}

fn haplotype_record(source: &VariantRecord, merge: &MergeNote) -> VariantRecord {
    let mut record = VariantRecord::new(RecordType::Haplotype, Default::default());
    record.set_field(columns::HGVS_C, merge.hgvs_c.as_str());
    record.set_field(columns::CLASSIFICATION, merge.classification.as_str());
    record.set_field(columns::VARIANTS, merge.variants.as_str());
    record.set_field(columns::HGVS_P, merge.hgvs_p.as_str());
    record.set_field(columns::GENE_NAMES, source.field(columns::GENE_NAMES));
    record.set_field(columns::NOTES, source.field(columns::NOTES));
    record.set_field(columns::LAST_EDITED, source.field(columns::LAST_EDITED));
    record
}
