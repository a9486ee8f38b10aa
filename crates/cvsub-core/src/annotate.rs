//! Write registry accessions back into the cleaned tables.
//!
//! Runs after the report documents for a submission round have been
//! retrieved. The annotated table becomes the reference table of the next
//! round, so annotation must be idempotent: re-running it over the same
//! reports changes nothing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use cvsub_ingest::artifact::ArtifactStore;
use cvsub_ingest::tsv::{read_tsv_table, render_tsv};
use cvsub_model::columns;
use cvsub_model::ids::{Accession, ExtractionDate};
use cvsub_model::record::{RecordType, VariantRecord};
use cvsub_model::report::ReportDocument;

use crate::normalize::repair_hgvs;

#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub record_type: RecordType,
    /// Date the annotated catalogue was extracted; stamped onto rows whose
    /// accession was resolved from a report document this round.
    pub extraction_date: ExtractionDate,
    /// Artifact key the annotated table is written under.
    pub output_key: String,
}

#[derive(Debug, Default)]
pub struct AnnotateSummary {
    pub rows: usize,
    pub annotated: usize,
    pub carried_forward: usize,
    /// Report keys that matched no row in the cleaned table.
    pub unmatched: Vec<String>,
}

/// Merge reference accessions and report outcomes into the cleaned table.
///
/// Accessions are resolved in two layers: the previous reference table
/// seeds the map, then the manifest's report documents overlay it. A row
/// already annotated therefore keeps its accession, and a row the registry
/// just accessioned gains one.
pub fn run_annotate<S: ArtifactStore>(
    store: &S,
    manifest_key: &str,
    cleaned: &Path,
    reference: Option<&Path>,
    options: &AnnotateOptions,
) -> Result<AnnotateSummary> {
    let span = info_span!("annotate", record_type = %options.record_type);
    let _guard = span.enter();

    let table = read_tsv_table(cleaned).with_context(|| format!("read {}", cleaned.display()))?;
    let mut headers = table.headers.clone();
    if !headers.iter().any(|header| header == columns::SCV) {
        headers.push(columns::SCV.to_string());
    }
    let mut records = table.into_records(options.record_type);

    let mut accessions: BTreeMap<String, Accession> = BTreeMap::new();
    let reference_records = match reference {
        Some(path) => {
            let table =
                read_tsv_table(path).with_context(|| format!("read {}", path.display()))?;
            table.into_records(options.record_type)
        }
        None => Vec::new(),
    };
    for record in &reference_records {
        if let Some(accession) = record.accession() {
            for identity in identities(record) {
                accessions.insert(identity, accession.clone());
            }
        }
    }

    let mut summary = AnnotateSummary {
        rows: records.len(),
        ..AnnotateSummary::default()
    };
    let report_keys = fold_reports(store, manifest_key, options.record_type, &mut accessions)?;
    let resolved: BTreeSet<String> = report_keys.iter().cloned().collect();

    let mut matched: BTreeSet<String> = BTreeSet::new();
    for record in &mut records {
        for identity in identities(record) {
            if let Some(accession) = accessions.get(&identity) {
                record.set_accession(accession);
                // A report-resolved accession dates the row at this
                // extraction; reference-seeded rows keep their stamp.
                if resolved.contains(&identity) {
                    record.set_field(columns::LAST_EDITED, options.extraction_date.as_str());
                }
                summary.annotated += 1;
                matched.insert(identity);
                break;
            }
        }
    }
    summary.unmatched = report_keys
        .into_iter()
        .filter(|key| !matched.contains(key))
        .collect();
    for key in &summary.unmatched {
        warn!(local_key = %key, "report outcome matched no cleaned row");
    }

    // Haplotype tables accumulate across rounds: accessioned rows from the
    // previous table that this export did not re-emit are carried forward,
    // ahead of the fresh rows.
    if options.record_type == RecordType::Haplotype {
        let emitted: BTreeSet<String> = records
            .iter()
            .map(|record| record.field(columns::HGVS_C).to_string())
            .collect();
        let mut carried: Vec<VariantRecord> = reference_records
            .into_iter()
            .filter(|record| {
                record.accession().is_some() && !emitted.contains(record.field(columns::HGVS_C))
            })
            .collect();
        summary.carried_forward = carried.len();
        carried.append(&mut records);
        records = carried;
    }

    store.write(&options.output_key, &render_tsv(&headers, &records)?)?;
    info!(
        rows = summary.rows,
        annotated = summary.annotated,
        carried_forward = summary.carried_forward,
        unmatched = summary.unmatched.len(),
        output = %options.output_key,
        "annotated table written"
    );
    Ok(summary)
}

/// Overlay report outcomes onto the accession map. Returns every local key
/// the reports resolved, for unmatched-row accounting.
fn fold_reports<S: ArtifactStore>(
    store: &S,
    manifest_key: &str,
    record_type: RecordType,
    accessions: &mut BTreeMap<String, Accession>,
) -> Result<Vec<String>> {
    if !store.exists(manifest_key) {
        warn!(manifest = %manifest_key, "no manifest found, annotating from reference only");
        return Ok(Vec::new());
    }
    let manifest = String::from_utf8(store.read(manifest_key)?)
        .with_context(|| format!("manifest {manifest_key} is not utf-8"))?;
    let mut resolved = Vec::new();
    for line in manifest.lines().filter(|line| !line.trim().is_empty()) {
        let mut parts = line.split_whitespace();
        let (Some(location), Some(listed_type)) = (parts.next(), parts.next()) else {
            warn!(line, "malformed manifest line skipped");
            continue;
        };
        if listed_type != record_type.as_str() {
            continue;
        }
        let raw = String::from_utf8(store.read(location)?)
            .with_context(|| format!("report {location} is not utf-8"))?;
        let report = ReportDocument::from_json(&raw)?;
        for outcome in &report.outcomes {
            match &outcome.accession {
                Some(accession) => {
                    accessions.insert(outcome.local_key.clone(), accession.clone());
                    resolved.push(outcome.local_key.clone());
                }
                None => warn!(
                    local_key = %outcome.local_key,
                    disposition = ?outcome.disposition,
                    "report outcome carries no accession"
                ),
            }
        }
    }
    Ok(resolved)
}

/// Every identity a row may be known by in a report document or reference
/// table: its primary transcript expression, the repaired form of that
/// expression, and the coordinate token. Checked in that order.
fn identities(record: &VariantRecord) -> Vec<String> {
    let mut out = Vec::new();
    let locus = record.locus().ok();
    if let Some(hgvs) = record.hgvs() {
        out.push(hgvs.to_string());
        if let Some(locus) = &locus
            && let Some(repaired) = repair_hgvs(hgvs, &locus.alternate)
        {
            out.push(repaired);
        }
    }
    if let Some(locus) = locus {
        out.push(locus.identity_token());
    }
    out
}
