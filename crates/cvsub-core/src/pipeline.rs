//! Submit-mode orchestration.
//!
//! raw table → clean → reconcile → batch → payload artifacts → registry →
//! manifests. Each stage communicates through the artifact store; the
//! manifests are the sole handoff to the status/annotation stages.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, info_span, warn};

use cvsub_ingest::artifact::ArtifactStore;
use cvsub_ingest::tsv::{read_tsv_table, render_tsv};
use cvsub_model::columns;
use cvsub_model::ids::{ExtractionDate, VariantKey};
use cvsub_model::record::{CatalogueOrigin, Intent, RecordType, VariantRecord};
use cvsub_model::reference::ReferenceTable;
use cvsub_model::report::ReportDocument;

use crate::batch::{Batch, build_batches, deletion_accessions};
use crate::clean::clean_table;
use crate::error::RowIssue;
use crate::payload::{batch_payload, deletion_payload};
use crate::reconcile::{Reconciliation, reconcile};
use crate::registry::{Registry, SubmissionId, SubmissionStatus, SubmitOutcome};

/// Artifact key conventions shared by the submit, status and annotate
/// stages.
pub mod keys {
    use cvsub_model::record::{CatalogueOrigin, Intent, RecordType};

    pub fn cleaned_table(stem: &str) -> String {
        format!("cleaned/{stem}_cleaned.tsv")
    }

    pub fn cleaned_haplotypes(stem: &str) -> String {
        format!("cleaned/{stem}_haplotypes_cleaned.tsv")
    }

    pub fn pending_payload(seq: usize) -> String {
        format!("payloads/pending-{seq}.json")
    }

    pub fn payload(
        submission_id: &str,
        origin: CatalogueOrigin,
        record_type: RecordType,
        intent: Intent,
    ) -> String {
        format!("payloads/{submission_id}-{origin}_{record_type}_{intent}.json")
    }

    pub fn report(submission_id: &str) -> String {
        format!("reports/{submission_id}-summary-report.json")
    }

    pub fn manifest(intent: Intent) -> String {
        format!("manifests/{intent}_summaries.txt")
    }

    pub fn batch_error(record_type: RecordType, intent: Intent, seq: usize) -> String {
        format!("errors/{record_type}_{intent}_{seq}.txt")
    }
}

#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub origin: CatalogueOrigin,
    pub batch_size: usize,
    pub extraction_date: ExtractionDate,
    /// Reconcile against reference tables (update mode). When false every
    /// cleaned row is submitted as novel, as on a first-ever run.
    pub reconcile: bool,
}

/// Per-partition classification counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassCounts {
    pub novel: usize,
    pub update: usize,
    pub unchanged: usize,
}

/// Outcome of one submitted (or attempted) batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub record_type: RecordType,
    pub intent: Intent,
    pub rows: usize,
    pub submission_id: Option<String>,
    pub payload_key: Option<String>,
    /// Manifest entry pointing at the eventual report document.
    pub report_location: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub input_rows: usize,
    pub duplicates_removed: usize,
    pub discarded: Vec<VariantKey>,
    pub variants: ClassCounts,
    pub haplotypes: ClassCounts,
    pub issues: Vec<RowIssue>,
    pub conflicts: Vec<RowIssue>,
    pub batches: Vec<BatchOutcome>,
    pub cleaned_table_key: Option<String>,
    pub cleaned_haplotypes_key: Option<String>,
}

impl RunSummary {
    /// True when anything row- or batch-level must surface in the exit code.
    pub fn has_errors(&self) -> bool {
        !self.issues.is_empty()
            || !self.conflicts.is_empty()
            || self.batches.iter().any(|batch| batch.error.is_some())
    }

    pub fn accepted_batches(&self) -> usize {
        self.batches
            .iter()
            .filter(|batch| batch.submission_id.is_some())
            .count()
    }
}

pub fn run_submit<S: ArtifactStore, R: Registry>(
    store: &S,
    registry: &R,
    input: &Path,
    reference_variants: Option<&Path>,
    reference_haplotypes: Option<&Path>,
    options: &SubmitOptions,
) -> Result<RunSummary> {
    let span = info_span!("submit", input = %input.display(), origin = %options.origin);
    let _guard = span.enter();

    let table = read_tsv_table(input).with_context(|| format!("read {}", input.display()))?;
    table.require_columns(input, columns::REQUIRED_VARIANT_COLUMNS)?;
    let headers = table.headers.clone();
    let input_rows = table.rows.len();

    let mut summary = RunSummary {
        input_rows,
        ..RunSummary::default()
    };

    let variant_reference = load_reference(reference_variants, RecordType::Variant, &mut summary)?;
    let haplotype_reference =
        load_reference(reference_haplotypes, RecordType::Haplotype, &mut summary)?;

    let cleaned = clean_table(table, variant_reference.as_ref());
    summary.duplicates_removed = cleaned.duplicates_removed;
    summary.discarded = cleaned.discarded;
    summary.issues.extend(cleaned.issues);

    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("catalogue");
    let cleaned_key = keys::cleaned_table(stem);
    store.write(&cleaned_key, &render_tsv(&headers, &cleaned.variants)?)?;
    summary.cleaned_table_key = Some(cleaned_key);
    if !cleaned.haplotypes.is_empty() {
        let haplo_headers: Vec<String> = columns::HAPLOTYPE_COLUMNS
            .iter()
            .map(|name| (*name).to_string())
            .collect();
        let key = keys::cleaned_haplotypes(stem);
        store.write(&key, &render_tsv(&haplo_headers, &cleaned.haplotypes)?)?;
        summary.cleaned_haplotypes_key = Some(key);
    }

    let mut sequence = 0usize;
    for (records, record_type, reference) in [
        (cleaned.variants, RecordType::Variant, &variant_reference),
        (cleaned.haplotypes, RecordType::Haplotype, &haplotype_reference),
    ] {
        if records.is_empty() {
            continue;
        }
        let classified = if options.reconcile {
            reconcile(records, reference.as_ref(), &options.extraction_date)
        } else {
            Reconciliation {
                novel: records,
                ..Reconciliation::default()
            }
        };
        let counts = ClassCounts {
            novel: classified.novel.len(),
            update: classified.update.len(),
            unchanged: classified.unchanged.len(),
        };
        match record_type {
            RecordType::Variant => summary.variants = counts,
            RecordType::Haplotype => summary.haplotypes = counts,
        }
        summary.conflicts.extend(classified.conflicts);

        for (partition, intent) in [
            (classified.novel, Intent::Novel),
            (classified.update, Intent::Update),
        ] {
            submit_partition(
                store,
                registry,
                partition,
                record_type,
                intent,
                options,
                &mut sequence,
                &mut summary.batches,
            )?;
        }
    }

    info!(
        input_rows = summary.input_rows,
        accepted_batches = summary.accepted_batches(),
        issues = summary.issues.len(),
        conflicts = summary.conflicts.len(),
        "submit run finished"
    );
    Ok(summary)
}

fn load_reference(
    path: Option<&Path>,
    record_type: RecordType,
    summary: &mut RunSummary,
) -> Result<Option<ReferenceTable>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let table = read_tsv_table(path).with_context(|| format!("read {}", path.display()))?;
    let records = table.into_records(record_type);
    let (reference, skipped) = ReferenceTable::from_records(&records);
    for message in skipped {
        summary
            .issues
            .push(RowIssue::validation(path.display().to_string(), message));
    }
    info!(
        path = %path.display(),
        entries = reference.len(),
        record_type = %record_type,
        "loaded reference table"
    );
    Ok(Some(reference))
}

#[allow(clippy::too_many_arguments)]
fn submit_partition<S: ArtifactStore, R: Registry>(
    store: &S,
    registry: &R,
    records: Vec<VariantRecord>,
    record_type: RecordType,
    intent: Intent,
    options: &SubmitOptions,
    sequence: &mut usize,
    outcomes: &mut Vec<BatchOutcome>,
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let rows = records.len();
    let batches = match build_batches(records, record_type, intent, options.batch_size) {
        Ok(batches) => batches,
        Err(engine_error) => {
            // Accession safety is fatal for the whole partition; nothing of
            // it may reach the registry, but sibling partitions proceed.
            error!(
                record_type = %record_type,
                intent = %intent,
                error = %engine_error,
                "partition refused"
            );
            outcomes.push(BatchOutcome {
                record_type,
                intent,
                rows,
                submission_id: None,
                payload_key: None,
                report_location: None,
                error: Some(engine_error.to_string()),
            });
            return Ok(());
        }
    };
    for batch in batches {
        *sequence += 1;
        outcomes.push(submit_batch(store, registry, &batch, options, *sequence)?);
    }
    Ok(())
}

fn submit_batch<S: ArtifactStore, R: Registry>(
    store: &S,
    registry: &R,
    batch: &Batch,
    options: &SubmitOptions,
    sequence: usize,
) -> Result<BatchOutcome> {
    let payload = batch_payload(batch, options.origin, &options.extraction_date)?;
    let pending_key = keys::pending_payload(sequence);
    store.write(&pending_key, &serde_json::to_vec_pretty(&payload)?)?;

    // Transport failure is fatal for the run; a rejection is isolated to
    // this batch.
    match registry.submit(&payload)? {
        SubmitOutcome::Accepted(id) => {
            let payload_key = keys::payload(&id.0, options.origin, batch.record_type, batch.intent);
            store.rename(&pending_key, &payload_key)?;
            let report_location = keys::report(&id.0);
            store.append_line(
                &keys::manifest(batch.intent),
                &format!("{report_location} {}", batch.record_type),
            )?;
            info!(
                submission_id = %id,
                record_type = %batch.record_type,
                intent = %batch.intent,
                rows = batch.records.len(),
                "batch accepted"
            );
            Ok(BatchOutcome {
                record_type: batch.record_type,
                intent: batch.intent,
                rows: batch.records.len(),
                submission_id: Some(id.0),
                payload_key: Some(payload_key),
                report_location: Some(report_location),
                error: None,
            })
        }
        SubmitOutcome::Rejected { message } => {
            let error_key = keys::batch_error(batch.record_type, batch.intent, sequence);
            store.write(&error_key, message.as_bytes())?;
            warn!(
                record_type = %batch.record_type,
                intent = %batch.intent,
                rows = batch.records.len(),
                error_artifact = %error_key,
                "batch rejected, payload retained for resubmission"
            );
            Ok(BatchOutcome {
                record_type: batch.record_type,
                intent: batch.intent,
                rows: batch.records.len(),
                submission_id: None,
                payload_key: Some(pending_key),
                report_location: None,
                error: Some(message),
            })
        }
    }
}

/// Deletion flow: rows carry only an accession and an explicit delete
/// intent. No dedup or reconciliation applies; deletion is idempotent per
/// accession.
pub fn run_delete<S: ArtifactStore, R: Registry>(
    store: &S,
    registry: &R,
    input: &Path,
    batch_size: usize,
) -> Result<RunSummary> {
    let span = info_span!("delete", input = %input.display());
    let _guard = span.enter();

    let table = read_tsv_table(input).with_context(|| format!("read {}", input.display()))?;
    table.require_columns(input, &[columns::SCV])?;
    let records = table.into_records(RecordType::Variant);
    let mut summary = RunSummary {
        input_rows: records.len(),
        ..RunSummary::default()
    };
    let (accessions, missing) = deletion_accessions(&records);
    for idx in missing {
        summary.issues.push(RowIssue::validation(
            format!("row {}", idx + 2),
            "deletion row without an SCV accession",
        ));
    }
    if accessions.is_empty() {
        warn!("no accessions to delete");
        return Ok(summary);
    }
    for (seq, chunk) in accessions.chunks(batch_size.max(1)).enumerate() {
        let sequence = seq + 1;
        let payload = deletion_payload(chunk);
        let pending_key = keys::pending_payload(sequence);
        store.write(&pending_key, &serde_json::to_vec_pretty(&payload)?)?;
        let outcome = match registry.submit(&payload)? {
            SubmitOutcome::Accepted(id) => {
                let payload_key = format!("payloads/{id}-deletions.json");
                store.rename(&pending_key, &payload_key)?;
                info!(submission_id = %id, rows = chunk.len(), "deletion batch accepted");
                BatchOutcome {
                    record_type: RecordType::Variant,
                    intent: Intent::Delete,
                    rows: chunk.len(),
                    submission_id: Some(id.0),
                    payload_key: Some(payload_key),
                    report_location: None,
                    error: None,
                }
            }
            SubmitOutcome::Rejected { message } => {
                let error_key = keys::batch_error(RecordType::Variant, Intent::Delete, sequence);
                store.write(&error_key, message.as_bytes())?;
                warn!(rows = chunk.len(), "deletion batch rejected");
                BatchOutcome {
                    record_type: RecordType::Variant,
                    intent: Intent::Delete,
                    rows: chunk.len(),
                    submission_id: None,
                    payload_key: Some(pending_key),
                    report_location: None,
                    error: Some(message),
                }
            }
        };
        summary.batches.push(outcome);
    }
    Ok(summary)
}

/// Outcome of polling one submission.
#[derive(Debug)]
pub struct StatusOutcome {
    pub status: SubmissionStatus,
    /// Key of the persisted report document, once ready.
    pub report_key: Option<String>,
}

/// Poll a submission; when the report is ready, fetch it and persist the raw
/// document under the key the manifest recorded at submit time.
pub fn run_status<S: ArtifactStore, R: Registry>(
    store: &S,
    registry: &R,
    submission_id: &SubmissionId,
) -> Result<StatusOutcome> {
    let status = registry.status(submission_id)?;
    match &status {
        SubmissionStatus::Pending => {
            info!(submission_id = %submission_id, "submission still processing");
            Ok(StatusOutcome {
                status,
                report_key: None,
            })
        }
        SubmissionStatus::Failed { message } => {
            error!(submission_id = %submission_id, message, "submission failed");
            Ok(StatusOutcome {
                status,
                report_key: None,
            })
        }
        SubmissionStatus::Ready { location } => {
            let raw = registry.fetch(location)?;
            // Parse before persisting so a truncated document fails here,
            // not during annotation.
            let report = ReportDocument::from_json(&raw)?;
            let report_key = keys::report(&submission_id.0);
            store.write(&report_key, raw.as_bytes())?;
            info!(
                submission_id = %submission_id,
                outcomes = report.outcomes.len(),
                report_key = %report_key,
                "report document retrieved"
            );
            Ok(StatusOutcome {
                status,
                report_key: Some(report_key),
            })
        }
    }
}
