//! Classify cleaned rows against the reference table.
//!
//! Every row lands in exactly one of NOVEL, UPDATE or UNCHANGED (or the
//! conflict list). UNCHANGED rows are logged and never forwarded. A row
//! that already carries an accession but is missing from the reference is
//! an update whose reference row was not yet synced; re-creating it as
//! novel would make the registry issue a duplicate accession, so that path
//! does not exist here.

use tracing::{debug, info, warn};

use cvsub_model::columns;
use cvsub_model::ids::ExtractionDate;
use cvsub_model::record::VariantRecord;
use cvsub_model::reference::{ReferenceEntry, ReferenceTable};

use crate::error::RowIssue;

#[derive(Debug, Default)]
pub struct Reconciliation {
    pub novel: Vec<VariantRecord>,
    pub update: Vec<VariantRecord>,
    pub unchanged: Vec<VariantRecord>,
    /// Rows whose accession state disagrees with the reference; excluded
    /// from every batch set and surfaced to the caller.
    pub conflicts: Vec<RowIssue>,
}

pub fn reconcile(
    records: Vec<VariantRecord>,
    reference: Option<&ReferenceTable>,
    extraction_date: &ExtractionDate,
) -> Reconciliation {
    let mut result = Reconciliation::default();
    for mut record in records {
        let subject = record
            .key()
            .map(|key| key.to_string())
            .unwrap_or_else(|_| "<no key>".to_string());
        let entry = lookup(&record, reference).cloned();
        match entry {
            None => {
                match record.accession() {
                    // Accessioned locally but unknown to the reference: the
                    // reference artifact lags behind. Update, never novel.
                    Some(accession) => {
                        warn!(
                            row = %subject,
                            accession = %accession,
                            "accessioned row missing from reference table, treating as update"
                        );
                        record.set_field(columns::LAST_EDITED, extraction_date.as_str());
                        result.update.push(record);
                    }
                    None => result.novel.push(record),
                }
            }
            Some(entry) => {
                if record.last_edited() <= entry.last_edited.as_str() {
                    debug!(row = %subject, "unchanged since last submission");
                    result.unchanged.push(record);
                    continue;
                }
                match &entry.accession {
                    Some(accession) => {
                        record.set_accession(accession);
                        record.set_field(columns::LAST_EDITED, extraction_date.as_str());
                        result.update.push(record);
                    }
                    None => result.conflicts.push(RowIssue::conflict(
                        subject,
                        "row matches a reference entry that has no accession; \
                         resubmitting it as novel could duplicate the registry record",
                    )),
                }
            }
        }
    }
    info!(
        novel = result.novel.len(),
        update = result.update.len(),
        unchanged = result.unchanged.len(),
        conflicts = result.conflicts.len(),
        "reconciled against reference table"
    );
    result
}

/// Match by key first, then by coordinate tuple for rows whose HGVS was
/// cleared (or was never present) on either side.
fn lookup<'a>(
    record: &VariantRecord,
    reference: Option<&'a ReferenceTable>,
) -> Option<&'a ReferenceEntry> {
    let reference = reference?;
    if let Ok(key) = record.key()
        && let Some(entry) = reference.get(&key)
    {
        return Some(entry);
    }
    let locus = record.locus().ok()?;
    reference.get_by_locus(&locus).map(|(_, entry)| entry)
}
