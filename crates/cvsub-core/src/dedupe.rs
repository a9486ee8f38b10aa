//! Collapse multi-allelic site groups to one representative row.
//!
//! The registry accepts only one allele representation per site. Rows are
//! grouped by site (chromosome, start, stop, reference allele); within a
//! group exactly one representative survives:
//!
//! 1. the allele whose identity is already in the reference table, so a
//!    previously-submitted representation is never silently swapped;
//! 2. otherwise, when the group agrees on its classification, the
//!    lexicographically smallest alternate allele string;
//! 3. a group with conflicting classifications and no reference signal has
//!    no resolvable representative and is reported instead.
//!
//! Discarded allele identities are retained so reconciliation can see that
//! a previously-submitted representation changed.

use std::collections::BTreeMap;

use tracing::debug;

use cvsub_model::ids::VariantKey;
use cvsub_model::record::VariantRecord;
use cvsub_model::reference::ReferenceTable;

use crate::error::RowIssue;

#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub records: Vec<VariantRecord>,
    /// Identities of alleles dropped in favor of a group representative.
    pub discarded: Vec<VariantKey>,
    pub issues: Vec<RowIssue>,
}

type SiteKey = (String, u64, u64, String);

pub fn dedupe_sites(
    records: Vec<VariantRecord>,
    reference: Option<&ReferenceTable>,
) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();
    let mut groups: BTreeMap<SiteKey, Vec<usize>> = BTreeMap::new();
    let mut keyed: Vec<Option<SiteKey>> = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        match record.locus() {
            Ok(locus) => {
                let key = (
                    locus.chromosome.clone(),
                    locus.start,
                    locus.stop,
                    locus.reference.clone(),
                );
                groups.entry(key.clone()).or_default().push(idx);
                keyed.push(Some(key));
            }
            Err(error) => {
                // A row without coordinates can still be submitted by HGVS;
                // it just cannot take part in site grouping.
                if record.hgvs().is_none() {
                    outcome
                        .issues
                        .push(RowIssue::validation("<no key>", error.to_string()));
                }
                keyed.push(None);
            }
        }
    }

    let mut emitted: BTreeMap<SiteKey, bool> = BTreeMap::new();
    for (idx, record) in records.iter().enumerate() {
        let Some(site) = &keyed[idx] else {
            if record.hgvs().is_some() {
                outcome.records.push(record.clone());
            }
            continue;
        };
        if *emitted.get(site).unwrap_or(&false) {
            continue;
        }
        emitted.insert(site.clone(), true);
        let members = &groups[site];
        if members.len() == 1 {
            outcome.records.push(record.clone());
            continue;
        }
        let candidates: Vec<&VariantRecord> = members.iter().map(|&i| &records[i]).collect();
        match choose_representative(&candidates, reference) {
            Ok(winner) => {
                debug!(
                    site = %format!("{}:{}-{} {}", site.0, site.1, site.2, site.3),
                    alleles = candidates.len(),
                    "collapsed multi-allelic site"
                );
                for (pos, candidate) in candidates.iter().enumerate() {
                    if pos == winner {
                        outcome.records.push((*candidate).clone());
                    } else if let Ok(key) = candidate.key() {
                        outcome.discarded.push(key);
                    }
                }
            }
            Err(message) => {
                let subject = format!("{}:{}-{}/{}", site.0, site.1, site.2, site.3);
                outcome.issues.push(RowIssue::validation(subject, message));
            }
        }
    }
    outcome
}

/// Index of the surviving candidate, or the reason the group is unresolvable.
fn choose_representative(
    candidates: &[&VariantRecord],
    reference: Option<&ReferenceTable>,
) -> Result<usize, String> {
    if let Some(reference) = reference {
        for (idx, candidate) in candidates.iter().enumerate() {
            let known_by_key = candidate
                .key()
                .map(|key| reference.contains(&key))
                .unwrap_or(false);
            let known_by_locus = candidate
                .locus()
                .ok()
                .and_then(|locus| reference.get_by_locus(&locus))
                .is_some();
            if known_by_key || known_by_locus {
                return Ok(idx);
            }
        }
    }
    let first_classification = candidates[0].classification().trim().to_lowercase();
    let agreed = candidates
        .iter()
        .all(|c| c.classification().trim().to_lowercase() == first_classification);
    if !agreed {
        return Err(format!(
            "{} alternate alleles with conflicting classifications and no prior submission to break the tie",
            candidates.len()
        ));
    }
    let winner = candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let alt_a = a.locus().map(|l| l.alternate).unwrap_or_default();
            let alt_b = b.locus().map(|l| l.alternate).unwrap_or_default();
            alt_a.cmp(&alt_b)
        })
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    Ok(winner)
}
