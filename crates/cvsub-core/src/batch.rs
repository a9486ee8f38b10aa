//! Partition classified rows into submission-ready batches.

use cvsub_model::ids::Accession;
use cvsub_model::record::{Intent, RecordType, VariantRecord};

use crate::error::EngineError;

/// Registry-imposed default maximum batch size.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Ordered sequence of records sharing one record type and one intent.
#[derive(Debug, Clone)]
pub struct Batch {
    pub record_type: RecordType,
    pub intent: Intent,
    pub records: Vec<VariantRecord>,
    /// Assigned once the registry accepts the batch.
    pub submission_id: Option<String>,
}

/// Chunk one partition into ceil(M/K) batches of at most `max_size` rows,
/// preserving order and covering every row exactly once.
///
/// Accession safety is enforced here, before any payload exists: a record
/// with an accession never enters a novel batch, and an update batch never
/// accepts a record without one. Both are hard errors, not downgrades.
pub fn build_batches(
    records: Vec<VariantRecord>,
    record_type: RecordType,
    intent: Intent,
    max_size: usize,
) -> Result<Vec<Batch>, EngineError> {
    if max_size == 0 {
        return Err(EngineError::InvalidBatchSize);
    }
    for record in &records {
        check_accession_state(record, intent)?;
    }
    let mut batches = Vec::with_capacity(records.len().div_ceil(max_size));
    let mut records = records;
    while !records.is_empty() {
        let rest = records.split_off(records.len().min(max_size));
        batches.push(Batch {
            record_type,
            intent,
            records: std::mem::replace(&mut records, rest),
            submission_id: None,
        });
    }
    Ok(batches)
}

fn check_accession_state(record: &VariantRecord, intent: Intent) -> Result<(), EngineError> {
    let subject = || {
        record
            .key()
            .map(|key| key.to_string())
            .unwrap_or_else(|_| "<no key>".to_string())
    };
    match (intent, record.accession()) {
        (Intent::Novel, Some(accession)) => Err(EngineError::AccessionSafety(format!(
            "{} already holds accession {accession} and cannot be submitted as novel",
            subject()
        ))),
        (Intent::Update, None) => Err(EngineError::AccessionSafety(format!(
            "{} has no accession and cannot be submitted as an update",
            subject()
        ))),
        _ => Ok(()),
    }
}

/// Collect the accessions of a deletion table's rows.
pub fn deletion_accessions(records: &[VariantRecord]) -> (Vec<Accession>, Vec<usize>) {
    let mut accessions = Vec::with_capacity(records.len());
    let mut missing = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match record.accession() {
            Some(accession) => accessions.push(accession),
            None => missing.push(idx),
        }
    }
    (accessions, missing)
}
