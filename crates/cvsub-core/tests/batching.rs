//! Batch construction properties.

use std::collections::BTreeMap;

use proptest::prelude::*;

use cvsub_core::batch::{build_batches, deletion_accessions};
use cvsub_core::error::EngineError;
use cvsub_model::columns;
use cvsub_model::record::{Intent, RecordType, VariantRecord};

fn record(n: usize, scv: &str) -> VariantRecord {
    let mut fields = BTreeMap::new();
    fields.insert(columns::HGVS_C.to_string(), format!("NM_{n}:c.{n}A>T"));
    fields.insert(columns::SCV.to_string(), scv.to_string());
    VariantRecord::new(RecordType::Variant, fields)
}

#[test]
fn zero_batch_size_is_rejected() {
    let result = build_batches(vec![record(1, "")], RecordType::Variant, Intent::Novel, 0);
    assert!(matches!(result, Err(EngineError::InvalidBatchSize)));
}

#[test]
fn accessioned_record_cannot_be_novel() {
    let result = build_batches(
        vec![record(1, ""), record(2, "SCV000002")],
        RecordType::Variant,
        Intent::Novel,
        500,
    );
    assert!(matches!(result, Err(EngineError::AccessionSafety(_))));
}

#[test]
fn unaccessioned_record_cannot_be_update() {
    let result = build_batches(
        vec![record(1, "SCV000001"), record(2, "")],
        RecordType::Variant,
        Intent::Update,
        500,
    );
    assert!(matches!(result, Err(EngineError::AccessionSafety(_))));
}

#[test]
fn deletion_accessions_report_blank_rows() {
    let rows = vec![record(1, "SCV000001"), record(2, ""), record(3, "SCV000003")];
    let (accessions, missing) = deletion_accessions(&rows);
    assert_eq!(accessions.len(), 2);
    assert_eq!(missing, vec![1]);
}

proptest! {
    /// Every partition of M rows at size K yields exactly ceil(M/K) batches,
    /// covers each row once, and preserves input order.
    #[test]
    fn chunking_covers_all_rows_in_order(rows in 1usize..400, size in 1usize..50) {
        let records: Vec<VariantRecord> = (0..rows).map(|n| record(n, "")).collect();
        let batches =
            build_batches(records.clone(), RecordType::Variant, Intent::Novel, size).unwrap();
        prop_assert_eq!(batches.len(), rows.div_ceil(size));
        for batch in &batches {
            prop_assert!(!batch.records.is_empty());
            prop_assert!(batch.records.len() <= size);
        }
        let flattened: Vec<VariantRecord> = batches
            .into_iter()
            .flat_map(|batch| batch.records)
            .collect();
        prop_assert_eq!(flattened, records);
    }
}
