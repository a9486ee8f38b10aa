//! Reference table of previously-submitted records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{Accession, Locus, VariantKey};
use crate::record::VariantRecord;

/// Snapshot of one previously-submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub accession: Option<Accession>,
    /// Date the snapshot was last updated from an extraction.
    pub last_edited: String,
    pub fields: BTreeMap<String, String>,
}

/// At most one live snapshot per key: the most recent accepted local state
/// plus the latest-known accession. Insertion replaces, never appends, which
/// is what makes annotation idempotent.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: BTreeMap<VariantKey, ReferenceEntry>,
    /// Secondary index for matching rows whose HGVS was cleared during
    /// cleaning: coordinate tuple → primary key.
    by_coordinates: BTreeMap<Locus, VariantKey>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from reference rows read off a TSV artifact.
    /// Rows that yield no key (no HGVS and unparsable coordinates) are
    /// returned separately for reporting.
    pub fn from_records(records: &[VariantRecord]) -> (Self, Vec<String>) {
        let mut table = Self::new();
        let mut skipped = Vec::new();
        for record in records {
            match record.key() {
                Ok(key) => {
                    let entry = ReferenceEntry {
                        accession: record.accession(),
                        last_edited: record.last_edited().to_string(),
                        fields: record.fields.clone(),
                    };
                    table.insert(key, entry, record.locus().ok());
                }
                Err(error) => skipped.push(error.to_string()),
            }
        }
        (table, skipped)
    }

    pub fn insert(&mut self, key: VariantKey, entry: ReferenceEntry, locus: Option<Locus>) {
        if let Some(locus) = locus {
            self.by_coordinates.insert(locus, key.clone());
        }
        self.entries.insert(key, entry);
    }

    pub fn get(&self, key: &VariantKey) -> Option<&ReferenceEntry> {
        self.entries.get(key)
    }

    /// Coordinate fallback: finds the entry even when either side lost its
    /// HGVS expression.
    pub fn get_by_locus(&self, locus: &Locus) -> Option<(&VariantKey, &ReferenceEntry)> {
        let key = self.by_coordinates.get(locus)?;
        self.entries.get(key).map(|entry| (key, entry))
    }

    pub fn contains(&self, key: &VariantKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VariantKey, &ReferenceEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns;
    use crate::record::RecordType;

    fn record(hgvs: &str, scv: &str, edited: &str) -> VariantRecord {
        let mut fields = BTreeMap::new();
        fields.insert(columns::HGVS_C.to_string(), hgvs.to_string());
        fields.insert(columns::SCV.to_string(), scv.to_string());
        fields.insert(columns::LAST_EDITED.to_string(), edited.to_string());
        fields.insert(columns::CHROMOSOME.to_string(), "1".to_string());
        fields.insert(columns::START.to_string(), "10".to_string());
        fields.insert(columns::STOP.to_string(), "11".to_string());
        fields.insert(columns::REF_ALT.to_string(), "A/G".to_string());
        VariantRecord::new(RecordType::Variant, fields)
    }

    #[test]
    fn one_live_snapshot_per_key() {
        let rows = vec![
            record("NM_1:c.1A>G", "SCV1", "2023-01-01"),
            record("NM_1:c.1A>G", "SCV2", "2024-01-01"),
        ];
        let (table, skipped) = ReferenceTable::from_records(&rows);
        assert!(skipped.is_empty());
        assert_eq!(table.len(), 1);
        let entry = table
            .get(&VariantKey::Hgvs("NM_1:c.1A>G".to_string()))
            .unwrap();
        assert_eq!(entry.accession.as_ref().unwrap().as_str(), "SCV2");
    }

    #[test]
    fn locus_fallback_finds_entry() {
        let rows = vec![record("NM_1:c.1A>G", "SCV1", "2023-01-01")];
        let (table, _) = ReferenceTable::from_records(&rows);
        let locus = rows[0].locus().unwrap();
        let (key, entry) = table.get_by_locus(&locus).unwrap();
        assert_eq!(key, &VariantKey::Hgvs("NM_1:c.1A>G".to_string()));
        assert_eq!(entry.accession.as_ref().unwrap().as_str(), "SCV1");
    }
}
