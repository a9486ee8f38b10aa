//! Typed representation of a catalogue row and its submission metadata.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns;
use crate::error::{ModelError, Result};
use crate::ids::{Accession, Locus, VariantKey};

/// Kind of record a row describes. Haplotypes aggregate several variants and
/// run through their own reconciliation and annotation passes against a
/// separate reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    Variant,
    Haplotype,
}

impl RecordType {
    /// Tag used in manifest lines and artifact names.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Variant => "variants",
            RecordType::Haplotype => "haplotypes",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission intent of a batch. Intents never mix within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Intent {
    Novel,
    Update,
    Delete,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Novel => "novel",
            Intent::Update => "update",
            Intent::Delete => "delete",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which catalogue the export came from. Selects the classification
/// vocabulary and condition block of the submission payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogueOrigin {
    Germline,
    Somatic,
}

impl CatalogueOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogueOrigin::Germline => "germline",
            CatalogueOrigin::Somatic => "somatic",
        }
    }
}

impl fmt::Display for CatalogueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the exported catalogue together with its record type.
///
/// Cells are kept as an ordered name → value map so cleaned tables
/// round-trip through the artifact store with every local column intact;
/// payload serialization strips anything the registry schema does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub record_type: RecordType,
    pub fields: BTreeMap<String, String>,
}

impl VariantRecord {
    pub fn new(record_type: RecordType, fields: BTreeMap<String, String>) -> Self {
        Self {
            record_type,
            fields,
        }
    }

    /// Cell value by column name, empty string when absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Primary HGVS c. expression: the first entry when the export lists
    /// several, `None` when the cell is empty.
    pub fn hgvs(&self) -> Option<&str> {
        let raw = self.field(columns::HGVS_C);
        let first = raw.split(',').next().unwrap_or("").trim();
        if first.is_empty() { None } else { Some(first) }
    }

    /// Parse the coordinate columns. Haplotype rows have none.
    pub fn locus(&self) -> Result<Locus> {
        let ref_alt = self.field(columns::REF_ALT);
        let mut alleles = ref_alt.split('/');
        let (Some(reference), Some(alternate)) = (alleles.next(), alleles.next()) else {
            return Err(ModelError::MalformedRow(format!(
                "Ref/Alt {ref_alt:?} is not ref/alt"
            )));
        };
        let start = self.parse_position(columns::START)?;
        let stop = self.parse_position(columns::STOP)?;
        Ok(Locus {
            chromosome: self.field(columns::CHROMOSOME).to_string(),
            start,
            stop,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
        })
    }

    fn parse_position(&self, column: &str) -> Result<u64> {
        let raw = self.field(column);
        raw.parse().map_err(|_| {
            ModelError::MalformedRow(format!("{column} {raw:?} is not a position"))
        })
    }

    /// Stable identity: HGVS when present, coordinates otherwise.
    pub fn key(&self) -> Result<VariantKey> {
        if let Some(hgvs) = self.hgvs() {
            return Ok(VariantKey::Hgvs(hgvs.to_string()));
        }
        Ok(VariantKey::Coordinates(self.locus()?))
    }

    pub fn accession(&self) -> Option<Accession> {
        let raw = self.field(columns::SCV).trim();
        if raw.is_empty() {
            None
        } else {
            Some(Accession::new(raw))
        }
    }

    pub fn set_accession(&mut self, accession: &Accession) {
        self.set_field(columns::SCV, accession.as_str());
    }

    pub fn last_edited(&self) -> &str {
        self.field(columns::LAST_EDITED)
    }

    pub fn classification(&self) -> &str {
        self.field(columns::CLASSIFICATION)
    }
}
