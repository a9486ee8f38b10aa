//! Identifier types shared across the submission pipeline.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Placeholder for an empty allele in the `Ref/Alt` column.
pub const EMPTY_ALLELE: &str = "-";

/// Registry accession identifier (SCV number).
///
/// Issued by the registry on first successful submission and immutable
/// afterwards. A record carrying an accession must never be re-submitted as
/// novel; the registry would create a duplicate entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Accession(String);

impl Accession {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Date the catalogue was exported from the assessment tool.
///
/// Supplied explicitly by the caller; the upload itself happens with some
/// delay, so "now" would misdocument provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionDate(String);

impl ExtractionDate {
    /// Parse and validate a `YYYY-MM-DD` date string.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() != 10 || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
            return Err(ModelError::InvalidDate(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtractionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Genomic coordinates and alleles of a single variant row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Locus {
    pub chromosome: String,
    pub start: u64,
    pub stop: u64,
    pub reference: String,
    pub alternate: String,
}

impl Locus {
    /// Grouping key for a site: all alternate-allele representations of the
    /// same biological variant share it.
    pub fn site_key(&self) -> (String, u64, u64) {
        (self.chromosome.clone(), self.start, self.stop)
    }

    /// Combined `ref/alt` rendering as used by the catalogue export.
    pub fn ref_alt(&self) -> String {
        format!("{}/{}", self.reference, self.alternate)
    }

    pub fn is_insertion(&self) -> bool {
        self.reference == EMPTY_ALLELE
    }

    pub fn is_deletion(&self) -> bool {
        self.alternate == EMPTY_ALLELE
    }

    /// Identity token under which the registry's summary report refers to a
    /// coordinate-submitted record. The report shifts the start by one.
    pub fn identity_token(&self) -> String {
        let mut token = format!(
            "Chr.{}_{}_{}_{}_{}",
            self.chromosome,
            self.start + 1,
            self.stop,
            self.reference,
            self.alternate
        );
        if self.is_insertion() {
            token.push_str("_Insertion");
        } else if self.is_deletion() {
            token.push_str("_Deletion");
        }
        token
    }
}

/// Stable identity of a variant row.
///
/// The primary HGVS c. expression when the export provides one, otherwise
/// the full coordinate tuple. Reference-table lookups and report-document
/// merges are keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VariantKey {
    Hgvs(String),
    Coordinates(Locus),
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKey::Hgvs(hgvs) => f.write_str(hgvs),
            VariantKey::Coordinates(locus) => f.write_str(&locus.identity_token()),
        }
    }
}
