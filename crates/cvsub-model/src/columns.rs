//! Column names of the exported assessment catalogue.
//!
//! The export schema is fixed; every stage addresses cells by these names so
//! a renamed column fails loudly at ingest instead of producing empty fields.

pub const CHROMOSOME: &str = "#Chromosome";
pub const START: &str = "Start";
pub const STOP: &str = "Stop";
pub const REF_ALT: &str = "Ref/Alt";
pub const HGVS_C: &str = "hgvs c.";
pub const HGVS_P: &str = "hgvs p.";
pub const GENE_NAMES: &str = "Gene Names";
pub const CLASSIFICATION: &str = "Classification";
pub const NOTES: &str = "Notes";
pub const LAST_EDITED: &str = "Last Edited";
pub const SCV: &str = "SCV";
/// Member variants of a haplotype row, comma-separated HGVS expressions.
pub const VARIANTS: &str = "Variants";

/// Columns a variant row must carry to be submittable.
pub const REQUIRED_VARIANT_COLUMNS: &[&str] = &[
    CHROMOSOME,
    START,
    STOP,
    REF_ALT,
    CLASSIFICATION,
    LAST_EDITED,
];

/// Header of the haplotype table written by the cleaning stage.
pub const HAPLOTYPE_COLUMNS: &[&str] = &[
    HGVS_C,
    CLASSIFICATION,
    VARIANTS,
    HGVS_P,
    GENE_NAMES,
    NOTES,
    LAST_EDITED,
];
