//! Registry submission payloads.
//!
//! Serializes a batch into the JSON shape the registry's submission API
//! expects. Only schema fields are emitted; local bookkeeping columns never
//! leave the process.

use serde_json::{Value, json};

use cvsub_model::columns;
use cvsub_model::ids::{Accession, ExtractionDate};
use cvsub_model::record::{CatalogueOrigin, Intent, RecordType, VariantRecord};

use crate::batch::Batch;
use crate::error::EngineError;
use crate::normalize::repair_hgvs;

/// Largest variant span (in bases) for which explicit alleles are included
/// alongside coordinates.
const MAX_ALLELE_SPAN: u64 = 50;

const GERMLINE_ASSERTION_PUBMED: &str = "25741868";
const SOMATIC_ASSERTION_PUBMED: &str = "35101336";

/// Full request body for one batch.
pub fn batch_payload(
    batch: &Batch,
    origin: CatalogueOrigin,
    date: &ExtractionDate,
) -> Result<Value, EngineError> {
    if batch.intent == Intent::Delete {
        return Err(EngineError::Payload(
            "delete batches are serialized from accessions, not records".to_string(),
        ));
    }
    let update = batch.intent == Intent::Update;
    let submissions = batch
        .records
        .iter()
        .map(|record| record_submission(record, origin, date, update))
        .collect::<Result<Vec<Value>, EngineError>>()?;
    let (submission_key, assertion_pubmed) = match origin {
        CatalogueOrigin::Germline => ("germlineSubmission", GERMLINE_ASSERTION_PUBMED),
        CatalogueOrigin::Somatic => ("oncogenicitySubmission", SOMATIC_ASSERTION_PUBMED),
    };
    let content = json!({
        submission_key: submissions,
        "clinvarSubmissionReleaseStatus": "public",
        "assertionCriteria": {
            "db": "PubMed",
            "id": assertion_pubmed,
        },
    });
    Ok(envelope(content))
}

/// Request body deleting previously-issued accessions.
pub fn deletion_payload(accessions: &[Accession]) -> Value {
    let set: Vec<Value> = accessions
        .iter()
        .map(|accession| json!({"accession": accession.as_str()}))
        .collect();
    envelope(json!({"clinvarDeletion": {"accessionSet": set}}))
}

fn envelope(content: Value) -> Value {
    json!({
        "actions": [
            {"type": "AddData", "targetDb": "clinvar", "data": {"content": content}}
        ]
    })
}

fn record_submission(
    record: &VariantRecord,
    origin: CatalogueOrigin,
    date: &ExtractionDate,
    update: bool,
) -> Result<Value, EngineError> {
    let classification = normalize_classification(record.classification(), origin)?;
    let (classification_key, description_key) = match origin {
        CatalogueOrigin::Germline => ("germlineClassification", "germlineClassificationDescription"),
        CatalogueOrigin::Somatic => (
            "oncogenicityClassification",
            "oncogenicityClassificationDescription",
        ),
    };
    let mut submission = json!({
        classification_key: {
            description_key: classification,
            "dateLastEvaluated": date.as_str(),
        },
        "conditionSet": {
            "condition": [condition(origin, &classification)],
        },
        "observedIn": [
            {
                "affectedStatus": match origin {
                    CatalogueOrigin::Germline => "unknown",
                    CatalogueOrigin::Somatic => "yes",
                },
                "alleleOrigin": origin.as_str(),
                "collectionMethod": "clinical testing",
            }
        ],
        "recordStatus": if update { "update" } else { "novel" },
    });
    let set = match record.record_type {
        RecordType::Variant => ("variantSet", variant_set(record)?),
        RecordType::Haplotype => ("haplotypeSet", haplotype_set(record)),
    };
    submission[set.0] = set.1;
    if update {
        let accession = record.accession().ok_or_else(|| {
            EngineError::AccessionSafety(format!(
                "update payload for {} without accession",
                record.field(columns::HGVS_C)
            ))
        })?;
        submission["clinvarAccession"] = json!(accession.as_str());
    }
    Ok(submission)
}

fn variant_set(record: &VariantRecord) -> Result<Value, EngineError> {
    let mut variant = json!({
        "gene": [{"symbol": record.field(columns::GENE_NAMES)}],
    });
    if let Some(hgvs) = record.hgvs() {
        let alternate = record.locus().map(|locus| locus.alternate).ok();
        let hgvs = match alternate.and_then(|alt| repair_hgvs(hgvs, &alt)) {
            Some(repaired) => repaired,
            None => hgvs.to_string(),
        };
        variant["hgvs"] = json!(hgvs);
        return Ok(variant);
    }
    let locus = record
        .locus()
        .map_err(|error| EngineError::Payload(error.to_string()))?;
    // Allele inclusion is decided on the exported span, before coordinate
    // fix-ups shift it.
    let include_alleles = locus.stop.saturating_sub(locus.start) <= MAX_ALLELE_SPAN;
    let mut start = locus.start;
    let mut stop = locus.stop;
    let mut variant_type = None;
    if stop <= start || stop == start + 1 {
        if locus.is_insertion() {
            variant_type = Some("Insertion");
            stop += 1;
        }
    } else if locus.is_deletion() {
        variant_type = Some("Deletion");
        start += 1;
    } else if locus.reference.len() == 1 && locus.alternate.len() == 1 {
        start += 1;
    }
    let mut coordinates = json!({
        "assembly": "hg38",
        "chromosome": locus.chromosome,
        "start": start,
        "stop": stop,
    });
    if include_alleles {
        coordinates["referenceAllele"] = json!(locus.reference);
        coordinates["alternateAllele"] = json!(locus.alternate);
    }
    variant["chromosomeCoordinates"] = coordinates;
    if let Some(variant_type) = variant_type {
        variant["variantType"] = json!(variant_type);
    }
    Ok(variant)
}

fn haplotype_set(record: &VariantRecord) -> Value {
    let members: Vec<Value> = record
        .field(columns::VARIANTS)
        .split(", ")
        .filter(|hgvs| !hgvs.is_empty())
        .map(|hgvs| json!({"hgvs": hgvs}))
        .collect();
    json!({
        "hgvs": record.field(columns::HGVS_C),
        "variants": members,
    })
}

/// Map the catalogue's classification text onto the registry vocabulary.
fn normalize_classification(
    raw: &str,
    origin: CatalogueOrigin,
) -> Result<String, EngineError> {
    let mut chars = raw.trim().chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    };
    let germline = if capitalized == "Unknown significance" {
        "Uncertain significance".to_string()
    } else {
        capitalized
    };
    match origin {
        CatalogueOrigin::Germline => Ok(germline),
        CatalogueOrigin::Somatic => {
            let somatic = match germline.as_str() {
                "Pathogenic" => "Oncogenic",
                "Likely pathogenic" => "Likely oncogenic",
                "Uncertain significance" => "Uncertain significance",
                "Likely benign" => "Likely benign",
                "Benign" => "Benign",
                other => {
                    return Err(EngineError::Payload(format!(
                        "classification {other:?} has no oncogenicity equivalent"
                    )));
                }
            };
            Ok(somatic.to_string())
        }
    }
}

fn condition(origin: CatalogueOrigin, classification: &str) -> Value {
    match origin {
        CatalogueOrigin::Somatic => json!({"db": "MedGen", "id": "C0027651"}),
        CatalogueOrigin::Germline => {
            let name = if matches!(
                classification,
                "Benign" | "Likely benign" | "Uncertain significance"
            ) {
                "not specified"
            } else {
                "not provided"
            };
            json!({"db": "MedGen", "name": name})
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_vocabulary() {
        assert_eq!(
            normalize_classification("unknown significance", CatalogueOrigin::Germline).unwrap(),
            "Uncertain significance"
        );
        assert_eq!(
            normalize_classification("pathogenic", CatalogueOrigin::Somatic).unwrap(),
            "Oncogenic"
        );
        assert!(normalize_classification("artifact", CatalogueOrigin::Somatic).is_err());
    }

    #[test]
    fn germline_condition_tracks_classification() {
        assert_eq!(
            condition(CatalogueOrigin::Germline, "Likely benign")["name"],
            "not specified"
        );
        assert_eq!(
            condition(CatalogueOrigin::Germline, "Pathogenic")["name"],
            "not provided"
        );
        assert_eq!(condition(CatalogueOrigin::Somatic, "Oncogenic")["id"], "C0027651");
    }
}
