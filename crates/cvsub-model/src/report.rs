//! Submission summary report documents.
//!
//! The registry produces one JSON report per accepted batch, hours to weeks
//! after submission. Each entry maps the submission-time identity token (the
//! `clinvarLocalKey` prefix) to the issued accession, or carries the error
//! output for records it declined.

use serde::Deserialize;

use crate::error::{ModelError, Result};
use crate::ids::Accession;

const ALREADY_EXISTS_PREFIX: &str = "This record is submitted as novel but";

/// How the registry disposed of one submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Accepted; a fresh accession was issued.
    Accessioned,
    /// Declined as a duplicate of an existing record; the existing accession
    /// is recoverable from the error message and the local row should be
    /// annotated with it and updated next run.
    AlreadyExists,
    /// Declined for another reason; the record must be corrected and
    /// resubmitted, no accession to fold back.
    Failed,
}

/// One record outcome from a summary report.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// Identity token the record was submitted under: the HGVS expression or
    /// the constructed coordinate token.
    pub local_key: String,
    pub accession: Option<Accession>,
    pub disposition: Disposition,
}

/// Parsed summary report.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub submission_date: String,
    pub outcomes: Vec<ReportOutcome>,
}

#[derive(Deserialize)]
struct RawReport {
    #[serde(rename = "submissionDate", default)]
    submission_date: String,
    #[serde(default)]
    submissions: Vec<RawSubmission>,
}

#[derive(Deserialize)]
struct RawSubmission {
    identifiers: RawIdentifiers,
    #[serde(default)]
    errors: Vec<RawError>,
}

#[derive(Deserialize)]
struct RawIdentifiers {
    #[serde(rename = "clinvarLocalKey")]
    local_key: String,
    #[serde(rename = "clinvarAccession")]
    accession: Option<String>,
}

#[derive(Deserialize)]
struct RawError {
    output: RawErrorOutput,
}

#[derive(Deserialize)]
struct RawErrorOutput {
    #[serde(default)]
    errors: Vec<RawErrorDetail>,
}

#[derive(Deserialize)]
struct RawErrorDetail {
    #[serde(rename = "userMessage", default)]
    user_message: String,
}

impl ReportDocument {
    pub fn from_json(raw: &str) -> Result<Self> {
        let report: RawReport =
            serde_json::from_str(raw).map_err(|error| ModelError::Report(error.to_string()))?;
        let outcomes = report
            .submissions
            .into_iter()
            .map(RawSubmission::into_outcome)
            .collect();
        Ok(Self {
            submission_date: report.submission_date,
            outcomes,
        })
    }
}

impl RawSubmission {
    fn into_outcome(self) -> ReportOutcome {
        // The local key carries trailing condition info after a pipe.
        let local_key = self
            .identifiers
            .local_key
            .split('|')
            .next()
            .unwrap_or_default()
            .to_string();
        if let Some(accession) = self.identifiers.accession {
            return ReportOutcome {
                local_key,
                accession: Some(Accession::new(accession)),
                disposition: Disposition::Accessioned,
            };
        }
        let message = self
            .errors
            .first()
            .and_then(|error| error.output.errors.first())
            .map(|detail| detail.user_message.as_str())
            .unwrap_or_default();
        if message.starts_with(ALREADY_EXISTS_PREFIX)
            && let Some(existing) = extract_accession(message)
        {
            return ReportOutcome {
                local_key,
                accession: Some(existing),
                disposition: Disposition::AlreadyExists,
            };
        }
        ReportOutcome {
            local_key,
            accession: None,
            disposition: Disposition::Failed,
        }
    }
}

/// Pull the existing accession out of a duplicate-submission error message.
fn extract_accession(message: &str) -> Option<Accession> {
    message
        .split_whitespace()
        .find(|token| token.starts_with("SCV"))
        .map(|token| Accession::new(token.trim_matches(|c: char| !c.is_ascii_alphanumeric())))
}
