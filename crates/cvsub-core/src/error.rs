//! Engine error taxonomy.
//!
//! Row- and group-level problems are collected as [`RowIssue`]s and reported
//! in aggregate at the end of a run. Anything that risks re-submitting an
//! already-accessioned record as novel is a hard [`EngineError`] and aborts
//! the affected batch set.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A record with an accession was routed towards a novel-intent batch,
    /// or an update-intent batch received an unaccessioned record.
    #[error("accession safety violation: {0}")]
    AccessionSafety(String),
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
    #[error("payload: {0}")]
    Payload(String),
}

/// Severity of a collected issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Malformed or ambiguous row/group; the run continues without it.
    Validation,
    /// Accession state disagrees between the row and the reference table in
    /// a way that must not be silently resolved.
    ReconciliationConflict,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Validation => f.write_str("validation"),
            IssueKind::ReconciliationConflict => f.write_str("reconciliation conflict"),
        }
    }
}

/// One collected per-row or per-group problem.
#[derive(Debug, Clone)]
pub struct RowIssue {
    pub kind: IssueKind,
    /// Key or human-readable identity of the offending row/group.
    pub subject: String,
    pub message: String,
}

impl RowIssue {
    pub fn validation(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Validation,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn conflict(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::ReconciliationConflict,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.kind, self.subject, self.message)
    }
}
