//! Registry capability interface.
//!
//! The engine never talks to the network itself; it is handed something
//! implementing [`Registry`]. The HTTP adapter lives in the CLI crate, the
//! scripted fake below drives tests, and the dry-run implementation accepts
//! everything with deterministic local ids.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, bail};
use serde_json::Value;

/// Identifier the registry assigns to an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immediate result of posting one batch.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accepted(SubmissionId),
    /// The registry declined the batch. Isolated to this batch; siblings
    /// proceed.
    Rejected { message: String },
}

/// Result of polling a submission.
#[derive(Debug, Clone)]
pub enum SubmissionStatus {
    Pending,
    Ready { location: String },
    Failed { message: String },
}

pub trait Registry {
    fn submit(&self, payload: &Value) -> Result<SubmitOutcome>;
    fn status(&self, id: &SubmissionId) -> Result<SubmissionStatus>;
    /// Retrieve the raw summary report JSON at a location returned by
    /// [`Registry::status`]. Callers parse it with
    /// [`cvsub_model::report::ReportDocument::from_json`] and persist the raw
    /// bytes so the annotation stage reads exactly what the registry served.
    fn fetch(&self, location: &str) -> Result<String>;
}

/// Accepts every batch without leaving the process. Used by `--dry-run`.
#[derive(Debug, Default)]
pub struct DryRunRegistry {
    counter: AtomicU64,
}

impl DryRunRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Registry for DryRunRegistry {
    fn submit(&self, _payload: &Value) -> Result<SubmitOutcome> {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(SubmitOutcome::Accepted(SubmissionId(format!(
            "DRY{seq:06}"
        ))))
    }

    fn status(&self, _id: &SubmissionId) -> Result<SubmissionStatus> {
        Ok(SubmissionStatus::Pending)
    }

    fn fetch(&self, location: &str) -> Result<String> {
        bail!("dry run produced no report document at {location:?}")
    }
}

/// Test fake with scripted responses and recorded calls.
#[derive(Debug, Default)]
pub struct ScriptedRegistry {
    submit_script: RefCell<VecDeque<SubmitOutcome>>,
    status_script: RefCell<VecDeque<SubmissionStatus>>,
    reports: RefCell<Vec<(String, String)>>,
    pub submitted: RefCell<Vec<Value>>,
}

impl ScriptedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_submit(&self, outcome: SubmitOutcome) {
        self.submit_script.borrow_mut().push_back(outcome);
    }

    pub fn script_status(&self, status: SubmissionStatus) {
        self.status_script.borrow_mut().push_back(status);
    }

    pub fn script_report(&self, location: &str, raw_json: &str) {
        self.reports
            .borrow_mut()
            .push((location.to_string(), raw_json.to_string()));
    }
}

impl Registry for ScriptedRegistry {
    fn submit(&self, payload: &Value) -> Result<SubmitOutcome> {
        self.submitted.borrow_mut().push(payload.clone());
        match self.submit_script.borrow_mut().pop_front() {
            Some(outcome) => Ok(outcome),
            None => bail!("no scripted submit outcome left"),
        }
    }

    fn status(&self, id: &SubmissionId) -> Result<SubmissionStatus> {
        match self.status_script.borrow_mut().pop_front() {
            Some(status) => Ok(status),
            None => bail!("no scripted status left for {id}"),
        }
    }

    fn fetch(&self, location: &str) -> Result<String> {
        let reports = self.reports.borrow();
        match reports.iter().find(|(key, _)| key == location) {
            Some((_, report)) => Ok(report.clone()),
            None => bail!("no scripted report at {location:?}"),
        }
    }
}
