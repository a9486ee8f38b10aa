//! HTTP adapter for the registry's submission API.
//!
//! Blocking reqwest client (no async runtime required). The engine only sees
//! the [`Registry`] trait; everything endpoint-specific lives here.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

use cvsub_core::registry::{Registry, SubmissionId, SubmissionStatus, SubmitOutcome};

const SUBMIT_URL: &str = "https://submit.ncbi.nlm.nih.gov/api/v1/submissions";
const TEST_URL: &str = "https://submit.ncbi.nlm.nih.gov/apitest/v1/submissions";

const API_KEY_HEADER: &str = "SP-API-KEY";

/// Registry client authenticated with a service-provider API key.
pub struct HttpRegistry {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl HttpRegistry {
    /// `test_endpoint` targets the validation-only endpoint: payloads are
    /// checked end to end but no accessions are issued.
    pub fn new(api_key: String, test_endpoint: bool) -> Result<Self> {
        let base_url = if test_endpoint { TEST_URL } else { SUBMIT_URL };
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        })
    }
}

impl Registry for HttpRegistry {
    fn submit(&self, payload: &Value) -> Result<SubmitOutcome> {
        let response = self
            .http
            .post(&self.base_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(payload)
            .send()
            .context("post submission batch")?;
        let status = response.status();
        let body = response.text().context("read submission response")?;
        debug!(%status, "submission response");
        if status.is_success() {
            let parsed: Value = serde_json::from_str(&body)
                .with_context(|| format!("unexpected submission response: {body}"))?;
            let id = parsed["id"]
                .as_str()
                .with_context(|| format!("submission response without id: {body}"))?;
            return Ok(SubmitOutcome::Accepted(SubmissionId(id.to_string())));
        }
        // Any decline, client- or server-side, fails only this batch; the
        // pipeline writes the error artifact and moves on to the siblings.
        // Only transport failures above abort the run.
        Ok(SubmitOutcome::Rejected {
            message: format!("{status}: {body}"),
        })
    }

    fn status(&self, id: &SubmissionId) -> Result<SubmissionStatus> {
        let url = format!("{}/{id}/actions/", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .context("poll submission status")?;
        let status = response.status();
        let body = response.text().context("read status response")?;
        if !status.is_success() {
            bail!("status poll for {id} returned {status}: {body}");
        }
        let parsed: Value = serde_json::from_str(&body)
            .with_context(|| format!("unexpected status response: {body}"))?;
        let action = &parsed["actions"][0];
        let state = action["status"].as_str().unwrap_or_default();
        match state {
            "processed" | "error" => {
                // Both terminal states carry the report document URL; the
                // report itself distinguishes per-record outcomes.
                let location = action["responses"][0]["files"][0]["url"].as_str();
                match location {
                    Some(location) => Ok(SubmissionStatus::Ready {
                        location: location.to_string(),
                    }),
                    None if state == "error" => Ok(SubmissionStatus::Failed {
                        message: action["responses"][0]["message"]
                            .as_str()
                            .unwrap_or(&body)
                            .to_string(),
                    }),
                    None => bail!("processed submission {id} without a report file: {body}"),
                }
            }
            _ => Ok(SubmissionStatus::Pending),
        }
    }

    fn fetch(&self, location: &str) -> Result<String> {
        let response = self
            .http
            .get(location)
            .send()
            .with_context(|| format!("fetch report document {location}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("report fetch {location} returned {status}");
        }
        response.text().context("read report document")
    }
}
