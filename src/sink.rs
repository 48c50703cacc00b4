//! Where finished leads go.
//!
//! One delivery per submission: no retry, no timeout, no cancellation.
//! The response body is never read; only the status counts.

use futures::future::BoxFuture;
use jsonschema::Validator;
use thiserror::Error;

use crate::submission::SubmissionRecord;

/// JSON Schema every outbound record must satisfy before it leaves the process.
pub const SUBMISSION_SCHEMA: &str = include_str!("../schema/submission.schema.json");

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Submission schema is unusable: {0}")]
    Schema(String),
    #[error("Submission violates the outbound contract: {0}")]
    Contract(String),
    #[error("Delivery failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub trait SubmissionSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn deliver<'a>(&'a self, record: &'a SubmissionRecord) -> BoxFuture<'a, Result<(), SinkError>>;
}

/// Writes the record to the log and nothing else.
#[derive(Debug, Default)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn deliver<'a>(&'a self, record: &'a SubmissionRecord) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async move {
            let payload = serde_json::to_string(record)?;
            tracing::info!(
                email = %record.email,
                motor = %record.recommended_motor,
                %payload,
                "Form submission data"
            );
            Ok(())
        })
    }
}

/// POSTs the record as JSON to a webhook (CRM, Zapier, Make, ...).
pub struct WebhookSink {
    endpoint: String,
    client: reqwest::Client,
    validator: Validator,
}

impl WebhookSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SinkError> {
        let schema: serde_json::Value = serde_json::from_str(SUBMISSION_SCHEMA)?;
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| SinkError::Schema(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
            validator,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Serializes and checks the record against the schema.
    pub fn encode(&self, record: &SubmissionRecord) -> Result<serde_json::Value, SinkError> {
        let body = serde_json::to_value(record)?;
        if !self.validator.is_valid(&body) {
            let reasons: Vec<String> = self
                .validator
                .iter_errors(&body)
                .map(|e| e.to_string())
                .collect();
            return Err(SinkError::Contract(reasons.join("; ")));
        }
        Ok(body)
    }
}

impl SubmissionSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn deliver<'a>(&'a self, record: &'a SubmissionRecord) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async move {
            let body = self.encode(record)?;
            let response = self.client.post(&self.endpoint).json(&body).send().await?;
            response.error_for_status()?;
            tracing::info!(endpoint = %self.endpoint, "Submission delivered");
            Ok(())
        })
    }
}
