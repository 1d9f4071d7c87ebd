//! Client that records payloads instead of sending them

use crate::client::{SubmissionClient, SubmissionError, SubmissionReceipt};
use crate::wizard::SubmissionPayload;

/// Accepts every payload without network I/O
#[derive(Debug, Default)]
pub struct DryRunClient {
    submitted: Vec<SubmissionPayload>,
}

impl DryRunClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> &[SubmissionPayload] {
        &self.submitted
    }

    pub fn last(&self) -> Option<&SubmissionPayload> {
        self.submitted.last()
    }
}

impl SubmissionClient for DryRunClient {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        tracing::info!(draft_id = %payload.draft_id, parts = payload.len(), "dry run, payload not sent");
        self.submitted.push(payload.clone());
        Ok(SubmissionReceipt::new(None, Some("dry run: nothing was sent".to_string())))
    }
}
