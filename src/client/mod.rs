//! Submission clients - hand a finished payload to the backend

pub mod dry_run;
pub mod http;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::wizard::SubmissionPayload;

pub use dry_run::DryRunClient;
pub use http::HttpSubmissionClient;

/// What the backend acknowledged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    /// HTTP status, when the client talked HTTP
    pub status: Option<u16>,
    /// Message returned by the backend, if any
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub fn new(status: Option<u16>, message: Option<String>) -> Self {
        Self {
            status,
            message,
            submitted_at: Utc::now(),
        }
    }
}

/// A rejected or failed submission, with text fit for the user
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Delivers a registration payload
pub trait SubmissionClient {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError>;
}
