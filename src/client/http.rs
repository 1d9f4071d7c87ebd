//! Multipart HTTP submission against the registration endpoints

use reqwest::blocking::{multipart::Form, Client};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::client::{SubmissionClient, SubmissionError, SubmissionReceipt};
use crate::core::{Config, Session};
use crate::wizard::{PayloadPart, SubmissionPayload};

/// Shape of the backend's JSON replies; both fields are optional
#[derive(Debug, Default, Deserialize)]
struct ApiReply {
    message: Option<String>,
    error: Option<String>,
}

pub struct HttpSubmissionClient {
    client: Client,
    session: Session,
    endpoint: String,
}

impl HttpSubmissionClient {
    pub fn new(session: Session, endpoint: impl Into<String>) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .user_agent(concat!("onboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SubmissionError::new(format!("could not start HTTP client: {}", e)))?;
        Ok(Self {
            client,
            session,
            endpoint: endpoint.into(),
        })
    }

    /// Client for a portal's registration endpoint as configured
    pub fn from_config(config: &Config, session: Session) -> Result<Self, SubmissionError> {
        let endpoint = config
            .registration_endpoint(session.portal)
            .map_err(|e| SubmissionError::new(e.to_string()))?
            .to_string();
        Self::new(session, endpoint)
    }

    pub fn url(&self) -> String {
        self.session.url_for(&self.endpoint)
    }
}

impl SubmissionClient for HttpSubmissionClient {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let form = build_form(payload)?;
        let url = self.url();
        tracing::debug!(%url, parts = payload.len(), "posting registration");

        let mut request = self.client.post(&url).multipart(form);
        if let Some(token) = &self.session.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| SubmissionError::new(format!("could not reach {}: {}", url, e)))?;
        let status = response.status();
        // An unreadable body is treated as empty; the status decides the outcome
        let body = response.text().unwrap_or_default();

        if status.is_success() {
            let reply: ApiReply = serde_json::from_str(&body).unwrap_or_default();
            Ok(SubmissionReceipt::new(Some(status.as_u16()), reply.message))
        } else {
            Err(SubmissionError::new(error_message(status, &body)))
        }
    }
}

/// Turn payload parts into form fields, reading file parts from disk
fn build_form(payload: &SubmissionPayload) -> Result<Form, SubmissionError> {
    let mut form = Form::new();
    for part in &payload.parts {
        form = match part {
            PayloadPart::Text { name, value } => form.text(name.clone(), value.clone()),
            PayloadPart::File { name, path } => form.file(name.clone(), path).map_err(|e| {
                SubmissionError::new(format!("cannot attach {} ({}): {}", name, path.display(), e))
            })?,
        };
    }
    Ok(form)
}

/// Human-readable failure text from an error response
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiReply>(body)
        .ok()
        .and_then(|r| r.message.or(r.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
