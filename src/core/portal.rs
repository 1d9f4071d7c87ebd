//! Portal and step identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three front-end portals of the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Portal {
    /// Back-office portal (no self-registration)
    Admin,
    /// Doctor portal
    Doctor,
    /// Patient-facing user portal
    User,
}

impl Portal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Portal::Admin => "admin",
            Portal::Doctor => "doctor",
            Portal::User => "user",
        }
    }

    /// Portals that expose a registration wizard
    pub fn with_registration() -> &'static [Portal] {
        &[Portal::Doctor, Portal::User]
    }
}

impl fmt::Display for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Portal {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Portal::Admin),
            "doctor" => Ok(Portal::Doctor),
            "user" => Ok(Portal::User),
            _ => Err(IdentityParseError::UnknownPortal(s.to_string())),
        }
    }
}

/// Name of a wizard step, and of the draft slice it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKey {
    /// Login credentials
    Account,
    /// Name, contact details, date of birth
    Personal,
    /// Specialization, license, experience
    Professional,
    /// Uploaded document references
    Documents,
    /// Terms and privacy acknowledgements
    Consent,
}

impl StepKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKey::Account => "account",
            StepKey::Personal => "personal",
            StepKey::Professional => "professional",
            StepKey::Documents => "documents",
            StepKey::Consent => "consent",
        }
    }

    pub fn all() -> &'static [StepKey] {
        &[
            StepKey::Account,
            StepKey::Personal,
            StepKey::Professional,
            StepKey::Documents,
            StepKey::Consent,
        ]
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StepKey {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepKey::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IdentityParseError::UnknownStep(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityParseError {
    #[error("unknown portal '{0}' (expected admin, doctor or user)")]
    UnknownPortal(String),

    #[error("unknown step '{0}' (expected account, personal, professional, documents or consent)")]
    UnknownStep(String),
}

/// Explicit request context for a portal
///
/// Carries what the original front-ends kept in an ambient session hook:
/// where the backend lives and which bearer token (if any) to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub portal: Portal,
    pub api_url: String,
    pub token: Option<String>,
}

impl Session {
    pub fn new(portal: Portal, api_url: impl Into<String>) -> Self {
        Self {
            portal,
            api_url: api_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Join the base URL with an endpoint path, tolerating stray slashes
    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_roundtrip_case_insensitive() {
        assert_eq!("Doctor".parse::<Portal>().unwrap(), Portal::Doctor);
        assert_eq!("USER".parse::<Portal>().unwrap(), Portal::User);
        assert!("nurse".parse::<Portal>().is_err());
    }

    #[test]
    fn test_step_key_parse() {
        assert_eq!("documents".parse::<StepKey>().unwrap(), StepKey::Documents);
        let err = "billing".parse::<StepKey>().unwrap_err();
        assert_eq!(err, IdentityParseError::UnknownStep("billing".to_string()));
    }

    #[test]
    fn test_session_url_join() {
        let s = Session::new(Portal::User, "http://localhost:8000/api/");
        assert_eq!(s.url_for("/auth/register"), "http://localhost:8000/api/auth/register");
        let s = Session::new(Portal::User, "http://h/api");
        assert_eq!(s.url_for("auth/register"), "http://h/api/auth/register");
    }
}
