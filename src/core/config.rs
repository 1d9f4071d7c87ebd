//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::portal::{Portal, Session};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_DOCTOR_ENDPOINT: &str = "/auth/doctor/register";
pub const DEFAULT_USER_ENDPOINT: &str = "/auth/register";

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = ".onboard.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("portal '{0}' has no registration endpoint")]
    NoRegistration(Portal),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Registration endpoints, relative to `api_url`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub doctor: Option<String>,
    pub user: Option<String>,
}

/// Onboard configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL
    pub api_url: Option<String>,

    /// Bearer token presented on submission
    pub token: Option<String>,

    /// Registration endpoint overrides
    pub endpoints: Endpoints,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/onboard/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_optional(&global_path) {
                config.merge(global);
            }
        }

        // Local config in the working directory
        if let Some(local) = Self::read_optional(Path::new(LOCAL_CONFIG_FILE)) {
            config.merge(local);
        }

        if let Ok(url) = std::env::var("ONBOARD_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(token) = std::env::var("ONBOARD_TOKEN") {
            config.token = Some(token);
        }

        config
    }

    /// Read a config file, logging and skipping it when unusable
    fn read_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::from_file(path) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("ignoring config: {}", e);
                None
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "onboard")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.endpoints.doctor.is_some() {
            self.endpoints.doctor = other.endpoints.doctor;
        }
        if other.endpoints.user.is_some() {
            self.endpoints.user = other.endpoints.user;
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Registration endpoint for a portal
    pub fn registration_endpoint(&self, portal: Portal) -> Result<&str, ConfigError> {
        match portal {
            Portal::Doctor => Ok(self.endpoints.doctor.as_deref().unwrap_or(DEFAULT_DOCTOR_ENDPOINT)),
            Portal::User => Ok(self.endpoints.user.as_deref().unwrap_or(DEFAULT_USER_ENDPOINT)),
            Portal::Admin => Err(ConfigError::NoRegistration(portal)),
        }
    }

    /// Build the explicit request context for a portal
    pub fn session(&self, portal: Portal) -> Session {
        let session = Session::new(portal, self.api_url());
        match &self.token {
            Some(token) => session.with_token(token.clone()),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.registration_endpoint(Portal::Doctor).unwrap(), DEFAULT_DOCTOR_ENDPOINT);
        assert_eq!(config.registration_endpoint(Portal::User).unwrap(), DEFAULT_USER_ENDPOINT);
        assert!(config.registration_endpoint(Portal::Admin).is_err());
    }

    #[test]
    fn test_merge_later_layer_wins_per_field() {
        let mut base: Config = serde_yml::from_str(
            "api_url: https://a.example/api\nendpoints:\n  doctor: /d\n",
        )
        .unwrap();
        let over: Config = serde_yml::from_str("token: abc\nendpoints:\n  user: /u\n").unwrap();
        base.merge(over);

        assert_eq!(base.api_url(), "https://a.example/api");
        assert_eq!(base.token.as_deref(), Some("abc"));
        assert_eq!(base.registration_endpoint(Portal::Doctor).unwrap(), "/d");
        assert_eq!(base.registration_endpoint(Portal::User).unwrap(), "/u");
    }

    #[test]
    fn test_session_carries_token() {
        let config = Config {
            token: Some("t0k".to_string()),
            ..Config::default()
        };
        let session = config.session(Portal::Doctor);
        assert_eq!(session.token.as_deref(), Some("t0k"));
        assert_eq!(session.portal, Portal::Doctor);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api_url: [unclosed").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
