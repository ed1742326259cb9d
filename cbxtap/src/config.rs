//! Config module provides the runtime configuration of the tap.

use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{Error, ErrorKind, Result};

fn default_api_url() -> String {
    "https://qa-api.cbx1.app/api/g/v1".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Runtime configuration, loaded from a JSON config file.
///
/// Unknown keys are ignored so that config files written for other tooling
/// keep working.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TapConfig {
    /// Access key exchanged for a session token.
    pub access_key: String,
    /// Organisation identifier sent on every request.
    pub organization_id: String,
    /// Base URL of the API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Token endpoint. Defaults to `{api_url}/auth/token/generate`.
    #[serde(default)]
    pub auth_url: Option<String>,
    /// Records requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Timeout in seconds applied to every API request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Initial bookmark used for streams without one in the state document.
    #[serde(default)]
    pub start_date: Option<String>,
}

impl TapConfig {
    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read(path.as_ref())?;
        let config: TapConfig = serde_json::from_slice(&content).map_err(|err| {
            Error::new(ErrorKind::ConfigInvalid, "config file is not a valid config document")
                .with_context("path", path.as_ref().to_string_lossy())
                .set_source(err)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field values beyond what deserialization enforces.
    pub fn validate(&self) -> Result<()> {
        if self.access_key.is_empty() {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "access_key must not be empty",
            ));
        }
        if self.organization_id.is_empty() {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "organization_id must not be empty",
            ));
        }
        if self.page_size == 0 {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "page_size must be positive",
            ));
        }

        Url::parse(&self.api_url).map_err(|err| {
            Error::new(ErrorKind::ConfigInvalid, "api_url is not a valid url")
                .with_context("api_url", &self.api_url)
                .set_source(err)
        })?;
        if let Some(auth_url) = &self.auth_url {
            Url::parse(auth_url).map_err(|err| {
                Error::new(ErrorKind::ConfigInvalid, "auth_url is not a valid url")
                    .with_context("auth_url", auth_url)
                    .set_source(err)
            })?;
        }

        Ok(())
    }

    /// The effective token endpoint.
    pub fn auth_url(&self) -> String {
        match &self.auth_url {
            Some(url) => url.clone(),
            None => format!("{}/auth/token/generate", self.api_url.trim_end_matches('/')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal() -> TapConfig {
        serde_json::from_str(r#"{ "access_key": "ak-1", "organization_id": "org-1" }"#).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = minimal();

        assert_eq!(config.api_url, "https://qa-api.cbx1.app/api/g/v1");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.start_date, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_url_is_derived_from_api_url() {
        let mut config = minimal();
        config.api_url = "https://example.com/api/".to_string();

        assert_eq!(config.auth_url(), "https://example.com/api/auth/token/generate");

        config.auth_url = Some("https://auth.example.com/token".to_string());
        assert_eq!(config.auth_url(), "https://auth.example.com/token");
    }

    #[test]
    fn test_rejects_empty_credentials() {
        let mut config = minimal();
        config.access_key = String::new();

        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_rejects_invalid_api_url() {
        let mut config = minimal();
        config.api_url = "not a url".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let mut config = minimal();
        config.page_size = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "access_key": "ak-1", "organization_id": "org-1", "page_size": 25 }}"#
        )
        .unwrap();

        let config = TapConfig::from_file(file.path()).unwrap();
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_from_file_rejects_missing_required_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "organization_id": "org-1" }}"#).unwrap();

        let err = TapConfig::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
