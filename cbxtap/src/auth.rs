//! Auth module exchanges the configured access key for a session token.

use std::time::Duration;

use reqwest::blocking::ClientBuilder;
use serde_json::Value;

use crate::catalog::ORGANISATION_HEADER;
use crate::config::TapConfig;
use crate::error::{Error, ErrorKind, Result};

mod _models {
    use serde::Deserialize;

    #[derive(Deserialize, Default, Debug)]
    #[serde(default)]
    pub(super) struct TokenEnvelope {
        pub(super) data: Option<TokenData>,
    }

    #[derive(Deserialize, Debug)]
    pub(super) struct TokenData {
        #[serde(rename = "sessionToken")]
        pub(super) session_token: Option<String>,
        #[serde(rename = "maxAge")]
        pub(super) max_age: Option<u64>,
    }
}

/// Exchanges the access key for a session token.
///
/// One blocking call against the token endpoint. There is no refresh or
/// expiry tracking; a run that outlives its token fails and is re-run.
pub fn acquire_session_token(config: &TapConfig) -> Result<String> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let response = client
        .get(config.auth_url())
        .query(&[
            ("authenticationType", "ACCESS_KEY"),
            ("code", config.access_key.as_str()),
        ])
        .header(ORGANISATION_HEADER, &config.organization_id)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(
            Error::new(ErrorKind::AuthFailed, "token endpoint returned non-success status")
                .with_context("status", status.to_string()),
        );
    }

    parse_token_document(response.json()?)
}

/// Pulls the session token out of a token endpoint response body.
fn parse_token_document(body: Value) -> Result<String> {
    let envelope: _models::TokenEnvelope = serde_json::from_value(body)?;

    let data = envelope
        .data
        .ok_or_else(|| Error::new(ErrorKind::AuthFailed, "token response has no data"))?;

    let token = data
        .session_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::new(ErrorKind::AuthFailed, "token response has no session token"))?;

    if let Some(max_age) = data.max_age {
        log::debug!("session token expires in {max_age}s");
    }

    Ok(token)
}
