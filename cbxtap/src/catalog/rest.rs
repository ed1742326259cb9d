//! Blocking REST client for the target schema and record endpoints.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use serde_json::{Map, Value};
use urlencoding::encode;

use self::_models::Envelope;
use super::{DiscoveryLogRef, StdLog, TargetSource};
use crate::config::TapConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::types::{flatten_schema_with_report, to_json_schema};

/// Response code the API uses for a successful call.
const STATUS_OK: &str = "CM000";

/// Key under which a schema response entry carries the flattened schema.
const FLATTENED_SCHEMA_KEY: &str = "flattenedJsonSchemaForJsonPath";

/// Header carrying the organisation identifier.
pub const ORGANISATION_HEADER: &str = "x-organisation-id";

/// Blocking client for the remote API.
///
/// One synchronous request at a time; every request carries the session token
/// and organisation header and is bounded by the configured timeout.
pub struct RestClient {
    endpoints: Endpoint,
    session_token: String,
    organization_id: String,
    client: Client,
    log: DiscoveryLogRef,
}

impl RestClient {
    /// Creates a client from the tap configuration and a session token.
    pub fn new(config: &TapConfig, session_token: impl Into<String>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            endpoints: Endpoint::new(config.api_url.clone()),
            session_token: session_token.into(),
            organization_id: config.organization_id.clone(),
            client,
            log: Arc::new(StdLog),
        })
    }

    /// Replaces the discovery log, for callers that capture diagnostics.
    pub fn with_discovery_log(mut self, log: DiscoveryLogRef) -> Self {
        self.log = log;
        self
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.session_token)
            .header(ORGANISATION_HEADER, &self.organization_id)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                Error::new(ErrorKind::Unexpected, "request returned non-success status")
                    .with_context("url", url)
                    .with_context("status", status.to_string()),
            );
        }

        Ok(response.json()?)
    }
}

impl TargetSource for RestClient {
    fn fetch_schema(&self, target: &str) -> Option<Value> {
        let flattened = self
            .get_json(&self.endpoints.schema(target))
            .and_then(parse_envelope)
            .and_then(schema_from_data);

        let flattened = match flattened {
            Ok(flattened) => flattened,
            Err(err) => {
                self.log.schema_unavailable(target, &err.to_string());
                return None;
            }
        };

        let (properties, report) = flatten_schema_with_report(&flattened);
        if report.unknown_types > 0 {
            self.log.unknown_types(target, report.unknown_types);
        }

        Some(to_json_schema(&properties))
    }

    fn fetch_records(
        &self,
        path: &str,
        page: usize,
        size: usize,
    ) -> Result<Vec<Map<String, Value>>> {
        let body = self.get_json(&self.endpoints.records(path, page, size))?;
        records_from_data(parse_envelope(body)?)
    }
}

/// Checks the `{status, data}` response envelope and returns the data array.
fn parse_envelope(body: Value) -> Result<Vec<Value>> {
    let envelope: Envelope = serde_json::from_value(body)?;

    if envelope.status.code != STATUS_OK {
        let mut err = Error::new(ErrorKind::Unexpected, "response status code is not success")
            .with_context("code", envelope.status.code);
        if let Some(message) = envelope.status.message {
            err = err.with_context("message", message);
        }
        return Err(err);
    }

    envelope
        .data
        .ok_or_else(|| Error::new(ErrorKind::Unexpected, "response has no data array"))
}

/// Extracts the flattened schema mapping from a schema response's data array.
fn schema_from_data(mut data: Vec<Value>) -> Result<Map<String, Value>> {
    if data.len() < 2 {
        return Err(
            Error::new(ErrorKind::SchemaInvalid, "schema response data is too short")
                .with_context("len", data.len().to_string()),
        );
    }

    match data.swap_remove(1) {
        Value::Object(mut entry) => match entry.remove(FLATTENED_SCHEMA_KEY) {
            Some(Value::Object(flattened)) => Ok(flattened),
            _ => Err(Error::new(
                ErrorKind::SchemaInvalid,
                "schema response entry has no flattened schema",
            )),
        },
        _ => Err(Error::new(
            ErrorKind::SchemaInvalid,
            "schema response entry is not an object",
        )),
    }
}

fn records_from_data(data: Vec<Value>) -> Result<Vec<Map<String, Value>>> {
    data.into_iter()
        .map(|record| match record {
            Value::Object(record) => Ok(record),
            _ => Err(Error::new(
                ErrorKind::Unexpected,
                "record entry is not an object",
            )),
        })
        .collect()
}

struct Endpoint {
    base: String,
}

impl Endpoint {
    fn new(base: String) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn schema(&self, target: &str) -> String {
        [
            &self.base,
            "targets",
            encode(target).as_ref(),
            "debug",
            "jsonSchema",
        ]
        .join("/")
    }

    fn records(&self, path: &str, page: usize, size: usize) -> String {
        format!("{}{}?page={}&size={}", self.base, path, page, size)
    }
}

mod _models {
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Deserialize, Default, Debug)]
    #[serde(default)]
    pub(super) struct Envelope {
        pub(super) status: Status,
        pub(super) data: Option<Vec<Value>>,
    }

    #[derive(Deserialize, Default, Debug)]
    #[serde(default)]
    pub(super) struct Status {
        pub(super) code: String,
        pub(super) message: Option<String>,
    }
}
