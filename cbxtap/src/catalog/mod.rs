//! Catalog module provides stream discovery against the remote API.

mod rest;
pub use rest::{RestClient, ORGANISATION_HEADER};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::stream::{StreamDef, STREAMS};

/// Source of target schemas and record pages.
///
/// Implemented by [`RestClient`] against the live API; tests drive discovery
/// and sync through in-process fakes.
pub trait TargetSource: Send + Sync {
    /// Derives the serialized record schema for a target.
    ///
    /// Returns `None` when the schema cannot be obtained for any reason; the
    /// reason has already been reported through the discovery log.
    fn fetch_schema(&self, target: &str) -> Option<Value>;

    /// Fetches one page of records from a records endpoint.
    ///
    /// Pages are 1-based. Unlike schema fetching, failures here propagate.
    fn fetch_records(&self, path: &str, page: usize, size: usize)
        -> Result<Vec<Map<String, Value>>>;
}

/// Sink for diagnostics raised while deriving schemas.
pub trait DiscoveryLog: Send + Sync {
    /// A target's schema could not be obtained.
    fn schema_unavailable(&self, target: &str, reason: &str);

    /// A target's schema contained field definitions with missing or
    /// unrecognized types, all defaulted to string.
    fn unknown_types(&self, target: &str, count: usize);
}

/// Reference to a shared discovery log.
pub type DiscoveryLogRef = Arc<dyn DiscoveryLog>;

/// Default discovery log routing to the process logger.
#[derive(Debug, Default)]
pub struct StdLog;

impl DiscoveryLog for StdLog {
    fn schema_unavailable(&self, target: &str, reason: &str) {
        log::warn!("schema for target {target} unavailable: {reason}");
    }

    fn unknown_types(&self, target: &str, count: usize) {
        log::warn!("target {target}: {count} field definitions without a known type, defaulted to string");
    }
}

/// Discovery-mode output document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    /// One entry per stream whose schema was derivable.
    pub streams: Vec<CatalogEntry>,
}

/// One stream entry in the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Unique stream identifier.
    pub tap_stream_id: String,
    /// Stream name.
    pub stream: String,
    /// JSON Schema document for the stream's records.
    pub schema: Value,
    /// Primary key field names.
    pub key_properties: Vec<String>,
    /// Field used as the incremental replication key.
    pub replication_key: String,
}

impl CatalogEntry {
    fn new(def: &StreamDef, schema: Value) -> Self {
        Self {
            tap_stream_id: def.name.to_string(),
            stream: def.name.to_string(),
            schema,
            key_properties: def.key_properties.iter().map(|k| k.to_string()).collect(),
            replication_key: def.replication_key.to_string(),
        }
    }
}

/// Builds the catalog by deriving a schema for every configured stream.
///
/// Streams whose schema cannot be obtained are left out of the catalog; the
/// discovery log already recorded why.
pub fn discover(source: &dyn TargetSource) -> Catalog {
    let mut streams = Vec::with_capacity(STREAMS.len());
    for def in STREAMS {
        if let Some(schema) = source.fetch_schema(def.target) {
            streams.push(CatalogEntry::new(def, schema));
        }
    }
    Catalog { streams }
}
