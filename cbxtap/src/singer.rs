//! Singer module provides the messages written on the output stream.
//!
//! The output protocol is line-delimited JSON: one SCHEMA message per stream
//! followed by its RECORD messages, with STATE messages marking progress.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::stream::StreamDef;

/// One message on the output stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Message {
    /// Declares the record schema of a stream.
    #[serde(rename = "SCHEMA")]
    Schema {
        /// Stream name.
        stream: String,
        /// JSON Schema document for the stream's records.
        schema: Value,
        /// Primary key fields.
        key_properties: Vec<String>,
        /// Fields used as replication bookmarks.
        bookmark_properties: Vec<String>,
    },
    /// Carries one extracted record.
    #[serde(rename = "RECORD")]
    Record {
        /// Stream the record belongs to.
        stream: String,
        /// The record payload.
        record: Map<String, Value>,
        /// Extraction timestamp, RFC 3339.
        time_extracted: String,
    },
    /// Snapshot of replication progress.
    #[serde(rename = "STATE")]
    State {
        /// The state document.
        value: Value,
    },
}

impl Message {
    /// Builds the SCHEMA message for a stream definition.
    pub fn schema(def: &StreamDef, schema: Value) -> Self {
        Message::Schema {
            stream: def.name.to_string(),
            schema,
            key_properties: def.key_properties.iter().map(|k| k.to_string()).collect(),
            bookmark_properties: vec![def.replication_key.to_string()],
        }
    }

    /// Builds a RECORD message stamped with the current time.
    pub fn record(stream: &str, record: Map<String, Value>) -> Self {
        Message::Record {
            stream: stream.to_string(),
            record,
            time_extracted: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// Builds a STATE message from a state document.
    pub fn state(value: Value) -> Self {
        Message::State { value }
    }
}

/// Writes line-delimited messages to a sink.
pub struct MessageWriter<W: Write> {
    out: W,
}

impl<W: Write> MessageWriter<W> {
    /// Wraps a sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Serializes one message and terminates it with a newline.
    pub fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Flushes the sink.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.out.flush()?)
    }
}
