//! State module tracks per-stream replication bookmarks.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Bookmark for one stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    /// Field the bookmark tracks.
    pub replication_key: String,
    /// Highest value observed for the field.
    pub replication_key_value: String,
}

/// Singer state document: replication bookmarks keyed by stream name.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TapState {
    /// Bookmarks keyed by stream name.
    #[serde(default)]
    pub bookmarks: BTreeMap<String, Bookmark>,
}

impl TapState {
    /// Reads a state document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read(path.as_ref())?;
        serde_json::from_slice(&content).map_err(|err| {
            Error::new(ErrorKind::ConfigInvalid, "state file is not a valid state document")
                .with_context("path", path.as_ref().to_string_lossy())
                .set_source(err)
        })
    }

    /// Current bookmark value for a stream.
    pub fn bookmark_value(&self, stream: &str) -> Option<&str> {
        self.bookmarks
            .get(stream)
            .map(|bookmark| bookmark.replication_key_value.as_str())
    }

    /// Records a new bookmark value for a stream.
    pub fn set_bookmark(&mut self, stream: &str, replication_key: &str, value: impl Into<String>) {
        self.bookmarks.insert(
            stream.to_string(),
            Bookmark {
                replication_key: replication_key.to_string(),
                replication_key_value: value.into(),
            },
        );
    }

    /// The state document as carried by STATE messages.
    pub fn document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_bookmark_round_trip() {
        let mut state = TapState::default();
        assert_eq!(state.bookmark_value("accounts"), None);

        state.set_bookmark("accounts", "updatedAt", "2024-03-01T00:00:00Z");
        assert_eq!(
            state.bookmark_value("accounts"),
            Some("2024-03-01T00:00:00Z")
        );

        state.set_bookmark("accounts", "updatedAt", "2024-04-01T00:00:00Z");
        assert_eq!(
            state.bookmark_value("accounts"),
            Some("2024-04-01T00:00:00Z")
        );
    }

    #[test]
    fn test_document_shape() {
        let mut state = TapState::default();
        state.set_bookmark("contacts", "updatedAt", "2024-03-01T00:00:00Z");

        assert_eq!(
            state.document().unwrap(),
            json!({
                "bookmarks": {
                    "contacts": {
                        "replication_key": "updatedAt",
                        "replication_key_value": "2024-03-01T00:00:00Z"
                    }
                }
            })
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "bookmarks": {{
                    "accounts": {{
                        "replication_key": "updatedAt",
                        "replication_key_value": "2024-01-01T00:00:00Z"
                    }}
                }}
            }}"#
        )
        .unwrap();

        let state = TapState::from_file(file.path()).unwrap();
        assert_eq!(state.bookmark_value("accounts"), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = TapState::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_empty_document_parses() {
        let state: TapState = serde_json::from_str("{}").unwrap();
        assert!(state.bookmarks.is_empty());
    }
}
