use std::collections::HashMap;

use serde_json::{json, Map, Value};

use cbxtap::catalog::TargetSource;
use cbxtap::config::TapConfig;
use cbxtap::singer::MessageWriter;
use cbxtap::state::TapState;
use cbxtap::sync::{sync, SyncReport};
use cbxtap::types::{flatten_schema, to_json_schema};

#[derive(Default, Clone)]
struct FakeSource {
    schemas: HashMap<&'static str, Value>,
    records: HashMap<&'static str, Vec<Map<String, Value>>>,
}

impl FakeSource {
    fn with_wire_schema(mut self, target: &'static str, wire: Value) -> Self {
        let flattened = wire.as_object().unwrap().clone();
        self.schemas
            .insert(target, to_json_schema(&flatten_schema(&flattened)));
        self
    }

    fn with_records(mut self, path: &'static str, records: Vec<Value>) -> Self {
        self.records.insert(
            path,
            records
                .into_iter()
                .map(|record| record.as_object().unwrap().clone())
                .collect(),
        );
        self
    }
}

impl TargetSource for FakeSource {
    fn fetch_schema(&self, target: &str) -> Option<Value> {
        self.schemas.get(target).cloned()
    }

    fn fetch_records(
        &self,
        path: &str,
        page: usize,
        size: usize,
    ) -> cbxtap::Result<Vec<Map<String, Value>>> {
        let records = match self.records.get(path) {
            Some(records) => records,
            None => return Ok(Vec::new()),
        };
        Ok(records
            .iter()
            .skip((page - 1) * size)
            .take(size)
            .cloned()
            .collect())
    }
}

struct SyncTestCase {
    source: FakeSource,
    config: TapConfig,
    state: TapState,
}

impl SyncTestCase {
    fn new(source: FakeSource) -> Self {
        SyncTestCase {
            source,
            config: serde_json::from_str(
                r#"{ "access_key": "ak", "organization_id": "org", "page_size": 10 }"#,
            )
            .unwrap(),
            state: TapState::default(),
        }
    }

    fn with_state(mut self, state: TapState) -> Self {
        self.state = state;
        self
    }

    fn run(mut self) -> (Vec<Value>, TapState, SyncReport) {
        let mut buffer = Vec::new();
        let mut writer = MessageWriter::new(&mut buffer);
        let report = sync(&self.source, &self.config, &mut self.state, &mut writer).unwrap();

        let messages = std::str::from_utf8(&buffer)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (messages, self.state, report)
    }
}

fn two_stream_source() -> FakeSource {
    FakeSource::default()
        .with_wire_schema(
            "accounts",
            json!({
                "id": { "type": "integer" },
                "name": { "type": "string" },
                "hqLocation.city": { "type": "string" },
                "industries[*].code": { "type": "string" },
                "updatedAt": { "type": "string" }
            }),
        )
        .with_wire_schema(
            "contacts",
            json!({
                "id": { "type": "integer" },
                "email": { "type": "string" },
                "updatedAt": { "type": "string" }
            }),
        )
        .with_records(
            "/targets/accounts",
            vec![
                json!({
                    "id": 1,
                    "name": "ACME",
                    "hqLocation_city": "Berlin",
                    "industries": ["SAAS"],
                    "updatedAt": "2024-01-10T00:00:00Z",
                    "internalScore": 0.9
                }),
                json!({
                    "id": 2,
                    "name": "Globex",
                    "updatedAt": "2024-02-20T00:00:00Z"
                }),
            ],
        )
        .with_records(
            "/targets/contacts",
            vec![json!({
                "id": 7,
                "email": "a@example.com",
                "updatedAt": "2024-03-05T00:00:00Z"
            })],
        )
}

#[test]
fn test_streams_are_emitted_in_order() {
    let (messages, state, report) = SyncTestCase::new(two_stream_source()).run();

    let kinds: Vec<&str> = messages
        .iter()
        .map(|message| message["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec!["SCHEMA", "RECORD", "RECORD", "STATE", "SCHEMA", "RECORD", "STATE"]
    );

    assert_eq!(messages[0]["stream"], json!("accounts"));
    assert_eq!(messages[4]["stream"], json!("contacts"));
    assert_eq!(
        report.counts,
        vec![("accounts".to_string(), 2), ("contacts".to_string(), 1)]
    );

    // The state after the first stream has no contacts bookmark yet.
    assert!(messages[3]["value"]["bookmarks"].get("contacts").is_none());
    assert_eq!(
        state.bookmark_value("accounts"),
        Some("2024-02-20T00:00:00Z")
    );
    assert_eq!(
        state.bookmark_value("contacts"),
        Some("2024-03-05T00:00:00Z")
    );
}

#[test]
fn test_records_are_conformed_to_schema() {
    let (messages, _, _) = SyncTestCase::new(two_stream_source()).run();

    let record = messages[1]["record"].as_object().unwrap();
    let names: Vec<&String> = record.keys().collect();

    // Declared order, undeclared fields gone.
    assert_eq!(
        names,
        vec!["id", "name", "hqLocation_city", "updatedAt", "industries"]
    );
    assert!(record.get("internalScore").is_none());
    assert_eq!(record["industries"], json!(["SAAS"]));
}

#[test]
fn test_second_run_resumes_from_state() {
    let (_, state, first) = SyncTestCase::new(two_stream_source()).run();
    assert_eq!(
        first.counts,
        vec![("accounts".to_string(), 2), ("contacts".to_string(), 1)]
    );

    let (messages, _, second) = SyncTestCase::new(two_stream_source())
        .with_state(state)
        .run();

    // The bookmark filter is inclusive, so only the newest record of each
    // stream comes back.
    assert_eq!(
        second.counts,
        vec![("accounts".to_string(), 1), ("contacts".to_string(), 1)]
    );
    let records: Vec<&Value> = messages
        .iter()
        .filter(|message| message["type"] == json!("RECORD"))
        .collect();
    assert_eq!(records[0]["record"]["id"], json!(2));
}

#[test]
fn test_sync_without_any_schema_produces_no_output() {
    let (messages, state, report) = SyncTestCase::new(FakeSource::default()).run();

    assert!(messages.is_empty());
    assert_eq!(report, SyncReport::default());
    assert!(state.bookmarks.is_empty());
}
